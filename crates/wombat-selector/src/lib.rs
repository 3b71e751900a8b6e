//! CSS selector parsing and matching
//!
//! This crate implements the subset of
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/) needed by the
//! DOM query methods: `matches`, `querySelector`, `querySelectorAll` and
//! `closest` all go through one [`SelectorList`].
//!
//! # Supported
//!
//! - Type, universal, class and ID selectors, compounds of them
//! - Descendant, child, next-sibling and subsequent-sibling combinators
//! - Attribute selectors with every operator in § 6.4
//! - Selector lists separated by commas
//! - Structural pseudo-classes: `:root`, `:first-child`, `:last-child`,
//!   `:only-child`, `:first-of-type`, `:last-of-type`, `:empty`
//!
//! Anything else is rejected with a [`SelectorError`].

mod matching;
mod parser;

use thiserror::Error;

/// A selector string that could not be parsed.
///
/// Per [§ 3.1 Invalid selectors](https://www.w3.org/TR/selectors-4/#invalid):
/// "an invalid selector represents, and therefore matches, nothing", so
/// callers surface this as an error instead of returning no match.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{selector}' is not a valid selector: {reason}")]
pub struct SelectorError {
    /// The full selector text as given.
    pub selector: String,
    /// What was wrong with it.
    pub reason: &'static str,
}

/// [§ 5 Elemental selectors](https://www.w3.org/TR/selectors-4/#elemental-selectors)
/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// A simple selector is a single condition on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    ///
    /// Stored lower-cased and compared ASCII case-insensitively, so `DIV`
    /// and `foreignobject` find `div` and `foreignObject`.
    Type(String),

    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    Class(String),

    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    Id(String),

    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
    Universal,

    /// A structural pseudo-class.
    PseudoClass(PseudoClass),

    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    Attribute(AttributeSelector),
}

/// Structural pseudo-classes per [§ 14](https://www.w3.org/TR/selectors-4/#structural-pseudos).
/// Only element siblings count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoClass {
    /// [§ 14.1 :root](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
    /// "represents an element that is the root of the document"
    Root,
    /// [§ 14.4.1 :first-child](https://www.w3.org/TR/selectors-4/#the-first-child-pseudo)
    FirstChild,
    /// [§ 14.4.2 :last-child](https://www.w3.org/TR/selectors-4/#the-last-child-pseudo)
    LastChild,
    /// [§ 14.4.3 :only-child](https://www.w3.org/TR/selectors-4/#the-only-child-pseudo)
    OnlyChild,
    /// [§ 14.5.3 :first-of-type](https://www.w3.org/TR/selectors-4/#the-first-of-type-pseudo)
    FirstOfType,
    /// [§ 14.5.4 :last-of-type](https://www.w3.org/TR/selectors-4/#the-last-of-type-pseudo)
    LastOfType,
    /// [§ 14.2 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
    /// An element with no children other than comments.
    Empty,
}

/// Attribute selectors per [§ 6.4](https://www.w3.org/TR/selectors-4/#attribute-selectors).
/// The first field is the attribute name, the second the value to compare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeSelector {
    /// `[attr]`: "Represents an element with the att attribute"
    Exists(String),
    /// `[attr=value]`: the value "is exactly 'val'"
    Equals(String, String),
    /// `[attr~=value]`: "a whitespace-separated list of words, one of which
    /// is exactly 'val'"
    Includes(String, String),
    /// `[attr|=value]`: "either being exactly 'val' or beginning with 'val'
    /// immediately followed by '-'"
    DashMatch(String, String),
    /// `[attr^=value]`: "begins with the prefix 'val'"
    PrefixMatch(String, String),
    /// `[attr$=value]`: "ends with the suffix 'val'"
    SuffixMatch(String, String),
    /// `[attr*=value]`: "contains at least one instance of the substring 'val'"
    SubstringMatch(String, String),
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator, and represents a set of simultaneous
/// conditions on a single element."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundSelector {
    /// The simple selectors that must all match.
    pub simple_selectors: Vec<SimpleSelector>,
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `A B`: B is an arbitrary descendant of A.
    Descendant,
    /// `A > B`: B is a direct child of A.
    Child,
    /// `A + B`: B immediately follows A among element siblings.
    NextSibling,
    /// `A ~ B`: B follows A among element siblings.
    SubsequentSibling,
}

/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
///
/// Example: `div.container > ul.nav li` is stored as
/// ```text
/// subject: [li]
/// combinators: [(Descendant, ul.nav), (Child, div.container)]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    /// The rightmost compound selector (the subject of the selector).
    pub subject: CompoundSelector,

    /// Chain of (combinator, compound) pairs going left from the subject,
    /// so matching walks from the subject outward.
    pub combinators: Vec<(Combinator, CompoundSelector)>,
}

/// [§ 4.1 Selector lists](https://www.w3.org/TR/selectors-4/#selector-list)
///
/// "A selector list is a comma-separated list of selectors"; an element
/// matches the list when it matches any of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    /// The comma-separated alternatives, in source order.
    pub selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    /// Parse a selector list.
    ///
    /// # Errors
    ///
    /// Returns a [`SelectorError`] for empty input, unbalanced brackets or
    /// quotes, dangling combinators and any syntax outside the supported
    /// subset (pseudo-elements, functional pseudo-classes, namespaces,
    /// escapes).
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        parser::parse_selector_list(source)
    }
}
