//! Selector text to [`SelectorList`].
//!
//! [§ 4 Selector syntax](https://www.w3.org/TR/selectors-4/#syntax)

use std::iter::Peekable;
use std::str::Chars;

use crate::{
    AttributeSelector, Combinator, ComplexSelector, CompoundSelector, PseudoClass, SelectorError,
    SelectorList, SimpleSelector,
};

type Input<'a> = Peekable<Chars<'a>>;

/// Check if a character can start an identifier.
/// [§ 4.3.10 ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
const fn is_ident_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// Check if a character can continue an identifier.
/// [§ 4.3.9 ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
const fn is_ident_char(c: char) -> bool {
    is_ident_start_char(c) || c.is_ascii_digit() || c == '-'
}

fn skip_whitespace(chars: &mut Input<'_>) {
    while chars.peek().is_some_and(char::is_ascii_whitespace) {
        let _ = chars.next();
    }
}

fn take_ident(chars: &mut Input<'_>) -> String {
    let mut ident = String::new();
    while let Some(&c) = chars.peek()
        && is_ident_char(c)
    {
        ident.push(c);
        let _ = chars.next();
    }
    ident
}

/// Parse a comma-separated selector list.
pub(crate) fn parse_selector_list(source: &str) -> Result<SelectorList, SelectorError> {
    let error = |reason| SelectorError {
        selector: source.to_string(),
        reason,
    };

    let mut selectors = Vec::new();
    for part in split_selector_list(source).map_err(error)? {
        selectors.push(parse_complex_selector(part).map_err(error)?);
    }
    Ok(SelectorList { selectors })
}

/// Split at top-level commas, leaving commas inside `[...]` and quoted
/// attribute values alone.
fn split_selector_list(source: &str) -> Result<Vec<&str>, &'static str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quote = None;
    let mut in_brackets = false;
    for (index, c) in source.char_indices() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') if in_brackets => quote = Some(c),
            (None, '[') => in_brackets = true,
            (None, ']') => in_brackets = false,
            (None, ',') if !in_brackets => {
                parts.push(&source[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    if quote.is_some() {
        return Err("unterminated string");
    }
    parts.push(&source[start..]);
    if parts.iter().any(|part| part.trim().is_empty()) {
        return Err("empty selector in list");
    }
    Ok(parts)
}

/// Parse one complex selector: compounds separated by combinators.
///
/// The chain is built left to right and then reversed so the rightmost
/// compound (the subject) is easy to reach.
fn parse_complex_selector(raw: &str) -> Result<ComplexSelector, &'static str> {
    /// Flush the current compound into the compounds list.
    /// Returns true if a non-empty compound was flushed.
    fn flush_compound(
        compound: &mut Vec<SimpleSelector>,
        compounds: &mut Vec<CompoundSelector>,
    ) -> bool {
        if compound.is_empty() {
            return false;
        }
        compounds.push(CompoundSelector {
            simple_selectors: std::mem::take(compound),
        });
        true
    }

    let mut compounds: Vec<CompoundSelector> = Vec::new();
    let mut combinators_between: Vec<Combinator> = Vec::new();
    let mut current_compound = Vec::new();

    let mut chars = raw.trim().chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            // [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
            '.' => {
                let name = take_ident(&mut chars);
                if name.is_empty() {
                    return Err("expected a class name after '.'");
                }
                current_compound.push(SimpleSelector::Class(name));
            }

            // [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
            '#' => {
                let name = take_ident(&mut chars);
                if name.is_empty() {
                    return Err("expected an id after '#'");
                }
                current_compound.push(SimpleSelector::Id(name));
            }

            // [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
            '*' => current_compound.push(SimpleSelector::Universal),

            // [§ 16.1 Descendant combinator](https://www.w3.org/TR/selectors-4/#descendant-combinators)
            // Whitespace is a descendant combinator unless an explicit
            // combinator follows it.
            c if c.is_ascii_whitespace() => {
                skip_whitespace(&mut chars);
                if matches!(chars.peek(), Some('>' | '+' | '~')) {
                    continue;
                }
                if !flush_compound(&mut current_compound, &mut compounds) {
                    return Err("combinator without a left-hand selector");
                }
                combinators_between.push(Combinator::Descendant);
            }

            // [§ 16.2](https://www.w3.org/TR/selectors-4/#child-combinators),
            // [§ 16.3](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators)
            // and [§ 16.4](https://www.w3.org/TR/selectors-4/#general-sibling-combinators)
            '>' | '+' | '~' => {
                if !flush_compound(&mut current_compound, &mut compounds) {
                    return Err("combinator without a left-hand selector");
                }
                skip_whitespace(&mut chars);
                combinators_between.push(match c {
                    '>' => Combinator::Child,
                    '+' => Combinator::NextSibling,
                    _ => Combinator::SubsequentSibling,
                });
            }

            // [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
            c if is_ident_start_char(c) || c == '-' => {
                if !current_compound.is_empty() {
                    return Err("a type selector must come first in a compound");
                }
                let mut name = String::from(c);
                name.push_str(&take_ident(&mut chars));
                current_compound.push(SimpleSelector::Type(name.to_ascii_lowercase()));
            }

            // [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
            ':' => {
                if chars.peek() == Some(&':') {
                    return Err("pseudo-elements are not supported");
                }
                let name = take_ident(&mut chars);
                if chars.peek() == Some(&'(') {
                    return Err("functional pseudo-classes are not supported");
                }
                let pseudo = match name.to_ascii_lowercase().as_str() {
                    "root" => PseudoClass::Root,
                    "first-child" => PseudoClass::FirstChild,
                    "last-child" => PseudoClass::LastChild,
                    "only-child" => PseudoClass::OnlyChild,
                    "first-of-type" => PseudoClass::FirstOfType,
                    "last-of-type" => PseudoClass::LastOfType,
                    "empty" => PseudoClass::Empty,
                    "" => return Err("expected a pseudo-class name after ':'"),
                    _ => return Err("unsupported pseudo-class"),
                };
                current_compound.push(SimpleSelector::PseudoClass(pseudo));
            }

            // [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
            '[' => current_compound.push(SimpleSelector::Attribute(parse_attribute_selector(
                &mut chars,
            )?)),

            _ => return Err("unexpected character"),
        }
    }

    let _ = flush_compound(&mut current_compound, &mut compounds);

    // "A B C" has three compounds and two combinators; anything else has a
    // combinator dangling at the end.
    if compounds.len() != combinators_between.len() + 1 {
        return Err("combinator without a right-hand selector");
    }
    let Some(subject) = compounds.pop() else {
        return Err("empty selector");
    };

    // For "A > B C": compounds [A, B] and combinators [Child, Descendant]
    // become [(Descendant, B), (Child, A)].
    let combinators = combinators_between
        .into_iter()
        .zip(compounds)
        .rev()
        .collect();

    Ok(ComplexSelector {
        subject,
        combinators,
    })
}

/// Parse the inside of `[...]`, with the `[` already consumed.
fn parse_attribute_selector(chars: &mut Input<'_>) -> Result<AttributeSelector, &'static str> {
    skip_whitespace(chars);
    let name = take_ident(chars).to_ascii_lowercase();
    if name.is_empty() {
        return Err("expected an attribute name");
    }
    skip_whitespace(chars);

    let operator = match chars.next() {
        Some(']') => return Ok(AttributeSelector::Exists(name)),
        Some('=') => '=',
        Some(op @ ('~' | '|' | '^' | '$' | '*')) => {
            if chars.next() != Some('=') {
                return Err("expected '=' in attribute selector");
            }
            op
        }
        _ => return Err("malformed attribute selector"),
    };

    let value = parse_attr_value(chars)?;
    skip_whitespace(chars);
    if chars.next() != Some(']') {
        return Err("expected ']' after attribute value");
    }

    Ok(match operator {
        '~' => AttributeSelector::Includes(name, value),
        '|' => AttributeSelector::DashMatch(name, value),
        '^' => AttributeSelector::PrefixMatch(name, value),
        '$' => AttributeSelector::SuffixMatch(name, value),
        '*' => AttributeSelector::SubstringMatch(name, value),
        _ => AttributeSelector::Equals(name, value),
    })
}

/// Parse an attribute value inside `[attr=value]`.
/// Handles both quoted (`"val"`, `'val'`) and unquoted ident values.
fn parse_attr_value(chars: &mut Input<'_>) -> Result<String, &'static str> {
    skip_whitespace(chars);

    match chars.peek() {
        Some(&q @ ('"' | '\'')) => {
            let _ = chars.next();
            let mut value = String::new();
            for c in chars.by_ref() {
                if c == q {
                    return Ok(value);
                }
                value.push(c);
            }
            Err("unterminated string")
        }
        _ => {
            let mut value = String::new();
            while let Some(&c) = chars.peek()
                && (is_ident_char(c) || c == '.')
            {
                value.push(c);
                let _ = chars.next();
            }
            if value.is_empty() {
                Err("expected an attribute value")
            } else {
                Ok(value)
            }
        }
    }
}
