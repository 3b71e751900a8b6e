//! HTML tokenizer, tree builder and serializer for the wombat document engine.
//!
//! # Scope
//!
//! - **Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Data, RCDATA, RAWTEXT, script data and PLAINTEXT states
//!   - DOCTYPE, comment, tag and attribute states
//!   - Named and numeric character references
//!
//! - **Tree builder** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - Insertion modes: Initial, BeforeHtml, BeforeHead, InHead, InHeadNoscript,
//!     AfterHead, InBody, Text, AfterBody, AfterAfterBody
//!   - Active formatting elements and the adoption agency algorithm
//!   - SVG and MathML subtrees
//!   - Fragment parsing against a context element
//!
//! - **Serializer** ([WHATWG § 13.3](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments))
//!
//! # Not Implemented
//!
//! - Table insertion modes and foster parenting; tables are ordinary elements
//! - Frameset documents
//! - Script execution

/// HTML parser and tree construction.
pub mod parser;
/// DOM to markup serialization.
pub mod serializer;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;

pub use parser::{HTMLParser, InsertionMode, ParseIssue, format_tree, print_tree};
pub use serializer::HtmlSerializer;
pub use tokenizer::{Attribute, HTMLTokenizer, Token};

use wombat_common::ParseOptions;
use wombat_dom::DomTree;

/// Parse a complete document. `html`, `head` and `body` always exist in the
/// result.
#[must_use]
pub fn parse_document(html: &str, options: &ParseOptions) -> DomTree {
    parse_document_with_issues(html, options).0
}

/// Parse a complete document and return the tree builder's parse issues too.
#[must_use]
pub fn parse_document_with_issues(
    html: &str,
    options: &ParseOptions,
) -> (DomTree, Vec<ParseIssue>) {
    let mut tokenizer = HTMLTokenizer::with_options(html, options);
    tokenizer.run();
    HTMLParser::with_options(tokenizer.into_tokens(), options).run_with_issues()
}

/// [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
///
/// Parse `html` as the content of a `context` element. The returned tree's
/// root is a `DocumentFragment` whose children are the parsed nodes; no
/// `html`, `head` or `body` wrapper is added.
#[must_use]
pub fn parse_fragment(html: &str, context: &str, options: &ParseOptions) -> DomTree {
    let mut tokenizer = HTMLTokenizer::for_fragment(html, context, options);
    tokenizer.run();
    HTMLParser::for_fragment(tokenizer.into_tokens(), options).run()
}
