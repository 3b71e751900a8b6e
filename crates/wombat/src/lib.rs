//! DOMParser-style API over the wombat document engine.
//!
//! [`DomParser::parse_from_string`] turns HTML text into a [`Document`];
//! [`Node`] handles then navigate, query, edit and serialize the tree.
//!
//! ```
//! use wombat::DomParser;
//!
//! let document = DomParser::new()
//!     .parse_from_string("<div class=foo><span>hi</span></div>", "text/html")
//!     .unwrap();
//! let span = document.query_selector(".foo span").unwrap().unwrap();
//! span.set_text_content("bye");
//! assert_eq!(
//!     document.body().unwrap().inner_html(),
//!     r#"<div class="foo"><span>bye</span></div>"#
//! );
//! ```
//!
//! # Handles
//!
//! Handles are `Rc`-based and single-threaded. A node never dies while a
//! handle to it exists: removing it only detaches it, and it can be
//! inserted again anywhere, including into another document.

mod arena;
mod class_list;
mod content;
mod document;
mod error;
mod mutation;
mod node;
mod query;

pub use class_list::ClassList;
pub use document::Document;
pub use error::DomError;
pub use mutation::AdjacentPosition;
pub use node::Node;
pub use wombat_common::ParseOptions;
pub use wombat_dom::{NodeTypeCode, document_position};

use wombat_common::warning::clear_warnings;
use wombat_html::parse_document;

/// The only MIME type [`DomParser::parse_from_string`] accepts.
pub const TEXT_HTML: &str = "text/html";

/// [§ 8.5 DOMParser](https://html.spec.whatwg.org/multipage/dynamic-markup-insertion.html#dom-parsing-and-serialization)
///
/// Parses HTML strings into documents.
#[derive(Debug, Clone, Default)]
pub struct DomParser {
    options: ParseOptions,
}

impl DomParser {
    /// A parser with default [`ParseOptions`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A parser with the given options. They also apply when markup
    /// setters on the resulting documents parse fragments.
    #[must_use]
    pub const fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    /// The options documents are parsed with.
    #[must_use]
    pub const fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// [parseFromString](https://html.spec.whatwg.org/multipage/dynamic-markup-insertion.html#dom-domparser-parsefromstring)
    ///
    /// The document always has `html`, `head` and `body` elements.
    ///
    /// # Errors
    ///
    /// [`DomError::UnsupportedMimeType`] unless `mime_type` is exactly
    /// `text/html`.
    pub fn parse_from_string(&self, html: &str, mime_type: &str) -> Result<Document, DomError> {
        if mime_type != TEXT_HTML {
            return Err(DomError::UnsupportedMimeType(mime_type.to_string()));
        }
        if self.options.report_parse_errors {
            clear_warnings();
        }
        let tree = parse_document(html, &self.options);
        Ok(Document::from_tree(tree, self.options.clone()))
    }
}
