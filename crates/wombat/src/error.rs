//! Errors surfaced by the document handles.

use thiserror::Error;
use wombat_selector::SelectorError;

/// Everything a DOM operation can fail with.
///
/// Every check runs before the tree is touched, so a failed call never
/// leaves a partial edit behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// `parse_from_string` was given anything but `text/html`.
    #[error("Unsupported mime type: {0}")]
    UnsupportedMimeType(String),

    /// [`NotFoundError`](https://webidl.spec.whatwg.org/#notfounderror):
    /// a reference node is not a child of the node being edited.
    #[error("NotFoundError: {0}")]
    NotFound(&'static str),

    /// The selector text could not be parsed.
    #[error("SyntaxError: {0}")]
    InvalidSelector(#[from] SelectorError),

    /// [`HierarchyRequestError`](https://webidl.spec.whatwg.org/#hierarchyrequesterror):
    /// the edit would create a cycle or put a node where it cannot live.
    #[error("HierarchyRequestError: {0}")]
    HierarchyRequest(&'static str),

    /// [`IndexSizeError`](https://webidl.spec.whatwg.org/#indexsizeerror):
    /// a character offset is past the end of the data.
    #[error("IndexSizeError: the offset is greater than the length of the data")]
    IndexSize,

    /// [`InvalidCharacterError`](https://webidl.spec.whatwg.org/#invalidcharactererror):
    /// a name argument holds a character it may not contain.
    #[error("InvalidCharacterError: {0}")]
    InvalidCharacter(String),

    /// [`SyntaxError`](https://webidl.spec.whatwg.org/#syntaxerror) for
    /// malformed string arguments other than selectors.
    #[error("SyntaxError: {0}")]
    Syntax(String),
}

pub(crate) const NOT_A_CHILD_TO_REMOVE: &str = "The node to be removed is not a child of this node.";
pub(crate) const NOT_A_CHILD_TO_REPLACE: &str =
    "The node to be replaced is not a child of this node.";
pub(crate) const NOT_A_CHILD_TO_INSERT_BEFORE: &str =
    "The node before which the new node is to be inserted is not a child of this node.";
