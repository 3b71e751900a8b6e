//! Tree construction: turns the token stream into a [`wombat_dom::DomTree`].

mod core;
pub mod foreign_content;

pub use self::core::{
    ActiveFormattingElement, HTMLParser, InsertionMode, ParseIssue, format_tree, print_tree,
};
