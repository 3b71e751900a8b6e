//! Common utilities for the wombat document engine.
//!
//! This crate provides shared infrastructure used by every engine component:
//! - **Warning System** - deduplicated, colored diagnostics on stderr
//! - **Parse Options** - knobs shared by the tokenizer, tree builder and facade

pub mod options;
pub mod warning;

pub use options::ParseOptions;
