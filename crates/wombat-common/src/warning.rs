//! Engine warnings with colored terminal output.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used by the tokenizer and tree builder to report parse errors.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use owo_colors::OwoColorize;

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

fn warned() -> MutexGuard<'static, Option<HashSet<String>>> {
    // A panic while printing leaves the set intact, so a poisoned lock is still usable.
    WARNED.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Warn about a parse error or unsupported construct (prints once per unique message).
///
/// Returns `true` if the message was printed, `false` if it was a repeat.
///
/// # Example
/// ```
/// use wombat_common::warning::{clear_warnings, warn_once};
///
/// clear_warnings();
/// assert!(warn_once("HTML Parser", "unexpected end tag </p>"));
/// assert!(!warn_once("HTML Parser", "unexpected end tag </p>"));
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let should_print = warned().get_or_insert_with(HashSet::new).insert(key);

    if should_print {
        eprintln!("{}", format!("[wombat {component}] ⚠ {message}").yellow());
    }
    should_print
}

/// Clear all recorded warnings (call before parsing a new document)
pub fn clear_warnings() {
    if let Some(set) = warned().as_mut() {
        set.clear();
    }
}
