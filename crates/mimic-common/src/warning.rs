//! Deduplicated engine warnings.
//!
//! Unsupported or malformed input (an unknown pseudo-class, a length unit
//! nobody handles) tends to repeat once per element. Warnings are keyed by
//! component and message and emitted through the [`log`] facade once.

use std::collections::HashSet;
use std::sync::Mutex;

/// Global set of warnings already emitted.
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about unsupported input (logged once per unique message).
///
/// # Example
/// ```
/// mimic_common::warning::warn_once("CSS", "unsupported unit 'vmin' in width: 10vmin");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let should_log = match WARNED.lock() {
        Ok(mut guard) => guard.get_or_insert_with(HashSet::new).insert(key),
        // A poisoned set only loses deduplication.
        Err(_) => true,
    };

    if should_log {
        log::warn!(target: "mimic", "[{component}] {message}");
    }
}

/// Forget all recorded warnings (call when a new document is loaded).
pub fn clear_warnings() {
    if let Ok(mut guard) = WARNED.lock()
        && let Some(set) = guard.as_mut()
    {
        set.clear();
    }
}

/// Number of distinct warnings recorded since the last [`clear_warnings`].
#[must_use]
pub fn warning_count() -> usize {
    WARNED
        .lock()
        .ok()
        .and_then(|guard| guard.as_ref().map(HashSet::len))
        .unwrap_or(0)
}
