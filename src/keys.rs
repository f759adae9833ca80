//! Process-wide API credential storage.
//!
//! Callers who want a single ambient credential set it once with
//! [`set_global_key`] before constructing clients; a key passed explicitly to
//! [`Stock::with_key`](crate::Stock::with_key) or
//! [`risk_free_rate`](crate::risk_free_rate) always takes precedence.

use std::sync::RwLock;

use lazy_static::lazy_static;

lazy_static! {
    static ref GLOBAL_KEY: RwLock<Option<String>> = RwLock::new(None);
}

/// Store `key` as the process-wide credential, overwriting any previous value.
///
/// The slot is lock-protected, so concurrent calls are memory-safe, but the
/// intended pattern is one-time setup before any concurrent use begins.
pub fn set_global_key(key: impl Into<String>) {
    let mut slot = GLOBAL_KEY.write().expect("global key lock poisoned");
    *slot = Some(key.into());
}

/// The current process-wide credential, if one has been set.
pub(crate) fn global_key() -> Option<String> {
    GLOBAL_KEY.read().expect("global key lock poisoned").clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so nothing races on the process-wide slot.
    #[test]
    fn test_set_and_overwrite_global_key() {
        set_global_key("first");
        assert_eq!(global_key().as_deref(), Some("first"));

        set_global_key("second".to_string());
        assert_eq!(global_key().as_deref(), Some("second"));
    }
}
