//! In-memory access token storage
//!
//! The store is the single source of truth for the bearer token attached to
//! outgoing requests. Reads and writes are lock-free and synchronous, so a
//! token written by a finished refresh is visible to every request built
//! afterwards, including retries resumed in the same turn.

use arc_swap::ArcSwapOption;
use ootd_core::AccessToken;
use std::fmt;
use std::sync::Arc;

/// Holds the current access token, if any
pub struct TokenStore {
    current: ArcSwapOption<AccessToken>,
}

impl TokenStore {
    /// Create an empty store (unauthenticated)
    pub fn new() -> Self {
        Self {
            current: ArcSwapOption::empty(),
        }
    }

    /// Replace the stored token. `None` means unauthenticated.
    pub fn set_token(&self, token: Option<AccessToken>) {
        self.current.store(token.map(Arc::new));
    }

    /// Current token, or `None` when unauthenticated
    pub fn token(&self) -> Option<AccessToken> {
        self.current.load_full().map(|token| token.as_ref().clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.load().is_some()
    }

    /// Forget the token
    pub fn clear(&self) {
        self.set_token(None);
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("token", &self.token())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_empty() {
        let store = TokenStore::new();
        assert!(store.token().is_none());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_set_and_replace() {
        let store = TokenStore::new();
        store.set_token(Some(AccessToken::new("tok1")));
        assert_eq!(store.token(), Some(AccessToken::new("tok1")));

        store.set_token(Some(AccessToken::new("tok2")));
        assert_eq!(store.token(), Some(AccessToken::new("tok2")));

        store.clear();
        assert!(store.token().is_none());
    }

    #[test]
    fn test_setting_same_token_twice_is_idempotent() {
        let store = TokenStore::new();
        store.set_token(Some(AccessToken::new("same")));
        let first = store.token().map(|t| t.bearer());
        store.set_token(Some(AccessToken::new("same")));
        assert_eq!(store.token().map(|t| t.bearer()), first);
    }

    #[test]
    fn test_debug_hides_token() {
        let store = TokenStore::new();
        store.set_token(Some(AccessToken::new("abcdefghijklmnopqrstuvwxyz")));
        let rendered = format!("{store:?}");
        assert!(rendered.contains("abcdefgh..."));
        assert!(!rendered.contains("qrstuvwxyz"));
    }
}
