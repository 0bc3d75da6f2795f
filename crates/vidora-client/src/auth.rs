//! Bearer token storage.

use std::sync::Arc;

use parking_lot::RwLock;

/// Holds the session token attached to outgoing requests.
///
/// Clones share the same slot, so a login flow can update the token seen
/// by an already-built client.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    token: Arc<RwLock<Option<String>>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set(token);
        store
    }

    /// Replaces the stored token.
    pub fn set(&self, token: impl Into<String>) {
        *self.token.write() = Some(token.into());
    }

    /// Removes the stored token.
    pub fn clear(&self) {
        *self.token.write() = None;
    }

    pub fn get(&self) -> Option<String> {
        self.token.read().clone()
    }

    /// `Authorization` header for the current token, if any.
    pub fn authorization_header(&self) -> Option<(String, String)> {
        self.token
            .read()
            .as_ref()
            .filter(|t| !t.is_empty())
            .map(|t| ("Authorization".to_string(), format!("Bearer {t}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_has_no_header() {
        assert!(TokenStore::new().authorization_header().is_none());
    }

    #[test]
    fn test_bearer_header() {
        let store = TokenStore::with_token("abc");
        assert_eq!(
            store.authorization_header(),
            Some(("Authorization".to_string(), "Bearer abc".to_string()))
        );
    }

    #[test]
    fn test_blank_token_is_ignored() {
        assert!(TokenStore::with_token("").authorization_header().is_none());
    }

    #[test]
    fn test_clones_share_token() {
        let store = TokenStore::new();
        let other = store.clone();

        other.set("t1");
        assert_eq!(store.get(), Some("t1".to_string()));

        store.clear();
        assert!(other.get().is_none());
    }
}
