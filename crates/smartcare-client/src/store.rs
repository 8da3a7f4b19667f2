//! Client-retained state that outlives a single request: the credential
//! artifact, the session cookie header and the redirect-attempt counter.

use std::sync::Mutex;

use crate::error::{ClientError, ClientResult};

/// The credential artifact is written by whoever issued it; this client only
/// reads it and deletes it once it can no longer be valid.
pub trait ClientStore: Send + Sync {
    fn load_token(&self) -> ClientResult<Option<String>>;
    fn remove_token(&self) -> ClientResult<()>;

    /// `Cookie` header value captured from the server session, if any.
    fn load_cookies(&self) -> ClientResult<Option<String>>;
    fn save_cookies(&self, cookies: Option<&str>) -> ClientResult<()>;

    fn redirect_attempts(&self) -> u32;
    fn record_redirect_attempt(&self) -> u32;
    fn clear_redirect_attempts(&self);
}

#[derive(Debug, Default)]
struct MemoryState {
    token: Option<String>,
    cookies: Option<String>,
    redirect_attempts: u32,
}

/// In-process store. Everything is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryClientStore {
    state: Mutex<MemoryState>,
}

impl MemoryClientStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::default();
        if let Ok(mut state) = store.state.lock() {
            state.token = Some(token.into());
        }
        store
    }

    fn lock(&self) -> ClientResult<std::sync::MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| ClientError::storage("memory store poisoned"))
    }
}

impl ClientStore for MemoryClientStore {
    fn load_token(&self) -> ClientResult<Option<String>> {
        Ok(self.lock()?.token.clone())
    }

    fn remove_token(&self) -> ClientResult<()> {
        self.lock()?.token = None;
        Ok(())
    }

    fn load_cookies(&self) -> ClientResult<Option<String>> {
        Ok(self.lock()?.cookies.clone())
    }

    fn save_cookies(&self, cookies: Option<&str>) -> ClientResult<()> {
        self.lock()?.cookies = cookies.map(str::to_string);
        Ok(())
    }

    fn redirect_attempts(&self) -> u32 {
        self.lock().map(|s| s.redirect_attempts).unwrap_or(0)
    }

    fn record_redirect_attempt(&self) -> u32 {
        match self.lock() {
            Ok(mut s) => {
                s.redirect_attempts = s.redirect_attempts.saturating_add(1);
                s.redirect_attempts
            }
            Err(_) => 0,
        }
    }

    fn clear_redirect_attempts(&self) {
        if let Ok(mut s) = self.lock() {
            s.redirect_attempts = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryClientStore::with_token("a.b.c");
        assert_eq!(store.load_token().unwrap().as_deref(), Some("a.b.c"));
        store.remove_token().unwrap();
        assert_eq!(store.load_token().unwrap(), None);

        store.save_cookies(Some("connect.sid=abc")).unwrap();
        assert_eq!(
            store.load_cookies().unwrap().as_deref(),
            Some("connect.sid=abc")
        );
    }

    #[test]
    fn test_redirect_counter() {
        let store = MemoryClientStore::new();
        assert_eq!(store.record_redirect_attempt(), 1);
        assert_eq!(store.record_redirect_attempt(), 2);
        store.clear_redirect_attempts();
        assert_eq!(store.redirect_attempts(), 0);
    }
}
