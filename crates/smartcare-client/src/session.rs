//! Session store.
//!
//! Holds the client's belief about the signed-in identity. The whole
//! [`Session`] value sits behind an `ArcSwap`, so every update is a single
//! pointer swap and readers never see a half-written identity.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::models::{User, UserRole};
use crate::notify::Language;

/// Lifecycle state of the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Bootstrap has not started.
    Unchecked,
    /// Bootstrap identity request is in flight.
    Checking,
    Authenticated(User),
    Unauthenticated,
}

/// Field-less view of [`SessionState`] for logging and comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Unchecked,
    Checking,
    Authenticated,
    Unauthenticated,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unchecked => "unchecked",
            Self::Checking => "checking",
            Self::Authenticated => "authenticated",
            Self::Unauthenticated => "unauthenticated",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub state: SessionState,
    pub last_error: Option<String>,
}

impl Session {
    fn with_state(state: SessionState) -> Self {
        Self {
            state,
            last_error: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        match self.state {
            SessionState::Unchecked => SessionPhase::Unchecked,
            SessionState::Checking => SessionPhase::Checking,
            SessionState::Authenticated(_) => SessionPhase::Authenticated,
            SessionState::Unauthenticated => SessionPhase::Unauthenticated,
        }
    }

    pub fn identity(&self) -> Option<&User> {
        match &self.state {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<UserRole> {
        self.identity().map(|u| u.role)
    }

    /// True once bootstrap has resolved one way or the other.
    pub fn is_checked(&self) -> bool {
        matches!(
            self.state,
            SessionState::Authenticated(_) | SessionState::Unauthenticated
        )
    }

    /// True while bootstrap has not resolved.
    pub fn is_loading(&self) -> bool {
        !self.is_checked()
    }

    /// Display language from the user's preference, falling back to `default`.
    pub fn language(&self, default: Language) -> Language {
        self.identity()
            .and_then(|u| u.preferred_language.as_deref())
            .and_then(Language::from_tag)
            .unwrap_or(default)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::with_state(SessionState::Unchecked)
    }
}

/// Process-wide session holder, shared by reference with the gate, the
/// transport and every resource hook.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: ArcSwap<Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current session (single atomic load).
    pub fn snapshot(&self) -> Arc<Session> {
        self.inner.load_full()
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner.load().phase()
    }

    pub fn identity(&self) -> Option<User> {
        self.inner.load().identity().cloned()
    }

    /// UNCHECKED -> CHECKING. Returns `false` if bootstrap already started.
    pub fn begin_check(&self) -> bool {
        let prev = self.inner.rcu(|cur| {
            if cur.state == SessionState::Unchecked {
                Arc::new(Session::with_state(SessionState::Checking))
            } else {
                Arc::clone(cur)
            }
        });
        prev.state == SessionState::Unchecked
    }

    /// Store the server-confirmed identity.
    pub fn authenticate(&self, user: User) {
        tracing::info!(user = %user.username, role = %user.role, "session authenticated");
        self.set(Session::with_state(SessionState::Authenticated(user)));
    }

    /// Resolve to UNAUTHENTICATED, recording why.
    pub fn reject(&self, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::info!(%reason, "session unauthenticated");
        self.set(Session {
            state: SessionState::Unauthenticated,
            last_error: Some(reason),
        });
    }

    /// Explicit logout.
    pub fn sign_out(&self) {
        tracing::info!("session signed out");
        self.set(Session::with_state(SessionState::Unauthenticated));
    }

    /// A request came back 401.
    ///
    /// Only an authenticated session is torn down; before bootstrap resolves
    /// the state is left for the bootstrap sequencer to settle.
    pub fn expire(&self, reason: &str) {
        self.inner.rcu(|cur| match cur.state {
            SessionState::Authenticated(_) | SessionState::Unauthenticated => Arc::new(Session {
                state: SessionState::Unauthenticated,
                last_error: Some(reason.to_string()),
            }),
            _ => Arc::new(Session {
                state: cur.state.clone(),
                last_error: Some(reason.to_string()),
            }),
        });
    }

    fn set(&self, session: Session) {
        self.inner.store(Arc::new(session));
    }
}

#[cfg(test)]
pub(crate) fn test_user(role: UserRole) -> User {
    User {
        id: 1,
        username: "a".into(),
        email: None,
        name: "A".into(),
        role,
        fcm_token: None,
        preferred_language: None,
        created_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_unchecked_without_identity() {
        let store = SessionStore::new();
        assert_eq!(store.phase(), SessionPhase::Unchecked);
        assert!(store.identity().is_none());
        assert!(store.snapshot().is_loading());
    }

    #[test]
    fn test_begin_check_only_once() {
        let store = SessionStore::new();
        assert!(store.begin_check());
        assert_eq!(store.phase(), SessionPhase::Checking);
        assert!(!store.begin_check());
        store.authenticate(test_user(UserRole::Nurse));
        assert!(!store.begin_check());
        assert_eq!(store.phase(), SessionPhase::Authenticated);
    }

    #[test]
    fn test_expire_tears_down_authenticated_session() {
        let store = SessionStore::new();
        store.authenticate(test_user(UserRole::Director));
        store.expire("401: Unauthorized");
        let session = store.snapshot();
        assert_eq!(session.phase(), SessionPhase::Unauthenticated);
        assert_eq!(session.last_error.as_deref(), Some("401: Unauthorized"));
    }

    #[test]
    fn test_expire_before_bootstrap_keeps_state() {
        let store = SessionStore::new();
        assert!(store.begin_check());
        store.expire("401: Unauthorized");
        assert_eq!(store.phase(), SessionPhase::Checking);
    }

    #[test]
    fn test_language_preference() {
        let store = SessionStore::new();
        assert_eq!(store.snapshot().language(Language::En), Language::En);

        let mut user = test_user(UserRole::Guardian);
        user.preferred_language = Some("ko".into());
        store.authenticate(user);
        assert_eq!(store.snapshot().language(Language::En), Language::Ko);
    }
}
