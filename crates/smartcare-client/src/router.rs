//! Routes and the single router-integration point.
//!
//! The session and transport layers never move the location themselves.
//! They return a [`NavigationIntent`] and hand it to [`Router::apply`].

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::models::{EntityId, UserRole};
use crate::store::ClientStore;

/// Pages exposed to the end user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Dashboard,
    FallDetection,
    Environment,
    PatientDetail(EntityId),
    MyPage,
    Accounts,
    RoomManagement,
    Messages,
    Settings,
    Auth,
    NotFound(String),
}

impl Route {
    /// Resolve a location path. Unknown paths map to [`Route::NotFound`].
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Self::Home,
            "/dashboard" => Self::Dashboard,
            "/fall-detection" => Self::FallDetection,
            "/environment" => Self::Environment,
            "/mypage" => Self::MyPage,
            "/accounts" => Self::Accounts,
            "/room-management" => Self::RoomManagement,
            "/messages" => Self::Messages,
            "/settings" => Self::Settings,
            "/auth" => Self::Auth,
            other => match other.strip_prefix("/patients/").map(str::parse::<EntityId>) {
                Some(Ok(id)) => Self::PatientDetail(id),
                _ => Self::NotFound(path.to_string()),
            },
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".into(),
            Self::Dashboard => "/dashboard".into(),
            Self::FallDetection => "/fall-detection".into(),
            Self::Environment => "/environment".into(),
            Self::PatientDetail(id) => format!("/patients/{id}"),
            Self::MyPage => "/mypage".into(),
            Self::Accounts => "/accounts".into(),
            Self::RoomManagement => "/room-management".into(),
            Self::Messages => "/messages".into(),
            Self::Settings => "/settings".into(),
            Self::Auth => "/auth".into(),
            Self::NotFound(path) => path.clone(),
        }
    }

    /// Public routes render without a session.
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Auth | Self::NotFound(_))
    }

    /// Role allow-list, `None` when any signed-in user may enter.
    pub fn required_roles(&self) -> Option<&'static [UserRole]> {
        match self {
            Self::Accounts | Self::RoomManagement => Some(UserRole::STAFF),
            _ => None,
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

/// Navigation requested by the session or transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationIntent {
    Stay,
    Redirect(Route),
}

impl NavigationIntent {
    /// After a 401: go to the login page unless already there.
    pub fn after_unauthorized(current: &Route) -> Self {
        if *current == Route::Auth {
            Self::Stay
        } else {
            Self::Redirect(Route::Auth)
        }
    }

    /// After the session was confirmed: leave the login page for home.
    pub fn after_authenticated(current: &Route) -> Self {
        if *current == Route::Auth {
            Self::Redirect(Route::Home)
        } else {
            Self::Stay
        }
    }
}

/// Holds the current location and applies navigation intents.
pub struct Router {
    location: ArcSwap<Route>,
    store: Arc<dyn ClientStore>,
    max_redirect_attempts: u32,
}

impl Router {
    pub fn new(initial: Route, store: Arc<dyn ClientStore>, max_redirect_attempts: u32) -> Self {
        Self {
            location: ArcSwap::from_pointee(initial),
            store,
            max_redirect_attempts,
        }
    }

    pub fn current(&self) -> Route {
        self.location.load().as_ref().clone()
    }

    /// User-initiated navigation. Always honored.
    pub fn navigate(&self, route: Route) {
        tracing::debug!(to = %route, "navigate");
        self.location.store(Arc::new(route));
    }

    /// Apply an intent from the session or transport layer.
    ///
    /// Forced redirects to the login route count against the redirect-attempt
    /// counter; once the limit is reached they are dropped until a successful
    /// sign-in or a fresh bootstrap clears the counter. Returns whether the
    /// location changed.
    pub fn apply(&self, intent: NavigationIntent) -> bool {
        let NavigationIntent::Redirect(target) = intent else {
            return false;
        };
        if target == Route::Auth {
            if self.store.redirect_attempts() >= self.max_redirect_attempts {
                tracing::warn!(
                    attempts = self.store.redirect_attempts(),
                    "redirect to login suppressed, attempt limit reached"
                );
                return false;
            }
            self.store.record_redirect_attempt();
        }
        tracing::info!(from = %self.current(), to = %target, "redirect");
        self.location.store(Arc::new(target));
        true
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("location", &self.current())
            .field("max_redirect_attempts", &self.max_redirect_attempts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryClientStore;

    #[test]
    fn test_parse_routes() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/dashboard/"), Route::Dashboard);
        assert_eq!(Route::parse("/patients/42"), Route::PatientDetail(42));
        assert_eq!(Route::parse("/auth?next=/"), Route::Auth);
        assert_eq!(
            Route::parse("/patients/abc"),
            Route::NotFound("/patients/abc".into())
        );
        assert_eq!(Route::parse("/nope"), Route::NotFound("/nope".into()));
    }

    #[test]
    fn test_paths_roundtrip_through_parse() {
        for route in [
            Route::Home,
            Route::FallDetection,
            Route::PatientDetail(7),
            Route::RoomManagement,
            Route::Settings,
        ] {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }

    #[test]
    fn test_role_requirements() {
        assert_eq!(Route::Accounts.required_roles(), Some(UserRole::STAFF));
        assert_eq!(Route::Messages.required_roles(), None);
        assert!(Route::Auth.is_public());
        assert!(!Route::Home.is_public());
    }

    #[test]
    fn test_intents() {
        assert_eq!(
            NavigationIntent::after_unauthorized(&Route::Dashboard),
            NavigationIntent::Redirect(Route::Auth)
        );
        assert_eq!(
            NavigationIntent::after_unauthorized(&Route::Auth),
            NavigationIntent::Stay
        );
        assert_eq!(
            NavigationIntent::after_authenticated(&Route::Auth),
            NavigationIntent::Redirect(Route::Home)
        );
        assert_eq!(
            NavigationIntent::after_authenticated(&Route::Messages),
            NavigationIntent::Stay
        );
    }

    #[test]
    fn test_redirect_loop_breaker() {
        let store = Arc::new(MemoryClientStore::new());
        let router = Router::new(Route::Home, store.clone(), 2);

        assert!(router.apply(NavigationIntent::Redirect(Route::Auth)));
        router.navigate(Route::Home);
        assert!(router.apply(NavigationIntent::Redirect(Route::Auth)));
        router.navigate(Route::Home);
        assert!(!router.apply(NavigationIntent::Redirect(Route::Auth)));
        assert_eq!(router.current(), Route::Home);

        store.clear_redirect_attempts();
        assert!(router.apply(NavigationIntent::Redirect(Route::Auth)));
        assert_eq!(router.current(), Route::Auth);
    }

    #[test]
    fn test_stay_is_noop() {
        let router = Router::new(Route::Messages, Arc::new(MemoryClientStore::new()), 3);
        assert!(!router.apply(NavigationIntent::Stay));
        assert_eq!(router.current(), Route::Messages);
    }
}
