//! Access gate: a pure function of the session and a route's declared role
//! requirement.

use crate::models::UserRole;
use crate::router::Route;
use crate::session::Session;

/// Result of asking whether a route may render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Render,
    /// Session is still being checked; show a loading state.
    Pending,
    /// No identity; go to the login route.
    Redirect(Route),
    /// Signed in, but the role is not on the route's allow-list.
    Denied { role: UserRole },
}

impl Admission {
    pub fn is_render(&self) -> bool {
        matches!(self, Self::Render)
    }
}

/// Decide admission for `route` using its own role requirement.
pub fn admit(session: &Session, route: &Route) -> Admission {
    if route.is_public() {
        return Admission::Render;
    }
    admit_with_roles(session, route.required_roles())
}

/// Decide admission for a protected page with an explicit role allow-list.
pub fn admit_with_roles(session: &Session, required_roles: Option<&[UserRole]>) -> Admission {
    if session.is_loading() {
        return Admission::Pending;
    }
    let Some(user) = session.identity() else {
        return Admission::Redirect(Route::Auth);
    };
    match required_roles {
        Some(roles) if !roles.contains(&user.role) => Admission::Denied { role: user.role },
        _ => Admission::Render,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionStore, test_user};

    fn authenticated(role: UserRole) -> Session {
        let store = SessionStore::new();
        store.authenticate(test_user(role));
        store.snapshot().as_ref().clone()
    }

    fn unauthenticated() -> Session {
        let store = SessionStore::new();
        store.sign_out();
        store.snapshot().as_ref().clone()
    }

    #[test]
    fn test_patient_denied_on_staff_route() {
        let session = authenticated(UserRole::Patient);
        let admission = admit(&session, &Route::Accounts);
        assert_eq!(
            admission,
            Admission::Denied {
                role: UserRole::Patient
            }
        );
        assert!(!admission.is_render());
    }

    #[test]
    fn test_staff_admitted() {
        assert!(admit(&authenticated(UserRole::Nurse), &Route::RoomManagement).is_render());
        assert!(admit(&authenticated(UserRole::Director), &Route::Accounts).is_render());
        assert!(admit(&authenticated(UserRole::Guardian), &Route::Messages).is_render());
    }

    #[test]
    fn test_absent_identity_redirects() {
        assert_eq!(
            admit(&unauthenticated(), &Route::Dashboard),
            Admission::Redirect(Route::Auth)
        );
        assert_eq!(
            admit(&unauthenticated(), &Route::Accounts),
            Admission::Redirect(Route::Auth)
        );
    }

    #[test]
    fn test_pending_while_checking() {
        let session = Session::default();
        assert_eq!(admit(&session, &Route::Home), Admission::Pending);
        assert_eq!(admit(&session, &Route::Auth), Admission::Render);
    }

    #[test]
    fn test_explicit_allow_list() {
        let session = authenticated(UserRole::Guardian);
        assert_eq!(
            admit_with_roles(&session, Some(&[UserRole::Guardian])),
            Admission::Render
        );
        assert_eq!(
            admit_with_roles(&session, Some(&[UserRole::Nurse])),
            Admission::Denied {
                role: UserRole::Guardian
            }
        );
    }
}
