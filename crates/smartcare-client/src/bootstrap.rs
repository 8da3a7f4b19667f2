//! Bootstrap sequencer.
//!
//! Runs once per load, before anything else reads the session:
//!
//! 1. clear the redirect-attempt counter left by a previous load;
//! 2. inspect the stored credential artifact and delete it if it is expired
//!    or malformed;
//! 3. ask the server for the current identity and settle the session
//!    (CHECKING -> AUTHENTICATED or UNAUTHENTICATED), redirecting between the
//!    login page and home as needed.
//!
//! A network failure settles the session exactly like a rejection.

use std::sync::Arc;

use crate::artifact::{self, ArtifactStatus};
use crate::cache::QueryCache;
use crate::router::{NavigationIntent, Router};
use crate::session::{SessionPhase, SessionStore};
use crate::store::ClientStore;
use crate::transport::Transport;

/// What a bootstrap run did.
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapOutcome {
    pub phase: SessionPhase,
    /// Artifact inspection result, `None` when no artifact was stored.
    pub artifact: Option<ArtifactStatus>,
    pub intent: NavigationIntent,
    /// False when bootstrap had already run and this call did nothing.
    pub ran: bool,
}

pub struct BootstrapSequencer {
    transport: Arc<Transport>,
    session: Arc<SessionStore>,
    cache: Arc<QueryCache>,
    router: Arc<Router>,
    store: Arc<dyn ClientStore>,
}

impl BootstrapSequencer {
    pub(crate) fn new(
        transport: Arc<Transport>,
        session: Arc<SessionStore>,
        cache: Arc<QueryCache>,
        router: Arc<Router>,
        store: Arc<dyn ClientStore>,
    ) -> Self {
        Self {
            transport,
            session,
            cache,
            router,
            store,
        }
    }

    pub async fn run(&self) -> BootstrapOutcome {
        if !self.session.begin_check() {
            tracing::debug!(phase = %self.session.phase(), "bootstrap already ran");
            return BootstrapOutcome {
                phase: self.session.phase(),
                artifact: None,
                intent: NavigationIntent::Stay,
                ran: false,
            };
        }

        self.store.clear_redirect_attempts();
        let artifact = self.reconcile_artifact();

        let intent = match self.transport.probe_identity().await {
            Ok(Some(user)) => {
                tracing::info!(user = %user.username, role = %user.role, "session restored");
                self.cache.user.set(Some(user.clone()));
                self.session.authenticate(user);
                NavigationIntent::after_authenticated(&self.router.current())
            }
            Ok(None) => {
                self.cache.user.set(None);
                self.session.reject("no active session");
                NavigationIntent::after_unauthorized(&self.router.current())
            }
            Err(err) => {
                tracing::error!(error = %err, "session check failed");
                self.cache.user.set(None);
                self.session.reject(err.to_string());
                NavigationIntent::after_unauthorized(&self.router.current())
            }
        };

        self.router.apply(intent.clone());

        BootstrapOutcome {
            phase: self.session.phase(),
            artifact,
            intent,
            ran: true,
        }
    }

    /// Delete the stored artifact when it can no longer be valid. Problems
    /// here are corrected locally and never surfaced to the user.
    fn reconcile_artifact(&self) -> Option<ArtifactStatus> {
        let token = match self.store.load_token() {
            Ok(Some(token)) => token,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(error = %err, "could not read credential artifact");
                return None;
            }
        };

        let status = artifact::inspect(&token);
        match &status {
            ArtifactStatus::Expired { expired_at } => {
                tracing::info!(expired_at, "discarding expired credential artifact");
            }
            ArtifactStatus::Malformed { reason } => {
                tracing::warn!(%reason, "discarding malformed credential artifact");
            }
            ArtifactStatus::Valid { .. } => {}
        }
        if status.should_discard()
            && let Err(err) = self.store.remove_token()
        {
            tracing::warn!(error = %err, "could not remove credential artifact");
        }
        Some(status)
    }
}
