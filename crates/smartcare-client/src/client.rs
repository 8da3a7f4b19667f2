use std::sync::Arc;

use crate::auth::AuthHook;
use crate::bootstrap::{BootstrapOutcome, BootstrapSequencer};
use crate::cache::QueryCache;
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::gate::{self, Admission};
use crate::notify::Notifier;
use crate::resources::{
    Accidents, Cameras, Entity, EnvLogs, Guardians, Messages, Patients, ResourceHook, Rooms,
    Services,
};
use crate::router::{Route, Router};
use crate::session::{Session, SessionStore};
use crate::store::ClientStore;
use crate::transport::Transport;

/// Entry point wiring the session store, transport, cache, router and hooks
/// together. Every component receives its collaborators explicitly.
pub struct SmartCareClient {
    services: Arc<Services>,
    router: Arc<Router>,
    store: Arc<dyn ClientStore>,
    bootstrap: BootstrapSequencer,
}

impl SmartCareClient {
    /// Build a client whose location starts at `initial`.
    pub fn new(
        config: ClientConfig,
        store: Arc<dyn ClientStore>,
        notifier: Arc<dyn Notifier>,
        initial: Route,
    ) -> ClientResult<Self> {
        let session = Arc::new(SessionStore::new());
        let cache = Arc::new(QueryCache::new());
        let router = Arc::new(Router::new(
            initial,
            Arc::clone(&store),
            config.max_redirect_attempts,
        ));
        let transport = Arc::new(Transport::new(
            &config,
            Arc::clone(&session),
            Arc::clone(&cache),
            Arc::clone(&router),
        )?);

        match store.load_cookies() {
            Ok(Some(cookies)) => transport.restore_cookies(&cookies),
            Ok(None) => {}
            Err(err) => tracing::warn!(error = %err, "could not load session cookies"),
        }

        let bootstrap = BootstrapSequencer::new(
            Arc::clone(&transport),
            Arc::clone(&session),
            Arc::clone(&cache),
            Arc::clone(&router),
            Arc::clone(&store),
        );

        let services = Arc::new(Services {
            transport,
            cache,
            session,
            notifier,
            default_language: config.default_language,
        });

        Ok(Self {
            services,
            router,
            store,
            bootstrap,
        })
    }

    /// Run the one-time session check. Later calls are no-ops.
    pub async fn bootstrap(&self) -> BootstrapOutcome {
        self.bootstrap.run().await
    }

    pub fn session(&self) -> Arc<Session> {
        self.services.session.snapshot()
    }

    pub fn cache(&self) -> &QueryCache {
        &self.services.cache
    }

    pub fn location(&self) -> Route {
        self.router.current()
    }

    /// Navigate to `path` and run the access gate for it. A redirect verdict
    /// moves the location to the login route.
    pub fn open(&self, path: &str) -> Admission {
        let route = Route::parse(path);
        self.router.navigate(route.clone());
        let admission = gate::admit(&self.session(), &route);
        if let Admission::Redirect(target) = &admission {
            self.router.navigate(target.clone());
        }
        tracing::debug!(route = %route, ?admission, "route admission");
        admission
    }

    /// Current `Cookie` header, saved to the client store.
    pub fn persist_session(&self) -> ClientResult<()> {
        let cookies = self.services.transport.cookie_header();
        self.store.save_cookies(cookies.as_deref())
    }

    pub fn auth(&self) -> AuthHook {
        AuthHook::new(
            Arc::clone(&self.services),
            Arc::clone(&self.router),
            Arc::clone(&self.store),
        )
    }

    pub fn resource<T: Entity>(&self) -> ResourceHook<T> {
        ResourceHook::new(Arc::clone(&self.services))
    }

    pub fn patients(&self) -> Patients {
        self.resource()
    }

    pub fn guardians(&self) -> Guardians {
        self.resource()
    }

    pub fn accidents(&self) -> Accidents {
        self.resource()
    }

    pub fn cameras(&self) -> Cameras {
        self.resource()
    }

    pub fn messages(&self) -> Messages {
        self.resource()
    }

    pub fn rooms(&self) -> Rooms {
        self.resource()
    }

    pub fn env_logs(&self) -> EnvLogs {
        self.resource()
    }
}

impl std::fmt::Debug for SmartCareClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmartCareClient")
            .field("transport", &self.services.transport)
            .field("session", &self.services.session.phase())
            .field("router", &self.router)
            .finish()
    }
}
