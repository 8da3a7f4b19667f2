//! Auth hook: current identity, login, registration and logout.

use std::sync::Arc;

use reqwest::Method;

use crate::error::ClientResult;
use crate::models::{InsertUser, LoginData, User};
use crate::notify;
use crate::resources::Services;
use crate::router::{Route, Router};
use crate::store::ClientStore;

#[derive(Clone)]
pub struct AuthHook {
    services: Arc<Services>,
    router: Arc<Router>,
    store: Arc<dyn ClientStore>,
}

impl AuthHook {
    pub(crate) fn new(
        services: Arc<Services>,
        router: Arc<Router>,
        store: Arc<dyn ClientStore>,
    ) -> Self {
        Self {
            services,
            router,
            store,
        }
    }

    /// Session identity as seen by pages.
    pub fn user(&self) -> Option<User> {
        self.services.session.identity()
    }

    /// The "current identity" query.
    ///
    /// Disabled until bootstrap has resolved: before that it answers `None`
    /// without a request. A non-OK response also reads as `None`.
    pub async fn current_user(&self) -> ClientResult<Option<Arc<User>>> {
        if !self.services.session.snapshot().is_checked() {
            return Ok(None);
        }
        if let Some(user) = self.services.cache.user() {
            return Ok(Some(user));
        }
        let user = self.services.transport.probe_identity().await?;
        if user.is_none() {
            self.services.session.expire("no active session");
        }
        self.services.cache.user.set(user);
        Ok(self.services.cache.user())
    }

    pub async fn login(&self, username: &str, password: &str) -> ClientResult<User> {
        let body = LoginData {
            username: username.to_string(),
            password: password.to_string(),
        };
        let result = self
            .services
            .transport
            .send_json::<_, User>(Method::POST, "/api/login", &body)
            .await;

        match result {
            Ok(user) => {
                self.store.clear_redirect_attempts();
                self.establish(&user);
                let lang = self.services.language();
                self.services
                    .notifier
                    .notify(notify::login_succeeded(lang, &user.name));
                self.router.navigate(Route::Home);
                Ok(user)
            }
            Err(err) => {
                tracing::warn!(username, error = %err, "login failed");
                let lang = self.services.language();
                self.services.notifier.notify(notify::login_failed(
                    lang,
                    err.is_unauthorized(),
                    &err.to_string(),
                ));
                Err(err)
            }
        }
    }

    pub async fn register(&self, input: &InsertUser) -> ClientResult<User> {
        let result = self
            .services
            .transport
            .send_json::<_, User>(Method::POST, "/api/register", input)
            .await;

        let lang = self.services.language();
        match result {
            Ok(user) => {
                self.store.clear_redirect_attempts();
                self.establish(&user);
                self.services
                    .notifier
                    .notify(notify::register_succeeded(self.services.language()));
                self.router.navigate(Route::Home);
                Ok(user)
            }
            Err(err) => {
                tracing::warn!(username = %input.username, error = %err, "registration failed");
                self.services
                    .notifier
                    .notify(notify::register_failed(lang, &err.to_string()));
                Err(err)
            }
        }
    }

    pub async fn logout(&self) -> ClientResult<()> {
        let lang = self.services.language();
        match self
            .services
            .transport
            .send_empty(Method::POST, "/api/logout")
            .await
        {
            Ok(()) => {
                self.services.session.sign_out();
                self.services.cache.clear();
                self.persist_cookies();
                self.services.notifier.notify(notify::logout_succeeded(lang));
                self.router.navigate(Route::Auth);
                Ok(())
            }
            Err(err) => {
                self.services
                    .notifier
                    .notify(notify::logout_failed(lang, &err.to_string()));
                Err(err)
            }
        }
    }

    /// Adopt `user` as the session identity. Collections cached under a
    /// different identity are dropped first.
    fn establish(&self, user: &User) {
        let previous = self.services.session.identity().map(|u| u.id);
        if previous != Some(user.id) {
            self.services.cache.clear();
        }
        self.services.session.authenticate(user.clone());
        self.services.cache.user.set(Some(user.clone()));
        self.persist_cookies();
    }

    fn persist_cookies(&self) {
        let cookies = self.services.transport.cookie_header();
        if let Err(err) = self.store.save_cookies(cookies.as_deref()) {
            tracing::warn!(error = %err, "failed to persist session cookies");
        }
    }
}
