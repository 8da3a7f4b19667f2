pub mod auth;
pub mod crud;
pub mod session;

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use smartcare_client::{ClientConfig, ClientError, Route, SmartCareClient};

use crate::config::ProfileConfig;
use crate::credentials::FileClientStore;
use crate::output::ConsoleNotifier;

/// Marks a failure the user has already seen as a notification.
#[derive(Debug)]
pub struct Reported;

impl fmt::Display for Reported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("failure already reported")
    }
}

impl std::error::Error for Reported {}

/// Build a client for `server` whose first page is `initial`.
pub fn connect(
    server: &str,
    profile: &str,
    cfg: &ProfileConfig,
    initial: Route,
) -> Result<SmartCareClient> {
    let store = FileClientStore::for_profile(profile, server)?;
    let config = ClientConfig::new(server).with_language(cfg.language());
    SmartCareClient::new(config, Arc::new(store), Arc::new(ConsoleNotifier), initial)
        .with_context(|| format!("Cannot use server {server}"))
}

/// Errors from reads carry no notification, so they get a hint instead.
pub fn explain(err: ClientError) -> anyhow::Error {
    if err.is_unauthorized() {
        anyhow::Error::new(err).context("Not signed in. Run: smartcare login")
    } else {
        anyhow::Error::new(err)
    }
}
