use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use smartcare_client::{ClientError, ClientResult, ClientStore};

use crate::config::smartcare_dir;

/// Contents of `credentials.<profile>.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoredCredentials {
    pub server: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<String>,
}

pub fn creds_path(profile: &str) -> Result<PathBuf> {
    Ok(smartcare_dir()?.join(format!("credentials.{profile}.json")))
}

/// Server recorded by the last session saved for `profile`.
pub fn stored_server(profile: &str) -> Result<Option<String>> {
    let store = FileClientStore::open(creds_path(profile)?, "");
    Ok(store.read().ok().flatten().map(|c| c.server))
}

/// File-backed client store for one profile.
///
/// The redirect-attempt counter lives in memory only: every CLI invocation
/// is a fresh load.
#[derive(Debug)]
pub struct FileClientStore {
    path: PathBuf,
    server: String,
    redirect_attempts: AtomicU32,
    write_lock: Mutex<()>,
}

impl FileClientStore {
    pub fn open(path: PathBuf, server: impl Into<String>) -> Self {
        Self {
            path,
            server: server.into(),
            redirect_attempts: AtomicU32::new(0),
            write_lock: Mutex::new(()),
        }
    }

    pub fn for_profile(profile: &str, server: &str) -> Result<Self> {
        Ok(Self::open(creds_path(profile)?, server))
    }

    fn read(&self) -> ClientResult<Option<StoredCredentials>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| ClientError::storage(format!("{}: {e}", self.path.display())))?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Read-modify-write the credentials file. Credentials saved for another
    /// server are discarded rather than replayed against this one.
    fn update(&self, change: impl FnOnce(&mut StoredCredentials)) -> ClientResult<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| ClientError::storage("credentials lock poisoned"))?;
        let mut creds = match self.read()? {
            Some(c) if c.server == self.server => c,
            _ => StoredCredentials {
                server: self.server.clone(),
                ..Default::default()
            },
        };
        change(&mut creds);
        let content = serde_json::to_string_pretty(&creds)?;
        fs::write(&self.path, content)
            .map_err(|e| ClientError::storage(format!("{}: {e}", self.path.display())))
    }

    fn current(&self) -> ClientResult<Option<StoredCredentials>> {
        Ok(self.read()?.filter(|c| c.server == self.server))
    }
}

impl ClientStore for FileClientStore {
    fn load_token(&self) -> ClientResult<Option<String>> {
        Ok(self.current()?.and_then(|c| c.token))
    }

    fn remove_token(&self) -> ClientResult<()> {
        self.update(|c| c.token = None)
    }

    fn load_cookies(&self) -> ClientResult<Option<String>> {
        Ok(self.current()?.and_then(|c| c.cookies))
    }

    fn save_cookies(&self, cookies: Option<&str>) -> ClientResult<()> {
        self.update(|c| c.cookies = cookies.map(str::to_string))
    }

    fn redirect_attempts(&self) -> u32 {
        self.redirect_attempts.load(Ordering::SeqCst)
    }

    fn record_redirect_attempt(&self) -> u32 {
        self.redirect_attempts.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn clear_redirect_attempts(&self) {
        self.redirect_attempts.store(0, Ordering::SeqCst);
    }
}
