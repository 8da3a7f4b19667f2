use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::notify::Language;

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server origin, e.g. `http://localhost:5000`. API paths are joined onto it.
    pub base_url: String,
    /// Request timeout. `None` keeps the transport's default.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Language used when the session user has no (or an unknown) preference.
    #[serde(default)]
    pub default_language: Language,
    /// Forced redirects to the login route tolerated before the loop breaker trips.
    #[serde(default = "default_max_redirect_attempts")]
    pub max_redirect_attempts: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_max_redirect_attempts() -> u32 {
    3
}

fn default_user_agent() -> String {
    format!("smartcare-client/{}", env!("CARGO_PKG_VERSION"))
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms: None,
            default_language: Language::default(),
            max_redirect_attempts: default_max_redirect_attempts(),
            user_agent: default_user_agent(),
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.default_language = language;
        self
    }

    pub fn with_max_redirect_attempts(mut self, attempts: u32) -> Self {
        self.max_redirect_attempts = attempts;
        self
    }

    pub fn validate(&self) -> ClientResult<()> {
        let url = self.origin()?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::configuration(format!(
                "base_url must be http or https, got {}",
                url.scheme()
            )));
        }
        if self.timeout_ms == Some(0) {
            return Err(ClientError::configuration("timeout_ms must be > 0"));
        }
        if self.max_redirect_attempts == 0 {
            return Err(ClientError::configuration(
                "max_redirect_attempts must be > 0",
            ));
        }
        Ok(())
    }

    /// Parsed base URL with any trailing slash removed.
    pub fn origin(&self) -> ClientResult<Url> {
        let trimmed = self.base_url.trim_end_matches('/');
        Ok(Url::parse(trimmed)?)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_minimal_toml_shape() {
        let cfg: ClientConfig =
            serde_json::from_str(r#"{ "base_url": "http://localhost:5000/" }"#).unwrap();
        assert_eq!(cfg.max_redirect_attempts, 3);
        assert_eq!(cfg.default_language, Language::Ko);
        assert!(cfg.timeout().is_none());
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.origin().unwrap().as_str(), "http://localhost:5000/");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(ClientConfig::new("ftp://host").validate().is_err());
        assert!(ClientConfig::new("not a url").validate().is_err());
        assert!(
            ClientConfig::new("http://host")
                .with_timeout_ms(0)
                .validate()
                .is_err()
        );
        assert!(
            ClientConfig::new("http://host")
                .with_max_redirect_attempts(0)
                .validate()
                .is_err()
        );
    }
}
