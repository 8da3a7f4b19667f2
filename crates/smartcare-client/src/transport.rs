//! HTTP transport.
//!
//! Every request carries the cookie jar and, when a body is present, a JSON
//! content type. Non-2xx responses are logged and turned into a typed
//! [`ClientError`]. A 401 additionally expires the session, drops every
//! cached query and asks the router to move to the login route, whichever
//! hook issued the request.

use std::sync::Arc;

use reqwest::Method;
use reqwest::cookie::{CookieStore, Jar};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::cache::QueryCache;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::User;
use crate::router::{NavigationIntent, Router};
use crate::session::SessionStore;

/// Identity endpoint, also used by the bootstrap check.
pub const USER_PATH: &str = "/api/user";

pub struct Transport {
    http: reqwest::Client,
    base_url: String,
    origin: Url,
    jar: Arc<Jar>,
    session: Arc<SessionStore>,
    cache: Arc<QueryCache>,
    router: Arc<Router>,
}

impl Transport {
    pub fn new(
        config: &ClientConfig,
        session: Arc<SessionStore>,
        cache: Arc<QueryCache>,
        router: Arc<Router>,
    ) -> ClientResult<Self> {
        config.validate()?;
        let origin = config.origin()?;
        let jar = Arc::new(Jar::default());

        let mut builder = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            origin,
            jar,
            session,
            cache,
            router,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issue a request and translate any non-2xx response.
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<reqwest::Response> {
        tracing::debug!(%method, path, "API request");

        let mut req = self.http.request(method.clone(), self.url(path));
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(|e| {
            tracing::error!(%method, path, error = %e, "API request failed");
            ClientError::from(e)
        })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        tracing::error!(%method, path, status = status.as_u16(), "API error");
        let message = error_message(resp).await;
        let err = ClientError::from_status(status, message);
        if err.is_unauthorized() {
            self.on_unauthorized(&err);
        }
        Err(err)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let resp = self.request::<()>(Method::GET, path, None).await?;
        decode(resp).await
    }

    pub async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.request(method, path, Some(body)).await?;
        decode(resp).await
    }

    /// Request whose response body is ignored.
    pub async fn send_empty(&self, method: Method, path: &str) -> ClientResult<()> {
        self.request::<()>(method, path, None).await?;
        Ok(())
    }

    /// Credential-bearing identity probe.
    ///
    /// Unlike [`Transport::request`] this never triggers the central 401
    /// handling: a non-OK answer simply means "no identity". Network and
    /// decode failures are returned as errors.
    pub async fn probe_identity(&self) -> ClientResult<Option<User>> {
        let resp = self.http.get(self.url(USER_PATH)).send().await?;
        let status = resp.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "identity probe rejected");
            return Ok(None);
        }
        Ok(Some(decode(resp).await?))
    }

    /// Current `Cookie` header for the server origin.
    pub fn cookie_header(&self) -> Option<String> {
        self.jar
            .cookies(&self.origin)
            .and_then(|v| v.to_str().ok().map(str::to_string))
    }

    /// Seed the jar from a previously captured `Cookie` header.
    pub fn restore_cookies(&self, header: &str) {
        for cookie in header.split(';').map(str::trim).filter(|c| !c.is_empty()) {
            self.jar.add_cookie_str(cookie, &self.origin);
        }
    }

    /// The server no longer recognises us: nothing cached under the old
    /// identity may be served again.
    fn on_unauthorized(&self, err: &ClientError) {
        self.session.expire(&err.to_string());
        self.cache.clear();
        let intent = NavigationIntent::after_unauthorized(&self.router.current());
        if intent != NavigationIntent::Stay {
            tracing::warn!("session rejected by server, redirecting to login");
        }
        self.router.apply(intent);
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.base_url)
            .finish()
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> ClientResult<T> {
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Server message for a failed response: the JSON `message` field, the raw
/// body, or the status reason phrase, in that order.
async fn error_message(resp: reqwest::Response) -> String {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    extract_message(&body)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string())
}

fn extract_message(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }
    if let Ok(json) = serde_json::from_str::<Value>(body)
        && let Some(msg) = json.get("message").and_then(|m| m.as_str())
    {
        return Some(msg.to_string());
    }
    Some(body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_message() {
        assert_eq!(
            extract_message(r#"{"message":"Patient not found"}"#).as_deref(),
            Some("Patient not found")
        );
        assert_eq!(
            extract_message("plain failure").as_deref(),
            Some("plain failure")
        );
        assert_eq!(
            extract_message(r#"{"error":"x"}"#).as_deref(),
            Some(r#"{"error":"x"}"#)
        );
        assert_eq!(extract_message("  "), None);
    }
}
