#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{Value, json};
use smartcare_client::{
    ChannelNotifier, ClientConfig, Language, MemoryClientStore, Notification, Route,
    SmartCareClient,
};
use tokio::sync::mpsc::UnboundedReceiver;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct Harness {
    pub client: SmartCareClient,
    pub notifications: UnboundedReceiver<Notification>,
    pub store: Arc<MemoryClientStore>,
}

impl Harness {
    /// Drain every notification received so far.
    pub fn drain(&mut self) -> Vec<Notification> {
        let mut out = Vec::new();
        while let Ok(n) = self.notifications.try_recv() {
            out.push(n);
        }
        out
    }
}

pub fn harness(base_url: &str, location: Route, store: MemoryClientStore) -> Harness {
    harness_with_language(base_url, location, store, Language::En)
}

pub fn harness_with_language(
    base_url: &str,
    location: Route,
    store: MemoryClientStore,
    language: Language,
) -> Harness {
    let store = Arc::new(store);
    let (notifier, notifications) = ChannelNotifier::new();
    let config = ClientConfig::new(base_url).with_language(language);
    let client = SmartCareClient::new(config, store.clone(), Arc::new(notifier), location)
        .expect("client builds");
    Harness {
        client,
        notifications,
        store,
    }
}

pub fn user_json(role: &str) -> Value {
    json!({ "id": 1, "username": "a", "role": role, "name": "A" })
}

pub async fn mount_session(server: &MockServer, role: &str) {
    Mock::given(method("GET"))
        .and(path("/api/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(role)))
        .mount(server)
        .await;
}

pub async fn mount_no_session(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/user"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Unauthorized" })))
        .mount(server)
        .await;
}

/// Signed-in harness for `role`, bootstrapped at `location`.
pub async fn signed_in(server: &MockServer, role: &str, location: Route) -> Harness {
    mount_session(server, role).await;
    let h = harness(&server.uri(), location, MemoryClientStore::new());
    h.client.bootstrap().await;
    h
}
