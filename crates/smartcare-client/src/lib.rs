//! SmartCare client library.
//!
//! Session lifecycle, cookie-carrying transport, typed query cache and
//! resource hooks for the SmartCare hospital patient-monitoring API.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use smartcare_client::{ClientConfig, MemoryClientStore, Route, SmartCareClient, TracingNotifier};
//!
//! let client = SmartCareClient::new(
//!     ClientConfig::new("http://localhost:5000"),
//!     Arc::new(MemoryClientStore::new()),
//!     Arc::new(TracingNotifier),
//!     Route::Home,
//! )?;
//!
//! client.bootstrap().await;
//! let patients = client.patients().list().await?;
//! ```

pub mod artifact;
pub mod auth;
pub mod bootstrap;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod gate;
pub mod models;
pub mod notify;
pub mod resources;
pub mod router;
pub mod session;
pub mod store;
pub mod transport;

pub use auth::AuthHook;
pub use bootstrap::BootstrapOutcome;
pub use cache::{CachePatch, QueryState, ResourceKey};
pub use client::SmartCareClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, ErrorCategory};
pub use gate::Admission;
pub use models::*;
pub use notify::{ChannelNotifier, Language, Notification, Notifier, TracingNotifier, Variant};
pub use resources::{
    Accidents, Cameras, Entity, EnvLogs, Guardians, Messages, Patients, ResourceHook, Rooms,
};
pub use router::{NavigationIntent, Route};
pub use session::{Session, SessionPhase, SessionState};
pub use store::{ClientStore, MemoryClientStore};
