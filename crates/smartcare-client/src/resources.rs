//! Resource hooks.
//!
//! One generic hook serves every collection: a cached read plus create,
//! update and delete mutations. A mutation patches the owning cache slot
//! only after the server confirms it, and every outcome produces exactly one
//! notification.

use std::marker::PhantomData;
use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::{CachePatch, CollectionCache, QueryCache, QueryState, ResourceKey};
use crate::error::ClientResult;
use crate::models::{
    Accident, AccidentPatch, Camera, CameraPatch, EntityId, EnvLog, EnvLogPatch, Guardian,
    GuardianPatch, Identified, InsertAccident, InsertCamera, InsertEnvLog, InsertGuardian,
    InsertMessage, InsertPatient, InsertRoom, Message, MessagePatch, Patient, PatientPatch, Room,
    RoomPatch,
};
use crate::notify::{self, Language, MutationKind, Noun, Notifier};
use crate::session::SessionStore;
use crate::transport::Transport;

/// A record type served by a collection endpoint.
pub trait Entity: Identified + Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Create body.
    type Create: Serialize + Send + Sync;
    /// Partial update body.
    type Patch: Serialize + Send + Sync;

    const KEY: ResourceKey;
    const NOUN: Noun;

    /// The cache slot owned by this resource.
    fn slot(cache: &QueryCache) -> &CollectionCache<Self>;

    /// Display name used in notifications, if the record has one.
    fn label(&self) -> Option<&str> {
        None
    }
}

macro_rules! entity {
    ($ty:ty, $create:ty, $patch:ty, $key:ident, $field:ident, $ko:literal, $en:literal $(, label = $label:ident)?) => {
        impl Entity for $ty {
            type Create = $create;
            type Patch = $patch;

            const KEY: ResourceKey = ResourceKey::$key;
            const NOUN: Noun = Noun { ko: $ko, en: $en };

            fn slot(cache: &QueryCache) -> &CollectionCache<Self> {
                &cache.$field
            }

            $(fn label(&self) -> Option<&str> {
                Some(self.$label.as_str())
            })?
        }
    };
}

entity!(Patient, InsertPatient, PatientPatch, Patients, patients, "환자", "patient", label = name);
entity!(Guardian, InsertGuardian, GuardianPatch, Guardians, guardians, "보호자", "guardian", label = name);
entity!(Accident, InsertAccident, AccidentPatch, Accidents, accidents, "사고 기록", "accident record");
entity!(Camera, InsertCamera, CameraPatch, Cameras, cameras, "카메라", "camera", label = name);
entity!(Message, InsertMessage, MessagePatch, Messages, messages, "메시지", "message");
entity!(Room, InsertRoom, RoomPatch, Rooms, rooms, "병실", "room", label = name);
entity!(EnvLog, InsertEnvLog, EnvLogPatch, EnvLogs, env_logs, "환경 기록", "environment log");

/// Shared handles every hook works through.
pub(crate) struct Services {
    pub transport: Arc<Transport>,
    pub cache: Arc<QueryCache>,
    pub session: Arc<SessionStore>,
    pub notifier: Arc<dyn Notifier>,
    pub default_language: Language,
}

impl Services {
    pub fn language(&self) -> Language {
        self.session.snapshot().language(self.default_language)
    }
}

/// Read and mutation operations for one collection.
pub struct ResourceHook<T: Entity> {
    services: Arc<Services>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for ResourceHook<T> {
    fn clone(&self) -> Self {
        Self {
            services: Arc::clone(&self.services),
            _entity: PhantomData,
        }
    }
}

pub type Patients = ResourceHook<Patient>;
pub type Guardians = ResourceHook<Guardian>;
pub type Accidents = ResourceHook<Accident>;
pub type Cameras = ResourceHook<Camera>;
pub type Messages = ResourceHook<Message>;
pub type Rooms = ResourceHook<Room>;
pub type EnvLogs = ResourceHook<EnvLog>;

impl<T: Entity> ResourceHook<T> {
    pub(crate) fn new(services: Arc<Services>) -> Self {
        Self {
            services,
            _entity: PhantomData,
        }
    }

    fn slot(&self) -> &CollectionCache<T> {
        T::slot(&self.services.cache)
    }

    fn item_path(id: EntityId) -> String {
        format!("{}/{id}", T::KEY.path())
    }

    /// Last known collection without touching the network.
    pub fn cached(&self) -> Option<Arc<Vec<T>>> {
        self.slot().get()
    }

    pub fn state(&self) -> QueryState<T> {
        self.slot().state()
    }

    /// Cached collection, fetched on first use. Cached data never goes stale
    /// on its own; call [`ResourceHook::refetch`] to reload.
    pub async fn list(&self) -> ClientResult<Arc<Vec<T>>> {
        match self.cached() {
            Some(items) => Ok(items),
            None => self.refetch().await,
        }
    }

    /// Fetch the collection and replace the cache entry.
    pub async fn refetch(&self) -> ClientResult<Arc<Vec<T>>> {
        let slot = self.slot();
        let _fetching = slot.begin_fetch();
        match self
            .services
            .transport
            .get_json::<Vec<T>>(T::KEY.path())
            .await
        {
            Ok(items) => Ok(slot.set(items)),
            Err(err) => {
                tracing::warn!(resource = %T::KEY, error = %err, "fetch failed");
                slot.record_error(err.to_string());
                Err(err)
            }
        }
    }

    pub async fn create(&self, input: &T::Create) -> ClientResult<T> {
        let result = self
            .services
            .transport
            .send_json::<_, T>(Method::POST, T::KEY.path(), input)
            .await;
        self.settle(MutationKind::Create, result, |created| {
            CachePatch::Append(created.clone())
        })
    }

    pub async fn update(&self, id: EntityId, patch: &T::Patch) -> ClientResult<T> {
        let result = self
            .services
            .transport
            .send_json::<_, T>(Method::PUT, &Self::item_path(id), patch)
            .await;
        self.settle(MutationKind::Update, result, |updated| {
            CachePatch::Replace(updated.clone())
        })
    }

    pub async fn delete(&self, id: EntityId) -> ClientResult<()> {
        let result = self
            .services
            .transport
            .send_empty(Method::DELETE, &Self::item_path(id))
            .await;
        self.settle(MutationKind::Delete, result, |_| CachePatch::Remove(id))
    }

    /// Patch the cache on success and emit the single outcome notification.
    fn settle<R>(
        &self,
        kind: MutationKind,
        result: ClientResult<R>,
        patch: impl FnOnce(&R) -> CachePatch<T>,
    ) -> ClientResult<R>
    where
        R: MutationOutput,
    {
        let lang = self.services.language();
        match result {
            Ok(value) => {
                self.slot().apply(&patch(&value));
                tracing::debug!(resource = %T::KEY, ?kind, "cache patched");
                self.services.notifier.notify(notify::mutation_succeeded(
                    lang,
                    kind,
                    T::NOUN,
                    value.label(),
                ));
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(resource = %T::KEY, ?kind, error = %err, "mutation failed");
                self.services.notifier.notify(notify::mutation_failed(
                    lang,
                    kind,
                    T::NOUN,
                    &err.to_string(),
                ));
                Err(err)
            }
        }
    }
}

/// What a mutation resolves to: the server's record, or nothing for deletes.
trait MutationOutput {
    fn label(&self) -> Option<&str>;
}

impl<T: Entity> MutationOutput for T {
    fn label(&self) -> Option<&str> {
        Entity::label(self)
    }
}

impl MutationOutput for () {
    fn label(&self) -> Option<&str> {
        None
    }
}
