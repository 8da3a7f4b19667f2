//! Query cache.
//!
//! One typed slot per resource instead of string-keyed entries. Each slot
//! holds the last server-confirmed collection behind an `ArcSwapOption`;
//! writes are whole-value replacements (a background fetch or a patch
//! derived from the previous value), so a read after a mutation's success
//! always sees the patch.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use arc_swap::ArcSwapOption;

use crate::models::{
    Accident, Camera, EntityId, EnvLog, Guardian, Identified, Message, Patient, Room, User,
};

/// Identifies a cached resource and the API path it mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    User,
    Patients,
    Guardians,
    Accidents,
    Cameras,
    Messages,
    Rooms,
    EnvLogs,
}

impl ResourceKey {
    pub fn path(&self) -> &'static str {
        match self {
            Self::User => "/api/user",
            Self::Patients => "/api/patients",
            Self::Guardians => "/api/guardians",
            Self::Accidents => "/api/accidents",
            Self::Cameras => "/api/cameras",
            Self::Messages => "/api/messages",
            Self::Rooms => "/api/rooms",
            Self::EnvLogs => "/api/env-logs",
        }
    }
}

impl std::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Rule applied to a cached collection after a mutation succeeds.
#[derive(Debug, Clone, PartialEq)]
pub enum CachePatch<T> {
    Append(T),
    Replace(T),
    Remove(EntityId),
}

impl<T: Identified + Clone> CachePatch<T> {
    /// Derive the next collection from the previous one. Without a previous
    /// value the result is a singleton (or empty, for removal).
    pub fn apply(&self, previous: Option<&[T]>) -> Vec<T> {
        match (self, previous) {
            (Self::Append(item), Some(old)) => {
                let mut next = Vec::with_capacity(old.len() + 1);
                next.extend_from_slice(old);
                next.push(item.clone());
                next
            }
            (Self::Replace(item), Some(old)) => old
                .iter()
                .map(|cur| {
                    if cur.id() == item.id() {
                        item.clone()
                    } else {
                        cur.clone()
                    }
                })
                .collect(),
            (Self::Remove(id), Some(old)) => {
                old.iter().filter(|cur| cur.id() != *id).cloned().collect()
            }
            (Self::Append(item) | Self::Replace(item), None) => vec![item.clone()],
            (Self::Remove(_), None) => Vec::new(),
        }
    }
}

/// Snapshot of a collection query.
#[derive(Debug, Clone)]
pub struct QueryState<T> {
    pub data: Option<Arc<Vec<T>>>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Cached collection for one resource.
pub struct CollectionCache<T> {
    data: ArcSwapOption<Vec<T>>,
    in_flight: AtomicUsize,
    last_error: ArcSwapOption<String>,
}

impl<T> Default for CollectionCache<T> {
    fn default() -> Self {
        Self {
            data: ArcSwapOption::empty(),
            in_flight: AtomicUsize::new(0),
            last_error: ArcSwapOption::empty(),
        }
    }
}

impl<T: Identified + Clone> CollectionCache<T> {
    pub fn get(&self) -> Option<Arc<Vec<T>>> {
        self.data.load_full()
    }

    /// Store a freshly fetched collection.
    pub fn set(&self, items: Vec<T>) -> Arc<Vec<T>> {
        let items = Arc::new(items);
        self.data.store(Some(Arc::clone(&items)));
        self.last_error.store(None);
        items
    }

    /// Apply a mutation patch atomically with respect to other writers.
    pub fn apply(&self, patch: &CachePatch<T>) {
        self.data
            .rcu(|cur| Some(Arc::new(patch.apply(cur.as_ref().map(|v| v.as_slice())))));
    }

    pub fn record_error(&self, message: String) {
        self.last_error.store(Some(Arc::new(message)));
    }

    pub fn clear(&self) {
        self.data.store(None);
        self.last_error.store(None);
    }

    pub fn state(&self) -> QueryState<T> {
        QueryState {
            data: self.get(),
            is_loading: self.in_flight.load(Ordering::Acquire) > 0,
            error: self.last_error.load_full().map(|e| e.as_ref().clone()),
        }
    }

    /// Mark a fetch as in flight until the guard drops.
    pub(crate) fn begin_fetch(&self) -> FetchGuard<'_> {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        FetchGuard {
            counter: &self.in_flight,
        }
    }
}

pub(crate) struct FetchGuard<'a> {
    counter: &'a AtomicUsize,
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Cached single value (the current user).
pub struct EntryCache<T> {
    data: ArcSwapOption<T>,
}

impl<T> Default for EntryCache<T> {
    fn default() -> Self {
        Self {
            data: ArcSwapOption::empty(),
        }
    }
}

impl<T> EntryCache<T> {
    pub fn get(&self) -> Option<Arc<T>> {
        self.data.load_full()
    }

    pub fn set(&self, value: Option<T>) {
        self.data.store(value.map(Arc::new));
    }
}

/// Process-wide query cache with one slot per resource.
#[derive(Default)]
pub struct QueryCache {
    pub(crate) user: EntryCache<User>,
    pub(crate) patients: CollectionCache<Patient>,
    pub(crate) guardians: CollectionCache<Guardian>,
    pub(crate) accidents: CollectionCache<Accident>,
    pub(crate) cameras: CollectionCache<Camera>,
    pub(crate) messages: CollectionCache<Message>,
    pub(crate) rooms: CollectionCache<Room>,
    pub(crate) env_logs: CollectionCache<EnvLog>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(&self) -> Option<Arc<User>> {
        self.user.get()
    }

    /// Drop every cached value.
    pub fn clear(&self) {
        self.user.set(None);
        self.patients.clear();
        self.guardians.clear();
        self.accidents.clear();
        self.cameras.clear();
        self.messages.clear();
        self.rooms.clear();
        self.env_logs.clear();
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("user", &self.user.get().map(|u| u.id))
            .field("patients", &self.patients.get().map(|v| v.len()))
            .field("guardians", &self.guardians.get().map(|v| v.len()))
            .field("accidents", &self.accidents.get().map(|v| v.len()))
            .field("cameras", &self.cameras.get().map(|v| v.len()))
            .field("messages", &self.messages.get().map(|v| v.len()))
            .field("rooms", &self.rooms.get().map(|v| v.len()))
            .field("env_logs", &self.env_logs.get().map(|v| v.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: EntityId,
        name: &'static str,
    }

    impl Identified for Row {
        fn id(&self) -> EntityId {
            self.id
        }
    }

    fn row(id: EntityId, name: &'static str) -> Row {
        Row { id, name }
    }

    #[test]
    fn test_append_rule() {
        let old = vec![row(1, "a")];
        let next = CachePatch::Append(row(2, "b")).apply(Some(&old));
        assert_eq!(next, vec![row(1, "a"), row(2, "b")]);
        assert_eq!(CachePatch::Append(row(2, "b")).apply(None), vec![row(2, "b")]);
    }

    #[test]
    fn test_replace_rule_keeps_order_and_no_duplicates() {
        let old = vec![row(1, "a"), row(2, "b"), row(3, "c")];
        let next = CachePatch::Replace(row(2, "B")).apply(Some(&old));
        assert_eq!(next, vec![row(1, "a"), row(2, "B"), row(3, "c")]);
        assert_eq!(next.iter().filter(|r| r.id == 2).count(), 1);
        assert_eq!(CachePatch::Replace(row(9, "z")).apply(None), vec![row(9, "z")]);
    }

    #[test]
    fn test_remove_rule() {
        let old = vec![row(1, "a"), row(2, "b")];
        assert_eq!(CachePatch::Remove(1).apply(Some(&old)), vec![row(2, "b")]);
        assert_eq!(
            CachePatch::<Row>::Remove(1).apply(None),
            Vec::<Row>::new()
        );
    }

    #[test]
    fn test_collection_cache_patch_visible_immediately() {
        let cache = CollectionCache::<Row>::default();
        assert!(cache.get().is_none());
        cache.set(vec![row(1, "a")]);
        cache.apply(&CachePatch::Append(row(2, "b")));
        assert_eq!(cache.get().unwrap().len(), 2);
        cache.apply(&CachePatch::Remove(1));
        assert_eq!(*cache.get().unwrap(), vec![row(2, "b")]);
    }

    #[test]
    fn test_state_tracks_fetch_and_error() {
        let cache = CollectionCache::<Row>::default();
        {
            let _guard = cache.begin_fetch();
            assert!(cache.state().is_loading);
        }
        assert!(!cache.state().is_loading);

        cache.record_error("500: boom".into());
        assert_eq!(cache.state().error.as_deref(), Some("500: boom"));
        cache.set(vec![]);
        assert!(cache.state().error.is_none());
    }

    #[test]
    fn test_resource_paths() {
        assert_eq!(ResourceKey::Patients.path(), "/api/patients");
        assert_eq!(ResourceKey::EnvLogs.to_string(), "/api/env-logs");
    }
}
