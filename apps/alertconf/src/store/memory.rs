//! # In-Memory Store
//!
//! A `ConfigMapStore` that keeps records in a map, with Kubernetes-style
//! resource versions and write conflicts.

use super::{ConfigMapStore, StoreError};
use alertconf_core::{ConfigMap, RecordRef};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Default)]
struct State {
    records: BTreeMap<RecordRef, ConfigMap>,
    next_version: u64,
}

/// Process-local record store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    offline: AtomicBool,
    creates: AtomicU64,
    updates: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `records`.
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = ConfigMap>) -> Self {
        let store = Self::new();
        for record in records {
            store.put(record);
        }
        store
    }

    /// Insert or replace a record unconditionally, bumping its version.
    ///
    /// Does not count as a write in [`Self::writes`].
    pub fn put(&self, mut record: ConfigMap) -> ConfigMap {
        let mut state = self.lock();
        record.metadata.resource_version = state.bump();
        state.records.insert(record.record_ref(), record.clone());
        record
    }

    /// Read a record without going through the async interface.
    #[must_use]
    pub fn snapshot(&self, namespace: &str, name: &str) -> Option<ConfigMap> {
        self.lock()
            .records
            .get(&RecordRef::new(namespace, name))
            .cloned()
    }

    /// Make every call fail with a transport error until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of successful `(create, update)` calls so far.
    #[must_use]
    pub fn writes(&self) -> (u64, u64) {
        (
            self.creates.load(Ordering::SeqCst),
            self.updates.load(Ordering::SeqCst),
        )
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // poisoning leaves the map itself consistent
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("memory store is offline".to_string()));
        }
        Ok(())
    }
}

impl State {
    fn bump(&mut self) -> String {
        self.next_version += 1;
        self.next_version.to_string()
    }
}

/// Equality-based label selector: `k=v`, `k==v`, `k!=v`, `k`, `!k`, comma-separated.
fn matches_selector(labels: &BTreeMap<String, String>, selector: &str) -> bool {
    selector
        .split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .all(|term| {
            if let Some((k, v)) = term.split_once("!=") {
                labels.get(k.trim()).map(String::as_str) != Some(v.trim())
            } else if let Some((k, v)) = term.split_once("==").or_else(|| term.split_once('=')) {
                labels.get(k.trim()).map(String::as_str) == Some(v.trim())
            } else if let Some(k) = term.strip_prefix('!') {
                !labels.contains_key(k.trim())
            } else {
                labels.contains_key(term)
            }
        })
}

impl ConfigMapStore for MemoryStore {
    async fn list(&self, namespace: &str, selector: &str) -> Result<Vec<ConfigMap>, StoreError> {
        self.check_online()?;
        Ok(self
            .lock()
            .records
            .values()
            .filter(|r| namespace.is_empty() || r.metadata.namespace == namespace)
            .filter(|r| matches_selector(&r.metadata.labels, selector))
            .cloned()
            .collect())
    }

    async fn get(&self, namespace: &str, name: &str) -> Result<ConfigMap, StoreError> {
        self.check_online()?;
        self.snapshot(namespace, name)
            .ok_or_else(|| StoreError::NotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }

    async fn create(&self, record: &ConfigMap) -> Result<ConfigMap, StoreError> {
        self.check_online()?;
        let id = record.record_ref();
        let mut state = self.lock();
        if state.records.contains_key(&id) {
            return Err(StoreError::Conflict {
                namespace: id.namespace,
                name: id.name,
            });
        }
        let mut stored = record.clone();
        stored.metadata.resource_version = state.bump();
        state.records.insert(id, stored.clone());
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok(stored)
    }

    async fn update(&self, record: &ConfigMap) -> Result<ConfigMap, StoreError> {
        self.check_online()?;
        let id = record.record_ref();
        let mut state = self.lock();
        let current = match state.records.get(&id) {
            Some(current) => current.metadata.resource_version.clone(),
            None => {
                return Err(StoreError::NotFound {
                    namespace: id.namespace,
                    name: id.name,
                });
            }
        };
        let requested = &record.metadata.resource_version;
        if !requested.is_empty() && *requested != current {
            return Err(StoreError::Conflict {
                namespace: id.namespace,
                name: id.name,
            });
        }
        let mut stored = record.clone();
        stored.metadata.resource_version = state.bump();
        state.records.insert(id, stored.clone());
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(stored)
    }

    async fn wait_until_reachable(
        &self,
        timeout: Duration,
        _poll: Duration,
    ) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unreachable(timeout));
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
