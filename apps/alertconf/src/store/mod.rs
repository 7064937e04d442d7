//! # ConfigMap Store
//!
//! The storage seam between the reconciler and the cluster.
//!
//! - [`KubeClient`]: talks to the Kubernetes API over HTTP (usually through
//!   `kubectl proxy`)
//! - [`MemoryStore`]: in-process store with the same optimistic-concurrency
//!   behaviour, for tests and local experiments

mod http;
mod memory;

pub use http::{DEFAULT_ENDPOINT, KubeClient};
pub use memory::MemoryStore;

use alertconf_core::ConfigMap;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Errors from the store layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested record does not exist.
    #[error("object {namespace}/{name} does not exist")]
    NotFound { namespace: String, name: String },

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The store answered with a status we did not expect.
    #[error("{context}: got HTTP {status} status code")]
    Status { status: u16, context: String },

    /// The response body was not a valid record or list.
    #[error("failed to decode response: {0}")]
    Parse(String),

    /// The record could not be encoded for sending.
    #[error("failed to encode {0}")]
    Encode(String),

    /// The write raced with another writer, or the record already exists.
    #[error("conflict writing {namespace}/{name}")]
    Conflict { namespace: String, name: String },

    /// The store did not answer within the startup window.
    #[error("timed out after {0:?} waiting for the Kubernetes API")]
    Unreachable(Duration),
}

impl StoreError {
    /// Whether this error means the record is absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// List, read and write ConfigMaps.
///
/// All futures are `Send` so a reconciler holding any implementation can run
/// on a spawned task.
pub trait ConfigMapStore: Send + Sync {
    /// List records in `namespace` (empty string: all namespaces) matching
    /// the label `selector` (empty string: everything).
    fn list(
        &self,
        namespace: &str,
        selector: &str,
    ) -> impl Future<Output = Result<Vec<ConfigMap>, StoreError>> + Send;

    /// Fetch one record. Absence is `StoreError::NotFound`.
    fn get(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = Result<ConfigMap, StoreError>> + Send;

    /// Create a record that does not exist yet.
    fn create(
        &self,
        record: &ConfigMap,
    ) -> impl Future<Output = Result<ConfigMap, StoreError>> + Send;

    /// Replace an existing record. A non-empty `resourceVersion` must match
    /// the stored one.
    fn update(
        &self,
        record: &ConfigMap,
    ) -> impl Future<Output = Result<ConfigMap, StoreError>> + Send;

    /// Block until the store answers, polling every `poll`, for at most
    /// `timeout`.
    fn wait_until_reachable(
        &self,
        timeout: Duration,
        poll: Duration,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
