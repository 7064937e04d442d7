//! # Core Type Definitions
//!
//! This module contains the record and diagnostic types shared by every
//! stage of the aggregation pipeline:
//! - The stored record shape (`ConfigMap`, `Metadata`) and its identity (`RecordRef`)
//! - Non-fatal diagnostics (`Notice`)
//! - Fatal errors (`AggregateError`)
//!
//! ## Determinism Guarantees
//!
//! All maps are `BTreeMap`, so serializing a record twice always yields the
//! same bytes regardless of the order the store returned the keys in.

use crate::primitives::{CONFIGMAP_API_VERSION, CONFIGMAP_KIND, SPEC_DATA_KEY};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Decode `null` the same way as a missing field.
///
/// The Kubernetes API returns `"data": null` for ConfigMaps without data.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// RECORD IDENTITY
// =============================================================================

/// Identity of a stored record: `(namespace, name)`.
///
/// Ordering is namespace first, then name; the assembler merges fragments in
/// this order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RecordRef {
    pub namespace: String,
    pub name: String,
}

impl RecordRef {
    /// Create a new record reference.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

// =============================================================================
// CONFIGMAP
// =============================================================================

/// Object metadata, restricted to the fields the controller reads or writes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_name: Option<String>,
    #[serde(default)]
    pub namespace: String,
    #[serde(default, deserialize_with = "nullable")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "nullable")]
    pub annotations: BTreeMap<String, String>,
    /// Optimistic-concurrency token. Empty on records not yet stored.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uid: String,
}

/// A namespaced key-value record, the unit of storage for both fragments and
/// the published document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMap {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default, deserialize_with = "nullable")]
    pub data: BTreeMap<String, String>,
}

impl ConfigMap {
    /// Create an empty `v1/ConfigMap` with the given identity.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            api_version: CONFIGMAP_API_VERSION.to_string(),
            kind: CONFIGMAP_KIND.to_string(),
            metadata: Metadata {
                name: name.into(),
                namespace: namespace.into(),
                ..Metadata::default()
            },
            data: BTreeMap::new(),
        }
    }

    /// The record's `(namespace, name)` identity.
    #[must_use]
    pub fn record_ref(&self) -> RecordRef {
        RecordRef::new(&self.metadata.namespace, &self.metadata.name)
    }

    /// Check whether this record has the given identity.
    #[must_use]
    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.metadata.namespace == namespace && self.metadata.name == name
    }

    /// Look up an annotation value.
    #[must_use]
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.metadata.annotations.get(key).map(String::as_str)
    }

    /// The fragment payload, if present and not blank.
    #[must_use]
    pub fn spec(&self) -> Option<&str> {
        self.data
            .get(SPEC_DATA_KEY)
            .map(String::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// Builder helper: set an annotation.
    #[must_use]
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.annotations.insert(key.into(), value.into());
        self
    }

    /// Builder helper: set a label.
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.labels.insert(key.into(), value.into());
        self
    }

    /// Builder helper: set a data entry.
    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Carry the stored record's labels, annotations and resource version
    /// over to this freshly built record.
    ///
    /// Keys already present on `existing` overwrite ours; the resource
    /// version is always taken from `existing` so the update is rejected if
    /// someone else wrote in between.
    pub fn inherit_metadata(&mut self, existing: &ConfigMap) {
        for (k, v) in &existing.metadata.annotations {
            self.metadata.annotations.insert(k.clone(), v.clone());
        }
        for (k, v) in &existing.metadata.labels {
            self.metadata.labels.insert(k.clone(), v.clone());
        }
        self.metadata
            .resource_version
            .clone_from(&existing.metadata.resource_version);
    }
}

// =============================================================================
// NOTICES
// =============================================================================

/// A non-fatal condition found while assembling.
///
/// The core never logs; callers decide how to surface these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The record declares a known kind but has no `spec` payload.
    MissingSpec(RecordRef),

    /// A second default route was found; the first one is kept.
    DuplicateDefaultRoute { kept: RecordRef, ignored: RecordRef },

    /// A route fragment declared child routes, which were dropped.
    ChildRoutesDiscarded { origin: RecordRef, count: usize },

    /// The same record was listed more than once (overlapping namespaces).
    DuplicateRecord(RecordRef),
}

impl Notice {
    /// Whether this notice indicates an authoring problem worth a warning.
    ///
    /// `MissingSpec` and `DuplicateRecord` are informational.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::DuplicateDefaultRoute { .. } | Self::ChildRoutesDiscarded { .. }
        )
    }

    /// The record this notice is about.
    #[must_use]
    pub fn record(&self) -> &RecordRef {
        match self {
            Self::MissingSpec(r) | Self::DuplicateRecord(r) => r,
            Self::DuplicateDefaultRoute { ignored, .. } => ignored,
            Self::ChildRoutesDiscarded { origin, .. } => origin,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSpec(r) => write!(f, "no {SPEC_DATA_KEY} key for {r}"),
            Self::DuplicateDefaultRoute { kept, ignored } => write!(
                f,
                "default route already set by {kept}; ignoring default route {ignored}"
            ),
            Self::ChildRoutesDiscarded { origin, count } => write!(
                f,
                "route {origin} has {count} child route(s) defined, they will be ignored"
            ),
            Self::DuplicateRecord(r) => write!(f, "{r} listed more than once, using it once"),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Conditions that abort an aggregation pass.
///
/// A partially merged configuration is never produced: any of these means
/// nothing gets published for the pass.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// A fragment's payload could not be decoded into its declared kind.
    #[error("failed to parse 'spec' data for {record}: {reason}")]
    Decode { record: RecordRef, reason: String },

    /// No route fragment carried the default-route annotation.
    #[error("no default route found")]
    NoDefaultRoute,

    /// The assembled configuration could not be rendered.
    #[error("failed to marshal config: {0}")]
    Serialization(String),
}

// =============================================================================
// TESTS
// =============================================================================
