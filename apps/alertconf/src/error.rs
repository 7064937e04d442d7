//! # Controller Errors
//!
//! Everything that can fail a pass or stop the process.

use crate::store::StoreError;
use alertconf_core::{AggregateError, RecordRef};
use thiserror::Error;

/// Errors surfaced by the reconciler and the CLI.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Listing fragments failed for one namespace.
    #[error("error listing configmaps in namespace '{namespace}' (selector '{selector}'): {source}")]
    Collect {
        namespace: String,
        selector: String,
        #[source]
        source: StoreError,
    },

    /// Reading the published record failed for a reason other than absence.
    #[error("error getting configmap {target}: {source}")]
    Fetch {
        target: RecordRef,
        #[source]
        source: StoreError,
    },

    /// Creating or updating the published record failed.
    #[error("error writing configmap {target}: {source}")]
    Write {
        target: RecordRef,
        #[source]
        source: StoreError,
    },

    /// The fragments could not be assembled.
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    /// A store call outside a pass failed (client setup, startup wait).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Settings were missing, unreadable or contradictory.
    #[error("invalid settings: {0}")]
    Settings(String),

    /// The sync worker task panicked or was aborted.
    #[error("sync worker stopped unexpectedly: {0}")]
    Worker(String),
}
