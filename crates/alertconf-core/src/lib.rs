//! # alertconf-core
//!
//! The deterministic aggregation engine for alertconf - THE LOGIC.
//!
//! Operators author Alertmanager configuration as independent fragments
//! (routes, receivers, inhibition rules, global defaults, templates), each
//! stored in its own ConfigMap. This crate turns a listing of those records
//! into one consolidated `alertmanager.yml` and decides whether the published
//! copy needs to be rewritten.
//!
//! ## Pipeline
//!
//! ```text
//! ConfigMap records ──► Classifier ──► ConfigAssembler ──► render() ──► Fingerprint
//!                                          │
//!                                          └──► RouteAssembler (one level)
//! ```
//!
//! ## Architectural Constraints
//!
//! - Has NO async, NO network dependencies (pure Rust)
//! - Deterministic: ordered maps everywhere, records merged in (namespace, name) order
//! - Never logs: conditions worth reporting are returned as [`Notice`] values
//! - All assembly state is scoped to a single call; nothing survives between passes

// =============================================================================
// MODULES
// =============================================================================

pub mod assembler;
pub mod classifier;
pub mod config;
pub mod fingerprint;
pub mod primitives;
pub mod routes;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{AggregateError, ConfigMap, Metadata, Notice, RecordRef};

// =============================================================================
// RE-EXPORTS: Configuration Model
// =============================================================================

pub use config::{
    Config, EmailConfig, GlobalConfig, InhibitRule, NotifierConfig, Receiver, Route,
    WebhookConfig,
};

// =============================================================================
// RE-EXPORTS: Aggregation Engine
// =============================================================================

pub use assembler::{Assembly, ConfigAssembler, render, target_record};
pub use classifier::{Classified, Classifier, Fragment, FragmentKind};
pub use fingerprint::{Fingerprint, same_payload};
pub use routes::RouteAssembler;
