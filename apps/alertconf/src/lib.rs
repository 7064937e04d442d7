//! # alertconf
//!
//! Library half of the alertconf controller binary. Exposed as a library so
//! integration tests can drive the reconciler and the store client directly.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                    apps/alertconf (THE BINARY)                │
//! │                                                               │
//! │  ┌─────────────┐    ┌──────────────┐    ┌─────────────────┐  │
//! │  │    CLI      │───►│  Reconciler  │───►│  ConfigMapStore │  │
//! │  │ (clap+toml) │    │ (sync loop)  │    │ (reqwest/memory)│  │
//! │  └─────────────┘    └──────┬───────┘    └─────────────────┘  │
//! │                            ▼                                  │
//! │                   ┌─────────────────┐                         │
//! │                   │ alertconf-core  │                         │
//! │                   │  (THE LOGIC)    │                         │
//! │                   └─────────────────┘                         │
//! └───────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod error;
pub mod reconciler;
pub mod settings;
pub mod store;

pub use error::ControllerError;
pub use reconciler::{PassOutcome, PassSettings, Phase, Reconciler, RunSummary};
pub use settings::{Settings, SettingsFile};
pub use store::{ConfigMapStore, KubeClient, MemoryStore, StoreError};
