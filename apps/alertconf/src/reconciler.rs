//! # Reconciler
//!
//! Drives aggregation passes against a [`ConfigMapStore`].
//!
//! ```text
//!          ┌──────────────────────────────────────────────┐
//!          ▼                                              │
//!   Idle ─► Collecting ─► Assembling ─► Diffing ─► Writing ┘
//!    │                                     │
//!    │                                     └──► Idle (unchanged)
//!    ▼
//!   ShuttingDown
//! ```
//!
//! A pass that fails at any step returns to `Idle` without publishing.
//! Shutdown is only observed between passes, so a started write is never
//! abandoned half way.

use crate::error::ControllerError;
use crate::store::ConfigMapStore;
use alertconf_core::{
    ConfigAssembler, ConfigMap, Fingerprint, Notice, RecordRef, render, same_payload,
    target_record,
};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

// =============================================================================
// STATE
// =============================================================================

/// Where the reconciler currently is in a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Collecting,
    Assembling,
    Diffing,
    Writing,
    ShuttingDown,
}

/// What a successful pass did to the published record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// The record did not exist and was created.
    Created,
    /// The record existed with different data and was replaced.
    Updated,
    /// The record already held the assembled document; nothing was written.
    Unchanged,
}

/// Inputs that stay fixed across passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassSettings {
    /// Where the assembled document is published.
    pub target: RecordRef,
    /// Namespaces to list; an empty string means all namespaces.
    pub namespaces: Vec<String>,
    /// Label selector applied to every list call.
    pub selector: String,
    /// Log the rendered document at info instead of debug.
    pub print: bool,
}

/// Counters returned when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub passes: u64,
    pub failures: u64,
}

// =============================================================================
// RECONCILER
// =============================================================================

/// Single-worker reconciler. Owns its store and runs passes sequentially.
#[derive(Debug)]
pub struct Reconciler<S> {
    store: S,
    settings: PassSettings,
    phase: Phase,
}

impl<S: ConfigMapStore> Reconciler<S> {
    /// Create an idle reconciler.
    pub fn new(store: S, settings: PassSettings) -> Self {
        Self {
            store,
            settings,
            phase: Phase::Idle,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn settings(&self) -> &PassSettings {
        &self.settings
    }

    /// Run one pass: list, assemble, compare with the published record and
    /// write if it differs.
    pub async fn run_pass(&mut self) -> Result<PassOutcome, ControllerError> {
        let result = self.pass().await;
        self.phase = Phase::Idle;
        result
    }

    async fn pass(&mut self) -> Result<PassOutcome, ControllerError> {
        let target = self.settings.target.clone();

        self.phase = Phase::Collecting;
        let mut records: Vec<ConfigMap> = Vec::new();
        for namespace in &self.settings.namespaces {
            let listed = self
                .store
                .list(namespace, &self.settings.selector)
                .await
                .map_err(|source| ControllerError::Collect {
                    namespace: namespace.clone(),
                    selector: self.settings.selector.clone(),
                    source,
                })?;
            debug!(namespace = %namespace, count = listed.len(), "listed configmaps");
            records.extend(listed);
        }

        self.phase = Phase::Assembling;
        let assembly = ConfigAssembler::assemble(&records, Some(&target))?;
        for notice in &assembly.notices {
            log_notice(notice);
        }
        let document = render(&assembly.config)?;
        if self.settings.print {
            info!(configmap = %target, "assembled alertmanager config:\n{document}");
        } else {
            debug!(configmap = %target, "assembled alertmanager config:\n{document}");
        }
        let mut desired = target_record(&target, document);

        self.phase = Phase::Diffing;
        let existing = match self.store.get(&target.namespace, &target.name).await {
            Ok(existing) => Some(existing),
            Err(e) if e.is_not_found() => None,
            Err(source) => {
                return Err(ControllerError::Fetch {
                    target: target.clone(),
                    source,
                });
            }
        };
        let fingerprint = Fingerprint::of_record(&desired);

        let Some(existing) = existing else {
            self.phase = Phase::Writing;
            self.store
                .create(&desired)
                .await
                .map_err(|source| ControllerError::Write {
                    target: target.clone(),
                    source,
                })?;
            info!(
                namespace = %target.namespace,
                name = %target.name,
                fingerprint = %fingerprint,
                fragments = assembly.fragments,
                "created configmap"
            );
            return Ok(PassOutcome::Created);
        };

        desired.inherit_metadata(&existing);
        if same_payload(&existing, &desired) {
            debug!(
                namespace = %target.namespace,
                name = %target.name,
                fingerprint = %fingerprint,
                "configmap up to date"
            );
            return Ok(PassOutcome::Unchanged);
        }

        self.phase = Phase::Writing;
        self.store
            .update(&desired)
            .await
            .map_err(|source| ControllerError::Write {
                target: target.clone(),
                source,
            })?;
        info!(
            namespace = %target.namespace,
            name = %target.name,
            fingerprint = %fingerprint,
            previous = %Fingerprint::of_record(&existing),
            fragments = assembly.fragments,
            "updated configmap"
        );
        Ok(PassOutcome::Updated)
    }

    /// Run passes until `shutdown` is cancelled.
    ///
    /// The interval is measured from the end of one pass to the start of the
    /// next. Failed passes are logged and counted; the loop keeps going.
    pub async fn run(&mut self, interval: Duration, shutdown: CancellationToken) -> RunSummary {
        let mut summary = RunSummary::default();
        info!(
            configmap = %self.settings.target,
            interval = %humantime::format_duration(interval),
            "starting sync loop"
        );

        while !shutdown.is_cancelled() {
            summary.passes += 1;
            match self.run_pass().await {
                Ok(outcome) => debug!(?outcome, "pass complete"),
                Err(e) => {
                    summary.failures += 1;
                    error!(error = %e, "failed to process config maps");
                }
            }

            tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                () = tokio::time::sleep(interval) => {}
            }
        }

        self.phase = Phase::ShuttingDown;
        info!(
            passes = summary.passes,
            failures = summary.failures,
            "sync loop stopped"
        );
        summary
    }
}

fn log_notice(notice: &Notice) {
    let record = notice.record();
    if notice.is_warning() {
        warn!(namespace = %record.namespace, name = %record.name, "{notice}");
    } else {
        info!(namespace = %record.namespace, name = %record.name, "{notice}");
    }
}

// =============================================================================
// TESTS
// =============================================================================
