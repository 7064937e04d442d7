//! # CLI Command Implementations
//!
//! Startup, single-pass mode and the long-running sync loop.

use crate::error::ControllerError;
use crate::reconciler::{PassOutcome, Reconciler, RunSummary};
use crate::settings::{STARTUP_POLL_INTERVAL, Settings};
use crate::store::{ConfigMapStore, KubeClient};
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::Cli;

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), ControllerError> {
    let settings = Settings::from_cli(&cli)?;
    let client = KubeClient::new(&settings.endpoint, settings.request_timeout)?;

    info!(endpoint = %client.endpoint(), "waiting for the Kubernetes API");
    client
        .wait_until_reachable(settings.startup_timeout, STARTUP_POLL_INTERVAL)
        .await?;

    if settings.onetime {
        let outcome = run_once(client, &settings).await?;
        info!(?outcome, "single pass complete");
        return Ok(());
    }

    run_until(client, &settings, shutdown_signal()).await?;
    Ok(())
}

/// Run exactly one pass.
pub async fn run_once<S: ConfigMapStore>(
    store: S,
    settings: &Settings,
) -> Result<PassOutcome, ControllerError> {
    Reconciler::new(store, settings.pass.clone())
        .run_pass()
        .await
}

/// Run the sync loop on a worker task until `shutdown` resolves, then
/// cancel it and wait for the current pass to finish.
pub async fn run_until<S, F>(
    store: S,
    settings: &Settings,
    shutdown: F,
) -> Result<RunSummary, ControllerError>
where
    S: ConfigMapStore + 'static,
    F: Future<Output = ()>,
{
    let token = CancellationToken::new();
    let mut reconciler = Reconciler::new(store, settings.pass.clone());
    let interval = settings.sync_interval;

    let worker = tokio::spawn({
        let token = token.clone();
        async move { reconciler.run(interval, token).await }
    });

    shutdown.await;
    info!("shutting down, waiting for the current pass to finish");
    token.cancel();

    worker
        .await
        .map_err(|e| ControllerError::Worker(e.to_string()))
}

/// Resolve on SIGINT or SIGTERM.
///
/// If a handler cannot be installed, that signal is logged and ignored.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C"),
        () = terminate => info!("received SIGTERM"),
    }
}
