//! # alertconf CLI Module
//!
//! Command-line surface of the controller. There are no subcommands: the
//! process either runs one pass (`--onetime`) or keeps the published config
//! in sync until it receives SIGINT or SIGTERM.

mod commands;

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// alertconf - Alertmanager config aggregator
///
/// Collects configuration fragments stored in Kubernetes ConfigMaps and
/// publishes a single alertmanager.yml into the target ConfigMap.
#[derive(Parser, Debug)]
#[command(name = "alertconf")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Label selector used to find fragment ConfigMaps
    #[arg(short, long)]
    pub selector: Option<String>,

    /// Kubernetes API endpoint [default: http://127.0.0.1:8001]
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// Namespace to search for fragments (repeatable; default: all)
    #[arg(short, long)]
    pub namespace: Vec<String>,

    /// Run a single pass and exit
    #[arg(short, long)]
    pub onetime: bool,

    /// Time between passes, e.g. "30s" or "5m" [default: 60s]
    #[arg(short = 'i', long, value_parser = humantime::parse_duration)]
    pub sync_interval: Option<Duration>,

    /// Path to a TOML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log the assembled document at info level on every pass
    #[arg(long)]
    pub print: bool,

    /// Namespace of the ConfigMap to publish into
    pub target_namespace: String,

    /// Name of the ConfigMap to publish into
    pub target_name: String,
}

// =============================================================================
// TESTS
// =============================================================================
