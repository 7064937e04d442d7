//! # alertconf
//!
//! Aggregates Alertmanager configuration fragments stored in ConfigMaps into
//! one published `alertmanager.yml`.
//!
//! ## Usage
//!
//! ```bash
//! # Keep monitoring/alertmanager in sync with every labelled fragment
//! alertconf -s alertmanager=true monitoring alertmanager
//!
//! # One pass over two namespaces, printing the result
//! alertconf -o --print -n monitoring -n databases monitoring alertmanager
//! ```

use alertconf::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // ALERTCONF_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("ALERTCONF_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "alertconf=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
