//! # Settings
//!
//! Layered process configuration: built-in defaults, then an optional TOML
//! file, then explicit command-line flags.
//!
//! ```toml
//! selector = "alertmanager=true"
//! endpoint = "http://127.0.0.1:8001"
//! namespaces = ["monitoring", "databases"]
//! sync_interval = "30s"
//! request_timeout = "10s"
//! startup_timeout = "2m"
//! print = false
//! ```

use crate::cli::Cli;
use crate::error::ControllerError;
use crate::reconciler::PassSettings;
use crate::store::DEFAULT_ENDPOINT;
use alertconf_core::RecordRef;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

// =============================================================================
// DEFAULTS
// =============================================================================

/// Time between the end of one pass and the start of the next.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(60);

/// Per-request HTTP timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How long to wait for the API at startup.
pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(60);

/// Delay between reachability probes at startup.
pub const STARTUP_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Maximum settings file size (1 MB).
const MAX_SETTINGS_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// SETTINGS FILE
// =============================================================================

/// Contents of the `--config` file. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    pub selector: Option<String>,
    pub endpoint: Option<String>,
    pub namespaces: Option<Vec<String>>,
    #[serde(default, with = "humantime_opt")]
    pub sync_interval: Option<Duration>,
    #[serde(default, with = "humantime_opt")]
    pub request_timeout: Option<Duration>,
    #[serde(default, with = "humantime_opt")]
    pub startup_timeout: Option<Duration>,
    pub print: Option<bool>,
}

impl SettingsFile {
    /// Read and parse a settings file.
    pub fn load(path: &Path) -> Result<Self, ControllerError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            ControllerError::Settings(format!("cannot read '{}': {e}", path.display()))
        })?;
        if metadata.len() > MAX_SETTINGS_FILE_SIZE {
            return Err(ControllerError::Settings(format!(
                "'{}' is {} bytes, larger than the {} byte limit",
                path.display(),
                metadata.len(),
                MAX_SETTINGS_FILE_SIZE
            )));
        }
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ControllerError::Settings(format!("cannot read '{}': {e}", path.display()))
        })?;
        Self::parse(&contents)
            .map_err(|e| ControllerError::Settings(format!("{}: {e}", path.display())))
    }

    /// Parse settings from TOML text.
    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

/// `Option<Duration>` as a humantime string such as `"90s"` or `"2m"`.
mod humantime_opt {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|s| humantime::parse_duration(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

// =============================================================================
// RESOLVED SETTINGS
// =============================================================================

/// Fully resolved settings for one process run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub pass: PassSettings,
    pub endpoint: String,
    pub sync_interval: Duration,
    pub request_timeout: Duration,
    pub startup_timeout: Duration,
    pub onetime: bool,
}

impl Settings {
    /// Merge defaults, the settings file and the command line.
    ///
    /// Flags given on the command line win over the file. Namespaces from
    /// the command line replace the file's list rather than extending it.
    pub fn resolve(cli: &Cli, file: Option<SettingsFile>) -> Result<Self, ControllerError> {
        let file = file.unwrap_or_default();

        if cli.target_namespace.is_empty() || cli.target_name.is_empty() {
            return Err(ControllerError::Settings(
                "target namespace and name must not be empty".to_string(),
            ));
        }

        let mut namespaces = if !cli.namespace.is_empty() {
            cli.namespace.clone()
        } else {
            file.namespaces.unwrap_or_default()
        };
        if namespaces.is_empty() {
            namespaces.push(String::new());
        }

        let sync_interval = cli
            .sync_interval
            .or(file.sync_interval)
            .unwrap_or(DEFAULT_SYNC_INTERVAL);
        if sync_interval.is_zero() {
            return Err(ControllerError::Settings(
                "sync interval must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            pass: PassSettings {
                target: RecordRef::new(&cli.target_namespace, &cli.target_name),
                namespaces,
                selector: cli.selector.clone().or(file.selector).unwrap_or_default(),
                print: cli.print || file.print.unwrap_or(false),
            },
            endpoint: cli
                .endpoint
                .clone()
                .or(file.endpoint)
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            sync_interval,
            request_timeout: file.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            startup_timeout: file.startup_timeout.unwrap_or(DEFAULT_STARTUP_TIMEOUT),
            onetime: cli.onetime,
        })
    }

    /// Resolve from the command line, loading `--config` if given.
    pub fn from_cli(cli: &Cli) -> Result<Self, ControllerError> {
        let file = cli.config.as_deref().map(SettingsFile::load).transpose()?;
        Self::resolve(cli, file)
    }
}

// =============================================================================
// TESTS
// =============================================================================
