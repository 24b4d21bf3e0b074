//! Logging and tracing setup.
//!
//! Diagnostics go to stderr through `tracing-subscriber`. When a log file or
//! directory is configured, the same events are also written there through a
//! non-blocking `tracing-appender` writer; keep the returned guard alive
//! until exit so buffered lines are flushed.

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_PATH_ENV: &str = "ABSTRACT_LINT_LOG_PATH";
const LOG_DIR_ENV: &str = "ABSTRACT_LINT_LOG_DIR";
const DEFAULT_LOG_FILE: &str = "abstract-lint.log";

/// Where file logs go, if anywhere.
#[derive(Debug, Clone, Default)]
pub struct ObservabilityConfig {
    /// Explicit log file path; wins over `log_dir`.
    pub log_path: Option<PathBuf>,
    /// Directory for `abstract-lint.log`.
    pub log_dir: Option<PathBuf>,
}

impl ObservabilityConfig {
    /// Read `ABSTRACT_LINT_LOG_PATH`/`ABSTRACT_LINT_LOG_DIR`, falling back to
    /// the configured log directory.
    pub fn from_env_with_overrides(config_log_dir: Option<PathBuf>) -> Self {
        let non_empty = |key| std::env::var_os(key).filter(|v: &OsString| !v.is_empty());
        Self {
            log_path: non_empty(LOG_PATH_ENV).map(PathBuf::from),
            log_dir: non_empty(LOG_DIR_ENV).map(PathBuf::from).or(config_log_dir),
        }
    }

    fn file_target(&self) -> Option<(PathBuf, OsString)> {
        if let Some(ref path) = self.log_path {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), PathBuf::from);
            let name = path.file_name()?.to_os_string();
            return Some((dir, name));
        }
        self.log_dir
            .clone()
            .map(|dir| (dir, OsString::from(DEFAULT_LOG_FILE)))
    }
}

/// Build the event filter.
///
/// `RUST_LOG` wins when set. Otherwise `--quiet` shows errors only, each
/// `-v` lowers the threshold one step from info, and the configured level
/// applies when neither flag is given.
pub fn env_filter(quiet: bool, verbose: u8, default_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => default_level,
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    EnvFilter::new(level)
}

/// Install the global subscriber.
pub fn init_observability(
    config: &ObservabilityConfig,
    filter: EnvFilter,
) -> anyhow::Result<Option<WorkerGuard>> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = match config.file_target() {
        Some((dir, name)) => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::never(&dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;
    Ok(guard)
}
