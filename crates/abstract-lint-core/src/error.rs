//! Error types for abstract-lint-core.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while checking or exporting an abstract.
#[derive(Error, Debug)]
pub enum LintError {
    /// The input path is neither a file nor a directory holding `<dir>.md`.
    #[error("file `{0}` not found")]
    InputNotFound(Utf8PathBuf),

    /// Reading or writing a file failed.
    #[error("failed to access {path}")]
    Io {
        /// The path that was being accessed.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configured text encoding label is not recognized.
    #[error("unknown text encoding: {0}")]
    UnknownEncoding(String),

    /// The input bytes are not valid in the configured encoding.
    #[error("{path} is not valid {encoding}")]
    Decode {
        /// The file that failed to decode.
        path: Utf8PathBuf,
        /// Canonical name of the encoding that was used.
        encoding: &'static str,
    },

    /// A freshness check was requested without any input files.
    #[error("list of input files is empty")]
    NoFreshnessInputs,

    /// A freshness check input does not exist.
    #[error("input file `{0}` does not exist")]
    FreshnessInputMissing(Utf8PathBuf),

    /// An external tool could not be spawned or waited on.
    #[error("failed to run `{program}`")]
    ToolSpawn {
        /// Program that was being run.
        program: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An external tool exceeded the configured timeout and was killed.
    #[error("`{program}` timed out after {seconds}s")]
    ToolTimeout {
        /// Program that was killed.
        program: String,
        /// Timeout that elapsed, in seconds.
        seconds: u64,
    },
}

impl LintError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias using [`LintError`].
pub type LintResult<T> = Result<T, LintError>;
