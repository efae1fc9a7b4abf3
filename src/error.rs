//! Error types shared by the selector, its collaborators and the binary.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by a record provider.
///
/// The selector recovers from every variant locally: the panel empties and
/// the next keystroke re-arms the search.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// Backend could not be reached or failed while answering.
    #[error("record provider unavailable: {0}")]
    Unavailable(String),

    /// Backend refused the query parameters.
    #[error("record provider rejected query: {0}")]
    Rejected(String),

    /// Worker finished without delivering a result.
    #[error("record provider worker disconnected")]
    Disconnected,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse YAML {path}: {source}")]
    ParseYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to parse JSON {path}: {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{label} is required")]
    Required { label: String },
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("step {index} is scheduled at {at_ms}ms, before the previous step at {previous_ms}ms")]
    OutOfOrder {
        index: usize,
        at_ms: u64,
        previous_ms: u64,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Top-level error for the command line driver.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Replay(#[from] ReplayError),

    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}
