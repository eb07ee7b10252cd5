//! Error types for the I/O layers.
//!
//! The matching engine itself never fails: unparseable versions and ranges
//! simply do not match. Everything that touches the network or the
//! filesystem reports a [`ScanError`].

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("failed to fetch IoC list: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("failed to fetch IoC list from {url}: HTTP {status}")]
    FetchStatus { url: String, status: u16 },

    #[error("io error: {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse manifest {}: {source}", path.display())]
    ManifestParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to parse lockfile {}: {reason}", path.display())]
    LockfileParse { path: PathBuf, reason: String },

    #[error("path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("no paths found in {}", .0.display())]
    EmptyPathsFile(PathBuf),

    #[error("scan cancelled")]
    Cancelled,

    #[error("scan worker failed: {0}")]
    Worker(String),
}

impl ScanError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScanError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = ScanError> = std::result::Result<T, E>;
