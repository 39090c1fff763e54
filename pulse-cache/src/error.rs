use std::path::PathBuf;

use thiserror::Error;

/// Failure inside the durable tier.
///
/// Never propagated past the cache: the tier records it and degrades to a miss.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Filesystem operation failed.
    #[error("cache io error at {path}: {source}")]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Record could not be encoded or decoded.
    #[error("corrupt cache record at {path}: {source}")]
    Csv {
        /// Record file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: csv::Error,
    },
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}
