//! Cache Error Types
//!
//! Every filesystem failure is reported back to the caller instead of
//! tearing down the host process.

use std::io;
use std::path::PathBuf;

/// Errors produced while setting up a cache directory or writing to it
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Failed to create cache directory {path:?}: {source}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write cache file {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid cache file name: {0:?}")]
    InvalidFileName(String),

    #[error("No documents directory available on this platform")]
    NoDocumentDir,

    #[error("Cacher must be created inside a tokio runtime")]
    NoRuntime,

    #[error("Cache worker has stopped")]
    WorkerStopped,

    #[error("Cache task panicked: {0}")]
    TaskPanicked(String),
}

impl CacheError {
    /// Whether retrying the same operation could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            CacheError::DirectoryCreation { source, .. } | CacheError::Write { source, .. } => {
                matches!(
                    source.kind(),
                    io::ErrorKind::Interrupted
                        | io::ErrorKind::TimedOut
                        | io::ErrorKind::WouldBlock
                )
            }
            _ => false,
        }
    }
}

/// Result alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_write_is_retryable() {
        let err = CacheError::Write {
            path: PathBuf::from("/cache/a.txt"),
            source: io::Error::new(io::ErrorKind::Interrupted, "signal"),
        };
        assert!(err.is_retryable());

        let err = CacheError::Write {
            path: PathBuf::from("/cache/a.txt"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_logical_errors_are_not_retryable() {
        assert!(!CacheError::InvalidFileName("..".to_string()).is_retryable());
        assert!(!CacheError::NoDocumentDir.is_retryable());
        assert!(!CacheError::WorkerStopped.is_retryable());
    }

    #[test]
    fn test_display_includes_path() {
        let err = CacheError::DirectoryCreation {
            path: PathBuf::from("/nope/cache"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/nope/cache"));
        assert!(msg.contains("denied"));
    }
}
