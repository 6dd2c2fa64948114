//! Storage error types.

use std::path::PathBuf;

/// Errors raised while writing or reading chunk files.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A filesystem operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// File or directory being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A file on disk does not have the size implied by its dimensions.
    #[error("{path} holds {actual} bytes, expected {expected}")]
    SizeMismatch {
        /// Offending file.
        path: PathBuf,
        /// Byte count implied by the chunk dimensions.
        expected: usize,
        /// Byte count found on disk.
        actual: usize,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
