//! Error types for bundle processing.

use std::path::PathBuf;

use certdedup_common::InvalidBundleId;
use thiserror::Error;

/// Failure while processing a single bundle.
///
/// Neither variant is fatal to a batch: the bundle is skipped and the next
/// one is processed.
#[derive(Debug, Error)]
pub enum BundleError {
    /// Bundle file missing or unreadable
    #[error("failed to read bundle {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Temporary file or rename failed; the original bundle is intact
    #[error("failed to write bundle {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BundleError {
    /// Path of the bundle that failed
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Read { path, .. } | Self::Write { path, .. } => path,
        }
    }
}

/// Failure that stops a whole batch.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Configured bundle file name would resolve outside its directory
    #[error("bundle file must be a plain file name, got {0:?}")]
    BundleFile(String),

    /// Live directory could not be listed
    #[error("failed to read live directory {path:?}: {source}")]
    LiveDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An input list file could not be read
    #[error("failed to read list file {path:?}: {source}")]
    ListRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An output list file could not be written
    #[error("failed to write list file {path:?}: {source}")]
    ListWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a single entry of a batch was skipped.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error(transparent)]
    Bundle(#[from] BundleError),

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(#[from] InvalidBundleId),
}

/// Result type for batch operations.
pub type BatchResult<T> = Result<T, BatchError>;
