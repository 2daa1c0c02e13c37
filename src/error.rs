use thiserror::Error;

use crate::vfs::{Capability, ClusterInitializationError};

/// Main error type for cluster-vfs operations
#[derive(Error, Debug)]
pub enum ClusterVfsError {
    #[error("Malformed address {uri:?}: {reason}")]
    MalformedAddress { uri: String, reason: String },

    #[error(transparent)]
    ClusterInitialization(#[from] ClusterInitializationError),

    #[error("No shim specified for named cluster {0:?}")]
    NoShimSpecified(String),

    #[error("No provider registered for scheme: {0}")]
    UnknownScheme(String),

    #[error("A provider is already registered for scheme: {0}")]
    SchemeAlreadyRegistered(String),

    #[error("Operation not supported: {0:?}")]
    NotSupported(Capability),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Path already exists: {0}")]
    AlreadyExists(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Is a directory: {0}")]
    IsADirectory(String),

    #[error("Directory not empty: {0}")]
    NotEmpty(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

impl ClusterVfsError {
    /// Whether the error means the target path does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClusterVfsError::NotFound(_))
    }
}

/// Result type alias for cluster-vfs operations
pub type Result<T> = std::result::Result<T, ClusterVfsError>;
