//! Virtual filesystem surface shared by every cluster
//!
//! - [`FileSystemHandle`] is the live client session for one cluster, as
//!   handed out by a [`FileSystemLocator`].
//! - [`ClusterFileSystem`] wraps a handle behind the uniform interface and
//!   enforces the provider's [`CapabilitySet`].

pub mod filesystem;
pub mod memory;
pub mod name;
pub mod options;

use std::pin::Pin;
use std::time::SystemTime;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use thiserror::Error;

use crate::cluster::NamedCluster;
use crate::error::{ClusterVfsError, Result};

pub use filesystem::ClusterFileSystem;
pub use memory::{MemoryFileSystem, MemoryLocator};
pub use name::FileName;
pub use options::FileSystemOptions;

/// Operations a filesystem may support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Create,
    Delete,
    Rename,
    GetType,
    ListChildren,
    ReadContent,
    WriteContent,
    Uri,
    GetLastModified,
    SetLastModifiedFile,
    SetLastModifiedFolder,
    RandomAccessRead,
}

/// Immutable set of capabilities
#[derive(Debug, PartialEq, Eq)]
pub struct CapabilitySet(&'static [Capability]);

impl CapabilitySet {
    pub const fn new(capabilities: &'static [Capability]) -> Self {
        Self(capabilities)
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Capabilities of every filesystem created by the HDFS provider
pub static HDFS_CAPABILITIES: CapabilitySet = CapabilitySet::new(&[
    Capability::Create,
    Capability::Delete,
    Capability::Rename,
    Capability::GetType,
    Capability::ListChildren,
    Capability::ReadContent,
    Capability::Uri,
    Capability::WriteContent,
    Capability::GetLastModified,
    Capability::SetLastModifiedFile,
    Capability::RandomAccessRead,
]);

/// File type as seen by the virtual filesystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// Does not exist (yet)
    Imaginary,
    File,
    Folder,
}

/// Status of one path on a cluster
#[derive(Debug, Clone, PartialEq)]
pub struct FileStatus {
    /// Absolute path within the cluster
    pub path: String,
    pub file_type: FileType,
    pub len: u64,
    pub modification_time: SystemTime,
}

impl FileStatus {
    pub fn file(path: impl Into<String>, len: u64, modification_time: SystemTime) -> Self {
        Self {
            path: path.into(),
            file_type: FileType::File,
            len,
            modification_time,
        }
    }

    pub fn folder(path: impl Into<String>, modification_time: SystemTime) -> Self {
        Self {
            path: path.into(),
            file_type: FileType::Folder,
            len: 0,
            modification_time,
        }
    }

    /// Last path component; empty for the root
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or("")
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.file_type, FileType::Folder)
    }
}

/// Stream type for directory listings
pub type FileStatusStream = Pin<Box<dyn Stream<Item = Result<FileStatus>> + Send>>;

/// Live client session for one cluster's filesystem.
///
/// Paths are absolute cluster paths (`/user/etl/in.csv`).
#[async_trait]
pub trait FileSystemHandle: Send + Sync {
    /// Status of a path; `NotFound` if it does not exist
    async fn status(&self, path: &str) -> Result<FileStatus>;

    /// Check if a path exists
    ///
    /// Default implementation uses status()
    async fn exists(&self, path: &str) -> Result<bool> {
        match self.status(path).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Read up to `len` bytes starting at `offset`; `None` reads to the end
    async fn read(&self, path: &str, offset: u64, len: Option<u64>) -> Result<Bytes>;

    /// Write a file, creating it and any missing parents
    ///
    /// # Arguments
    /// * `path` - File to write
    /// * `data` - Content to write
    /// * `append` - If true, add to the end of an existing file instead of replacing it
    async fn write(&self, path: &str, data: &[u8], append: bool) -> Result<()>;

    /// Create an empty file; `AlreadyExists` if the path is taken
    async fn create_file(&self, path: &str) -> Result<()>;

    /// Create a directory and any missing parents
    async fn mkdirs(&self, path: &str) -> Result<()>;

    /// Delete a path
    ///
    /// # Arguments
    /// * `path` - Path to delete
    /// * `recursive` - If false, a directory must be empty
    async fn delete(&self, path: &str, recursive: bool) -> Result<()>;

    /// List the direct children of a directory
    fn list_status(&self, path: &str) -> FileStatusStream;

    /// Rename/move a file or directory
    async fn rename(&self, from: &str, to: &str) -> Result<()>;

    async fn set_modification_time(&self, path: &str, time: SystemTime) -> Result<()>;
}

/// Failure to prepare a filesystem client for a cluster
#[derive(Debug, Error)]
#[error("Unable to initialize named cluster {cluster:?}: {reason}")]
pub struct ClusterInitializationError {
    pub cluster: String,
    pub reason: String,
}

impl ClusterInitializationError {
    pub fn new(cluster: &NamedCluster, reason: impl Into<String>) -> Self {
        let cluster = if cluster.is_template() {
            cluster.hdfs_host.clone()
        } else {
            cluster.name.clone()
        };
        Self {
            cluster,
            reason: reason.into(),
        }
    }
}

/// Obtains live filesystem handles for clusters
pub trait FileSystemLocator: Send + Sync {
    /// Open a session for `cluster`, addressed by the normalized `uri`
    fn filesystem(
        &self,
        cluster: &NamedCluster,
        uri: &str,
    ) -> std::result::Result<Box<dyn FileSystemHandle>, ClusterInitializationError>;
}

/// Map a missing capability to the error returned to callers
pub(crate) fn require(set: &CapabilitySet, capability: Capability) -> Result<()> {
    if set.contains(capability) {
        Ok(())
    } else {
        Err(ClusterVfsError::NotSupported(capability))
    }
}
