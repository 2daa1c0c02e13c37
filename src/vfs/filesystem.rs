//! Uniform filesystem over one resolved cluster

use std::fmt;
use std::time::SystemTime;

use bytes::Bytes;
use futures::TryStreamExt;
use tracing::{debug, trace};

use super::{
    require, Capability, CapabilitySet, FileName, FileStatus, FileSystemHandle,
    FileSystemOptions, FileType, HDFS_CAPABILITIES,
};
use crate::cluster::NamedCluster;
use crate::error::Result;

/// A filesystem instance bound to one named cluster.
///
/// Owns the client session it was created with. Every operation is checked
/// against the provider's capability set before reaching the session.
pub struct ClusterFileSystem {
    root: FileName,
    options: FileSystemOptions,
    cluster: NamedCluster,
    handle: Box<dyn FileSystemHandle>,
}

impl fmt::Debug for ClusterFileSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterFileSystem")
            .field("root", &self.root.uri())
            .field("cluster", &self.cluster.name)
            .finish()
    }
}

impl ClusterFileSystem {
    pub fn new(
        name: &FileName,
        options: FileSystemOptions,
        cluster: NamedCluster,
        handle: Box<dyn FileSystemHandle>,
    ) -> Self {
        Self {
            root: name.root(),
            options,
            cluster,
            handle,
        }
    }

    pub fn root_uri(&self) -> String {
        self.root.uri()
    }

    /// The cluster this filesystem was resolved to
    pub fn cluster(&self) -> &NamedCluster {
        &self.cluster
    }

    pub fn options(&self) -> &FileSystemOptions {
        &self.options
    }

    pub fn capabilities(&self) -> &'static CapabilitySet {
        &HDFS_CAPABILITIES
    }

    fn check(&self, capability: Capability) -> Result<()> {
        require(self.capabilities(), capability)
    }

    /// Absolute URI of a path within this filesystem
    pub fn uri(&self, path: &str) -> Result<String> {
        self.check(Capability::Uri)?;
        Ok(self.root.with_path(path).uri())
    }

    /// Type of a path; `Imaginary` if it does not exist
    pub async fn file_type(&self, path: &str) -> Result<FileType> {
        self.check(Capability::GetType)?;
        match self.handle.status(path).await {
            Ok(status) => Ok(status.file_type),
            Err(e) if e.is_not_found() => Ok(FileType::Imaginary),
            Err(e) => Err(e),
        }
    }

    pub async fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.file_type(path).await? != FileType::Imaginary)
    }

    pub async fn status(&self, path: &str) -> Result<FileStatus> {
        self.check(Capability::GetType)?;
        self.handle.status(path).await
    }

    /// Direct children of a folder
    pub async fn list_children(&self, path: &str) -> Result<Vec<FileStatus>> {
        self.check(Capability::ListChildren)?;
        trace!("list_children: root={} path={}", self.root, path);
        self.handle.list_status(path).try_collect().await
    }

    /// Whole content of a file
    pub async fn read(&self, path: &str) -> Result<Bytes> {
        self.check(Capability::ReadContent)?;
        trace!("read: root={} path={}", self.root, path);
        self.handle.read(path, 0, None).await
    }

    /// Read `len` bytes at `offset`
    pub async fn read_at(&self, path: &str, offset: u64, len: u64) -> Result<Bytes> {
        self.check(Capability::ReadContent)?;
        self.check(Capability::RandomAccessRead)?;
        trace!(
            "read_at: root={} path={} offset={} len={}",
            self.root,
            path,
            offset,
            len
        );
        self.handle.read(path, offset, Some(len)).await
    }

    /// Write a file's content, appending to it if `append` is set
    pub async fn write(&self, path: &str, data: &[u8], append: bool) -> Result<()> {
        self.check(Capability::WriteContent)?;
        trace!(
            "write: root={} path={} len={} append={}",
            self.root,
            path,
            data.len(),
            append
        );
        self.handle.write(path, data, append).await
    }

    pub async fn create_file(&self, path: &str) -> Result<()> {
        self.check(Capability::Create)?;
        self.handle.create_file(path).await
    }

    pub async fn create_folder(&self, path: &str) -> Result<()> {
        self.check(Capability::Create)?;
        self.handle.mkdirs(path).await
    }

    /// Delete a path. Returns false if there was nothing to delete.
    pub async fn delete(&self, path: &str, recursive: bool) -> Result<bool> {
        self.check(Capability::Delete)?;
        debug!("delete: root={} path={} recursive={}", self.root, path, recursive);
        match self.handle.delete(path, recursive).await {
            Ok(()) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn rename(&self, from: &str, to: &str) -> Result<()> {
        self.check(Capability::Rename)?;
        debug!("rename: root={} {} -> {}", self.root, from, to);
        self.handle.rename(from, to).await
    }

    pub async fn last_modified(&self, path: &str) -> Result<SystemTime> {
        self.check(Capability::GetLastModified)?;
        Ok(self.handle.status(path).await?.modification_time)
    }

    /// Set the modification time. Folders need `SetLastModifiedFolder`.
    pub async fn set_last_modified(&self, path: &str, time: SystemTime) -> Result<()> {
        let status = self.handle.status(path).await?;
        if status.is_folder() {
            self.check(Capability::SetLastModifiedFolder)?;
        } else {
            self.check(Capability::SetLastModifiedFile)?;
        }
        self.handle.set_modification_time(path, time).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClusterVfsError;
    use crate::vfs::MemoryFileSystem;

    fn filesystem() -> ClusterFileSystem {
        let name = FileName::parse("hdfs://nn:8020/data/in.csv").unwrap();
        ClusterFileSystem::new(
            &name,
            FileSystemOptions::new(),
            NamedCluster::new("clusterA"),
            Box::new(MemoryFileSystem::new()),
        )
    }

    #[test]
    fn test_root_and_uri() {
        let fs = filesystem();
        assert_eq!(fs.root_uri(), "hdfs://nn:8020/");
        assert_eq!(fs.uri("/a/b").unwrap(), "hdfs://nn:8020/a/b");
        assert_eq!(fs.cluster().name, "clusterA");
        assert!(fs.options().is_empty());
    }

    #[tokio::test]
    async fn test_file_type() {
        let fs = filesystem();
        fs.write("/data/in.csv", b"a,b", false).await.unwrap();

        assert_eq!(fs.file_type("/data").await.unwrap(), FileType::Folder);
        assert_eq!(fs.file_type("/data/in.csv").await.unwrap(), FileType::File);
        assert_eq!(fs.file_type("/nope").await.unwrap(), FileType::Imaginary);
        assert!(!fs.exists("/nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_read_and_random_access() {
        let fs = filesystem();
        fs.write("/f", b"hello world", false).await.unwrap();

        assert_eq!(&fs.read("/f").await.unwrap()[..], b"hello world");
        assert_eq!(&fs.read_at("/f", 6, 5).await.unwrap()[..], b"world");
    }

    #[tokio::test]
    async fn test_write_append() {
        let fs = filesystem();
        fs.write("/out.csv", b"a,b\n", false).await.unwrap();
        fs.write("/out.csv", b"c,d\n", true).await.unwrap();

        assert_eq!(&fs.read("/out.csv").await.unwrap()[..], b"a,b\nc,d\n");
        assert_eq!(fs.status("/out.csv").await.unwrap().len, 8);
    }

    #[tokio::test]
    async fn test_list_children() {
        let fs = filesystem();
        fs.create_folder("/d/sub").await.unwrap();
        fs.create_file("/d/f").await.unwrap();

        let children = fs.list_children("/d").await.unwrap();
        let names: Vec<_> = children.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["f", "sub"]);
    }

    #[tokio::test]
    async fn test_delete_missing_returns_false() {
        let fs = filesystem();
        fs.create_file("/f").await.unwrap();
        assert!(fs.delete("/f", false).await.unwrap());
        assert!(!fs.delete("/f", false).await.unwrap());
    }

    #[tokio::test]
    async fn test_set_last_modified_only_on_files() {
        let fs = filesystem();
        fs.create_file("/d/f").await.unwrap();

        fs.set_last_modified("/d/f", SystemTime::UNIX_EPOCH)
            .await
            .unwrap();
        assert_eq!(
            fs.last_modified("/d/f").await.unwrap(),
            SystemTime::UNIX_EPOCH
        );

        let err = fs
            .set_last_modified("/d", SystemTime::UNIX_EPOCH)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClusterVfsError::NotSupported(Capability::SetLastModifiedFolder)
        ));
    }

    #[tokio::test]
    async fn test_rename() {
        let fs = filesystem();
        fs.write("/a", b"1", false).await.unwrap();
        fs.rename("/a", "/b").await.unwrap();
        assert!(!fs.exists("/a").await.unwrap());
        assert!(fs.exists("/b").await.unwrap());
    }
}
