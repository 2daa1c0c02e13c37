//! In-memory cluster filesystem and locator
//!
//! Each host gets its own tree. Handles returned by [`MemoryLocator`] are
//! independent sessions over that shared tree, the way separate client
//! sessions see the same remote namespace.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use super::name::normalize_path;
use super::{
    ClusterInitializationError, FileStatus, FileStatusStream, FileSystemHandle,
    FileSystemLocator,
};
use crate::cluster::NamedCluster;
use crate::error::{ClusterVfsError, Result};

#[derive(Debug, Clone)]
enum Entry {
    File { data: Vec<u8>, modified: SystemTime },
    Directory { modified: SystemTime },
}

type Tree = BTreeMap<String, Entry>;

/// In-memory filesystem keyed by normalized absolute path
#[derive(Clone)]
pub struct MemoryFileSystem {
    tree: Arc<RwLock<Tree>>,
}

impl Default for MemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        let mut tree = BTreeMap::new();
        // Root directory always exists
        tree.insert(
            "/".to_string(),
            Entry::Directory {
                modified: SystemTime::now(),
            },
        );
        Self {
            tree: Arc::new(RwLock::new(tree)),
        }
    }

    fn parent_of(path: &str) -> Option<String> {
        if path == "/" {
            return None;
        }
        match path.rfind('/') {
            Some(0) => Some("/".to_string()),
            Some(idx) => Some(path[..idx].to_string()),
            None => None,
        }
    }

    fn child_prefix(path: &str) -> String {
        if path == "/" {
            "/".to_string()
        } else {
            format!("{}/", path)
        }
    }

    /// Create every missing ancestor of `path` as a directory
    fn ensure_parents(tree: &mut Tree, path: &str) -> Result<()> {
        let mut ancestors = Vec::new();
        let mut current = Self::parent_of(path);
        while let Some(dir) = current {
            current = Self::parent_of(&dir);
            ancestors.push(dir);
        }

        for dir in ancestors.into_iter().rev() {
            match tree.get(&dir) {
                Some(Entry::Directory { .. }) => {}
                Some(Entry::File { .. }) => return Err(ClusterVfsError::NotADirectory(dir)),
                None => {
                    tree.insert(
                        dir,
                        Entry::Directory {
                            modified: SystemTime::now(),
                        },
                    );
                }
            }
        }
        Ok(())
    }

    fn status_of(path: &str, entry: &Entry) -> FileStatus {
        match entry {
            Entry::File { data, modified } => FileStatus::file(path, data.len() as u64, *modified),
            Entry::Directory { modified } => FileStatus::folder(path, *modified),
        }
    }

    /// Keys of `path` and everything below it
    fn subtree_keys(tree: &Tree, path: &str) -> Vec<String> {
        let prefix = Self::child_prefix(path);
        let mut keys = vec![path.to_string()];
        keys.extend(
            tree.range(prefix.clone()..)
                .take_while(|(key, _)| key.starts_with(&prefix))
                .filter(|(key, _)| key.as_str() != path)
                .map(|(key, _)| key.clone()),
        );
        keys
    }
}

#[async_trait]
impl FileSystemHandle for MemoryFileSystem {
    async fn status(&self, path: &str) -> Result<FileStatus> {
        let path = normalize_path(path);
        let tree = self.tree.read();
        tree.get(&path)
            .map(|entry| Self::status_of(&path, entry))
            .ok_or(ClusterVfsError::NotFound(path))
    }

    async fn read(&self, path: &str, offset: u64, len: Option<u64>) -> Result<Bytes> {
        let path = normalize_path(path);
        let tree = self.tree.read();
        match tree.get(&path) {
            Some(Entry::File { data, .. }) => {
                let size = data.len() as u64;
                let start = offset.min(size);
                let end = match len {
                    Some(len) => start.saturating_add(len).min(size),
                    None => size,
                };
                Ok(Bytes::copy_from_slice(&data[start as usize..end as usize]))
            }
            Some(Entry::Directory { .. }) => Err(ClusterVfsError::IsADirectory(path)),
            None => Err(ClusterVfsError::NotFound(path)),
        }
    }

    async fn write(&self, path: &str, data: &[u8], append: bool) -> Result<()> {
        let path = normalize_path(path);
        let mut tree = self.tree.write();

        match tree.get_mut(&path) {
            // Check we're not overwriting a directory
            Some(Entry::Directory { .. }) => return Err(ClusterVfsError::IsADirectory(path)),
            Some(Entry::File {
                data: existing,
                modified,
            }) if append => {
                existing.extend_from_slice(data);
                *modified = SystemTime::now();
                return Ok(());
            }
            _ => {}
        }
        Self::ensure_parents(&mut tree, &path)?;

        tree.insert(
            path,
            Entry::File {
                data: data.to_vec(),
                modified: SystemTime::now(),
            },
        );
        Ok(())
    }

    async fn create_file(&self, path: &str) -> Result<()> {
        let path = normalize_path(path);
        let mut tree = self.tree.write();
        if tree.contains_key(&path) {
            return Err(ClusterVfsError::AlreadyExists(path));
        }
        Self::ensure_parents(&mut tree, &path)?;
        tree.insert(
            path,
            Entry::File {
                data: Vec::new(),
                modified: SystemTime::now(),
            },
        );
        Ok(())
    }

    async fn mkdirs(&self, path: &str) -> Result<()> {
        let path = normalize_path(path);
        let mut tree = self.tree.write();
        match tree.get(&path) {
            Some(Entry::Directory { .. }) => return Ok(()),
            Some(Entry::File { .. }) => return Err(ClusterVfsError::AlreadyExists(path)),
            None => {}
        }
        Self::ensure_parents(&mut tree, &path)?;
        tree.insert(
            path,
            Entry::Directory {
                modified: SystemTime::now(),
            },
        );
        Ok(())
    }

    async fn delete(&self, path: &str, recursive: bool) -> Result<()> {
        let path = normalize_path(path);
        if path == "/" {
            return Err(ClusterVfsError::Backend(
                "refusing to delete the filesystem root".to_string(),
            ));
        }

        let mut tree = self.tree.write();
        let is_dir = match tree.get(&path) {
            None => return Err(ClusterVfsError::NotFound(path)),
            Some(Entry::File { .. }) => false,
            Some(Entry::Directory { .. }) => true,
        };
        if !is_dir {
            tree.remove(&path);
            return Ok(());
        }

        let keys = Self::subtree_keys(&tree, &path);
        if keys.len() > 1 && !recursive {
            return Err(ClusterVfsError::NotEmpty(path));
        }
        for key in keys {
            tree.remove(&key);
        }
        Ok(())
    }

    fn list_status(&self, path: &str) -> FileStatusStream {
        let path = normalize_path(path);
        let tree = self.tree.read();

        let listing: Result<Vec<Result<FileStatus>>> = match tree.get(&path) {
            None => Err(ClusterVfsError::NotFound(path.clone())),
            Some(Entry::File { .. }) => Err(ClusterVfsError::NotADirectory(path.clone())),
            Some(Entry::Directory { .. }) => {
                let prefix = Self::child_prefix(&path);
                Ok(tree
                    .range(prefix.clone()..)
                    .take_while(|(key, _)| key.starts_with(&prefix))
                    .filter(|(key, _)| {
                        key.len() > prefix.len() && !key[prefix.len()..].contains('/')
                    })
                    .map(|(key, entry)| Ok(Self::status_of(key, entry)))
                    .collect::<Vec<_>>())
            }
        };

        match listing {
            Ok(entries) => Box::pin(stream::iter(entries)),
            Err(e) => Box::pin(stream::iter(vec![Err(e)])),
        }
    }

    async fn rename(&self, from: &str, to: &str) -> Result<()> {
        let from = normalize_path(from);
        let to = normalize_path(to);
        let mut tree = self.tree.write();

        if !tree.contains_key(&from) {
            return Err(ClusterVfsError::NotFound(from));
        }
        if tree.contains_key(&to) {
            return Err(ClusterVfsError::AlreadyExists(to));
        }
        if to.starts_with(&Self::child_prefix(&from)) {
            return Err(ClusterVfsError::Backend(format!(
                "cannot move {} into itself",
                from
            )));
        }
        match Self::parent_of(&to).and_then(|parent| tree.get(&parent).cloned()) {
            Some(Entry::Directory { .. }) => {}
            Some(Entry::File { .. }) => return Err(ClusterVfsError::NotADirectory(to)),
            None => return Err(ClusterVfsError::NotFound(to)),
        }

        for key in Self::subtree_keys(&tree, &from) {
            if let Some(entry) = tree.remove(&key) {
                let moved = format!("{}{}", to, &key[from.len()..]);
                tree.insert(moved, entry);
            }
        }
        Ok(())
    }

    async fn set_modification_time(&self, path: &str, time: SystemTime) -> Result<()> {
        let path = normalize_path(path);
        let mut tree = self.tree.write();
        match tree.get_mut(&path) {
            Some(Entry::File { modified, .. }) | Some(Entry::Directory { modified }) => {
                *modified = time;
                Ok(())
            }
            None => Err(ClusterVfsError::NotFound(path)),
        }
    }
}

/// Locator serving in-memory filesystems for clusters whose shim is installed
///
/// Each distinct namenode host gets its own tree on first use, including
/// hosts that only resolved to the template. Trees live as long as the
/// locator and are never evicted.
pub struct MemoryLocator {
    installed_shims: HashSet<String>,
    trees: Mutex<HashMap<String, MemoryFileSystem>>,
}

impl MemoryLocator {
    pub fn new<I, S>(installed_shims: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            installed_shims: installed_shims.into_iter().map(Into::into).collect(),
            trees: Mutex::new(HashMap::new()),
        }
    }

    /// The backing tree for a namenode host, created on first use
    pub fn tree_for_host(&self, host: &str) -> MemoryFileSystem {
        self.trees
            .lock()
            .entry(host.to_string())
            .or_default()
            .clone()
    }
}

impl FileSystemLocator for MemoryLocator {
    fn filesystem(
        &self,
        cluster: &NamedCluster,
        uri: &str,
    ) -> std::result::Result<Box<dyn FileSystemHandle>, ClusterInitializationError> {
        let shim = cluster
            .shim_identifier()
            .map_err(|e| ClusterInitializationError::new(cluster, e.to_string()))?;

        if !self.installed_shims.contains(shim) {
            return Err(ClusterInitializationError::new(
                cluster,
                format!("shim {:?} is not installed", shim),
            ));
        }
        if cluster.hdfs_host.is_empty() {
            return Err(ClusterInitializationError::new(
                cluster,
                "no namenode host configured",
            ));
        }

        debug!(
            "Opening in-memory session for {} (shim {}) at {:?}",
            cluster.hdfs_host, shim, uri
        );
        Ok(Box::new(self.tree_for_host(&cluster.hdfs_host)))
    }
}
