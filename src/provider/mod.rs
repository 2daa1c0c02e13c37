//! Filesystem providers
//!
//! A provider turns a parsed [`FileName`] into a live [`ClusterFileSystem`].
//! Providers are registered explicitly with a
//! [`FileSystemManager`](crate::manager::FileSystemManager) for the schemes
//! they serve.

pub mod config_builder;

use std::sync::Arc;

use tracing::{debug, info};

use crate::cluster::{ClusterRegistry, MetastoreLocator};
use crate::error::Result;
use crate::resolver::{ClusterResolver, HDFS_SCHEME, MAPRFS_SCHEME};
use crate::vfs::{
    CapabilitySet, ClusterFileSystem, FileName, FileSystemLocator, FileSystemOptions,
    HDFS_CAPABILITIES,
};

pub use config_builder::NamedClusterConfigBuilder;

/// Schemes the HDFS provider is normally registered for
pub const HDFS_PROVIDER_SCHEMES: [&str; 2] = [HDFS_SCHEME, MAPRFS_SCHEME];

/// Authentication data a provider accepts from callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticatorType {
    Username,
    Password,
}

/// Authentication data accepted by the HDFS provider
pub const AUTHENTICATOR_TYPES: [AuthenticatorType; 2] =
    [AuthenticatorType::Username, AuthenticatorType::Password];

/// Creates filesystems for the schemes it is registered under
pub trait FileProvider: Send + Sync {
    /// Create a filesystem rooted at `name`'s root
    fn create_filesystem(
        &self,
        name: &FileName,
        options: &FileSystemOptions,
    ) -> Result<ClusterFileSystem>;

    /// Capabilities shared by every filesystem this provider creates
    fn capabilities(&self) -> &'static CapabilitySet;
}

/// Provider for HDFS-compatible clusters (hdfs://, maprfs://)
pub struct HdfsFileProvider {
    locator: Arc<dyn FileSystemLocator>,
    resolver: ClusterResolver,
    metastore_locator: Arc<dyn MetastoreLocator>,
}

impl HdfsFileProvider {
    pub fn new(
        locator: Arc<dyn FileSystemLocator>,
        registry: Arc<dyn ClusterRegistry>,
        metastore_locator: Arc<dyn MetastoreLocator>,
    ) -> Self {
        Self {
            locator,
            resolver: ClusterResolver::new(registry, metastore_locator.clone()),
            metastore_locator,
        }
    }

    /// Builder for the named-cluster options this provider understands
    pub fn config_builder(&self) -> NamedClusterConfigBuilder {
        NamedClusterConfigBuilder::new(
            self.metastore_locator.clone(),
            self.resolver.registry().clone(),
        )
    }

    pub fn authenticator_types(&self) -> &'static [AuthenticatorType] {
        &AUTHENTICATOR_TYPES
    }

    pub fn resolver(&self) -> &ClusterResolver {
        &self.resolver
    }
}

impl FileProvider for HdfsFileProvider {
    fn create_filesystem(
        &self,
        name: &FileName,
        options: &FileSystemOptions,
    ) -> Result<ClusterFileSystem> {
        let root = name.root();
        let host = root.host.clone().unwrap_or_default();
        let cluster = self
            .resolver
            .resolve_host(&host, root.port_or_zero(), &root.scheme);
        debug!(
            "Resolved {} to named cluster {:?} (host {:?})",
            root, cluster.name, cluster.hdfs_host
        );

        let uri = if root.host.is_some() {
            name.uri()
        } else {
            String::new()
        };
        let handle = self.locator.filesystem(&cluster, &uri)?;

        info!("Created filesystem for {} on cluster {:?}", root, cluster.name);
        Ok(ClusterFileSystem::new(name, options.clone(), cluster, handle))
    }

    fn capabilities(&self) -> &'static CapabilitySet {
        &HDFS_CAPABILITIES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{
        MemoryMetastore, MetastoreClusterRegistry, NamedCluster, StaticMetastoreLocator,
    };
    use crate::error::ClusterVfsError;
    use crate::vfs::MemoryLocator;

    fn provider(clusters: &[NamedCluster]) -> HdfsFileProvider {
        let store = Arc::new(MemoryMetastore::new("test"));
        let registry = MetastoreClusterRegistry::new(NamedCluster {
            shim: Some("hdp30".to_string()),
            ..NamedCluster::default()
        });
        for c in clusters {
            registry.save(c, &store);
        }
        HdfsFileProvider::new(
            Arc::new(MemoryLocator::new(["hdp30"])),
            Arc::new(registry),
            Arc::new(StaticMetastoreLocator::new(store)),
        )
    }

    #[test]
    fn test_create_filesystem_for_registered_cluster() {
        let registered = NamedCluster {
            shim: Some("hdp30".to_string()),
            hdfs_host: "nn-a".to_string(),
            hdfs_port: "8020".to_string(),
            ..NamedCluster::new("clusterA")
        };
        let provider = provider(&[registered.clone()]);
        let name = FileName::parse("hdfs://nn-a:8020/data/x").unwrap();

        let fs = provider
            .create_filesystem(&name, &FileSystemOptions::new())
            .unwrap();
        assert_eq!(fs.cluster(), &registered);
        assert_eq!(fs.root_uri(), "hdfs://nn-a:8020/");
    }

    #[test]
    fn test_create_filesystem_for_unknown_host_uses_template() {
        let provider = provider(&[]);
        let name = FileName::parse("maprfs://m7:7222/x").unwrap();

        let fs = provider
            .create_filesystem(&name, &FileSystemOptions::new())
            .unwrap();
        assert!(fs.cluster().is_template());
        assert_eq!(fs.cluster().hdfs_host, "m7");
        assert_eq!(fs.cluster().hdfs_port, "7222");
        assert!(fs.cluster().mapr);
    }

    #[test]
    fn test_cluster_initialization_failure_is_surfaced() {
        let registered = NamedCluster {
            shim: Some("not-installed".to_string()),
            hdfs_host: "nn-b".to_string(),
            ..NamedCluster::new("clusterB")
        };
        let provider = provider(&[registered]);
        let name = FileName::parse("hdfs://nn-b/x").unwrap();

        let err = provider
            .create_filesystem(&name, &FileSystemOptions::new())
            .unwrap_err();
        match err {
            ClusterVfsError::ClusterInitialization(e) => assert_eq!(e.cluster, "clusterB"),
            other => panic!("Expected cluster initialization error, got {:?}", other),
        }
    }

    #[test]
    fn test_options_are_kept_on_filesystem() {
        let provider = provider(&[]);
        let mut options = FileSystemOptions::new();
        options.set("hdfs", "k", "v");

        let fs = provider
            .create_filesystem(&FileName::parse("hdfs://h/").unwrap(), &options)
            .unwrap();
        assert_eq!(fs.options(), &options);
    }

    #[test]
    fn test_capabilities_are_constant() {
        let provider = provider(&[]);
        let a = provider
            .create_filesystem(&FileName::parse("hdfs://a/").unwrap(), &FileSystemOptions::new())
            .unwrap();
        let b = provider
            .create_filesystem(&FileName::parse("hdfs://b/").unwrap(), &FileSystemOptions::new())
            .unwrap();

        assert!(std::ptr::eq(provider.capabilities(), provider.capabilities()));
        assert!(std::ptr::eq(a.capabilities(), b.capabilities()));
        assert_eq!(provider.capabilities(), &HDFS_CAPABILITIES);
    }

    #[test]
    fn test_authenticator_types() {
        assert_eq!(
            provider(&[]).authenticator_types(),
            &[AuthenticatorType::Username, AuthenticatorType::Password]
        );
    }
}
