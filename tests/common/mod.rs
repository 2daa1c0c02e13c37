//! Shared fixtures: a config-driven deployment wired the way the binary wires it

#![allow(dead_code)]

use std::sync::Arc;

use cluster_vfs::cluster::{MemoryMetastore, StaticMetastoreLocator};
use cluster_vfs::config::Config;
use cluster_vfs::manager::FileSystemManager;
use cluster_vfs::provider::{HdfsFileProvider, HDFS_PROVIDER_SCHEMES};
use cluster_vfs::resolver::ClusterResolver;
use cluster_vfs::vfs::MemoryLocator;

/// Two HDFS clusters sharing a host, one MapR cluster and one without a shim
pub const CLUSTERS_YAML: &str = r#"
logging:
  level: debug

metastore: integration
installed_shims: [hdp30, mapr60]

cluster_defaults:
  shim: hdp30
  hdfs_port: 8020

clusters:
  - name: clusterA
    hdfs_host: nn-a
  - name: clusterA-shadow
    hdfs_host: nn-a
  - name: maprCluster
    hdfs_host: mapr-nn
    hdfs_port: 7222
    shim: mapr60
    mapr: true
  - name: legacy
    hdfs_host: old-nn
    shim: cdh5
"#;

pub struct Deployment {
    pub config: Config,
    pub metastore: Arc<MemoryMetastore>,
    pub resolver: ClusterResolver,
    pub manager: FileSystemManager,
    pub locator: Arc<MemoryLocator>,
}

impl Deployment {
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        let config = Config::from_str(yaml)?;
        config.validate()?;

        let metastore = config.metastore();
        let metastore_locator = Arc::new(StaticMetastoreLocator::new(metastore.clone()));
        let registry = Arc::new(config.registry());
        let locator = Arc::new(MemoryLocator::new(config.installed_shims.clone()));

        let manager = FileSystemManager::new();
        manager.add_provider(
            &HDFS_PROVIDER_SCHEMES,
            Arc::new(HdfsFileProvider::new(
                locator.clone(),
                registry.clone(),
                metastore_locator.clone(),
            )),
        )?;

        Ok(Self {
            resolver: ClusterResolver::new(registry, metastore_locator),
            config,
            metastore,
            manager,
            locator,
        })
    }

    pub fn standard() -> anyhow::Result<Self> {
        Self::from_yaml(CLUSTERS_YAML)
    }
}
