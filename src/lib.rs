//! cluster-vfs: address several Hadoop-compatible clusters through ordinary URIs
//!
//! A URI's scheme and host are resolved to a configured named cluster, and a
//! filesystem provider hands out a virtual filesystem bound to that cluster.
//!
//! # Architecture
//!
//! - **Cluster registry**: named clusters persisted in a metastore, plus a
//!   blank template used when nothing matches.
//! - **Resolver**: maps `hc://name/...` by name and any other scheme by host,
//!   always falling back to the template.
//! - **Provider**: resolves the owning cluster, asks a `FileSystemLocator`
//!   for a live handle and wraps it in a capability-checked `ClusterFileSystem`.
//! - **Manager**: routes URIs to the provider registered for their scheme.
//! - **Runtime tests**: pluggable checks (such as the shim load test) run
//!   against a named cluster in dependency order.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use cluster_vfs::cluster::StaticMetastoreLocator;
//! use cluster_vfs::config::Config;
//! use cluster_vfs::manager::FileSystemManager;
//! use cluster_vfs::provider::{HdfsFileProvider, HDFS_PROVIDER_SCHEMES};
//! use cluster_vfs::vfs::{FileSystemOptions, MemoryLocator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_file(&"clusters.yaml".into())?;
//! let metastore = Arc::new(StaticMetastoreLocator::new(config.metastore()));
//! let provider = HdfsFileProvider::new(
//!     Arc::new(MemoryLocator::new(config.installed_shims.clone())),
//!     Arc::new(config.registry()),
//!     metastore,
//! );
//!
//! let manager = FileSystemManager::new();
//! manager.add_provider(&HDFS_PROVIDER_SCHEMES, Arc::new(provider))?;
//!
//! let (fs, name) = manager.resolve("hdfs://namenode:8020/data", &FileSystemOptions::new())?;
//! let children = fs.list_children(&name.path).await?;
//! # Ok(())
//! # }
//! ```

pub mod cluster;
pub mod config;
pub mod env;
pub mod error;
pub mod manager;
pub mod provider;
pub mod resolver;
pub mod runtime_test;
pub mod vfs;

pub use error::{ClusterVfsError, Result};
