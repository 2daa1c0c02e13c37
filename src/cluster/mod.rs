//! Named cluster model and the registry/metastore seams
//!
//! A named cluster identifies one remote filesystem deployment. Clusters are
//! persisted in a metastore (a key-value lookup service) and surfaced through
//! a [`ClusterRegistry`], which also hands out blank template clusters used
//! as the fallback when nothing configured matches a request.

pub mod metastore;
pub mod registry;

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::error::{ClusterVfsError, Result};

pub use metastore::{MemoryMetastore, MetastoreElement, StaticMetastoreLocator};
pub use registry::MetastoreClusterRegistry;

/// Default namenode port used when nothing else is configured
pub const DEFAULT_HDFS_PORT: &str = "8020";

/// One remote filesystem deployment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NamedCluster {
    /// Logical name, unique within a metastore
    pub name: String,

    /// Driver (shim) identifier, e.g. "hdp30" or "cdh61"
    pub shim: Option<String>,

    /// Storage scheme the cluster is addressed with (hdfs, maprfs, ...)
    pub storage_scheme: Option<String>,

    pub hdfs_host: String,

    /// Kept as a string; empty when the port is unknown
    pub hdfs_port: String,

    pub hdfs_username: Option<String>,

    #[serde(skip_serializing)]
    pub hdfs_password: Option<String>,

    pub job_tracker_host: Option<String>,
    pub job_tracker_port: Option<String>,
    pub zookeeper_host: Option<String>,
    pub zookeeper_port: Option<String>,
    pub oozie_url: Option<String>,

    /// MapR-FS dialect
    pub mapr: bool,
}

impl NamedCluster {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The configured shim identifier.
    ///
    /// Fails with `NoShimSpecified` when the identifier is missing or blank.
    pub fn shim_identifier(&self) -> Result<&str> {
        match self.shim.as_deref().map(str::trim) {
            Some(shim) if !shim.is_empty() => Ok(shim),
            _ => Err(ClusterVfsError::NoShimSpecified(self.name.clone())),
        }
    }

    /// Whether this cluster has no configured identity (a template)
    pub fn is_template(&self) -> bool {
        self.name.is_empty()
    }
}

/// Metastore error types
#[derive(Debug, Error)]
pub enum MetastoreError {
    #[error("Metastore is unavailable")]
    Unavailable,

    #[error("Invalid {element_type} element {id:?}: {reason}")]
    InvalidElement {
        element_type: String,
        id: String,
        reason: String,
    },
}

/// Key-value lookup service holding persisted configuration elements.
///
/// Elements are grouped by type and returned in insertion order.
pub trait Metastore: Send + Sync {
    /// Name of this metastore (for diagnostics)
    fn name(&self) -> &str;

    /// All elements of a type, in insertion order
    fn elements(&self, element_type: &str) -> std::result::Result<Vec<MetastoreElement>, MetastoreError>;

    /// Look up a single element by id
    fn element(
        &self,
        element_type: &str,
        id: &str,
    ) -> std::result::Result<Option<MetastoreElement>, MetastoreError> {
        Ok(self
            .elements(element_type)?
            .into_iter()
            .find(|element| element.id == id))
    }
}

/// Hands out the currently active metastore, if any
pub trait MetastoreLocator: Send + Sync {
    fn metastore(&self) -> Option<Arc<dyn Metastore>>;
}

/// Source of named clusters
pub trait ClusterRegistry: Send + Sync {
    /// All configured clusters, in registration order
    fn list(&self, metastore: &dyn Metastore) -> std::result::Result<Vec<NamedCluster>, MetastoreError>;

    /// A fresh blank cluster; callers may mutate it freely
    fn cluster_template(&self) -> NamedCluster;

    fn cluster_by_name(
        &self,
        name: &str,
        metastore: &dyn Metastore,
    ) -> std::result::Result<Option<NamedCluster>, MetastoreError>;

    /// First cluster whose namenode host equals `host`
    fn cluster_by_host(
        &self,
        host: &str,
        metastore: &dyn Metastore,
    ) -> std::result::Result<Option<NamedCluster>, MetastoreError> {
        Ok(self
            .list(metastore)?
            .into_iter()
            .find(|cluster| cluster.hdfs_host == host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shim_identifier_present() {
        let cluster = NamedCluster {
            shim: Some("hdp30".to_string()),
            ..NamedCluster::new("clusterA")
        };
        assert_eq!(cluster.shim_identifier().unwrap(), "hdp30");
    }

    #[test]
    fn test_shim_identifier_missing_or_blank() {
        let mut cluster = NamedCluster::new("clusterA");
        assert!(matches!(
            cluster.shim_identifier(),
            Err(ClusterVfsError::NoShimSpecified(name)) if name == "clusterA"
        ));

        cluster.shim = Some("   ".to_string());
        assert!(cluster.shim_identifier().is_err());
    }

    #[test]
    fn test_template_has_no_name() {
        assert!(NamedCluster::default().is_template());
        assert!(!NamedCluster::new("x").is_template());
    }
}
