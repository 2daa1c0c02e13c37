//! Named cluster resolution
//!
//! Maps a resource URI to the named cluster that owns it:
//!
//! - `hc://<name>/...` looks the cluster up by its logical name.
//! - any other scheme looks the cluster up by namenode host.
//! - when nothing matches, a template cluster is returned instead. For host
//!   lookups the template is populated with the requested host and port, and
//!   flagged as MapR when the scheme is `maprfs`.
//!
//! Resolution never fails. Malformed URIs and metastore failures are logged
//! and degrade to the template.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cluster::{ClusterRegistry, Metastore, MetastoreError, MetastoreLocator, NamedCluster};
use crate::vfs::FileName;

/// Scheme addressing a cluster by logical name rather than host
pub const NAMED_CLUSTER_SCHEME: &str = "hc";
/// Native HDFS scheme
pub const HDFS_SCHEME: &str = "hdfs";
/// MapR-FS dialect scheme
pub const MAPRFS_SCHEME: &str = "maprfs";

/// Resolves URIs to named clusters using a registry and the active metastore
#[derive(Clone)]
pub struct ClusterResolver {
    registry: Arc<dyn ClusterRegistry>,
    metastore_locator: Arc<dyn MetastoreLocator>,
}

impl ClusterResolver {
    pub fn new(
        registry: Arc<dyn ClusterRegistry>,
        metastore_locator: Arc<dyn MetastoreLocator>,
    ) -> Self {
        Self {
            registry,
            metastore_locator,
        }
    }

    pub fn registry(&self) -> &Arc<dyn ClusterRegistry> {
        &self.registry
    }

    /// Resolve the cluster owning `uri`. Always returns a cluster.
    pub fn resolve(&self, uri: &str) -> NamedCluster {
        let name = match FileName::parse(uri) {
            Ok(name) => name,
            Err(e) => {
                warn!("Unable to parse {:?}, resolving without scheme or host: {}", uri, e);
                FileName::default()
            }
        };

        let Some(host) = name.host.as_deref() else {
            debug!("No host in {:?}, using cluster template", uri);
            return self.registry.cluster_template();
        };

        if name.scheme == NAMED_CLUSTER_SCHEME {
            return self
                .lookup(|registry, metastore| registry.cluster_by_name(host, metastore))
                .unwrap_or_else(|| {
                    debug!("No named cluster called {:?}, using cluster template", host);
                    self.registry.cluster_template()
                });
        }

        self.lookup(|registry, metastore| registry.cluster_by_host(host, metastore))
            .unwrap_or_else(|| self.template_for(host, name.port_or_zero(), &name.scheme))
    }

    /// Resolve by namenode host.
    ///
    /// Returns the first registered cluster whose host equals `host`, or a
    /// template populated from the request. An empty host never matches.
    pub fn resolve_host(&self, host: &str, port: u16, scheme: &str) -> NamedCluster {
        if host.is_empty() {
            return self.template_for(host, port, scheme);
        }
        self.all_clusters()
            .into_iter()
            .find(|cluster| cluster.hdfs_host == host)
            .unwrap_or_else(|| self.template_for(host, port, scheme))
    }

    /// Every registered cluster; empty when the metastore can't be read
    pub fn all_clusters(&self) -> Vec<NamedCluster> {
        self.lookup(|registry, metastore| registry.list(metastore).map(Some))
            .unwrap_or_default()
    }

    fn template_for(&self, host: &str, port: u16, scheme: &str) -> NamedCluster {
        debug!(
            "No named cluster for host {:?}, using template (scheme {:?})",
            host, scheme
        );
        let mut cluster = self.registry.cluster_template();
        cluster.hdfs_host = host.to_string();
        cluster.hdfs_port = if port > 0 {
            port.to_string()
        } else {
            String::new()
        };
        cluster.mapr = scheme == MAPRFS_SCHEME;
        cluster
    }

    /// Run a registry lookup against the active metastore, logging failures
    fn lookup<T, F>(&self, f: F) -> Option<T>
    where
        F: FnOnce(&dyn ClusterRegistry, &dyn Metastore) -> Result<Option<T>, MetastoreError>,
    {
        let Some(metastore) = self.metastore_locator.metastore() else {
            warn!("{}", MetastoreError::Unavailable);
            return None;
        };
        match f(self.registry.as_ref(), metastore.as_ref()) {
            Ok(found) => found,
            Err(e) => {
                warn!("Named cluster lookup in metastore {:?} failed: {}", metastore.name(), e);
                None
            }
        }
    }
}
