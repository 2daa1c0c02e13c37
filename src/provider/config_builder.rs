//! Named-cluster options for filesystem requests

use std::sync::Arc;

use tracing::warn;

use crate::cluster::{ClusterRegistry, MetastoreLocator, NamedCluster};
use crate::vfs::FileSystemOptions;

const OPT_NAMED_CLUSTER: &str = "namedCluster";
const OPT_USERNAME: &str = "username";
const OPT_PASSWORD: &str = "password";

/// Reads and writes per-scheme named-cluster options
#[derive(Clone)]
pub struct NamedClusterConfigBuilder {
    metastore_locator: Arc<dyn MetastoreLocator>,
    registry: Arc<dyn ClusterRegistry>,
}

impl NamedClusterConfigBuilder {
    pub fn new(
        metastore_locator: Arc<dyn MetastoreLocator>,
        registry: Arc<dyn ClusterRegistry>,
    ) -> Self {
        Self {
            metastore_locator,
            registry,
        }
    }

    pub fn set_named_cluster(&self, options: &mut FileSystemOptions, scheme: &str, name: &str) {
        options.set(scheme, OPT_NAMED_CLUSTER, name);
    }

    pub fn named_cluster_name<'a>(
        &self,
        options: &'a FileSystemOptions,
        scheme: &str,
    ) -> Option<&'a str> {
        options.get(scheme, OPT_NAMED_CLUSTER)
    }

    /// The cluster named in `options`, looked up in the active metastore
    pub fn named_cluster(&self, options: &FileSystemOptions, scheme: &str) -> Option<NamedCluster> {
        let name = self.named_cluster_name(options, scheme)?;
        let metastore = self.metastore_locator.metastore()?;
        match self.registry.cluster_by_name(name, metastore.as_ref()) {
            Ok(cluster) => cluster,
            Err(e) => {
                warn!("Unable to load named cluster {:?}: {}", name, e);
                None
            }
        }
    }

    pub fn set_user_auth(
        &self,
        options: &mut FileSystemOptions,
        scheme: &str,
        username: &str,
        password: &str,
    ) {
        options.set(scheme, OPT_USERNAME, username);
        options.set(scheme, OPT_PASSWORD, password);
    }

    /// Username and password previously stored with `set_user_auth`
    pub fn user_auth<'a>(
        &self,
        options: &'a FileSystemOptions,
        scheme: &str,
    ) -> Option<(&'a str, &'a str)> {
        Some((
            options.get(scheme, OPT_USERNAME)?,
            options.get(scheme, OPT_PASSWORD)?,
        ))
    }
}
