//! Cluster registry backed by metastore elements
//!
//! Each named cluster is stored as one element of type [`NAMED_CLUSTER_ELEMENT_TYPE`]
//! whose id is the cluster name.

use super::{ClusterRegistry, Metastore, MetastoreElement, MetastoreError, NamedCluster};

/// Metastore element type holding named clusters
pub const NAMED_CLUSTER_ELEMENT_TYPE: &str = "NamedCluster";

const ATTR_SHIM: &str = "shimIdentifier";
const ATTR_STORAGE_SCHEME: &str = "storageScheme";
const ATTR_HDFS_HOST: &str = "hdfsHost";
const ATTR_HDFS_PORT: &str = "hdfsPort";
const ATTR_HDFS_USERNAME: &str = "hdfsUsername";
const ATTR_HDFS_PASSWORD: &str = "hdfsPassword";
const ATTR_JOB_TRACKER_HOST: &str = "jobTrackerHost";
const ATTR_JOB_TRACKER_PORT: &str = "jobTrackerPort";
const ATTR_ZOOKEEPER_HOST: &str = "zooKeeperHost";
const ATTR_ZOOKEEPER_PORT: &str = "zooKeeperPort";
const ATTR_OOZIE_URL: &str = "oozieUrl";
const ATTR_MAPR: &str = "isMapr";

/// Registry reading named clusters out of a metastore
pub struct MetastoreClusterRegistry {
    template: NamedCluster,
}

impl MetastoreClusterRegistry {
    /// Create a registry whose templates are clones of `template`.
    ///
    /// The template's name is always cleared.
    pub fn new(template: NamedCluster) -> Self {
        Self {
            template: NamedCluster {
                name: String::new(),
                ..template
            },
        }
    }

    /// Persist a cluster, replacing any cluster with the same name
    pub fn save(&self, cluster: &NamedCluster, metastore: &super::MemoryMetastore) {
        metastore.put(NAMED_CLUSTER_ELEMENT_TYPE, to_element(cluster));
    }
}

impl Default for MetastoreClusterRegistry {
    fn default() -> Self {
        Self::new(NamedCluster {
            hdfs_port: super::DEFAULT_HDFS_PORT.to_string(),
            ..NamedCluster::default()
        })
    }
}

impl ClusterRegistry for MetastoreClusterRegistry {
    fn list(&self, metastore: &dyn Metastore) -> Result<Vec<NamedCluster>, MetastoreError> {
        metastore
            .elements(NAMED_CLUSTER_ELEMENT_TYPE)?
            .iter()
            .map(from_element)
            .collect()
    }

    fn cluster_template(&self) -> NamedCluster {
        self.template.clone()
    }

    fn cluster_by_name(
        &self,
        name: &str,
        metastore: &dyn Metastore,
    ) -> Result<Option<NamedCluster>, MetastoreError> {
        metastore
            .element(NAMED_CLUSTER_ELEMENT_TYPE, name)?
            .as_ref()
            .map(from_element)
            .transpose()
    }
}

/// Convert a cluster into its metastore representation
pub fn to_element(cluster: &NamedCluster) -> MetastoreElement {
    let mut element = MetastoreElement::new(cluster.name.clone())
        .with(ATTR_HDFS_HOST, cluster.hdfs_host.clone())
        .with(ATTR_HDFS_PORT, cluster.hdfs_port.clone())
        .with(ATTR_MAPR, cluster.mapr.to_string());

    let optional = [
        (ATTR_SHIM, &cluster.shim),
        (ATTR_STORAGE_SCHEME, &cluster.storage_scheme),
        (ATTR_HDFS_USERNAME, &cluster.hdfs_username),
        (ATTR_HDFS_PASSWORD, &cluster.hdfs_password),
        (ATTR_JOB_TRACKER_HOST, &cluster.job_tracker_host),
        (ATTR_JOB_TRACKER_PORT, &cluster.job_tracker_port),
        (ATTR_ZOOKEEPER_HOST, &cluster.zookeeper_host),
        (ATTR_ZOOKEEPER_PORT, &cluster.zookeeper_port),
        (ATTR_OOZIE_URL, &cluster.oozie_url),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            element.attributes.insert(key.to_string(), value.clone());
        }
    }
    element
}

/// Rebuild a cluster from its metastore representation
pub fn from_element(element: &MetastoreElement) -> Result<NamedCluster, MetastoreError> {
    let invalid = |reason: String| MetastoreError::InvalidElement {
        element_type: NAMED_CLUSTER_ELEMENT_TYPE.to_string(),
        id: element.id.clone(),
        reason,
    };

    if element.id.trim().is_empty() {
        return Err(invalid("cluster name is empty".to_string()));
    }

    let mapr = match element.get(ATTR_MAPR) {
        None => false,
        Some(value) => value
            .parse::<bool>()
            .map_err(|_| invalid(format!("{} is not a boolean: {:?}", ATTR_MAPR, value)))?,
    };

    let owned = |key: &str| element.get(key).map(str::to_string);

    Ok(NamedCluster {
        name: element.id.clone(),
        shim: owned(ATTR_SHIM),
        storage_scheme: owned(ATTR_STORAGE_SCHEME),
        hdfs_host: owned(ATTR_HDFS_HOST).unwrap_or_default(),
        hdfs_port: owned(ATTR_HDFS_PORT).unwrap_or_default(),
        hdfs_username: owned(ATTR_HDFS_USERNAME),
        hdfs_password: owned(ATTR_HDFS_PASSWORD),
        job_tracker_host: owned(ATTR_JOB_TRACKER_HOST),
        job_tracker_port: owned(ATTR_JOB_TRACKER_PORT),
        zookeeper_host: owned(ATTR_ZOOKEEPER_HOST),
        zookeeper_port: owned(ATTR_ZOOKEEPER_PORT),
        oozie_url: owned(ATTR_OOZIE_URL),
        mapr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::MemoryMetastore;

    fn cluster(name: &str, host: &str) -> NamedCluster {
        NamedCluster {
            shim: Some("hdp30".to_string()),
            hdfs_host: host.to_string(),
            hdfs_port: "8020".to_string(),
            ..NamedCluster::new(name)
        }
    }

    #[test]
    fn test_element_conversion_keeps_all_fields() {
        let original = NamedCluster {
            storage_scheme: Some("hdfs".to_string()),
            hdfs_username: Some("etl".to_string()),
            hdfs_password: Some("secret".to_string()),
            job_tracker_host: Some("jt".to_string()),
            job_tracker_port: Some("8032".to_string()),
            zookeeper_host: Some("zk".to_string()),
            zookeeper_port: Some("2181".to_string()),
            oozie_url: Some("http://oozie:11000/oozie".to_string()),
            mapr: true,
            ..cluster("clusterA", "namenode-a")
        };

        let element = to_element(&original);
        assert_eq!(element.id, "clusterA");
        assert_eq!(element.get("isMapr"), Some("true"));
        assert_eq!(from_element(&element).unwrap(), original);
    }

    #[test]
    fn test_invalid_mapr_flag_rejected() {
        let element = MetastoreElement::new("bad").with("isMapr", "maybe");
        let err = from_element(&element).unwrap_err();
        assert!(err.to_string().contains("isMapr"), "{}", err);
    }

    #[test]
    fn test_list_in_registration_order() {
        let store = MemoryMetastore::new("local");
        let registry = MetastoreClusterRegistry::default();
        registry.save(&cluster("second", "h2"), &store);
        registry.save(&cluster("first", "h1"), &store);

        let names: Vec<_> = registry
            .list(&store)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["second", "first"]);
    }

    #[test]
    fn test_lookup_by_name_and_host() {
        let store = MemoryMetastore::new("local");
        let registry = MetastoreClusterRegistry::default();
        registry.save(&cluster("a", "shared-host"), &store);
        registry.save(&cluster("b", "shared-host"), &store);

        let by_name = registry.cluster_by_name("b", &store).unwrap().unwrap();
        assert_eq!(by_name.name, "b");
        assert!(registry.cluster_by_name("zzz", &store).unwrap().is_none());

        // First registered wins when hosts collide
        let by_host = registry.cluster_by_host("shared-host", &store).unwrap().unwrap();
        assert_eq!(by_host.name, "a");
        assert!(registry.cluster_by_host("other", &store).unwrap().is_none());
    }

    #[test]
    fn test_template_is_fresh_and_unnamed() {
        let registry = MetastoreClusterRegistry::new(cluster("ignored", "template-host"));

        let mut first = registry.cluster_template();
        assert!(first.is_template());
        assert_eq!(first.shim.as_deref(), Some("hdp30"));

        first.hdfs_host = "mutated".to_string();
        assert_eq!(registry.cluster_template().hdfs_host, "template-host");
    }

    #[test]
    fn test_default_template_port() {
        let registry = MetastoreClusterRegistry::default();
        assert_eq!(registry.cluster_template().hdfs_port, "8020");
    }
}
