//! Configuration parsing and structures

use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;

use crate::cluster::{MemoryMetastore, MetastoreClusterRegistry, NamedCluster, DEFAULT_HDFS_PORT};
use crate::env::substitute_env_vars;

// =============================================================================
// Raw Config (Deserialized from YAML)
// =============================================================================

/// Raw configuration as deserialized from YAML.
/// This is converted to `Config` via `resolve()`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Name of the metastore holding the clusters
    #[serde(default = "default_metastore_name")]
    pub metastore: String,

    /// Shims available to this process
    #[serde(default)]
    pub installed_shims: Vec<String>,

    /// Values every cluster inherits; also the template for unknown hosts
    #[serde(default)]
    pub cluster_defaults: ClusterDefaults,

    /// Named clusters, in registration order
    #[serde(default)]
    pub clusters: Vec<RawClusterConfig>,
}

fn default_metastore_name() -> String {
    "local".to_string()
}

/// Ports may be written as numbers or strings
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PortValue {
    Number(u32),
    Text(String),
}

impl PortValue {
    fn into_string(self) -> String {
        match self {
            PortValue::Number(n) => n.to_string(),
            PortValue::Text(s) => s.trim().to_string(),
        }
    }
}

/// Cluster defaults section
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ClusterDefaults {
    pub shim: Option<String>,
    pub storage_scheme: Option<String>,
    pub hdfs_port: Option<PortValue>,
    pub hdfs_username: Option<String>,
    pub hdfs_password: Option<String>,
    #[serde(default)]
    pub mapr: bool,
}

/// Raw cluster configuration before resolution
/// All fields except `name` are optional - missing values inherit from defaults
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawClusterConfig {
    pub name: String,
    pub shim: Option<String>,
    pub storage_scheme: Option<String>,
    pub hdfs_host: Option<String>,
    pub hdfs_port: Option<PortValue>,
    pub hdfs_username: Option<String>,
    pub hdfs_password: Option<String>,
    pub job_tracker_host: Option<String>,
    pub job_tracker_port: Option<PortValue>,
    pub zookeeper_host: Option<String>,
    pub zookeeper_port: Option<PortValue>,
    pub oozie_url: Option<String>,
    pub mapr: Option<bool>,
}

// =============================================================================
// Resolved Config (Ready for use)
// =============================================================================

/// Top-level configuration (resolved from RawConfig)
#[derive(Debug, Clone)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    pub metastore: String,

    pub installed_shims: Vec<String>,

    /// Template handed out when no cluster matches
    pub template: NamedCluster,

    /// Named clusters (fully resolved)
    pub clusters: Vec<NamedCluster>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// =============================================================================
// Resolution Logic
// =============================================================================

impl RawConfig {
    /// Resolve raw config into final config by merging cluster overrides with defaults
    pub fn resolve(self) -> Result<Config, ConfigError> {
        let RawConfig {
            logging,
            metastore,
            installed_shims,
            cluster_defaults,
            clusters,
        } = self;

        let template = Self::resolve_template(&cluster_defaults)?;

        let mut resolved_clusters = Vec::with_capacity(clusters.len());
        for raw_cluster in clusters {
            resolved_clusters.push(Self::resolve_cluster(&cluster_defaults, raw_cluster)?);
        }

        Ok(Config {
            logging,
            metastore,
            installed_shims,
            template,
            clusters: resolved_clusters,
        })
    }

    fn resolve_template(defaults: &ClusterDefaults) -> Result<NamedCluster, ConfigError> {
        Ok(NamedCluster {
            shim: defaults.shim.clone(),
            storage_scheme: defaults.storage_scheme.clone(),
            hdfs_port: defaults
                .hdfs_port
                .clone()
                .map(PortValue::into_string)
                .unwrap_or_else(|| DEFAULT_HDFS_PORT.to_string()),
            hdfs_username: Self::substitute(defaults.hdfs_username.clone())?,
            hdfs_password: Self::substitute(defaults.hdfs_password.clone())?,
            mapr: defaults.mapr,
            ..NamedCluster::default()
        })
    }

    fn resolve_cluster(
        defaults: &ClusterDefaults,
        raw: RawClusterConfig,
    ) -> Result<NamedCluster, ConfigError> {
        // Cluster values override defaults
        let hdfs_username = raw
            .hdfs_username
            .or_else(|| defaults.hdfs_username.clone());
        let hdfs_password = raw
            .hdfs_password
            .or_else(|| defaults.hdfs_password.clone());

        Ok(NamedCluster {
            name: raw.name.trim().to_string(),
            shim: raw.shim.or_else(|| defaults.shim.clone()),
            storage_scheme: raw
                .storage_scheme
                .or_else(|| defaults.storage_scheme.clone()),
            hdfs_host: raw.hdfs_host.unwrap_or_default().trim().to_string(),
            hdfs_port: raw
                .hdfs_port
                .or_else(|| defaults.hdfs_port.clone())
                .map(PortValue::into_string)
                .unwrap_or_else(|| DEFAULT_HDFS_PORT.to_string()),
            hdfs_username: Self::substitute(hdfs_username)?,
            hdfs_password: Self::substitute(hdfs_password)?,
            job_tracker_host: raw.job_tracker_host,
            job_tracker_port: raw.job_tracker_port.map(PortValue::into_string),
            zookeeper_host: raw.zookeeper_host,
            zookeeper_port: raw.zookeeper_port.map(PortValue::into_string),
            oozie_url: raw.oozie_url,
            mapr: raw.mapr.unwrap_or(defaults.mapr),
        })
    }

    fn substitute(value: Option<String>) -> Result<Option<String>, ConfigError> {
        value.map(|v| substitute_env_vars(&v)).transpose()
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.clone(), e.to_string()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a YAML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        raw.resolve()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Check for blank and duplicate cluster names
        let mut names = std::collections::HashSet::new();
        for cluster in &self.clusters {
            if cluster.name.is_empty() {
                return Err(ConfigError::ValidationError(
                    "Named cluster name cannot be empty".to_string(),
                ));
            }
            if !names.insert(cluster.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "Duplicate named cluster: {:?}",
                    cluster.name
                )));
            }
        }

        for cluster in self.clusters.iter().chain(std::iter::once(&self.template)) {
            if !cluster.hdfs_port.is_empty() && cluster.hdfs_port.parse::<u16>().is_err() {
                return Err(ConfigError::ValidationError(format!(
                    "Named cluster {:?}: invalid hdfs_port {:?}",
                    cluster.name, cluster.hdfs_port
                )));
            }
        }

        Ok(())
    }

    /// Registry handing out this config's template
    pub fn registry(&self) -> MetastoreClusterRegistry {
        MetastoreClusterRegistry::new(self.template.clone())
    }

    /// In-memory metastore holding every configured cluster
    pub fn metastore(&self) -> Arc<MemoryMetastore> {
        let metastore = Arc::new(MemoryMetastore::new(self.metastore.clone()));
        let registry = self.registry();
        for cluster in &self.clusters {
            registry.save(cluster, &metastore);
        }
        metastore
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(PathBuf, String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}
