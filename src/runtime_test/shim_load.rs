//! Checks that a named cluster's shim can be loaded

use std::any::Any;
use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use super::{
    DocAnchor, RuntimeTest, RuntimeTestEntrySeverity, RuntimeTestInfo, RuntimeTestResultEntry,
    RuntimeTestResultSummary,
};
use crate::cluster::NamedCluster;

pub const HADOOP_CONFIGURATION_MODULE: &str = "Hadoop Configuration";
pub const HADOOP_CONFIGURATION_TEST_SHIM_LOAD: &str = "hadoopConfigurationTestShimLoad";
const TEST_SHIM_LOAD_NAME: &str = "Hadoop Configuration Shim Load Test";
const NO_SHIM_SPECIFIED_DESC: &str = "No shim specified";
const UNABLE_TO_LOAD_SHIM_DESC: &str = "Unable to load the shim";

#[derive(Debug, Error)]
#[error("Shim load test expects a named cluster")]
struct NotANamedCluster;

/// Reads back a cluster's shim identifier and reports whether it loaded
pub struct ShimLoadTest {
    info: RuntimeTestInfo,
}

impl Default for ShimLoadTest {
    fn default() -> Self {
        Self::new()
    }
}

impl ShimLoadTest {
    pub fn new() -> Self {
        Self {
            info: RuntimeTestInfo {
                id: HADOOP_CONFIGURATION_TEST_SHIM_LOAD,
                module: HADOOP_CONFIGURATION_MODULE,
                name: TEST_SHIM_LOAD_NAME,
                supported: true,
                dependencies: HashSet::new(),
            },
        }
    }

    fn error(description: &str, error: &dyn std::error::Error) -> RuntimeTestResultSummary {
        RuntimeTestResultSummary::new(
            RuntimeTestResultEntry::new(RuntimeTestEntrySeverity::Error, description, error.to_string())
                .with_exception(error)
                .with_doc_anchor(DocAnchor::ShimLoad),
        )
    }
}

impl RuntimeTest for ShimLoadTest {
    fn info(&self) -> &RuntimeTestInfo {
        &self.info
    }

    fn run(&self, object: &dyn Any) -> RuntimeTestResultSummary {
        let Some(cluster) = object.downcast_ref::<NamedCluster>() else {
            return Self::error(UNABLE_TO_LOAD_SHIM_DESC, &NotANamedCluster);
        };

        match cluster.shim_identifier() {
            Ok(shim) => {
                debug!("Shim {} loaded for named cluster {:?}", shim, cluster.name);
                RuntimeTestResultSummary::new(
                    RuntimeTestResultEntry::new(
                        RuntimeTestEntrySeverity::Info,
                        format!("Successfully loaded the {} shim.", shim),
                        format!("The {} shim was loaded for cluster {}.", shim, cluster.name),
                    )
                    .with_doc_anchor(DocAnchor::ShimLoad),
                )
            }
            Err(e) => Self::error(NO_SHIM_SPECIFIED_DESC, &e),
        }
    }
}
