//! Runtime tests run against live objects (usually a named cluster)
//!
//! A runtime test declares an id, the module it belongs to, a display name
//! and the ids of the tests it depends on. Running it never fails: problems
//! are reported as entries in a [`RuntimeTestResultSummary`].

pub mod shim_load;
pub mod tester;

use std::any::Any;
use std::collections::HashSet;
use std::fmt;

pub use shim_load::ShimLoadTest;
pub use tester::RuntimeTester;

/// Severity of a result entry, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuntimeTestEntrySeverity {
    Debug,
    Info,
    Warning,
    Skipped,
    Error,
    Fatal,
}

impl RuntimeTestEntrySeverity {
    /// Whether dependents may run after a result with this severity
    pub fn is_passing(self) -> bool {
        self < RuntimeTestEntrySeverity::Skipped
    }
}

impl fmt::Display for RuntimeTestEntrySeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RuntimeTestEntrySeverity::Debug => "DEBUG",
            RuntimeTestEntrySeverity::Info => "INFO",
            RuntimeTestEntrySeverity::Warning => "WARNING",
            RuntimeTestEntrySeverity::Skipped => "SKIPPED",
            RuntimeTestEntrySeverity::Error => "ERROR",
            RuntimeTestEntrySeverity::Fatal => "FATAL",
        };
        f.write_str(s)
    }
}

/// Troubleshooting guide section a result points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocAnchor {
    ShimLoad,
}

impl DocAnchor {
    pub fn anchor(self) -> &'static str {
        match self {
            DocAnchor::ShimLoad => "shim-load",
        }
    }
}

/// One reported finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeTestResultEntry {
    pub severity: RuntimeTestEntrySeverity,
    pub description: String,
    pub message: String,
    /// Captured failure detail, if the entry came from an error
    pub exception: Option<String>,
    pub doc_anchor: Option<DocAnchor>,
}

impl RuntimeTestResultEntry {
    pub fn new(
        severity: RuntimeTestEntrySeverity,
        description: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            description: description.into(),
            message: message.into(),
            exception: None,
            doc_anchor: None,
        }
    }

    /// Attach the failure that produced this entry
    pub fn with_exception(mut self, error: &dyn std::error::Error) -> Self {
        let mut detail = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            detail.push_str("\nCaused by: ");
            detail.push_str(&cause.to_string());
            source = cause.source();
        }
        self.exception = Some(detail);
        self
    }

    pub fn with_doc_anchor(mut self, anchor: DocAnchor) -> Self {
        self.doc_anchor = Some(anchor);
        self
    }
}

/// Outcome of one test run: an overall entry plus optional detail entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeTestResultSummary {
    pub overall: RuntimeTestResultEntry,
    pub entries: Vec<RuntimeTestResultEntry>,
}

impl RuntimeTestResultSummary {
    pub fn new(overall: RuntimeTestResultEntry) -> Self {
        Self {
            overall,
            entries: Vec::new(),
        }
    }

    /// Worst severity across the overall entry and all detail entries
    pub fn max_severity(&self) -> RuntimeTestEntrySeverity {
        self.entries
            .iter()
            .map(|e| e.severity)
            .fold(self.overall.severity, Ord::max)
    }
}

/// Registration metadata shared by runtime tests
#[derive(Debug, Clone)]
pub struct RuntimeTestInfo {
    pub id: &'static str,
    pub module: &'static str,
    pub name: &'static str,
    pub supported: bool,
    pub dependencies: HashSet<String>,
}

/// A pluggable test run against a live object
pub trait RuntimeTest: Send + Sync {
    fn info(&self) -> &RuntimeTestInfo;

    fn id(&self) -> &str {
        self.info().id
    }

    fn module(&self) -> &str {
        self.info().module
    }

    fn name(&self) -> &str {
        self.info().name
    }

    /// Whether this test applies to `object`
    fn accepts(&self, _object: &dyn Any) -> bool {
        self.info().supported
    }

    /// Ids of tests that must pass before this one runs
    fn dependencies(&self) -> &HashSet<String> {
        &self.info().dependencies
    }

    /// Run the test. Failures are reported in the summary, never raised.
    fn run(&self, object: &dyn Any) -> RuntimeTestResultSummary;
}
