//! Runs registered runtime tests in dependency order

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{info, warn};

use super::{RuntimeTest, RuntimeTestEntrySeverity, RuntimeTestResultEntry, RuntimeTestResultSummary};

/// Runtime test runner
#[derive(Default)]
pub struct RuntimeTester {
    tests: Vec<Arc<dyn RuntimeTest>>,
}

impl RuntimeTester {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, test: Arc<dyn RuntimeTest>) {
        self.tests.push(test);
    }

    pub fn tests(&self) -> &[Arc<dyn RuntimeTest>] {
        &self.tests
    }

    /// Run every test that accepts `object`.
    ///
    /// Tests run once all of their dependencies have run. A test whose
    /// dependency did not pass, or is not registered, is reported as skipped.
    /// Results are returned in execution order.
    pub fn run_all(&self, object: &dyn Any) -> Vec<(String, RuntimeTestResultSummary)> {
        let applicable: Vec<&Arc<dyn RuntimeTest>> =
            self.tests.iter().filter(|t| t.accepts(object)).collect();

        let mut outcomes: HashMap<String, bool> = HashMap::new();
        let mut results = Vec::with_capacity(applicable.len());
        let mut pending = applicable;

        while !pending.is_empty() {
            let mut progressed = false;
            let mut still_pending = Vec::new();

            for test in pending {
                let deps = test.dependencies();
                if !deps.iter().all(|d| outcomes.contains_key(d)) {
                    still_pending.push(test);
                    continue;
                }
                progressed = true;

                let failed: Vec<&String> =
                    deps.iter().filter(|d| !outcomes[d.as_str()]).collect();
                let summary = if failed.is_empty() {
                    info!("Running runtime test {} ({})", test.id(), test.module());
                    test.run(object)
                } else {
                    Self::skipped(test.name(), &failed)
                };

                let passed = summary.max_severity().is_passing();
                if !passed {
                    warn!(
                        "Runtime test {} finished with {}: {}",
                        test.id(),
                        summary.max_severity(),
                        summary.overall.message
                    );
                }
                outcomes.insert(test.id().to_string(), passed);
                results.push((test.id().to_string(), summary));
            }

            if !progressed {
                // Skip tests waiting on ids that will never run, then retry
                let waiting: HashSet<String> =
                    still_pending.iter().map(|t| t.id().to_string()).collect();
                let (mut blocked, mut rest): (Vec<_>, Vec<_>) =
                    still_pending.into_iter().partition(|t| {
                        t.dependencies()
                            .iter()
                            .any(|d| !outcomes.contains_key(d) && !waiting.contains(d))
                    });
                if blocked.is_empty() {
                    // Dependency cycle
                    std::mem::swap(&mut blocked, &mut rest);
                }

                for test in blocked {
                    let missing: Vec<&String> = test
                        .dependencies()
                        .iter()
                        .filter(|d| !outcomes.contains_key(d.as_str()))
                        .collect();
                    warn!("Runtime test {} has unresolvable dependencies", test.id());
                    results.push((test.id().to_string(), Self::skipped(test.name(), &missing)));
                    outcomes.insert(test.id().to_string(), false);
                }
                pending = rest;
                continue;
            }
            pending = still_pending;
        }

        results
    }

    fn skipped(name: &str, blocking: &[&String]) -> RuntimeTestResultSummary {
        let mut blocking: Vec<&str> = blocking.iter().map(|s| s.as_str()).collect();
        blocking.sort_unstable();
        RuntimeTestResultSummary::new(RuntimeTestResultEntry::new(
            RuntimeTestEntrySeverity::Skipped,
            format!("{} was skipped", name),
            format!("Required tests did not pass: {}", blocking.join(", ")),
        ))
    }
}
