//! Test execution runner
//!
//! Owns the registry and the collaborators of a run and drives the
//! `setup -> run_tests -> finish` lifecycle.

use chrono::Utc;
use tracing::{info, warn};

use super::driver::{report_through, Driver, RunnerError, SubtestLevel};
use crate::collab::{ErrorQueue, ErrorStack, LeakDetector, NoLeakCheck};
use crate::config::RunnerConfig;
use crate::models::{CaseReport, Outcome, RunOutcome, RunSummary, TestKind};
use crate::ordering::permutation;
use crate::output::{OutputSink, StdSink};
use crate::registry::{Registry, RegistryError};

/// Test runner
///
/// Tests run one at a time, in registration order or, when a seed is
/// configured, in a seeded random order.
pub struct TestRunner {
    config: RunnerConfig,
    registry: Registry,
    driver: Driver,
    leaks: Box<dyn LeakDetector>,
    leak_check_armed: bool,
    leak_detected: bool,
    results: Vec<CaseReport>,
}

impl TestRunner {
    /// Create a runner writing to the process stdout/stderr
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            registry: Registry::with_capacity(config.capacity),
            driver: Driver::new(Box::new(StdSink::new()), Box::new(ErrorStack::new())),
            leaks: Box::new(NoLeakCheck),
            leak_check_armed: false,
            leak_detected: false,
            results: Vec::new(),
            config,
        }
    }

    /// Set the report sink
    pub fn with_sink(mut self, sink: impl OutputSink + 'static) -> Self {
        self.driver.sink = Box::new(sink);
        self
    }

    /// Set the error queue settled after every test
    pub fn with_error_queue(mut self, errors: impl ErrorQueue + 'static) -> Self {
        self.driver.errors = Box::new(errors);
        self
    }

    /// Set the leak detector consulted at the end of the run
    pub fn with_leak_detector(mut self, detector: impl LeakDetector + 'static) -> Self {
        self.leaks = Box::new(detector);
        self
    }

    /// Register a test invoked once
    pub fn register<F, O>(&mut self, name: impl Into<String>, func: F) -> Result<(), RegistryError>
    where
        F: FnMut() -> O + 'static,
        O: Into<Outcome>,
    {
        self.registry.register(name, func)
    }

    /// Register a test invoked `count` times with indices in `[0, count)`
    pub fn register_parameterized<F, O>(
        &mut self,
        name: impl Into<String>,
        func: F,
        count: usize,
        subtest: bool,
    ) -> Result<(), RegistryError>
    where
        F: FnMut(usize) -> O + 'static,
        O: Into<Outcome>,
    {
        self.registry
            .register_parameterized(name, func, count, subtest)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Handle to the indentation of the line currently being reported
    ///
    /// Test functions can clone it to indent their own diagnostics.
    pub fn subtest_level(&self) -> SubtestLevel {
        self.driver.state.level.clone()
    }

    /// Seed in effect; 0 when ordering is deterministic
    pub fn seed(&self) -> i64 {
        self.driver.state.seed
    }

    /// Open the sink, pick the seed, and arm leak checking
    pub fn setup(&mut self) -> Result<(), RunnerError> {
        self.driver.sink.open()?;

        let mut seed = 0;
        if let Some(requested) = self.config.seed {
            seed = if requested <= 0 { time_seed() } else { requested };
        }
        self.driver.state.reset(self.config.base_level(), seed);
        self.results.clear();
        self.leak_detected = false;

        if seed != 0 {
            self.driver.line(format_args!("# RAND SEED {seed}"))?;
            self.driver.sink.flush_stdout()?;
        }

        self.leak_check_armed = self.config.leak_check;
        if self.leak_check_armed {
            self.leaks.arm();
        }
        Ok(())
    }

    /// Run every registered test and report the combined outcome
    pub fn run_tests(&mut self, program: &str) -> Result<RunOutcome, RunnerError> {
        let num_tests = self.registry.len();

        if num_tests == 0 {
            self.driver
                .line(format_args!("1..0 # Skipped: {program}"))?;
        } else {
            if self.driver.state.level.get() > 0 {
                self.driver.line(format_args!("# Subtest: {program}"))?;
            }
            self.driver.line(format_args!("1..{num_tests}"))?;
        }
        self.driver.sink.flush_stdout()?;

        info!(
            "Running {} tests ({} cases) from {}",
            num_tests,
            self.registry.num_test_cases(),
            program
        );

        let state = &mut self.driver.state;
        let order = permutation(num_tests, state.seed, &mut state.rng);

        for (position, index) in order.into_iter().enumerate() {
            let number = position + 1;
            let Some(descriptor) = self.registry.get_mut(index) else {
                continue;
            };
            let report = match &mut descriptor.kind {
                TestKind::Simple(func) => self.driver.run_simple(number, &descriptor.name, func)?,
                TestKind::Parameterized {
                    func,
                    count,
                    subtest,
                } => self.driver.run_parameterized(
                    number,
                    &descriptor.name,
                    func,
                    *count,
                    *subtest,
                )?,
            };
            info!("  {}", report);
            self.results.push(report);
        }

        let failed = self.driver.state.failed;
        info!("{}/{} tests passed", num_tests - failed, num_tests);
        Ok(RunOutcome::from_failures(failed))
    }

    /// Apply the leak verdict and close the sink
    pub fn finish(&mut self, outcome: RunOutcome) -> Result<RunOutcome, RunnerError> {
        let mut outcome = outcome;

        if self.leak_check_armed {
            let leaks = &mut self.leaks;
            let verdict = report_through(
                self.driver.sink.as_mut(),
                self.driver.state.level.get(),
                |report| leaks.query_leaks_and_report(report),
            )?;
            if verdict <= 0 {
                warn!("Memory leaks detected");
                self.leak_detected = true;
                outcome = RunOutcome::Failure;
            }
        }

        self.driver.sink.close()?;
        Ok(outcome)
    }

    /// Full lifecycle for `program`
    pub fn execute(&mut self, program: &str) -> Result<RunOutcome, RunnerError> {
        self.setup()?;
        let outcome = self.run_tests(program)?;
        self.finish(outcome)
    }

    /// Summary of the last run
    pub fn summary(&self, program: &str) -> RunSummary {
        RunSummary::new(program, self.seed(), self.results.clone())
            .with_leak_detected(self.leak_detected)
    }
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new(RunnerConfig::default())
    }
}

/// Positive seed derived from the wall clock
fn time_seed() -> i64 {
    Utc::now().timestamp().max(1)
}
