//! Test execution driver
//!
//! Runs one descriptor at a time, emits its TAP lines, and keeps the
//! nesting level and failure count of the run.

use std::cell::Cell;
use std::fmt;
use std::io;
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, trace};

use crate::collab::ErrorQueue;
use crate::models::{CaseReport, ParamFn, SimpleFn, Verdict};
use crate::ordering::{SubIndexOrder, TestRng};
use crate::output::OutputSink;
use crate::registry::RegistryError;
use crate::utils::timer::Timer;

/// Indentation added while running the sub-cases of a parameterized test
pub const SUBTEST_INDENT: usize = 4;

/// Runner errors
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Failed to write report: {0}")]
    Output(#[from] io::Error),
}

/// Current indentation of report lines
///
/// Clones share the value, so a test function holding a handle sees the
/// level of the line its own result will be reported on.
#[derive(Clone, Debug, Default)]
pub struct SubtestLevel(Rc<Cell<usize>>);

impl SubtestLevel {
    pub fn get(&self) -> usize {
        self.0.get()
    }

    fn set(&self, level: usize) {
        self.0.set(level);
    }
}

/// Mutable state of one run
#[derive(Debug)]
pub(super) struct RunState {
    pub level: SubtestLevel,
    /// 0 keeps every order deterministic
    pub seed: i64,
    /// Failed top-level tests
    pub failed: usize,
    pub rng: TestRng,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            level: SubtestLevel::default(),
            seed: 0,
            failed: 0,
            rng: TestRng::from_seed(0),
        }
    }

    /// Start a new run; handles to the level stay valid
    pub fn reset(&mut self, level: usize, seed: i64) {
        self.level.set(level);
        self.seed = seed;
        self.failed = 0;
        self.rng = TestRng::from_seed(seed);
    }
}

pub(super) struct Driver {
    pub sink: Box<dyn OutputSink>,
    pub errors: Box<dyn ErrorQueue>,
    pub state: RunState,
}

impl Driver {
    pub fn new(sink: Box<dyn OutputSink>, errors: Box<dyn ErrorQueue>) -> Self {
        Self {
            sink,
            errors,
            state: RunState::new(),
        }
    }

    pub fn line(&mut self, args: fmt::Arguments<'_>) -> Result<(), RunnerError> {
        self.sink.write_stdout(self.state.level.get(), args)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), RunnerError> {
        self.sink.flush_stdout()?;
        self.sink.flush_stderr()?;
        Ok(())
    }

    fn result_line(
        &mut self,
        verdict: Verdict,
        number: usize,
        title: &str,
    ) -> Result<(), RunnerError> {
        self.line(format_args!("{verdict} {number} - {title}"))
    }

    /// Drop queued errors after a pass, print them after a failure
    fn settle_errors(&mut self, passed: bool) -> Result<(), RunnerError> {
        if passed {
            self.errors.clear();
            return Ok(());
        }
        let errors = &mut self.errors;
        report_through(self.sink.as_mut(), self.state.level.get(), |report| {
            errors.print_all(report)
        })
    }

    pub fn run_simple(
        &mut self,
        number: usize,
        name: &str,
        func: &mut SimpleFn,
    ) -> Result<CaseReport, RunnerError> {
        debug!("Running {}", name);
        let timer = Timer::start(name);

        let outcome = func();
        self.flush()?;

        let title = outcome.title.as_deref().unwrap_or(name);
        if !outcome.passed {
            self.state.failed += 1;
        }
        self.result_line(Verdict::from_passed(outcome.passed), number, title)?;
        self.flush()?;
        self.settle_errors(outcome.passed)?;

        Ok(CaseReport::simple(
            number,
            title,
            outcome.passed,
            timer.stop(),
        ))
    }

    pub fn run_parameterized(
        &mut self,
        number: usize,
        name: &str,
        func: &mut ParamFn,
        count: usize,
        subtest: bool,
    ) -> Result<CaseReport, RunnerError> {
        debug!("Running {} ({} cases)", name, count);
        let timer = Timer::start(name);

        let outer = self.state.level.get();
        self.state.level.set(outer + SUBTEST_INDENT);
        if subtest {
            self.line(format_args!("# Subtest: {name}"))?;
            self.line(format_args!("1..{count}"))?;
            self.sink.flush_stdout()?;
        }

        let order = SubIndexOrder::for_seed(count, self.state.seed, &mut self.state.rng);
        trace!("{} visits sub-indices with step {}", name, order.step());

        let mut failed_cases = 0;
        for (position, index) in order.enumerate() {
            let outcome = func(index);
            self.flush()?;

            if !outcome.passed {
                failed_cases += 1;
            }
            self.settle_errors(outcome.passed)?;

            if subtest {
                let verdict = Verdict::from_passed(outcome.passed);
                let case = position + 1;
                match &outcome.title {
                    Some(title) => self.result_line(verdict, case, title)?,
                    None => self.line(format_args!("{verdict} {case} - iteration {}", index + 1))?,
                }
                self.sink.flush_stdout()?;
            }
        }

        self.state.level.set(outer);
        let passed = failed_cases == 0;
        if !passed {
            self.state.failed += 1;
        }
        self.result_line(Verdict::from_passed(passed), number, name)?;
        self.sink.flush_stdout()?;

        Ok(CaseReport::parameterized(
            number,
            name,
            count,
            failed_cases,
            timer.stop(),
        ))
    }
}

/// Run `f` with a callback writing each reported entry as a `#` comment on stderr
pub(super) fn report_through<R>(
    sink: &mut dyn OutputSink,
    level: usize,
    f: impl FnOnce(&mut dyn FnMut(&str)) -> R,
) -> Result<R, RunnerError> {
    let mut failure = None;
    let result = f(&mut |entry: &str| {
        if failure.is_none() {
            if let Err(e) = sink.write_stderr(level, format_args!("# {entry}")) {
                failure = Some(e);
            }
        }
    });
    match failure {
        Some(e) => Err(RunnerError::Output(e)),
        None => Ok(result),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::ErrorStack;
    use crate::models::Outcome;
    use crate::output::MemorySink;

    fn driver(sink: &MemorySink, errors: &ErrorStack) -> Driver {
        Driver::new(Box::new(sink.clone()), Box::new(errors.clone()))
    }

    #[test]
    fn test_simple_uses_outcome_title() {
        let sink = MemorySink::new();
        let mut driver = driver(&sink, &ErrorStack::new());
        let mut func: SimpleFn = Box::new(|| Outcome::pass().with_title("custom"));

        let report = driver.run_simple(3, "named", &mut func).unwrap();
        assert_eq!(sink.stdout_lines(), vec!["ok 3 - custom"]);
        assert_eq!(report.name, "custom");
        assert_eq!(driver.state.failed, 0);
    }

    #[test]
    fn test_non_subtest_counts_one_failure() {
        let sink = MemorySink::new();
        let mut driver = driver(&sink, &ErrorStack::new());
        let mut func: ParamFn = Box::new(|i| Outcome::from(i != 1 && i != 3));

        let report = driver
            .run_parameterized(1, "five", &mut func, 5, false)
            .unwrap();
        assert_eq!(driver.state.failed, 1);
        assert_eq!(report.failed_cases, 2);
        assert_eq!(sink.stdout_lines(), vec!["not ok 1 - five"]);
        assert_eq!(driver.state.level.get(), 0);
    }

    #[test]
    fn test_subtest_lines() {
        let sink = MemorySink::new();
        let mut driver = driver(&sink, &ErrorStack::new());
        let mut func: ParamFn = Box::new(|i| {
            if i == 1 {
                Outcome::fail().with_title("second")
            } else {
                Outcome::pass()
            }
        });

        driver
            .run_parameterized(2, "trio", &mut func, 3, true)
            .unwrap();
        assert_eq!(
            sink.stdout_lines(),
            vec![
                "    # Subtest: trio",
                "    1..3",
                "    ok 1 - iteration 1",
                "    not ok 2 - second",
                "    ok 3 - iteration 3",
                "not ok 2 - trio",
            ]
        );
    }

    #[test]
    fn test_failure_prints_errors_and_success_clears() {
        let sink = MemorySink::new();
        let errors = ErrorStack::new();
        let mut driver = driver(&sink, &errors);

        let handle = errors.clone();
        let mut passing: SimpleFn = Box::new(move || {
            handle.push("ignored");
            Outcome::pass()
        });
        driver.run_simple(1, "passing", &mut passing).unwrap();
        assert!(errors.is_empty());

        let handle = errors.clone();
        let mut failing: SimpleFn = Box::new(move || {
            handle.push("bad signature");
            Outcome::fail()
        });
        driver.run_simple(2, "failing", &mut failing).unwrap();

        assert_eq!(sink.stderr(), "# bad signature\n");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_empty_parameterized_passes() {
        let sink = MemorySink::new();
        let mut driver = driver(&sink, &ErrorStack::new());
        let mut func: ParamFn = Box::new(|_| Outcome::fail());

        driver
            .run_parameterized(1, "none", &mut func, 0, true)
            .unwrap();
        assert_eq!(
            sink.stdout_lines(),
            vec!["    # Subtest: none", "    1..0", "ok 1 - none"]
        );
    }
}
