//! Test result models
//!
//! Defines verdicts, per-test reports, and the outcome of a whole run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::ExitCode;

/// Verdict of a single report line
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Ok,
    NotOk,
}

impl Verdict {
    pub fn from_passed(passed: bool) -> Self {
        if passed {
            Verdict::Ok
        } else {
            Verdict::NotOk
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Verdict::Ok => "✓",
            Verdict::NotOk => "✗",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Verdict::Ok)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Ok => write!(f, "ok"),
            Verdict::NotOk => write!(f, "not ok"),
        }
    }
}

/// Final outcome of a run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunOutcome {
    Success,
    Failure,
}

impl RunOutcome {
    pub fn from_failures(failed: usize) -> Self {
        if failed == 0 {
            RunOutcome::Success
        } else {
            RunOutcome::Failure
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success)
    }

    pub fn exit_code(&self) -> ExitCode {
        match self {
            RunOutcome::Success => ExitCode::SUCCESS,
            RunOutcome::Failure => ExitCode::FAILURE,
        }
    }
}

/// Report for one top-level test
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaseReport {
    /// Position in the executed order, starting at 1
    pub number: usize,
    pub name: String,
    pub verdict: Verdict,
    /// Invocations performed (1 for simple tests)
    pub cases: usize,
    /// Invocations that failed
    pub failed_cases: usize,
    pub duration_ms: u64,
}

impl CaseReport {
    pub fn simple(number: usize, name: impl Into<String>, passed: bool, duration_ms: u64) -> Self {
        Self {
            number,
            name: name.into(),
            verdict: Verdict::from_passed(passed),
            cases: 1,
            failed_cases: usize::from(!passed),
            duration_ms,
        }
    }

    pub fn parameterized(
        number: usize,
        name: impl Into<String>,
        cases: usize,
        failed_cases: usize,
        duration_ms: u64,
    ) -> Self {
        Self {
            number,
            name: name.into(),
            verdict: Verdict::from_passed(failed_cases == 0),
            cases,
            failed_cases,
            duration_ms,
        }
    }
}

impl fmt::Display for CaseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} [{}ms]",
            self.verdict.symbol(),
            self.number,
            self.name,
            self.duration_ms
        )?;
        if self.cases > 1 {
            write!(f, " ({}/{} cases failed)", self.failed_cases, self.cases)?;
        }
        Ok(())
    }
}

/// Summary of one run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    pub program: String,
    pub seed: i64,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Individual invocations across all tests
    pub total_cases: usize,
    pub leak_detected: bool,
    pub total_duration_ms: u64,
    pub outcome: RunOutcome,
    pub results: Vec<CaseReport>,
}

impl RunSummary {
    pub fn new(program: impl Into<String>, seed: i64, results: Vec<CaseReport>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.verdict.is_success()).count();
        let failed = total - passed;
        let total_cases = results.iter().map(|r| r.cases).sum();
        let total_duration_ms = results.iter().map(|r| r.duration_ms).sum();

        Self {
            program: program.into(),
            seed,
            total,
            passed,
            failed,
            total_cases,
            leak_detected: false,
            total_duration_ms,
            outcome: RunOutcome::from_failures(failed),
            results,
        }
    }

    /// Record a leak verdict; a detected leak fails the run regardless of results
    pub fn with_leak_detected(mut self, leak_detected: bool) -> Self {
        self.leak_detected = leak_detected;
        if leak_detected {
            self.outcome = RunOutcome::Failure;
        }
        self
    }

    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.passed as f64 / self.total as f64) * 100.0
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run of {} (seed {})", self.program, self.seed)?;
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        for result in &self.results {
            writeln!(f, "  {result}")?;
        }
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(
            f,
            "Total: {} | Pass: {} | Fail: {} | Cases: {}",
            self.total, self.passed, self.failed, self.total_cases
        )?;
        if self.leak_detected {
            writeln!(f, "Leaks detected")?;
        }
        writeln!(
            f,
            "Pass Rate: {:.1}% | Duration: {}ms",
            self.pass_rate(),
            self.total_duration_ms
        )
    }
}
