//! tapdrive - minimal TAP test execution engine
//!
//! Registers simple and parameterized tests, runs them one at a time in
//! registration order or in a seeded random order, and reports results as
//! TAP lines plus a process exit status.
//!
//! ```no_run
//! use tapdrive::{RunnerConfig, TestRunner};
//!
//! let mut runner = TestRunner::new(RunnerConfig::from_env());
//! runner.register("addition", || 1 + 1 == 2).unwrap();
//! runner
//!     .register_parameterized("squares", |i| i * i >= i, 10, true)
//!     .unwrap();
//! let outcome = runner.execute("arith").unwrap();
//! std::process::exit(if outcome.is_success() { 0 } else { 1 });
//! ```

pub mod checks;
pub mod cli;
pub mod collab;
pub mod config;
pub mod executor;
pub mod models;
pub mod ordering;
pub mod output;
pub mod registry;
pub mod utils;

pub use collab::{ErrorQueue, ErrorStack, LeakDetector, LeakLedger, NoLeakCheck};
pub use config::RunnerConfig;
pub use executor::{RunnerError, SubtestLevel, TestRunner};
pub use models::{Outcome, RunOutcome, RunSummary, TestDescriptor, TestKind, Verdict};
pub use output::{MemorySink, OutputSink, StdSink};
pub use registry::{Registry, RegistryError};
