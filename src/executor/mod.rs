//! Test execution engine
//!
//! Sequential, single-threaded execution of registered tests.

mod driver;
mod runner;

pub use driver::{RunnerError, SubtestLevel, SUBTEST_INDENT};
pub use runner::TestRunner;
