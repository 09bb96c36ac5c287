//! Data models for test execution
//!
//! Registered test descriptors, invocation outcomes, and run results.

mod descriptor;
mod test_result;

pub use descriptor::{Outcome, ParamFn, SimpleFn, TestDescriptor, TestKind};
pub use test_result::{CaseReport, RunOutcome, RunSummary, Verdict};
