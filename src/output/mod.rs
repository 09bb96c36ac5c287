//! Output handling
//!
//! Line sinks for the TAP stream and formatters for run summaries.

mod formatter;
mod sink;

pub use formatter::{OutputFormat, SummaryFormatter};
pub use sink::{MemorySink, OutputSink, StdSink, Stream};
