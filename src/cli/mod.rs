//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};

/// TAP test driver
#[derive(Parser, Debug)]
#[command(name = "tapdrive")]
#[command(version = "0.1.0")]
#[command(about = "Run TAP-reporting test suites in fixed or seeded random order")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the built-in self-check suite
    Selftest(SelftestArgs),

    /// Print the execution order for a seed
    Order(OrderArgs),

    /// Describe environment variables
    Env,

    /// Write the effective runner configuration to a file
    Config(ConfigArgs),
}

/// Arguments for selftest command
#[derive(Parser, Debug)]
pub struct SelftestArgs {
    /// Randomization seed (<= 0 picks one from the clock)
    #[arg(short, long, allow_hyphen_values = true)]
    pub seed: Option<i64>,

    /// Harness nesting level
    #[arg(short = 'L', long)]
    pub level: Option<usize>,

    /// Disable leak checking
    #[arg(long)]
    pub no_leak_check: bool,

    /// Runner configuration file (YAML or JSON)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Print a run summary to stderr (table, json, json-pretty, summary)
    #[arg(long)]
    pub summary: Option<String>,
}

/// Arguments for order command
#[derive(Parser, Debug)]
pub struct OrderArgs {
    /// Number of top-level tests
    #[arg(short, long)]
    pub count: usize,

    /// Randomization seed (0 keeps registration order)
    #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
    pub seed: i64,

    /// Also print the sub-index order of a parameterized test of this size
    #[arg(long)]
    pub sub: Option<usize>,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Output file (YAML for .yaml/.yml, JSON otherwise)
    #[arg(short, long)]
    pub output: String,
}
