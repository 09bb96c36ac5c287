//! tapdrive - TAP test driver
//!
//! Runs TAP-reporting test suites one test at a time, in registration order
//! or in a reproducible seeded random order.
//!
//! ## Usage
//!
//! ```bash
//! # Run the built-in self-checks
//! tapdrive selftest
//!
//! # Shuffle with a fixed seed and print a summary table
//! tapdrive selftest --seed 1234 --summary table
//!
//! # Inspect the order a seed produces
//! tapdrive order --count 10 --seed 1234 --sub 7
//!
//! # Describe environment variables
//! tapdrive env
//!
//! # Save the defaults plus environment overrides as a config file
//! tapdrive config --output runner.yaml
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::info;

use tapdrive::checks::{self, SUITE_NAME};
use tapdrive::cli::{self, Args, ConfigArgs, OrderArgs, SelftestArgs};
use tapdrive::config::env::{print_env_help, EnvConfig};
use tapdrive::ordering::{permutation, SubIndexOrder, TestRng};
use tapdrive::output::{OutputFormat, SummaryFormatter};
use tapdrive::utils::logger::{init_logger, LogLevel};
use tapdrive::{LeakLedger, RunnerConfig, TestRunner};

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let env = EnvConfig::load();

    let log_level = args
        .log_level
        .as_deref()
        .or(env.log_level.as_deref())
        .and_then(LogLevel::from_str)
        .unwrap_or(LogLevel::Warn);
    init_logger(log_level);

    match args.command {
        cli::Command::Selftest(selftest_args) => run_selftest(selftest_args, &env),
        cli::Command::Order(order_args) => {
            print_order(&order_args);
            Ok(ExitCode::SUCCESS)
        }
        cli::Command::Env => {
            print_env_help();
            println!();
            if env.has_any() {
                env.print_summary();
            } else {
                println!("No TAPDRIVE variables set");
            }
            Ok(ExitCode::SUCCESS)
        }
        cli::Command::Config(config_args) => write_config(&config_args, &env),
    }
}

fn run_selftest(args: SelftestArgs, env: &EnvConfig) -> Result<ExitCode> {
    let mut config = match &args.config {
        Some(path) => RunnerConfig::load(path)
            .with_context(|| format!("Failed to load runner config from {path}"))?,
        None => RunnerConfig::default(),
    }
    .with_env(env);

    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(level) = args.level {
        config = config.with_harness_level(level);
    }
    if args.no_leak_check {
        config = config.with_leak_check(false);
    }

    let program = config
        .program_name
        .clone()
        .unwrap_or_else(|| SUITE_NAME.to_string());

    let ledger = LeakLedger::new();
    let mut runner = TestRunner::new(config).with_leak_detector(ledger.clone());
    checks::register_all(&mut runner, &ledger).context("Failed to register self-checks")?;

    info!(
        "Running {} with {}/{} tests",
        program,
        runner.registry().len(),
        runner.registry().capacity()
    );
    let outcome = runner.execute(&program).context("Test run failed")?;

    if let Some(format) = &args.summary {
        let format = OutputFormat::from_str(format)
            .ok_or_else(|| anyhow::anyhow!("Unknown summary format: {format}"))?;
        eprintln!(
            "{}",
            SummaryFormatter::new(format).format(&runner.summary(&program))
        );
    }

    Ok(outcome.exit_code())
}

fn write_config(args: &ConfigArgs, env: &EnvConfig) -> Result<ExitCode> {
    RunnerConfig::default()
        .with_env(env)
        .save(&args.output)
        .with_context(|| format!("Failed to write runner config to {}", args.output))?;
    info!("Wrote runner config to {}", args.output);
    Ok(ExitCode::SUCCESS)
}

fn print_order(args: &OrderArgs) {
    let mut rng = TestRng::from_seed(args.seed);
    let order = permutation(args.count, args.seed, &mut rng);

    println!("Seed: {}", args.seed);
    println!("Top-level order:");
    for (position, index) in order.iter().enumerate() {
        println!("  {:3}. test #{}", position + 1, index + 1);
    }

    if let Some(size) = args.sub {
        let sub = SubIndexOrder::for_seed(size, args.seed, &mut rng);
        println!("Sub-index order (step {}):", sub.step());
        let indices: Vec<String> = sub.map(|i| (i + 1).to_string()).collect();
        println!("  {}", indices.join(" "));
    }
}
