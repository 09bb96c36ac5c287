//! Built-in self-checks
//!
//! A suite that runs the engine's own ordering algorithms through the
//! engine. Used by the `selftest` command.
//!
//! - `gcd_identities` - Euclid's algorithm against divisibility rules
//! - `identity_order` - unseeded ordering keeps registration order
//! - `permutation_complete` - seeded shuffles of sizes 0..16 (aggregated)
//! - `coprime_walk` - sub-index traversal coverage for n = 1..=16 (subtest)
//! - `step_selection` - seeded step choice is coprime for n = 3..=10 (subtest)
//! - `nesting_level` - sub-cases run one indent deeper than the run (subtest)
//! - `ledger_balance` - acquire/release pairs leave nothing outstanding

use crate::collab::LeakLedger;
use crate::executor::{SubtestLevel, TestRunner, SUBTEST_INDENT};
use crate::models::Outcome;
use crate::ordering::{choose_step, gcd, permutation, SubIndexOrder, TestRng};
use crate::registry::RegistryError;

/// Program name reported for the built-in suite
pub const SUITE_NAME: &str = "tapdrive-selftest";

/// Register every self-check with `runner`
pub fn register_all(runner: &mut TestRunner, ledger: &LeakLedger) -> Result<(), RegistryError> {
    runner.register("gcd_identities", gcd_identities)?;
    runner.register("identity_order", identity_order)?;
    runner.register_parameterized("permutation_complete", permutation_complete, 16, false)?;
    runner.register_parameterized("coprime_walk", coprime_walk, 16, true)?;
    runner.register_parameterized("step_selection", step_selection, 8, true)?;

    let level = runner.subtest_level();
    runner.register_parameterized("nesting_level", move |_| nesting_level(&level), 3, true)?;

    let ledger = ledger.clone();
    runner.register("ledger_balance", move || ledger_balance(&ledger))?;
    Ok(())
}

fn gcd_identities() -> bool {
    (0..30).all(|a| {
        (0..30).all(|b| {
            let g = gcd(a, b);
            g == gcd(b, a)
                && (g == 0 || (a % g == 0 && b % g == 0))
                && (b != 0 || g == a)
        })
    })
}

fn identity_order() -> bool {
    let mut rng = TestRng::from_seed(0);
    permutation(12, 0, &mut rng) == (0..12).collect::<Vec<_>>()
        && SubIndexOrder::for_seed(12, 0, &mut rng).eq(0..12)
}

fn permutation_complete(size: usize) -> bool {
    let seed = size as i64 + 1;
    let mut rng = TestRng::from_seed(seed);
    let mut order = permutation(size, seed, &mut rng);
    order.sort_unstable();
    order == (0..size).collect::<Vec<_>>()
}

fn coprime_walk(idx: usize) -> Outcome {
    let n = idx + 1;
    let complete = (1..n.max(2))
        .filter(|&step| gcd(n, step) == 1)
        .all(|step| {
            let mut seen = vec![false; n];
            for i in SubIndexOrder::new(n, step) {
                if std::mem::replace(&mut seen[i], true) {
                    return false;
                }
            }
            seen.into_iter().all(|v| v)
        });
    Outcome::from(complete).with_title(format!("coprime walk over {n} indices"))
}

fn step_selection(idx: usize) -> Outcome {
    let n = idx + 3;
    let mut rng = TestRng::from_seed(n as i64 * 31);
    let step = choose_step(n, 1, &mut rng);
    Outcome::from(step > 0 && step < n && gcd(n, step) == 1)
        .with_title(format!("n = {n}, step = {step}"))
}

fn nesting_level(level: &SubtestLevel) -> Outcome {
    let current = level.get();
    Outcome::from(current >= SUBTEST_INDENT && current % SUBTEST_INDENT == 0)
        .with_title(format!("sub-case indented to {current}"))
}

fn ledger_balance(ledger: &LeakLedger) -> bool {
    let before = ledger.outstanding();
    ledger.acquire("scratch");
    ledger.release("scratch");
    ledger.outstanding() == before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunnerConfig;
    use crate::output::MemorySink;

    fn run(config: RunnerConfig) -> (crate::models::RunOutcome, MemorySink, TestRunner) {
        let sink = MemorySink::new();
        let ledger = LeakLedger::new();
        let mut runner = TestRunner::new(config)
            .with_sink(sink.clone())
            .with_leak_detector(ledger.clone());
        register_all(&mut runner, &ledger).unwrap();
        let outcome = runner.execute(SUITE_NAME).unwrap();
        (outcome, sink, runner)
    }

    #[test]
    fn test_suite_registration() {
        let mut runner = TestRunner::default();
        register_all(&mut runner, &LeakLedger::new()).unwrap();
        assert_eq!(runner.registry().len(), 7);
        assert_eq!(runner.registry().num_test_cases(), 3 + 16 + 16 + 8 + 3);
    }

    #[test]
    fn test_suite_passes_in_order() {
        let (outcome, sink, runner) = run(RunnerConfig::default());
        assert!(outcome.is_success(), "{}", sink.stdout());
        assert!(!sink.stdout().contains("not ok"));
        assert_eq!(runner.summary(SUITE_NAME).passed, 7);
        assert!(sink.stdout().contains("    ok 1 - sub-case indented to 4"));
    }

    #[test]
    fn test_suite_passes_shuffled() {
        let (outcome, sink, _) = run(RunnerConfig::default().with_seed(20240101));
        assert!(outcome.is_success(), "{}", sink.stdout());
        assert!(sink.stdout().contains("    # Subtest: coprime_walk"));
        assert!(sink.stdout().contains("ok 16 - coprime walk over"));
    }

    #[test]
    fn test_suite_nested_in_harness() {
        let (outcome, sink, _) = run(RunnerConfig::default().with_harness_level(1));
        assert!(outcome.is_success(), "{}", sink.stdout());
        assert!(sink.stdout().contains("sub-case indented to 8"));
    }

    #[test]
    fn test_individual_checks() {
        assert!(gcd_identities());
        assert!(identity_order());
        assert!((0..16).all(permutation_complete));
        assert!((0..16).all(|i| coprime_walk(i).passed));
        assert!((0..8).all(|i| step_selection(i).passed));
    }
}
