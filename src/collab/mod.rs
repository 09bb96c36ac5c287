//! Runner collaborators
//!
//! The runner talks to an error queue and a leak detector through the
//! traits below. Both come with small default implementations whose clones
//! share state, so test functions can hold a handle while the runner owns
//! another.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::debug;

/// Queue of errors recorded while a test runs
pub trait ErrorQueue {
    /// Discard all queued errors
    fn clear(&mut self);

    /// Hand every queued error to `report`, then discard them
    fn print_all(&mut self, report: &mut dyn FnMut(&str));
}

/// Allocation leak detector
pub trait LeakDetector {
    /// Start tracking; called once before any test runs
    fn arm(&mut self);

    /// Report outstanding leaks through `report`
    ///
    /// Returns a positive value when nothing leaked, zero or negative otherwise.
    fn query_leaks_and_report(&mut self, report: &mut dyn FnMut(&str)) -> i64;
}

/// Shared stack of error messages
#[derive(Clone, Debug, Default)]
pub struct ErrorStack {
    entries: Rc<RefCell<Vec<String>>>,
}

impl ErrorStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, message: impl Into<String>) {
        self.entries.borrow_mut().push(message.into());
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl ErrorQueue for ErrorStack {
    fn clear(&mut self) {
        self.entries.borrow_mut().clear();
    }

    fn print_all(&mut self, report: &mut dyn FnMut(&str)) {
        let entries = std::mem::take(&mut *self.entries.borrow_mut());
        for entry in &entries {
            report(entry);
        }
    }
}

/// Detector used when leak checking is not wanted
#[derive(Clone, Copy, Debug, Default)]
pub struct NoLeakCheck;

impl LeakDetector for NoLeakCheck {
    fn arm(&mut self) {}

    fn query_leaks_and_report(&mut self, _report: &mut dyn FnMut(&str)) -> i64 {
        1
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    armed: bool,
    outstanding: BTreeMap<String, usize>,
}

/// Acquire/release ledger
///
/// Tests record resources with [`LeakLedger::acquire`] and
/// [`LeakLedger::release`]. Anything still held when the run finishes is a
/// leak. Nothing is recorded until the ledger is armed.
#[derive(Clone, Debug, Default)]
pub struct LeakLedger {
    state: Rc<RefCell<LedgerState>>,
}

impl LeakLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.state.borrow().armed
    }

    pub fn acquire(&self, label: impl Into<String>) {
        let mut state = self.state.borrow_mut();
        if state.armed {
            *state.outstanding.entry(label.into()).or_insert(0) += 1;
        }
    }

    pub fn release(&self, label: &str) {
        let mut state = self.state.borrow_mut();
        if let Some(count) = state.outstanding.get_mut(label) {
            *count -= 1;
            if *count == 0 {
                state.outstanding.remove(label);
            }
        }
    }

    /// Number of resources still held
    pub fn outstanding(&self) -> usize {
        self.state.borrow().outstanding.values().sum()
    }
}

impl LeakDetector for LeakLedger {
    fn arm(&mut self) {
        debug!("Leak ledger armed");
        self.state.borrow_mut().armed = true;
    }

    fn query_leaks_and_report(&mut self, report: &mut dyn FnMut(&str)) -> i64 {
        let state = self.state.borrow();
        if state.outstanding.is_empty() {
            return 1;
        }
        for (label, count) in &state.outstanding {
            report(&format!("leaked {count} x {label}"));
        }
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_stack_print_drains() {
        let stack = ErrorStack::new();
        stack.push("first");
        stack.push("second");

        let mut queue = stack.clone();
        let mut seen = Vec::new();
        queue.print_all(&mut |e| seen.push(e.to_string()));

        assert_eq!(seen, vec!["first", "second"]);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_error_stack_clear() {
        let stack = ErrorStack::new();
        stack.push("noise");
        stack.clone().clear();
        assert_eq!(stack.len(), 0);
    }

    #[test]
    fn test_no_leak_check_is_clean() {
        let mut detector = NoLeakCheck;
        detector.arm();
        assert!(detector.query_leaks_and_report(&mut |_| {}) > 0);
    }

    #[test]
    fn test_ledger_ignores_until_armed() {
        let ledger = LeakLedger::new();
        ledger.acquire("buf");
        assert_eq!(ledger.outstanding(), 0);

        let mut detector = ledger.clone();
        detector.arm();
        ledger.acquire("buf");
        ledger.acquire("buf");
        ledger.release("buf");
        assert_eq!(ledger.outstanding(), 1);

        let mut reports = Vec::new();
        assert_eq!(
            detector.query_leaks_and_report(&mut |r| reports.push(r.to_string())),
            0
        );
        assert_eq!(reports, vec!["leaked 1 x buf"]);

        ledger.release("buf");
        assert_eq!(detector.query_leaks_and_report(&mut |_| {}), 1);
    }
}
