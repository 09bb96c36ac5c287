//! Test registry
//!
//! Append-only, ordered store of test descriptors with an explicit upper bound.

use thiserror::Error;
use tracing::debug;

use crate::models::{Outcome, TestDescriptor};

/// Default maximum number of registered tests
pub const DEFAULT_CAPACITY: usize = 1024;

/// Registration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Registry capacity of {capacity} tests exceeded while registering '{name}'")]
    CapacityExceeded { capacity: usize, name: String },
}

/// Ordered collection of registered tests
///
/// Registration order is the identity ordering used by deterministic runs.
#[derive(Debug)]
pub struct Registry {
    tests: Vec<TestDescriptor>,
    capacity: usize,
    /// Total invocations across all tests; diagnostic only
    num_test_cases: usize,
}

impl Registry {
    /// Create a registry holding at most [`DEFAULT_CAPACITY`] tests
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a registry holding at most `capacity` tests
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tests: Vec::new(),
            capacity,
            num_test_cases: 0,
        }
    }

    /// Register a test invoked once
    pub fn register<F, O>(&mut self, name: impl Into<String>, func: F) -> Result<(), RegistryError>
    where
        F: FnMut() -> O + 'static,
        O: Into<Outcome>,
    {
        self.push(TestDescriptor::simple(name, func))
    }

    /// Register a test invoked `count` times with indices in `[0, count)`
    pub fn register_parameterized<F, O>(
        &mut self,
        name: impl Into<String>,
        func: F,
        count: usize,
        subtest: bool,
    ) -> Result<(), RegistryError>
    where
        F: FnMut(usize) -> O + 'static,
        O: Into<Outcome>,
    {
        self.push(TestDescriptor::parameterized(name, func, count, subtest))
    }

    /// Append a prepared descriptor
    pub fn push(&mut self, descriptor: TestDescriptor) -> Result<(), RegistryError> {
        if self.tests.len() >= self.capacity {
            return Err(RegistryError::CapacityExceeded {
                capacity: self.capacity,
                name: descriptor.name,
            });
        }

        debug!("Registered {}", descriptor);
        self.num_test_cases += descriptor.kind.case_count();
        self.tests.push(descriptor);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn num_test_cases(&self) -> usize {
        self.num_test_cases
    }

    pub fn get(&self, index: usize) -> Option<&TestDescriptor> {
        self.tests.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut TestDescriptor> {
        self.tests.get_mut(index)
    }

    /// Names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tests.iter().map(|t| t.name.as_str()).collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
