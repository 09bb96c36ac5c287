//! Test descriptor models
//!
//! Defines registered test units and the value a test invocation returns.

use std::fmt;

/// Function backing a simple test case
pub type SimpleFn = Box<dyn FnMut() -> Outcome>;

/// Function backing a parameterized test case, called once per sub-index
pub type ParamFn = Box<dyn FnMut(usize) -> Outcome>;

/// Result of invoking a test function
///
/// A test may attach a title that replaces the default label of the
/// report line emitted for this invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub passed: bool,
    pub title: Option<String>,
}

impl Outcome {
    pub fn pass() -> Self {
        Self {
            passed: true,
            title: None,
        }
    }

    pub fn fail() -> Self {
        Self {
            passed: false,
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl From<bool> for Outcome {
    fn from(passed: bool) -> Self {
        Self {
            passed,
            title: None,
        }
    }
}

/// Shape of a registered test
pub enum TestKind {
    /// Invoked once, without an index
    Simple(SimpleFn),
    /// Invoked `count` times with indices in `[0, count)`
    Parameterized {
        func: ParamFn,
        count: usize,
        /// Report every sub-case on its own line instead of only the aggregate
        subtest: bool,
    },
}

impl TestKind {
    /// Number of invocations this test performs
    pub fn case_count(&self) -> usize {
        match self {
            TestKind::Simple(_) => 1,
            TestKind::Parameterized { count, .. } => *count,
        }
    }
}

impl fmt::Debug for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestKind::Simple(_) => f.write_str("Simple"),
            TestKind::Parameterized { count, subtest, .. } => f
                .debug_struct("Parameterized")
                .field("count", count)
                .field("subtest", subtest)
                .finish(),
        }
    }
}

/// One registered test
#[derive(Debug)]
pub struct TestDescriptor {
    pub name: String,
    pub kind: TestKind,
}

impl TestDescriptor {
    pub fn simple<F, O>(name: impl Into<String>, mut func: F) -> Self
    where
        F: FnMut() -> O + 'static,
        O: Into<Outcome>,
    {
        Self {
            name: name.into(),
            kind: TestKind::Simple(Box::new(move || func().into())),
        }
    }

    pub fn parameterized<F, O>(
        name: impl Into<String>,
        mut func: F,
        count: usize,
        subtest: bool,
    ) -> Self
    where
        F: FnMut(usize) -> O + 'static,
        O: Into<Outcome>,
    {
        Self {
            name: name.into(),
            kind: TestKind::Parameterized {
                func: Box::new(move |idx| func(idx).into()),
                count,
                subtest,
            },
        }
    }
}

impl fmt::Display for TestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TestKind::Simple(_) => write!(f, "{}", self.name),
            TestKind::Parameterized { count, .. } => write!(f, "{} [{} cases]", self.name, count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_bool() {
        assert!(Outcome::from(true).passed);
        assert!(!Outcome::from(false).passed);
        assert_eq!(Outcome::from(true).title, None);
    }

    #[test]
    fn test_outcome_title() {
        let outcome = Outcome::fail().with_title("bad key length");
        assert!(!outcome.passed);
        assert_eq!(outcome.title.as_deref(), Some("bad key length"));
    }

    #[test]
    fn test_descriptor_kinds() {
        let simple = TestDescriptor::simple("simple", || true);
        assert!(matches!(simple.kind, TestKind::Simple(_)));
        assert_eq!(simple.kind.case_count(), 1);

        let param = TestDescriptor::parameterized("param", |i| i % 2 == 0, 7, true);
        assert!(matches!(
            param.kind,
            TestKind::Parameterized { subtest: true, .. }
        ));
        assert_eq!(param.kind.case_count(), 7);
        assert_eq!(param.to_string(), "param [7 cases]");
    }

    #[test]
    fn test_param_fn_receives_index() {
        let mut desc = TestDescriptor::parameterized("even", |i| i % 2 == 0, 4, false);
        if let TestKind::Parameterized { func, .. } = &mut desc.kind {
            assert!(func(0).passed);
            assert!(!func(1).passed);
        } else {
            panic!("expected parameterized descriptor");
        }
    }
}
