//! The reporting capability expectations talk to.
//!
//! Two severities exist. [`Reporter::error`] records an assertion failure and lets the
//! test continue, so every assertion in a test gets evaluated. [`Reporter::fatal`] is for
//! usage errors and broken setup: it records the failure and aborts the test unit.
//!
//! - [`TestReporter`] plugs into the standard libtest harness. Errors are collected and
//!   raised together when the reporter is dropped; a fatal report panics right away.
//! - [`RecordingReporter`] only records. It is the test double used to check failure
//!   messages, and the expectation chain goes inert after a fatal report.

use std::cell::RefCell;

use tracing::warn;

pub trait Reporter {
    /// Records a failure and aborts the current test unit.
    fn fatal(&self, message: String);

    /// Records a failure. The test keeps running.
    fn error(&self, message: String);
}

impl<R: Reporter + ?Sized> Reporter for &R {
    #[track_caller]
    fn fatal(&self, message: String) {
        (**self).fatal(message);
    }

    fn error(&self, message: String) {
        (**self).error(message);
    }
}

// ============================================================================
// LIBTEST REPORTER
// ============================================================================

/// Reporter for ordinary `#[test]` functions.
///
/// ```rust,should_panic
/// use expecto::{expect, TestReporter};
///
/// let t = TestReporter::new();
/// expect(&t, "answer", 41).to_be(42);
/// // dropping `t` panics with "expected answer to be 42 but it is 41"
/// ```
#[derive(Debug, Default)]
pub struct TestReporter {
    errors: RefCell<Vec<String>>,
}

impl TestReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Failures recorded so far.
    pub fn errors(&self) -> Vec<String> {
        self.errors.borrow().clone()
    }

    fn summary(errors: &[String]) -> String {
        errors.join("\n\n")
    }
}

impl Reporter for TestReporter {
    #[track_caller]
    fn fatal(&self, message: String) {
        warn!(%message, "fatal expectation failure");
        let mut errors = self.errors.take();
        errors.push(message);
        panic!("{}", Self::summary(&errors));
    }

    fn error(&self, message: String) {
        warn!(%message, "expectation failed");
        self.errors.borrow_mut().push(message);
    }
}

impl Drop for TestReporter {
    fn drop(&mut self) {
        let errors = self.errors.take();
        if !errors.is_empty() && !std::thread::panicking() {
            panic!("{}", Self::summary(&errors));
        }
    }
}

// ============================================================================
// RECORDING REPORTER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Fatal,
    Error,
}

/// Reporter that keeps every message for inspection.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    entries: RefCell<Vec<(Severity, String)>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages in the order they were reported.
    pub fn messages(&self) -> Vec<String> {
        self.entries.borrow().iter().map(|(_, m)| m.clone()).collect()
    }

    pub fn fatals(&self) -> Vec<String> {
        self.of(Severity::Fatal)
    }

    pub fn errors(&self) -> Vec<String> {
        self.of(Severity::Error)
    }

    pub fn is_clean(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn of(&self, severity: Severity) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn fatal(&self, message: String) {
        self.entries.borrow_mut().push((Severity::Fatal, message));
    }

    fn error(&self, message: String) {
        self.entries.borrow_mut().push((Severity::Error, message));
    }
}
