//! # Expectations
//!
//! An [`Expectation`] is the triple `(name, reporter, value)` plus the [`Config`] it
//! renders with. Every assertion consumes the expectation and hands it back, so checks
//! chain:
//!
//! ```rust
//! use expecto::{expect, RecordingReporter};
//!
//! let t = RecordingReporter::new();
//! expect(&t, "greeting", "hello world")
//!     .to_have_prefix("hello")
//!     .to_have_suffix("world")
//!     .to_count(11);
//! assert!(t.is_clean());
//! ```
//!
//! Accessors such as [`Expectation::first`] or [`Expectation::message`] return a new
//! expectation on the derived value. After a fatal report the chain is inert: nothing
//! further is evaluated or reported.

use std::path::Path;

use crate::config::{self, Config};
use crate::diff::{colored_diff, wants_diff};
use crate::format::{format, format_one, format_pair, indent, Presentation};
use crate::reporter::Reporter;
use crate::snapshot::{self, ImageTolerancePolicy, Outcome};
use crate::value::Value;

/// A named value under test.
pub struct Expectation<'r> {
    name: String,
    reporter: &'r dyn Reporter,
    value: Value,
    config: Config,
    aborted: bool,
}

/// Starts an expectation. `name` is how the value is referred to in failure messages.
#[track_caller]
pub fn expect<'r>(
    reporter: &'r dyn Reporter,
    name: impl Into<String>,
    value: impl Into<Value>,
) -> Expectation<'r> {
    Expectation {
        name: name.into(),
        reporter,
        value: value.into(),
        config: config::defaults().clone(),
        aborted: false,
    }
}

/// Starts an expectation on an optional error, named `error`.
///
/// ```rust
/// use expecto::{expect_error, RecordingReporter};
///
/// let t = RecordingReporter::new();
/// expect_error(&t, None).message().to_be("");
/// assert!(t.is_clean());
/// ```
#[track_caller]
pub fn expect_error<'r>(
    reporter: &'r dyn Reporter,
    err: Option<&dyn std::error::Error>,
) -> Expectation<'r> {
    let value = match err {
        Some(err) => Value::error(err),
        None => Value::nil_error(),
    };
    expect(reporter, "error", value)
}

impl<'r> Expectation<'r> {
    /// Replaces the config this expectation renders with.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// True once a fatal failure was reported on this chain.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    #[track_caller]
    fn fatal(mut self, message: String) -> Self {
        self.reporter.fatal(message);
        self.aborted = true;
        self
    }

    fn derive(self, name: String, value: Value) -> Self {
        Expectation {
            name,
            value,
            ..self
        }
    }

    // ------------------------------------------------------------------------
    // Equality
    // ------------------------------------------------------------------------

    /// Asserts deep equality with `expected`.
    ///
    /// The dynamic types must agree first, unless both sides are absent-like (nil, a nil
    /// error, an absent reference or absent container), which always compare equal.
    #[track_caller]
    pub fn to_be(self, expected: impl Into<Value>) -> Self {
        if self.aborted {
            return self;
        }
        let expected = expected.into();

        if self.value.is_absent() && expected.is_absent() {
            return self;
        }

        if !self.value.same_type(&expected) {
            self.reporter.error(format!(
                "expected {} to be of type {} but it is of type {}",
                self.name,
                expected.type_name(),
                self.value.type_name()
            ));
            return self;
        }

        if self.value != expected {
            self.reporter.error(self.mismatch_message(&expected));
        }
        self
    }

    fn mismatch_message(&self, expected: &Value) -> String {
        let e = format(expected);
        let a = format(&self.value);
        if wants_diff(&self.config, &e.text, &a.text) {
            return format!(
                "expected {} to be\n{}",
                self.name,
                colored_diff(&e.text, &a.text)
            );
        }

        let (e, a, presentation) = format_pair(expected, &self.value);
        match presentation {
            Presentation::Compact => {
                format!("expected {} to be {} but it is {}", self.name, e, a)
            }
            Presentation::Block => format!(
                "expected {} to be\n{}\nbut it is\n{}",
                self.name,
                indent(&e, presentation),
                indent(&a, presentation)
            ),
        }
    }

    /// Asserts the value is not deeply equal to `unexpected`.
    #[track_caller]
    pub fn not_to_be(self, unexpected: impl Into<Value>) -> Self {
        if self.aborted {
            return self;
        }
        let unexpected = unexpected.into();
        let equal = (self.value.is_absent() && unexpected.is_absent()) || self.value == unexpected;
        if !equal {
            return self;
        }

        let (text, presentation) = format_one(&unexpected);
        let message = match presentation {
            Presentation::Compact => format!("expected {} to NOT be {}", self.name, text),
            Presentation::Block => format!(
                "expected {} to NOT be\n{}",
                self.name,
                indent(&text, presentation)
            ),
        };
        self.reporter.error(message);
        self
    }

    // ------------------------------------------------------------------------
    // Simple predicates
    // ------------------------------------------------------------------------

    /// Asserts the number of elements. Strings count Unicode code points.
    #[track_caller]
    pub fn to_count(self, count: usize) -> Self {
        if self.aborted {
            return self;
        }
        match self.value.len() {
            None => {
                let message = format!(
                    "{} is not a datatype with a length (sequence, mapping, queue, bytes, string)",
                    self.name
                );
                self.fatal(message)
            }
            Some(len) if len != count => {
                self.reporter.error(format!(
                    "expected {} to have {} elements but it has {} elements",
                    self.name, count, len
                ));
                self
            }
            Some(_) => self,
        }
    }

    /// Asserts `|value - expected| <= delta` for any numeric value.
    #[track_caller]
    pub fn to_be_about(self, expected: f64, delta: f64) -> Self {
        if self.aborted {
            return self;
        }
        let Some(actual) = self.value.as_f64() else {
            let message = format!(
                "to_be_about must only be called on a numeric value but {} is of type {}",
                self.name,
                self.value.type_name()
            );
            return self.fatal(message);
        };

        if (actual - expected).abs() > delta || actual.is_nan() {
            self.reporter.error(format!(
                "expected {} to be {}±{} but it is {}",
                self.name, expected, delta, self.value
            ));
        }
        self
    }

    /// Asserts a string value starts with `prefix`.
    #[track_caller]
    pub fn to_have_prefix(self, prefix: &str) -> Self {
        self.affix("to_have_prefix", "prefix", prefix, |s, p| s.starts_with(p))
    }

    /// Asserts a string value ends with `suffix`.
    #[track_caller]
    pub fn to_have_suffix(self, suffix: &str) -> Self {
        self.affix("to_have_suffix", "suffix", suffix, |s, p| s.ends_with(p))
    }

    #[track_caller]
    fn affix(
        self,
        operation: &str,
        label: &str,
        affix: &str,
        test: impl Fn(&str, &str) -> bool,
    ) -> Self {
        if self.aborted {
            return self;
        }
        let Some(actual) = self.value.as_str() else {
            let message = format!("{} must only be called on a string value", operation);
            return self.fatal(message);
        };
        if !test(actual, affix) {
            self.reporter.error(format!(
                "expected {} to have {} '{}' but it is '{}'",
                self.name, label, affix, actual
            ));
        }
        self
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Continues with the message of an error value. A nil error, or plain nil, has the
    /// empty message.
    #[track_caller]
    pub fn message(self) -> Self {
        if self.aborted {
            return self;
        }
        let message = match &self.value {
            Value::Null => String::new(),
            Value::Error(message) => message.clone().unwrap_or_default(),
            _ => return self.fatal("message must only be called on an error value".to_string()),
        };
        let name = format!("message of {}", self.name);
        self.derive(name, Value::Text(message))
    }

    /// Continues with the first element.
    #[track_caller]
    pub fn first(self) -> Self {
        self.element("first", 0, |name| format!("first element of {}", name))
    }

    /// Continues with the last element.
    #[track_caller]
    pub fn last(self) -> Self {
        self.element("last", -1, |name| format!("last element of {}", name))
    }

    /// Continues with the element at `index`; negative indexes count from the end.
    #[track_caller]
    pub fn at(self, index: isize) -> Self {
        self.element("at", index, |name| format!("{}[{}]", name, index))
    }

    #[track_caller]
    fn element(self, operation: &str, index: isize, label: impl Fn(&str) -> String) -> Self {
        if self.aborted {
            return self;
        }
        if !self.value.is_indexable() {
            let message = format!(
                "{} must only be called on a sequence, bytes or string value but {} is of type {}",
                operation,
                self.name,
                self.value.type_name()
            );
            return self.fatal(message);
        }

        if self.value.is_empty() == Some(true) && operation != "at" {
            let message = format!("{} is empty, it has no {} element", self.name, operation);
            return self.fatal(message);
        }

        let len = self.value.len().unwrap_or(0);
        let resolved = if index < 0 {
            len as isize + index
        } else {
            index
        };
        let element = usize::try_from(resolved)
            .ok()
            .and_then(|i| self.value.element(i));
        match element {
            Some(value) => {
                let name = label(&self.name);
                self.derive(name, value)
            }
            None => {
                let message = format!(
                    "index {} is out of bounds for {} with {} elements",
                    index, self.name, len
                );
                self.fatal(message)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------------

    /// Compares the value with the text/binary baseline at `path`, creating it on the
    /// first run.
    #[track_caller]
    pub fn to_be_snapshot(mut self, path: impl AsRef<Path>) -> Self {
        if self.aborted {
            return self;
        }
        let outcome = snapshot::compare_or_create(self.reporter, path.as_ref(), &self.value);
        self.aborted = outcome == Outcome::Aborted;
        self
    }

    /// Compares encoded image bytes with the PNG baseline at `path`, using the image
    /// policy of this expectation's config.
    #[track_caller]
    pub fn to_be_snapshot_image(self, path: impl AsRef<Path>) -> Self {
        let policy = self.config.image;
        self.to_be_snapshot_image_with(path, policy)
    }

    /// Like [`Expectation::to_be_snapshot_image`] with an explicit policy.
    #[track_caller]
    pub fn to_be_snapshot_image_with(
        mut self,
        path: impl AsRef<Path>,
        policy: ImageTolerancePolicy,
    ) -> Self {
        if self.aborted {
            return self;
        }
        let Value::Bytes(bytes) = &self.value else {
            let message = format!(
                "value of to_be_snapshot_image must be encoded image bytes but {} is of type {}",
                self.name,
                self.value.type_name()
            );
            return self.fatal(message);
        };
        let current = match image::load_from_memory(bytes) {
            Ok(current) => current,
            Err(source) => {
                let err = crate::errors::ExpectError::Decode {
                    what: format!("bytes value {}", self.name),
                    source,
                };
                return self.fatal(err.to_string());
            }
        };
        let outcome =
            snapshot::compare_or_create_image(self.reporter, path.as_ref(), &current, &policy);
        self.aborted = outcome == Outcome::Aborted;
        self
    }
}
