//! Fluent expectations with readable failure messages and golden-file snapshots.
//!
//! ```rust
//! use expecto::{expect, RecordingReporter};
//!
//! let t = RecordingReporter::new();
//! expect(&t, "foo", "xxx").to_be("yyy");
//! assert_eq!(t.errors(), ["expected foo to be 'yyy' but it is 'xxx'"]);
//! ```

pub use crate::config::{Config, OutputMode};
pub use crate::errors::ExpectError;
pub use crate::expect::{expect, expect_error, Expectation};
pub use crate::reporter::{RecordingReporter, Reporter, TestReporter};
pub use crate::snapshot::{expect_image, ImageExpectation, ImageTolerancePolicy, Outcome};
pub use crate::value::{Record, Value};

pub mod config;
pub mod diff;
pub mod errors;
pub mod expect;
pub mod format;
pub mod reporter;
pub mod snapshot;
pub mod value;
