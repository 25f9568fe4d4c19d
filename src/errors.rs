//! Expecto Error Handling
//!
//! Every fallible helper inside the crate returns [`ExpectError`]. None of these errors
//! ever escape to a test as a `Result`: the expectation layer hands the rendered message
//! to [`Reporter::fatal`](crate::reporter::Reporter::fatal), which aborts the current test
//! unit. Assertion *mismatches* are not errors at all; they are reported through
//! [`Reporter::error`](crate::reporter::Reporter::error) and evaluation continues.

use std::io;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

/// Convenience alias used by all internal helpers.
pub type Result<T> = std::result::Result<T, ExpectError>;

// ============================================================================
// ERROR TYPE
// ============================================================================

/// Usage and setup failures. Each variant maps to one fatal report.
#[derive(Debug, Error, Diagnostic)]
pub enum ExpectError {
    #[error("failed to {action} {}: {source}", path.display())]
    #[diagnostic(
        code(expecto::io),
        help("check that the snapshot location is writable by the test process")
    )]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to {action} image {}: {source}", path.display())]
    #[diagnostic(code(expecto::image))]
    Image {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{what} is not an image, {source}")]
    #[diagnostic(
        code(expecto::image),
        help("only PNG, JPEG and GIF encoded bytes can be compared as images")
    )]
    Decode {
        what: String,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to serialize value: {0}")]
    #[diagnostic(code(expecto::serialize))]
    Serialize(#[from] serde_yaml::Error),

    #[error("invalid configuration: {message}")]
    #[diagnostic(code(expecto::config))]
    Config { message: String },

    #[error("{name} must be within [0, 1] but it is {value}")]
    #[diagnostic(code(expecto::tolerance))]
    Tolerance { name: &'static str, value: f64 },
}

impl ExpectError {
    pub(crate) fn io(action: &'static str, path: &Path, source: io::Error) -> Self {
        ExpectError::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn image(action: &'static str, path: &Path, source: image::ImageError) -> Self {
        ExpectError::Image {
            action,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Stable diagnostic code, useful for matching in tests.
    pub fn code_str(&self) -> &'static str {
        match self {
            ExpectError::Io { .. } => "expecto::io",
            ExpectError::Image { .. } | ExpectError::Decode { .. } => "expecto::image",
            ExpectError::Serialize(_) => "expecto::serialize",
            ExpectError::Config { .. } => "expecto::config",
            ExpectError::Tolerance { .. } => "expecto::tolerance",
        }
    }
}
