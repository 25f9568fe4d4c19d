//! Presentation and tolerance settings.
//!
//! Every [`Expectation`](crate::Expectation) carries a [`Config`]. By default that is the
//! process-wide instance returned by [`defaults`], which is immutable: a test that needs
//! different behavior builds its own `Config` and passes it along with
//! [`Expectation::with_config`](crate::Expectation::with_config), so nothing has to be
//! restored afterwards.
//!
//! Configs can also be kept next to the snapshots as YAML:
//!
//! ```yaml
//! output: colored-diff
//! diff_threshold: 30
//! image:
//!   pixel_tolerance: 0.05
//!   match_tolerance: 0.0
//! ```

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::errors::{ExpectError, Result};
use crate::snapshot::ImageTolerancePolicy;

/// Texts longer than this (in characters) are diffed in colored-diff mode.
pub const DEFAULT_DIFF_THRESHOLD: usize = 30;

/// How mismatching values are presented in failure messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// Both values printed side by side, compact or as indented blocks.
    #[default]
    Plain,
    /// Long values rendered as one ANSI-colored semantic diff.
    ColoredDiff,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output: OutputMode,
    pub diff_threshold: usize,
    pub image: ImageTolerancePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: OutputMode::Plain,
            diff_threshold: DEFAULT_DIFF_THRESHOLD,
            image: ImageTolerancePolicy::default(),
        }
    }
}

impl Config {
    /// Shorthand for a config using colored diffs.
    pub fn colored_diff() -> Self {
        Self {
            output: OutputMode::ColoredDiff,
            ..Self::default()
        }
    }

    pub fn with_image_policy(mut self, image: ImageTolerancePolicy) -> Self {
        self.image = image;
        self
    }

    /// Parses a YAML config. Missing keys keep their defaults.
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(source).map_err(|e| ExpectError::Config {
            message: e.to_string(),
        })?;
        config.image.validate()?;
        Ok(config)
    }

    /// Reads a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source =
            fs::read_to_string(path).map_err(|e| ExpectError::io("read config", path, e))?;
        Self::from_yaml_str(&source)
    }
}

static DEFAULT_CONFIG: Lazy<Config> = Lazy::new(Config::default);

/// The process-wide default config.
pub fn defaults() -> &'static Config {
    &DEFAULT_CONFIG
}
