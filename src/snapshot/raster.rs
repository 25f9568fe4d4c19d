//! Image snapshots with per-pixel tolerance.
//!
//! Two images match when at most `match_tolerance` of their pixels differ by more than
//! `pixel_tolerance`. A pixel's difference is the mean of its four normalized channel
//! differences (red, green, blue, alpha), each in `[0, 1]`. Color channels are
//! premultiplied by alpha first.
//!
//! On a mismatch a heat-map is written next to the baseline: every channel difference is
//! exaggerated three times, so faint drift still shows up.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{ensure_parent_dir, read_baseline, remove_stale, with_suffix, write_artifact, Outcome};
use crate::config;
use crate::errors::{ExpectError, Result};
use crate::reporter::Reporter;

/// Channel differences are multiplied by this in the diff image.
const DIFF_EXAGGERATION: f64 = 3.0;

// ============================================================================
// TOLERANCE POLICY
// ============================================================================

/// How far two images may drift apart and still match.
///
/// The default allows up to 1% of pixels to differ by more than 10% intensity.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImageTolerancePolicy {
    pixel_tolerance: f64,
    match_tolerance: f64,
}

impl Default for ImageTolerancePolicy {
    fn default() -> Self {
        Self {
            pixel_tolerance: 0.1,
            match_tolerance: 0.01,
        }
    }
}

impl ImageTolerancePolicy {
    /// Both tolerances in `[0, 1]`.
    pub fn new(pixel_tolerance: f64, match_tolerance: f64) -> Result<Self> {
        let policy = Self {
            pixel_tolerance,
            match_tolerance,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Every pixel must be identical.
    pub const fn exact() -> Self {
        Self {
            pixel_tolerance: 0.0,
            match_tolerance: 0.0,
        }
    }

    /// Maximum mean channel difference for a pixel to still count as matching.
    pub fn with_pixel_tolerance(self, pixel_tolerance: f64) -> Result<Self> {
        Self::new(pixel_tolerance, self.match_tolerance)
    }

    /// Maximum fraction of mismatching pixels for the image to still match.
    pub fn with_match_tolerance(self, match_tolerance: f64) -> Result<Self> {
        Self::new(self.pixel_tolerance, match_tolerance)
    }

    pub fn pixel_tolerance(&self) -> f64 {
        self.pixel_tolerance
    }

    pub fn match_tolerance(&self) -> f64 {
        self.match_tolerance
    }

    pub(crate) fn validate(&self) -> Result<()> {
        check_unit("pixel tolerance", self.pixel_tolerance)?;
        check_unit("match tolerance", self.match_tolerance)
    }
}

fn check_unit(name: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ExpectError::Tolerance { name, value })
    }
}

// ============================================================================
// PIXEL COMPARISON
// ============================================================================

/// Result of comparing a baseline with a current image.
#[derive(Debug, Clone)]
pub enum Comparison {
    /// Dimensions differ, no pixels were compared.
    SizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    Compared {
        mismatched_pixels: u64,
        total_pixels: u64,
        diff: RgbaImage,
    },
}

impl Comparison {
    /// Fraction of pixels beyond the pixel tolerance. Size mismatches count as 1.
    pub fn mismatch_ratio(&self) -> f64 {
        match self {
            Comparison::SizeMismatch { .. } => 1.0,
            Comparison::Compared {
                total_pixels: 0, ..
            } => 0.0,
            Comparison::Compared {
                mismatched_pixels,
                total_pixels,
                ..
            } => *mismatched_pixels as f64 / *total_pixels as f64,
        }
    }

    pub fn is_match(&self, policy: &ImageTolerancePolicy) -> bool {
        match self {
            Comparison::SizeMismatch { .. } => false,
            Comparison::Compared { .. } => self.mismatch_ratio() <= policy.match_tolerance,
        }
    }
}

/// Color channels scaled by alpha, so hidden color under transparency does not count.
fn premultiplied(pixel: &Rgba<u16>) -> [u32; 4] {
    let [r, g, b, a] = pixel.0.map(u32::from);
    let max = u32::from(u16::MAX);
    [r * a / max, g * a / max, b * a / max, a]
}

fn channel_difference(a: u32, b: u32) -> f64 {
    f64::from(a.abs_diff(b)) / f64::from(u16::MAX)
}

fn heat(difference: f64) -> u8 {
    (difference * DIFF_EXAGGERATION * 255.0).min(255.0) as u8
}

/// Compares two images pixel by pixel and builds the diff heat-map.
pub fn compare_images(
    baseline: &DynamicImage,
    current: &DynamicImage,
    policy: &ImageTolerancePolicy,
) -> Comparison {
    if baseline.dimensions() != current.dimensions() {
        return Comparison::SizeMismatch {
            expected: baseline.dimensions(),
            actual: current.dimensions(),
        };
    }

    let (width, height) = baseline.dimensions();
    let expected = baseline.to_rgba16();
    let actual = current.to_rgba16();
    let mut diff = RgbaImage::new(width, height);
    let mut mismatched_pixels = 0_u64;

    for (x, y, e) in expected.enumerate_pixels() {
        let e = premultiplied(e);
        let a = premultiplied(actual.get_pixel(x, y));
        let channels: [f64; 4] = std::array::from_fn(|c| channel_difference(e[c], a[c]));

        diff.put_pixel(
            x,
            y,
            Rgba([heat(channels[0]), heat(channels[1]), heat(channels[2]), u8::MAX]),
        );

        let pixel_difference = channels.iter().sum::<f64>() / 4.0;
        if pixel_difference > policy.pixel_tolerance {
            mismatched_pixels += 1;
        }
    }

    Comparison::Compared {
        mismatched_pixels,
        total_pixels: u64::from(width) * u64::from(height),
        diff,
    }
}

// ============================================================================
// SNAPSHOT LIFECYCLE
// ============================================================================

fn companion(path: &Path, suffix: &str) -> PathBuf {
    let stem = if path.extension().is_some_and(|ext| ext == "png") {
        path.with_extension("")
    } else {
        path.to_path_buf()
    };
    with_suffix(&stem, suffix)
}

/// `<stem>.current.png` for a baseline at `<stem>.png`.
pub fn current_image_path(path: &Path) -> PathBuf {
    companion(path, ".current.png")
}

/// `<stem>.diff.png` for a baseline at `<stem>.png`.
pub fn diff_image_path(path: &Path) -> PathBuf {
    companion(path, ".diff.png")
}

fn encode_png(image: &DynamicImage, path: &Path) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| ExpectError::image("encode", path, e))?;
    Ok(bytes)
}

/// Compares `current` with the PNG baseline at `path`, creating it on first use.
pub fn compare_or_create_image(
    reporter: &dyn Reporter,
    path: &Path,
    current: &DynamicImage,
    policy: &ImageTolerancePolicy,
) -> Outcome {
    match try_compare_or_create_image(reporter, path, current, policy) {
        Ok(outcome) => outcome,
        Err(e) => {
            reporter.fatal(e.to_string());
            Outcome::Aborted
        }
    }
}

fn try_compare_or_create_image(
    reporter: &dyn Reporter,
    path: &Path,
    current: &DynamicImage,
    policy: &ImageTolerancePolicy,
) -> Result<Outcome> {
    if path.extension().map_or(true, |ext| ext != "png") {
        return Err(ExpectError::Config {
            message: format!(
                "only png format is supported, add a .png extension to the snapshot path {}",
                path.display()
            ),
        });
    }
    policy.validate()?;
    ensure_parent_dir(path)?;

    let Some(baseline) = read_baseline(path)? else {
        write_artifact(path, &encode_png(current, path)?)?;
        debug!(path = %path.display(), "image baseline created");
        return Ok(Outcome::Created);
    };

    let baseline =
        image::load_from_memory(&baseline).map_err(|e| ExpectError::image("decode", path, e))?;
    let current_path = current_image_path(path);
    let diff_path = diff_image_path(path);

    match compare_images(&baseline, current, policy) {
        Comparison::SizeMismatch { expected, actual } => {
            warn!(path = %path.display(), ?expected, ?actual, "image size mismatch");
            reporter.error(format!(
                "expected image size to be ({},{}) but it is ({},{})",
                expected.0, expected.1, actual.0, actual.1
            ));
            write_artifact(&current_path, &encode_png(current, &current_path)?)?;
            remove_stale(&diff_path);
            Ok(Outcome::Mismatched)
        }
        comparison @ Comparison::Compared { .. } if comparison.is_match(policy) => {
            debug!(path = %path.display(), ratio = comparison.mismatch_ratio(), "image snapshot matched");
            remove_stale(&current_path);
            remove_stale(&diff_path);
            Ok(Outcome::Matched)
        }
        comparison => {
            let ratio = comparison.mismatch_ratio();
            warn!(path = %path.display(), ratio, "image snapshot mismatch");
            reporter.error(format!(
                "expected image does not match snapshot, {:.1}% of pixels do not match",
                ratio * 100.0
            ));
            write_artifact(&current_path, &encode_png(current, &current_path)?)?;
            if let Comparison::Compared { diff, .. } = comparison {
                let diff = DynamicImage::ImageRgba8(diff);
                write_artifact(&diff_path, &encode_png(&diff, &diff_path)?)?;
            }
            Ok(Outcome::Mismatched)
        }
    }
}

// ============================================================================
// IN-MEMORY IMAGE EXPECTATIONS
// ============================================================================

/// Expectation over a decoded image, created by [`expect_image`].
pub struct ImageExpectation<'r> {
    name: String,
    reporter: &'r dyn Reporter,
    image: DynamicImage,
    policy: ImageTolerancePolicy,
    aborted: bool,
}

/// Starts an expectation on an in-memory image, using the default tolerance policy.
#[track_caller]
pub fn expect_image<'r>(
    reporter: &'r dyn Reporter,
    name: impl Into<String>,
    image: DynamicImage,
) -> ImageExpectation<'r> {
    ImageExpectation {
        name: name.into(),
        reporter,
        image,
        policy: config::defaults().image,
        aborted: false,
    }
}

impl<'r> ImageExpectation<'r> {
    pub fn with_policy(mut self, policy: ImageTolerancePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Compares the image with the PNG baseline at `path`.
    #[track_caller]
    pub fn to_be_snapshot(mut self, path: impl AsRef<Path>) -> Self {
        if self.aborted {
            return self;
        }
        let outcome =
            compare_or_create_image(self.reporter, path.as_ref(), &self.image, &self.policy);
        self.aborted = outcome == Outcome::Aborted;
        self
    }
}
