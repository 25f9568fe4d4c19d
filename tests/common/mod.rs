//! # Shared Test Helpers
//!
//! Scratch directories, log capture and image fixtures used across the integration
//! tests. Not every test binary uses every helper.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Once;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Routes library events to the libtest output capture. Set `RUST_LOG` to see more.
pub fn init_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("expecto=debug")),
            )
            .try_init();
    });
}

/// A fresh directory for snapshot files, removed when dropped.
pub struct Scratch {
    dir: TempDir,
}

impl Scratch {
    pub fn new() -> Self {
        init_logging();
        Self {
            dir: tempfile::tempdir().expect("create scratch dir"),
        }
    }

    /// Absolute path of `name` inside the scratch directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    pub fn read_string(&self, name: &str) -> String {
        std::fs::read_to_string(self.path(name)).expect("read scratch file")
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }
}

/// An image filled with a single color.
pub fn solid_image(width: u32, height: u32, rgba: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(rgba)))
}

/// A deterministic gradient, so pixel comparisons are not trivially uniform.
pub fn sample_image(width: u32, height: u32) -> DynamicImage {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 4 % 256) as u8, (y * 4 % 256) as u8, ((x + y) % 256) as u8, 255])
    });
    DynamicImage::ImageRgba8(img)
}

/// `image` with the pixel at `(x, y)` replaced.
pub fn with_pixel(image: &DynamicImage, x: u32, y: u32, rgba: [u8; 4]) -> DynamicImage {
    let mut img = image.to_rgba8();
    img.put_pixel(x, y, Rgba(rgba));
    DynamicImage::ImageRgba8(img)
}

pub fn png_bytes(image: &DynamicImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode png");
    bytes
}
