//! Transcode configuration.

use crate::error::{Error, Result};
use whereat::*;

/// JPEG quality used at the C/WebAssembly boundary.
pub const BOUNDARY_JPEG_QUALITY: u8 = 100;

/// PNG compression effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum PngCompression {
    /// The encoder's default balance of speed and size.
    #[default]
    Default,
    /// Faster encoding, larger output.
    Fast,
}

/// Transcode configuration. Reusable across images.
///
/// # Example
///
/// ```rust
/// use webp_transcode::{PngCompression, TranscodeConfig};
///
/// let config = TranscodeConfig::new()
///     .jpeg_quality(90)
///     .png_compression(PngCompression::Fast);
/// config.validate()?;
/// # Ok::<(), webp_transcode::At<webp_transcode::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeConfig {
    pub(crate) jpeg_quality: u8,
    pub(crate) png_compression: PngCompression,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: BOUNDARY_JPEG_QUALITY,
            png_compression: PngCompression::Default,
        }
    }
}

impl TranscodeConfig {
    /// Create a configuration with the boundary defaults (JPEG quality 100).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set JPEG quality (1-100).
    #[must_use]
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Set PNG compression effort.
    #[must_use]
    pub fn png_compression(mut self, compression: PngCompression) -> Self {
        self.png_compression = compression;
        self
    }

    /// Configured JPEG quality.
    pub fn get_jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    /// Configured PNG compression.
    pub fn get_png_compression(&self) -> PngCompression {
        self.png_compression
    }

    /// Check the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(at!(Error::InvalidConfig(format!(
                "jpeg quality must be 1-100, got {}",
                self.jpeg_quality
            ))));
        }
        Ok(())
    }
}
