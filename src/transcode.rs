//! WebP to PNG/JPEG transcoding.
//!
//! A transcode runs in two independently failable stages. Decode failures
//! mean the input is bad; encode failures mean the encoder or the output
//! buffer failed. [`Error::is_input_error`] tells the two apart.

use crate::buffer::ImageBuffer;
use crate::config::TranscodeConfig;
use crate::decode::decode_rgba;
use crate::encode::encode;
use crate::error::{Error, Result};
use crate::handle::ImageHandle;
use crate::types::OutputFormat;
use whereat::*;

/// Transcoder holding a reusable configuration.
///
/// Holds no state between calls, so one transcoder can be shared across
/// threads.
///
/// # Example
///
/// ```rust,no_run
/// use webp_transcode::{TranscodeConfig, Transcoder};
///
/// let webp_data: &[u8] = &[0u8; 100]; // placeholder
/// let transcoder = Transcoder::with_config(TranscodeConfig::new().jpeg_quality(90));
/// let jpeg = transcoder.to_jpeg(webp_data)?;
/// assert!(jpeg.bytes().starts_with(&[0xFF, 0xD8]));
/// # Ok::<(), webp_transcode::At<webp_transcode::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Transcoder {
    config: TranscodeConfig,
}

impl Transcoder {
    /// Create a transcoder with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transcoder with the given configuration.
    #[must_use]
    pub fn with_config(config: TranscodeConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &TranscodeConfig {
        &self.config
    }

    /// Decode `data` and re-encode it as `format`.
    ///
    /// On failure nothing is returned and every intermediate allocation has
    /// already been released.
    pub fn transcode(&self, data: &[u8], format: OutputFormat) -> Result<ImageHandle> {
        let pixels = decode_rgba(data).map_err(|e| {
            log::warn!("failed to decode {} byte WebP input: {}", data.len(), e);
            e
        })?;
        log::debug!(
            "decoded {}x{} WebP, encoding as {}",
            pixels.width(),
            pixels.height(),
            format
        );

        let mut output = ImageBuffer::new();
        encode(&pixels, format, &self.config, &mut output).map_err(|e| {
            log::warn!(
                "failed to encode {}x{} image as {}: {}",
                pixels.width(),
                pixels.height(),
                format,
                e
            );
            e
        })?;
        drop(pixels);

        log::debug!("encoded {} bytes of {}", output.len(), format);
        Ok(ImageHandle::new(output, format))
    }

    /// Transcode to PNG.
    pub fn to_png(&self, data: &[u8]) -> Result<ImageHandle> {
        self.transcode(data, OutputFormat::Png)
    }

    /// Transcode to JPEG.
    pub fn to_jpeg(&self, data: &[u8]) -> Result<ImageHandle> {
        self.transcode(data, OutputFormat::Jpeg)
    }

    /// Transcode WebP bytes given as a raw pointer and length.
    ///
    /// A null `ptr` fails with [`Error::NullInput`] and a zero `len` with
    /// [`Error::EmptyInput`]; neither is dereferenced.
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must be valid for reads of `len` bytes for the
    /// duration of the call.
    pub unsafe fn transcode_raw(
        &self,
        ptr: *const u8,
        len: usize,
        format: OutputFormat,
    ) -> Result<ImageHandle> {
        if ptr.is_null() {
            log::warn!("{} transcode called with a null input pointer", format);
            return Err(at!(Error::NullInput));
        }
        if len == 0 {
            log::warn!("{} transcode called with an empty input", format);
            return Err(at!(Error::EmptyInput));
        }

        let data = unsafe { core::slice::from_raw_parts(ptr, len) };
        self.transcode(data, format)
    }
}

/// Transcode WebP bytes to PNG with the default configuration.
///
/// # Example
///
/// ```rust,no_run
/// let webp_data: &[u8] = &[0u8; 100]; // placeholder
/// let png = webp_transcode::webp_to_png(webp_data)?;
/// std::fs::write("out.png", png.bytes()).unwrap();
/// # Ok::<(), webp_transcode::At<webp_transcode::Error>>(())
/// ```
pub fn webp_to_png(data: &[u8]) -> Result<ImageHandle> {
    Transcoder::new().to_png(data)
}

/// Transcode WebP bytes to JPEG at quality 100.
pub fn webp_to_jpeg(data: &[u8]) -> Result<ImageHandle> {
    Transcoder::new().to_jpeg(data)
}
