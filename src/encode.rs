//! PNG and JPEG encoding of decoded rasters.
//!
//! Both encoders write through [`std::io::Write`], so the output can be
//! captured incrementally by an [`ImageBuffer`](crate::ImageBuffer) or any
//! other sink.

use crate::config::TranscodeConfig;
use crate::decode::RgbaPixels;
use crate::error::{Error, Result};
use crate::types::OutputFormat;
use std::io::{self, Write};
use whereat::*;

/// Encode `pixels` into `sink` in the requested format.
pub fn encode<W: Write>(
    pixels: &RgbaPixels,
    format: OutputFormat,
    config: &TranscodeConfig,
    sink: W,
) -> Result<()> {
    match format {
        OutputFormat::Png => encode_png(pixels, config, sink),
        OutputFormat::Jpeg => encode_jpeg(pixels, config, sink),
    }
}

/// Encode as an 8-bit RGBA PNG.
#[cfg(feature = "png")]
pub fn encode_png<W: Write>(pixels: &RgbaPixels, config: &TranscodeConfig, sink: W) -> Result<()> {
    let mut encoder = png::Encoder::new(sink, pixels.width(), pixels.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    if config.png_compression == crate::config::PngCompression::Fast {
        encoder.set_compression(png::Compression::Fast);
    }

    let mut writer = encoder.write_header().map_err(png_error)?;
    writer
        .write_image_data(pixels.as_bytes())
        .map_err(png_error)?;
    writer.finish().map_err(png_error)?;
    Ok(())
}

/// Encode as an 8-bit RGBA PNG.
#[cfg(not(feature = "png"))]
pub fn encode_png<W: Write>(
    _pixels: &RgbaPixels,
    _config: &TranscodeConfig,
    _sink: W,
) -> Result<()> {
    Err(at!(Error::UnsupportedFormat(OutputFormat::Png)))
}

#[cfg(feature = "png")]
fn png_error(e: png::EncodingError) -> whereat::At<Error> {
    match e {
        png::EncodingError::IoError(io) => io_error(OutputFormat::Png, io),
        other => at!(Error::EncodeFailed {
            format: OutputFormat::Png,
            reason: other.to_string(),
        }),
    }
}

/// Encode as a baseline RGB JPEG. The alpha channel is dropped.
#[cfg(feature = "jpeg")]
pub fn encode_jpeg<W: Write>(pixels: &RgbaPixels, config: &TranscodeConfig, sink: W) -> Result<()> {
    config.validate()?;

    let rgb: Vec<u8> = pixels
        .as_img()
        .pixels()
        .flat_map(|px| {
            let px = px.rgb();
            [px.r, px.g, px.b]
        })
        .collect();

    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(sink, config.jpeg_quality);
    encoder
        .encode(
            &rgb,
            pixels.width(),
            pixels.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| match e {
            image::ImageError::IoError(io) => io_error(OutputFormat::Jpeg, io),
            other => at!(Error::EncodeFailed {
                format: OutputFormat::Jpeg,
                reason: other.to_string(),
            }),
        })
}

/// Encode as a baseline RGB JPEG. The alpha channel is dropped.
#[cfg(not(feature = "jpeg"))]
pub fn encode_jpeg<W: Write>(
    _pixels: &RgbaPixels,
    _config: &TranscodeConfig,
    _sink: W,
) -> Result<()> {
    Err(at!(Error::UnsupportedFormat(OutputFormat::Jpeg)))
}

#[cfg(any(feature = "png", feature = "jpeg"))]
fn io_error(format: OutputFormat, e: io::Error) -> whereat::At<Error> {
    if e.kind() == io::ErrorKind::OutOfMemory {
        at!(Error::OutOfMemory)
    } else {
        at!(Error::EncodeFailed {
            format,
            reason: e.to_string(),
        })
    }
}
