//! # webp-transcode
//!
//! Decode WebP images and re-encode them as PNG or JPEG, from Rust or across
//! a C/WebAssembly boundary.
//!
//! WebP decoding goes through libwebp; PNG output through the `png` crate
//! and JPEG output through the `image` crate's encoder. Encoder output is
//! captured incrementally into a growable [`ImageBuffer`] owned by an
//! [`ImageHandle`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! let webp_bytes = std::fs::read("image.webp").unwrap();
//!
//! let png = webp_transcode::webp_to_png(&webp_bytes)?;
//! assert!(png.bytes().starts_with(b"\x89PNG"));
//!
//! let jpeg = webp_transcode::webp_to_jpeg(&webp_bytes)?;
//! assert!(jpeg.bytes().starts_with(&[0xFF, 0xD8]));
//! # Ok::<(), webp_transcode::At<webp_transcode::Error>>(())
//! ```
//!
//! ## Boundary API
//!
//! The [`ffi`] module exports `create_buffer`, `destroy_buffer`,
//! `get_png_handle_from_webp`, `get_jpg_handle_from_webp`,
//! `get_image_bytes_from_handle`, `get_num_bytes_from_handle` and
//! `release_image_handle` for hosts that can only exchange pointers and
//! integers.

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

mod buffer;
mod config;
mod decode;
mod encode;
mod error;
mod handle;
mod transcode;
mod types;

pub mod ffi;
pub mod staging;

whereat::define_at_crate_info!();

// Re-exports
pub use buffer::{ImageBuffer, MIN_GROWTH};
pub use config::{PngCompression, TranscodeConfig, BOUNDARY_JPEG_QUALITY};
pub use decode::{decode_rgba, decode_to_img, RgbaPixels};
pub use encode::{encode, encode_jpeg, encode_png};
pub use error::{DecodingError, Error, ErrorCode, Result};
pub use handle::ImageHandle;
pub use transcode::{webp_to_jpeg, webp_to_png, Transcoder};
pub use types::{BitstreamFormat, ImageInfo, OutputFormat};
pub use whereat::At;

/// libwebp decoder version.
pub fn version() -> (u32, u32, u32) {
    let v = unsafe { libwebp_sys::WebPGetDecoderVersion() } as u32;
    ((v >> 16) & 0xff, (v >> 8) & 0xff, v & 0xff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let (major, minor, patch) = version();
        assert!(
            major >= 1,
            "Expected libwebp 1.x, got {}.{}.{}",
            major,
            minor,
            patch
        );
    }
}
