//! WebP decoding functionality.

use crate::error::{DecodingError, Error, Result};
use crate::types::ImageInfo;
use imgref::{ImgRef, ImgVec};
use rgb::{FromSlice, RGBA8};
use whereat::*;

/// RGBA raster decoded by libwebp.
///
/// The pixel memory belongs to libwebp and is returned with `WebPFree` when
/// this value is dropped, so the raster is released on every exit path of a
/// transcode without an explicit free.
pub struct RgbaPixels {
    ptr: *mut u8,
    len: usize,
    width: u32,
    height: u32,
}

impl RgbaPixels {
    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major, `width * 4` bytes per row.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: ptr is a live libwebp allocation of exactly len bytes.
        unsafe { core::slice::from_raw_parts(self.ptr, self.len) }
    }

    /// Typed view of the raster.
    pub fn as_img(&self) -> ImgRef<'_, RGBA8> {
        ImgRef::new(
            self.as_bytes().as_rgba(),
            self.width as usize,
            self.height as usize,
        )
    }

    /// Copy the raster into an owned image.
    pub fn to_img(&self) -> ImgVec<RGBA8> {
        ImgVec::new(
            self.as_bytes().as_rgba().to_vec(),
            self.width as usize,
            self.height as usize,
        )
    }
}

// SAFETY: the raster is uniquely owned and libwebp memory may be freed from
// any thread.
unsafe impl Send for RgbaPixels {}

impl Drop for RgbaPixels {
    fn drop(&mut self) {
        unsafe { libwebp_sys::WebPFree(self.ptr as *mut _) };
    }
}

impl core::fmt::Debug for RgbaPixels {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RgbaPixels")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Decode WebP data to RGBA pixels.
///
/// The header is probed first so that a malformed or truncated stream is
/// reported as [`Error::InvalidWebP`] before any pixel memory is allocated.
/// Animated files are rejected.
///
/// # Example
///
/// ```rust,no_run
/// let webp_data: &[u8] = &[0u8; 100]; // placeholder
/// let pixels = webp_transcode::decode_rgba(webp_data)?;
/// println!("{}x{}", pixels.width(), pixels.height());
/// # Ok::<(), webp_transcode::At<webp_transcode::Error>>(())
/// ```
pub fn decode_rgba(data: &[u8]) -> Result<RgbaPixels> {
    if data.is_empty() {
        return Err(at!(Error::EmptyInput));
    }

    let info = ImageInfo::from_webp(data)?;
    if info.has_animation {
        return Err(at!(Error::DecodeFailed(DecodingError::UnsupportedFeature)));
    }
    let len = info.rgba_len().ok_or_else(|| at!(Error::OutOfMemory))?;

    let mut width: i32 = 0;
    let mut height: i32 = 0;
    let ptr =
        unsafe { libwebp_sys::WebPDecodeRGBA(data.as_ptr(), data.len(), &mut width, &mut height) };

    if ptr.is_null() {
        return Err(at!(Error::DecodeFailed(DecodingError::BitstreamError)));
    }
    let pixels = RgbaPixels {
        ptr,
        len,
        width: width as u32,
        height: height as u32,
    };

    if pixels.width != info.width || pixels.height != info.height {
        return Err(at!(Error::DecodeFailed(DecodingError::BitstreamError)));
    }

    Ok(pixels)
}

/// Decode WebP data to an imgref image.
pub fn decode_to_img(data: &[u8]) -> Result<ImgVec<RGBA8>> {
    Ok(decode_rgba(data)?.to_img())
}
