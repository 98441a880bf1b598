//! C/WebAssembly boundary.
//!
//! Only pointers and integers cross the boundary, so every structured value
//! is exchanged through explicit setup and teardown calls. They must be made
//! in the right order because they hand raw memory back and forth.
//!
//! # JavaScript WebAssembly example
//!
//! ```js
//! const { instance } = await WebAssembly.instantiateStreaming(fetch('webp_transcode.wasm'));
//! const wasm = instance.exports;
//!
//! // Stage the WebP file inside the instance's memory.
//! const webp = new Uint8Array(await (await fetch('image.webp')).arrayBuffer());
//! const input = wasm.create_buffer(webp.length);
//! new Uint8Array(wasm.memory.buffer, input, webp.length).set(webp);
//!
//! // Transcode. A null (0) handle means no output was produced.
//! const handle = wasm.get_png_handle_from_webp(input, webp.length);
//! wasm.destroy_buffer(input);
//! if (handle === 0) {
//!   throw new Error(`transcode failed with code ${wasm.get_last_error_code()}`);
//! }
//!
//! // Copy the PNG out, then release the handle exactly once.
//! const ptr = wasm.get_image_bytes_from_handle(handle);
//! const len = wasm.get_num_bytes_from_handle(handle);
//! const png = new Uint8Array(wasm.memory.buffer, ptr, len).slice();
//! wasm.release_image_handle(handle);
//! ```
//!
//! Input buffers and output handles are separate ownership domains: an input
//! buffer is freed with `destroy_buffer`, a handle with
//! `release_image_handle`. Mixing them up is undefined behaviour.

use crate::error::ErrorCode;
use crate::handle::ImageHandle;
use crate::staging;
use crate::transcode::Transcoder;
use crate::types::OutputFormat;
use core::cell::Cell;
use core::ptr;

std::thread_local! {
    static LAST_ERROR: Cell<ErrorCode> = const { Cell::new(ErrorCode::None) };
}

fn set_last_error(code: ErrorCode) {
    LAST_ERROR.with(|last| last.set(code));
}

/// Allocate a buffer of `size` bytes for staging input.
///
/// Returns null when `size` is zero or allocation fails.
#[no_mangle]
pub extern "C" fn create_buffer(size: usize) -> *mut u8 {
    staging::allocate(size)
}

/// Free a buffer returned by `create_buffer`. Null is a no-op.
///
/// # Safety
///
/// `ptr` must be null or come from `create_buffer` and not have been freed.
/// Never pass an image handle here.
#[no_mangle]
pub unsafe extern "C" fn destroy_buffer(ptr: *mut u8) {
    unsafe { staging::deallocate(ptr) }
}

unsafe fn transcode_to_handle(
    webp_ptr: *const u8,
    size: usize,
    format: OutputFormat,
) -> *mut ImageHandle {
    match unsafe { Transcoder::new().transcode_raw(webp_ptr, size, format) } {
        Ok(handle) => {
            set_last_error(ErrorCode::None);
            handle.into_raw()
        }
        Err(e) => {
            set_last_error(ErrorCode::from(e.error()));
            ptr::null_mut()
        }
    }
}

/// Transcode `size` bytes of WebP at `webp_ptr` to PNG.
///
/// Returns an image handle, or null on failure. The handle must be freed
/// with `release_image_handle`.
///
/// # Safety
///
/// A non-null `webp_ptr` must be valid for reads of `size` bytes.
#[no_mangle]
pub unsafe extern "C" fn get_png_handle_from_webp(
    webp_ptr: *const u8,
    size: usize,
) -> *mut ImageHandle {
    unsafe { transcode_to_handle(webp_ptr, size, OutputFormat::Png) }
}

/// Transcode `size` bytes of WebP at `webp_ptr` to JPEG at quality 100.
///
/// Returns an image handle, or null on failure. The handle must be freed
/// with `release_image_handle`.
///
/// # Safety
///
/// A non-null `webp_ptr` must be valid for reads of `size` bytes.
#[no_mangle]
pub unsafe extern "C" fn get_jpg_handle_from_webp(
    webp_ptr: *const u8,
    size: usize,
) -> *mut ImageHandle {
    unsafe { transcode_to_handle(webp_ptr, size, OutputFormat::Jpeg) }
}

/// Pointer to a handle's encoded bytes, valid until the handle is released.
/// Null for a null handle.
///
/// # Safety
///
/// `handle` must be null or a live handle from a transcode export.
#[no_mangle]
pub unsafe extern "C" fn get_image_bytes_from_handle(handle: *const ImageHandle) -> *const u8 {
    match unsafe { ImageHandle::from_ptr(handle) } {
        Some(handle) => handle.as_ptr(),
        None => ptr::null(),
    }
}

/// Number of encoded bytes behind a handle. Zero for a null handle.
///
/// # Safety
///
/// `handle` must be null or a live handle from a transcode export.
#[no_mangle]
pub unsafe extern "C" fn get_num_bytes_from_handle(handle: *const ImageHandle) -> usize {
    unsafe { ImageHandle::from_ptr(handle) }.map_or(0, ImageHandle::len)
}

/// Free a handle and its encoded bytes. Null is a no-op.
///
/// # Safety
///
/// `handle` must be null or a live handle from a transcode export, and must
/// not be used after this call. Never pass a `create_buffer` pointer here.
#[no_mangle]
pub unsafe extern "C" fn release_image_handle(handle: *mut ImageHandle) {
    unsafe { ImageHandle::release(handle) }
}

/// Error code of the calling thread's most recent transcode, 0 on success.
///
/// See [`ErrorCode`] for the values.
#[no_mangle]
pub extern "C" fn get_last_error_code() -> u8 {
    LAST_ERROR.with(Cell::get) as u8
}

/// libwebp decoder version packed as `0xMMmmpp`.
#[no_mangle]
pub extern "C" fn get_decoder_version() -> u32 {
    let (major, minor, patch) = crate::version();
    (major << 16) | (minor << 8) | patch
}
