//! Allocation tracking for the transcode and boundary paths.
//!
//! A counting global allocator records live bytes per thread, so tests
//! running in parallel do not see each other's allocations.
//!
//! Memory libwebp allocates through C `malloc`, including the decoded
//! raster, is not counted. The encode-failure test decodes a real raster and
//! drops it after the encoder errors, so `RgbaPixels::drop` runs on that
//! exit; these counters cannot tell whether `WebPFree` released it.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::io::{self, Write};

use webp_transcode::ffi::*;
use webp_transcode::*;

struct Counting;

thread_local! {
    static LIVE_BYTES: Cell<isize> = const { Cell::new(0) };
}

fn track(delta: isize) {
    let _ = LIVE_BYTES.try_with(|live| live.set(live.get() + delta));
}

unsafe impl GlobalAlloc for Counting {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            track(layout.size() as isize);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) };
        track(-(layout.size() as isize));
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() {
            track(new_size as isize - layout.size() as isize);
        }
        new_ptr
    }
}

#[global_allocator]
static GLOBAL: Counting = Counting;

fn live_bytes() -> isize {
    LIVE_BYTES.with(Cell::get)
}

/// Live bytes left behind by `f`, after `f`'s own return value is dropped.
fn leaked_by<R>(f: impl FnOnce() -> R) -> isize {
    let before = live_bytes();
    drop(f());
    live_bytes() - before
}

fn fixture_webp(width: u32, height: u32) -> Vec<u8> {
    let rgba: Vec<u8> = (0..width * height)
        .flat_map(|i| [(i % 256) as u8, (i / 7 % 256) as u8, 90, 255])
        .collect();
    let mut out = Vec::new();
    image::codecs::webp::WebPEncoder::new_lossless(&mut out)
        .encode(&rgba, width, height, image::ExtendedColorType::Rgba8)
        .expect("webp fixture encode failed");
    out
}

/// Run every path once so one-time runtime allocations are not counted.
fn warm_up(webp: &[u8]) {
    let _ = webp_to_png(webp);
    let _ = webp_to_jpeg(webp);
    let _ = webp_to_png(&webp[..webp.len() / 2]);
    let _ = get_last_error_code();
}

#[test]
fn test_no_leak_on_decode_failure() {
    let webp = fixture_webp(32, 32);
    warm_up(&webp);

    for cut in [8, 20, webp.len() / 2] {
        let truncated = &webp[..cut];
        let leaked = leaked_by(|| assert!(webp_to_png(truncated).is_err()));
        assert_eq!(leaked, 0, "png, cut {}", cut);
        let leaked = leaked_by(|| assert!(webp_to_jpeg(truncated).is_err()));
        assert_eq!(leaked, 0, "jpeg, cut {}", cut);
    }
    assert_eq!(leaked_by(|| assert!(webp_to_png(b"garbage").is_err())), 0);
}

/// Sink that accepts the given number of bytes and then fails.
struct FailAfter(usize);

impl Write for FailAfter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.0 == 0 {
            return Err(io::Error::other("sink full"));
        }
        let n = buf.len().min(self.0);
        self.0 -= n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_no_leak_on_encode_failure() {
    let webp = fixture_webp(32, 32);
    warm_up(&webp);
    let config = TranscodeConfig::new();

    for format in [OutputFormat::Png, OutputFormat::Jpeg] {
        let fail_encode = || {
            let pixels = decode_rgba(&webp).expect("decode failed");
            let err = encode(&pixels, format, &config, FailAfter(50)).unwrap_err();
            assert!(matches!(err.error(), Error::EncodeFailed { .. }), "{}", err);
        };
        fail_encode();

        assert_eq!(leaked_by(fail_encode), 0, "{}", format);
    }
}

#[test]
fn test_no_leak_through_boundary_failure() {
    let webp = fixture_webp(16, 16);
    warm_up(&webp);

    let leaked = leaked_by(|| {
        let input = create_buffer(webp.len() / 2);
        unsafe {
            core::ptr::copy_nonoverlapping(webp.as_ptr(), input, webp.len() / 2);
            let handle = get_png_handle_from_webp(input, webp.len() / 2);
            assert!(handle.is_null());
            release_image_handle(handle);
            destroy_buffer(input);
        }
    });
    assert_eq!(leaked, 0);

    let leaked = leaked_by(|| {
        let handle = unsafe { get_jpg_handle_from_webp(core::ptr::null(), 100) };
        assert!(handle.is_null());
    });
    assert_eq!(leaked, 0);
}

#[test]
fn test_single_release_frees_everything() {
    let webp = fixture_webp(24, 24);
    warm_up(&webp);

    for transcode in [get_png_handle_from_webp, get_jpg_handle_from_webp] {
        let before = live_bytes();

        let input = create_buffer(webp.len());
        unsafe { core::ptr::copy_nonoverlapping(webp.as_ptr(), input, webp.len()) };
        let handle = unsafe { transcode(input, webp.len()) };
        assert!(!handle.is_null());
        assert!(live_bytes() > before, "handle should hold live memory");

        unsafe {
            release_image_handle(handle);
            destroy_buffer(input);
        }
        assert_eq!(live_bytes(), before);
    }
}

#[test]
fn test_staging_buffers_are_freed() {
    let leaked = leaked_by(|| {
        for size in [1, 7, 128, 4096, 1 << 20] {
            let ptr = create_buffer(size);
            assert!(!ptr.is_null());
            unsafe { destroy_buffer(ptr) };
        }
        assert!(create_buffer(0).is_null());
    });
    assert_eq!(leaked, 0);
}

#[test]
fn test_growable_buffer_is_freed() {
    let leaked = leaked_by(|| {
        let mut buf = ImageBuffer::new();
        for i in 0..1000u32 {
            buf.append(&i.to_le_bytes()).unwrap();
        }
        assert_eq!(buf.len(), 4000);
    });
    assert_eq!(leaked, 0);
}
