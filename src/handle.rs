//! Boundary-safe handle to an encoded image.

use crate::buffer::ImageBuffer;
use crate::types::OutputFormat;

/// An encoded image handed across the C/WebAssembly boundary.
///
/// The handle exclusively owns its output buffer. Its byte count is fixed
/// when it is created and never changes afterwards.
///
/// Rust callers use it as a normal owned value. Boundary callers receive it
/// as an opaque pointer from [`into_raw`](Self::into_raw) and must hand that
/// pointer back to [`release`](Self::release) exactly once.
#[derive(Debug)]
pub struct ImageHandle {
    byte_count: usize,
    format: OutputFormat,
    bytes: ImageBuffer,
}

impl ImageHandle {
    pub(crate) fn new(bytes: ImageBuffer, format: OutputFormat) -> Self {
        Self {
            byte_count: bytes.len(),
            format,
            bytes,
        }
    }

    /// The encoded bytes.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes.as_slice()[..self.byte_count]
    }

    /// Pointer to the encoded bytes, valid while the handle is alive.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.bytes.as_ptr()
    }

    /// Number of encoded bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.byte_count
    }

    /// Whether the encoded output is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.byte_count == 0
    }

    /// Format the bytes are encoded in.
    #[inline]
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Consume the handle, returning the encoded bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes.into_vec()
    }

    /// Move the handle to the heap and leak it as an opaque pointer.
    pub fn into_raw(self) -> *mut ImageHandle {
        Box::into_raw(Box::new(self))
    }

    /// Reclaim a handle previously leaked with [`into_raw`](Self::into_raw).
    ///
    /// # Safety
    ///
    /// `ptr` must be non-null, come from `into_raw`, and not have been
    /// reclaimed or released before.
    pub unsafe fn from_raw(ptr: *mut ImageHandle) -> Box<ImageHandle> {
        unsafe { Box::from_raw(ptr) }
    }

    /// Borrow a leaked handle. Returns `None` for null.
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must come from `into_raw` and still be alive for `'a`.
    pub unsafe fn from_ptr<'a>(ptr: *const ImageHandle) -> Option<&'a ImageHandle> {
        unsafe { ptr.as_ref() }
    }

    /// Free a leaked handle and its buffer. Null is a no-op.
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must come from `into_raw` and must not be used again.
    pub unsafe fn release(ptr: *mut ImageHandle) {
        if !ptr.is_null() {
            drop(unsafe { Self::from_raw(ptr) });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle_with(data: &[u8]) -> ImageHandle {
        let mut buf = ImageBuffer::new();
        buf.append(data).unwrap();
        ImageHandle::new(buf, OutputFormat::Png)
    }

    #[test]
    fn test_count_matches_buffer() {
        let handle = handle_with(b"encoded");
        assert_eq!(handle.len(), 7);
        assert_eq!(handle.bytes(), b"encoded");
        assert_eq!(handle.format(), OutputFormat::Png);
        assert_eq!(handle.into_vec(), b"encoded");
    }

    #[test]
    fn test_empty_handle() {
        let handle = ImageHandle::new(ImageBuffer::new(), OutputFormat::Jpeg);
        assert!(handle.is_empty());
        assert_eq!(handle.bytes(), b"");
    }

    #[test]
    fn test_raw_round_trip() {
        let ptr = handle_with(&[1, 2, 3]).into_raw();
        assert!(!ptr.is_null());

        let borrowed = unsafe { ImageHandle::from_ptr(ptr) }.unwrap();
        assert_eq!(borrowed.len(), 3);
        let view = unsafe { core::slice::from_raw_parts(borrowed.as_ptr(), borrowed.len()) };
        assert_eq!(view, &[1, 2, 3]);

        unsafe { ImageHandle::release(ptr) };
    }

    #[test]
    fn test_release_null() {
        unsafe { ImageHandle::release(core::ptr::null_mut()) };
        assert!(unsafe { ImageHandle::from_ptr(core::ptr::null()) }.is_none());
    }
}
