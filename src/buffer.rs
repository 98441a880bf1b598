//! Append-only byte sink for encoder output.

use crate::error::{Error, Result};
use std::io;
use whereat::*;

/// Smallest capacity step taken when the buffer has to grow.
///
/// Encoders tend to emit many small chunks (chunk headers, single rows), so
/// growing by at least this much keeps the number of reallocations low.
pub const MIN_GROWTH: usize = 128;

/// Growable byte buffer that encoders write into.
///
/// Bytes are only ever appended. Growth is fallible: if the allocator cannot
/// satisfy a request, [`append`](Self::append) fails and the bytes written so
/// far stay intact.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    bytes: Vec<u8>,
}

impl ImageBuffer {
    /// Create an empty buffer. Does not allocate.
    #[must_use]
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Create an empty buffer able to hold `capacity` bytes without growing.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Append `data`, growing the backing storage if needed.
    pub fn append(&mut self, data: &[u8]) -> Result<()> {
        self.reserve_for(data.len())?;
        self.bytes.extend_from_slice(data);
        Ok(())
    }

    /// Number of bytes written.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether nothing has been written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Bytes the buffer can hold before it has to grow again.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    /// The written bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Pointer to the first written byte. Dangling (non-null) when empty.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.bytes.as_ptr()
    }

    /// Consume the buffer, returning the written bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }

    fn reserve_for(&mut self, additional: usize) -> Result<()> {
        let spare = self.bytes.capacity() - self.bytes.len();
        if spare >= additional {
            return Ok(());
        }

        // Grow by max(additional, MIN_GROWTH), or double, whichever is larger.
        let step = additional.max(MIN_GROWTH).max(self.bytes.capacity());
        let target = self
            .bytes
            .capacity()
            .checked_add(step)
            .ok_or_else(|| at!(Error::OutOfMemory))?;

        self.bytes
            .try_reserve_exact(target - self.bytes.len())
            .map_err(|_| at!(Error::OutOfMemory))
    }
}

impl io::Write for ImageBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf)
            .map_err(|_| io::Error::from(io::ErrorKind::OutOfMemory))?;
        Ok(buf.len())
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.write(buf).map(|_| ())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_new_buffer_is_unallocated() {
        let buf = ImageBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), 0);
    }

    #[test]
    fn test_small_append_grows_by_floor() {
        let mut buf = ImageBuffer::new();
        buf.append(&[1]).unwrap();
        assert_eq!(buf.len(), 1);
        assert!(buf.capacity() >= MIN_GROWTH);

        // Fits in the spare capacity, so no further growth.
        let cap = buf.capacity();
        buf.append(&[2; 100]).unwrap();
        assert_eq!(buf.capacity(), cap);
    }

    #[test]
    fn test_large_append_grows_past_request() {
        let mut buf = ImageBuffer::new();
        buf.append(&[7; 1000]).unwrap();
        assert_eq!(buf.len(), 1000);
        assert!(buf.capacity() >= 1000);
    }

    #[test]
    fn test_chunked_appends_concatenate() {
        let data: Vec<u8> = (0..5000u32).map(|i| (i * 31 % 251) as u8).collect();

        for chunk_size in [1, 3, 127, 128, 129, 4096] {
            let mut buf = ImageBuffer::new();
            for chunk in data.chunks(chunk_size) {
                buf.append(chunk).unwrap();
                assert!(buf.capacity() >= buf.len());
            }
            assert_eq!(buf.len(), data.len(), "chunk size {}", chunk_size);
            assert_eq!(buf.as_slice(), &data[..], "chunk size {}", chunk_size);
        }
    }

    #[test]
    fn test_empty_append() {
        let mut buf = ImageBuffer::new();
        buf.append(&[]).unwrap();
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), 0);
    }

    #[test]
    fn test_io_write() {
        let mut buf = ImageBuffer::with_capacity(4);
        buf.write_all(b"ab").unwrap();
        write!(buf, "{}-{}", 1, 2).unwrap();
        buf.flush().unwrap();
        assert_eq!(buf.into_vec(), b"ab1-2");
    }
}
