//! Raw buffers for staging input bytes inside this module's memory.
//!
//! A WebAssembly host cannot hand over a pointer into its own memory, so it
//! asks this module for a buffer, copies the WebP file into the instance's
//! linear memory, and passes the pointer and size to a transcode export.
//!
//! Unlike a `Vec`, a staged buffer is freed from the pointer alone: the
//! allocation size is kept in a header word just before the returned
//! pointer.

use core::mem::{align_of, size_of};
use core::ptr;
use std::alloc::{self, Layout};

const HEADER: usize = size_of::<usize>();
const ALIGN: usize = align_of::<usize>();

fn layout_for(size: usize) -> Option<Layout> {
    let total = size.checked_add(HEADER)?;
    Layout::from_size_align(total, ALIGN).ok()
}

/// Allocate `size` bytes of uninitialized memory.
///
/// Returns null when `size` is zero, too large, or the allocator fails.
/// The buffer must be freed with [`deallocate`].
pub fn allocate(size: usize) -> *mut u8 {
    if size == 0 {
        return ptr::null_mut();
    }
    let Some(layout) = layout_for(size) else {
        log::warn!("staging buffer of {} bytes exceeds the address space", size);
        return ptr::null_mut();
    };

    // SAFETY: layout has non-zero size.
    let base = unsafe { alloc::alloc(layout) };
    if base.is_null() {
        log::warn!("failed to allocate a staging buffer of {} bytes", size);
        return ptr::null_mut();
    }

    // SAFETY: base is aligned for usize and at least HEADER bytes long.
    unsafe {
        (base as *mut usize).write(size);
        base.add(HEADER)
    }
}

/// Free a buffer returned by [`allocate`]. Null is a no-op.
///
/// # Safety
///
/// A non-null `ptr` must come from [`allocate`] and not have been freed.
pub unsafe fn deallocate(ptr: *mut u8) {
    if ptr.is_null() {
        return;
    }
    unsafe {
        let base = ptr.sub(HEADER);
        let size = (base as *const usize).read();
        // The layout was valid when the buffer was allocated.
        let layout = Layout::from_size_align_unchecked(size + HEADER, ALIGN);
        alloc::dealloc(base, layout);
    }
}
