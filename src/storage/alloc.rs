//! The allocator capability consumed by the storage engine.
//!
//! The engine never calls `std::alloc` directly; it talks to a [`RawAllocator`], a
//! byte-granularity allocate / reallocate / deallocate capability with no construction
//! semantics. [`Global`] is the default implementation over the standard global allocator.
//! Tests substitute allocators that fail on demand.

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use super::error::OutOfMemory;

/// A raw, byte-granularity allocation capability.
///
/// Implementations hand out uninitialized bytes; constructing and destroying elements in them
/// is entirely the caller's business. Allocation and reallocation may fail and say so through
/// [`OutOfMemory`] instead of panicking or aborting. Deallocation cannot fail.
///
/// An implementation must be stateless or internally synchronized if it is shared between
/// engines; the engine itself never synchronizes allocator calls.
///
/// # Contract
/// - `allocate` and `reallocate` are never called with a zero-size layout; the buffer layer
///   guards zero capacities and zero-sized element types before reaching the allocator.
/// - On `reallocate` failure the original block is still valid and still owned by the caller.
/// - A block must be deallocated with the same layout it was last (re)allocated with.
pub trait RawAllocator {
    /// Allocates a block of bytes described by `layout`.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] if the allocator cannot satisfy the request.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, OutOfMemory>;

    /// Grows or shrinks the block at `ptr` from `old_layout` to `new_size` bytes, preserving
    /// the leading `min(old, new)` bytes. The allocator may move the block.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] if the allocator cannot satisfy the request; the original block
    /// remains valid in that case.
    ///
    /// # Safety
    /// `ptr` must denote a block currently allocated by this allocator with `old_layout`, and
    /// `new_size` must be non-zero and must not overflow [`isize::MAX`] when rounded up to
    /// `old_layout.align()`.
    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, OutOfMemory>;

    /// Returns the block at `ptr` to the allocator.
    ///
    /// # Safety
    /// `ptr` must denote a block currently allocated by this allocator with `layout`. The block
    /// must not be used after this call.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The standard global allocator, exposed as a [`RawAllocator`].
///
/// A zero-sized type: every [`Global`] is the same allocator, so it can be cloned freely and
/// costs nothing to store inside each engine.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Global;

impl RawAllocator for Global {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, OutOfMemory> {
        // SAFETY: The trait contract guarantees a non-zero layout size.
        let raw = unsafe { alloc::alloc(layout) };

        NonNull::new(raw).ok_or(OutOfMemory {
            bytes: layout.size(),
        })
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, OutOfMemory> {
        // SAFETY: ptr was allocated by this allocator with old_layout, and new_size meets
        // realloc's size requirements; both are guaranteed by the caller.
        let raw = unsafe { alloc::realloc(ptr.as_ptr(), old_layout, new_size) };

        NonNull::new(raw).ok_or(OutOfMemory { bytes: new_size })
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: ptr was allocated by this allocator with layout, as guaranteed by the caller.
        unsafe { alloc::dealloc(ptr.as_ptr(), layout) }
    }
}
