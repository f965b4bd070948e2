//! The owned buffer record: a pointer plus the number of raw slots behind it.
//!
//! [`RawBuf`] owns allocation, reallocation and deallocation and nothing else; it neither
//! constructs nor destroys elements, and it tracks no length. The engine layers element
//! bookkeeping on top.

use std::alloc::Layout;
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

use super::alloc::RawAllocator;
use super::error::{SizeOverflow, StorageError};
use super::lifecycle;

/// The maximum number of slots a buffer of `T` may hold. Zero-sized types never allocate, so
/// their count is unbounded.
pub(crate) const fn max_cap<T>() -> usize {
    if size_of::<T>() == 0 {
        usize::MAX
    } else {
        isize::MAX as usize / size_of::<T>()
    }
}

/// An owned run of `cap` raw slots of `T`, allocated through `A`.
///
/// The pointer is dangling iff `cap == 0` (or `T` is zero-sized); no allocation exists in
/// either case. Dropping a `RawBuf` frees the storage without touching its contents, so any
/// live elements must be destroyed first.
pub(crate) struct RawBuf<T, A: RawAllocator> {
    pub(crate) ptr: NonNull<T>,
    pub(crate) cap: usize,
    pub(crate) alloc: A,
    pub(crate) _phantom: PhantomData<T>,
}

impl<T, A: RawAllocator> RawBuf<T, A> {
    /// Creates an empty buffer. No allocation happens until the capacity changes.
    pub(crate) const fn new(alloc: A) -> RawBuf<T, A> {
        RawBuf {
            ptr: NonNull::dangling(),
            cap: 0,
            alloc,
            _phantom: PhantomData,
        }
    }

    /// Allocates a buffer of exactly `cap` slots.
    ///
    /// # Errors
    /// [`SizeOverflow`] if `cap` exceeds [`max_cap`], [`OutOfMemory`](super::OutOfMemory) if
    /// the allocator declines. No partial state escapes a failure.
    pub(crate) fn with_cap(alloc: A, cap: usize) -> Result<RawBuf<T, A>, StorageError> {
        if cap > max_cap::<T>() {
            return Err(SizeOverflow {
                requested: cap,
                max: max_cap::<T>(),
            }
            .into());
        }

        if cap == 0 || size_of::<T>() == 0 {
            let mut buf = RawBuf::new(alloc);
            buf.cap = cap;
            return Ok(buf);
        }

        let layout = Self::layout_for(cap);
        let ptr = alloc.allocate(layout)?.cast();

        Ok(RawBuf {
            ptr,
            cap,
            alloc,
            _phantom: PhantomData,
        })
    }

    /// Grows the buffer to exactly `new_cap` slots, preserving the first `live` elements.
    ///
    /// Elements without drop glue ride the allocator's own `reallocate`, which may extend the
    /// block in place; everything else takes the conservative route of a fresh allocation, a
    /// relocation of the live prefix and a free of the old block. Either way, a failure leaves
    /// the buffer and its contents exactly as they were.
    ///
    /// # Errors
    /// [`SizeOverflow`] or [`OutOfMemory`](super::OutOfMemory), as for
    /// [`with_cap`](RawBuf::with_cap).
    pub(crate) fn grow_to(&mut self, new_cap: usize, live: usize) -> Result<(), StorageError> {
        debug_assert!(new_cap > self.cap);
        debug_assert!(live <= self.cap);

        if new_cap > max_cap::<T>() {
            return Err(SizeOverflow {
                requested: new_cap,
                max: max_cap::<T>(),
            }
            .into());
        }

        if size_of::<T>() == 0 {
            self.cap = new_cap;
            return Ok(());
        }

        let new_ptr = if self.cap == 0 {
            self.alloc.allocate(Self::layout_for(new_cap))?.cast()
        } else if !mem::needs_drop::<T>() {
            let old_layout = Self::layout_for(self.cap);
            // max_cap has been checked, so the byte count fits in isize::MAX.
            let new_bytes = new_cap * size_of::<T>();

            // SAFETY: ptr was allocated by self.alloc with old_layout (cap > 0 and T is not
            // zero-sized), and new_bytes is non-zero and within isize::MAX.
            unsafe { self.alloc.reallocate(self.ptr.cast(), old_layout, new_bytes)? }.cast()
        } else {
            let new_ptr: NonNull<T> = self.alloc.allocate(Self::layout_for(new_cap))?.cast();

            // SAFETY: The old buffer holds `live` live elements; the new block is freshly
            // allocated for new_cap > live slots and cannot overlap it.
            unsafe { lifecycle::relocate_range(new_ptr, self.ptr, live) };
            // SAFETY: ptr was allocated by self.alloc with the layout for the old capacity.
            // Its elements were just relocated out, so freeing the bytes is all that remains.
            unsafe {
                self.alloc
                    .deallocate(self.ptr.cast(), Self::layout_for(self.cap))
            };

            new_ptr
        };

        self.ptr = new_ptr;
        self.cap = new_cap;
        Ok(())
    }

    /// Frees the storage and resets the buffer to empty. Contents must already be dead.
    pub(crate) fn release_storage(&mut self) {
        if self.cap != 0 && size_of::<T>() != 0 {
            // SAFETY: ptr was allocated by self.alloc with the layout for cap; cap > 0 and T
            // is not zero-sized, so an allocation exists.
            unsafe {
                self.alloc
                    .deallocate(self.ptr.cast(), Self::layout_for(self.cap))
            };
        }

        self.ptr = NonNull::dangling();
        self.cap = 0;
    }

    /// Detaches the pointer and capacity, leaving the buffer empty and the allocation owned by
    /// the caller.
    pub(crate) const fn detach(&mut self) -> (NonNull<T>, usize) {
        let parts = (self.ptr, self.cap);
        self.ptr = NonNull::dangling();
        self.cap = 0;
        parts
    }

    /// Reconstitutes a buffer from parts produced by [`detach`](RawBuf::detach).
    ///
    /// # Safety
    /// `ptr` and `cap` must have come from a buffer of the same `T` allocated through an
    /// allocator interchangeable with `alloc`, and the allocation must not be owned elsewhere.
    pub(crate) const unsafe fn from_parts(ptr: NonNull<T>, cap: usize, alloc: A) -> RawBuf<T, A> {
        RawBuf {
            ptr,
            cap,
            alloc,
            _phantom: PhantomData,
        }
    }

    /// The layout for `cap` slots of `T`. Callers stay within [`max_cap`], so this cannot
    /// actually overflow.
    ///
    /// # Panics
    /// Panics if `cap` exceeds [`max_cap`], which would be an internal bug.
    fn layout_for(cap: usize) -> Layout {
        match Layout::array::<T>(cap) {
            Ok(layout) => layout,
            Err(_) => panic!("Capacity overflow!"),
        }
    }
}

impl<T, A: RawAllocator> Drop for RawBuf<T, A> {
    fn drop(&mut self) {
        self.release_storage();
    }
}
