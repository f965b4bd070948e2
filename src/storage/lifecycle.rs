//! Lifecycle helpers: constructing, destroying and relocating ranges of elements in raw slots.
//!
//! These free functions are the only code in the crate that writes elements into or drops
//! elements out of uninitialized storage. The engine composes them; facades that translate
//! richer operations (insert-at, erase-range, resize-with-fill) into storage primitives use
//! them directly.
//!
//! Dispatch on element capability happens here and nowhere else: [`destroy_range`] is a no-op
//! for types without drop glue, and [`relocate_range`] is a plain byte copy for every `T`,
//! because ownership transfer in Rust is always a bitwise move. Cloning is performed
//! element-wise for all types; a byte-copy fast path would need a provable `Copy` bound the
//! call sites don't have, and the element-wise path is the conservative one.

use std::mem;
use std::ptr::{self, NonNull};

/// Default-constructs `count` elements into the slots starting at `dst`.
///
/// # Safety
/// `dst` must point to at least `count` allocated, properly aligned slots of `T`, none of which
/// hold a live value.
pub unsafe fn construct_range<T: Default>(dst: NonNull<T>, count: usize) {
    for i in 0..count {
        // SAFETY: The caller guarantees count in-bounds, aligned, dead slots starting at dst.
        unsafe { dst.add(i).write(T::default()) }
    }
}

/// Clone-constructs `count` copies of `value` into the slots starting at `dst`.
///
/// # Safety
/// `dst` must point to at least `count` allocated, properly aligned slots of `T`, none of which
/// hold a live value.
pub unsafe fn fill_range<T: Clone>(dst: NonNull<T>, count: usize, value: &T) {
    for i in 0..count {
        // SAFETY: The caller guarantees count in-bounds, aligned, dead slots starting at dst.
        unsafe { dst.add(i).write(value.clone()) }
    }
}

/// Clone-constructs the `count` live elements starting at `src` into the slots starting at
/// `dst`.
///
/// # Safety
/// `src` must point to `count` live elements, `dst` to at least `count` allocated, properly
/// aligned slots holding no live values, and the two ranges must not overlap.
pub unsafe fn clone_range<T: Clone>(dst: NonNull<T>, src: NonNull<T>, count: usize) {
    for i in 0..count {
        // SAFETY: src holds count live elements and dst holds count dead slots, per the caller;
        // non-overlap makes the shared reference sound while dst is written.
        unsafe { dst.add(i).write(src.add(i).as_ref().clone()) }
    }
}

/// Drops the `count` live elements starting at `dst`. Skipped entirely for types without drop
/// glue.
///
/// # Safety
/// `dst` must point to `count` live elements, which must not be used again after this call.
pub unsafe fn destroy_range<T>(dst: NonNull<T>, count: usize) {
    if !mem::needs_drop::<T>() {
        return;
    }

    for i in 0..count {
        // SAFETY: The caller guarantees count live, aligned elements starting at dst; each is
        // dropped exactly once.
        unsafe { ptr::drop_in_place(dst.add(i).as_ptr()) }
    }
}

/// Moves the `count` elements starting at `src` into the slots starting at `dst`, leaving the
/// source slots dead.
///
/// Ownership transfer is a bitwise copy for every Rust type, so this is a single
/// `copy_nonoverlapping`; the source elements must afterwards be treated as uninitialized, not
/// dropped.
///
/// # Safety
/// `src` must point to `count` live elements and `dst` to at least `count` allocated, properly
/// aligned slots holding no live values. The ranges must not overlap. After the call the
/// source slots no longer hold live values.
pub unsafe fn relocate_range<T>(dst: NonNull<T>, src: NonNull<T>, count: usize) {
    // SAFETY: Both ranges are valid for count elements and disjoint, per the caller.
    unsafe { ptr::copy_nonoverlapping(src.as_ptr(), dst.as_ptr(), count) }
}
