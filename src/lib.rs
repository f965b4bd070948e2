//! The growable contiguous-storage engine that sits underneath every contiguous container in
//! this library layer.
//!
//! # Purpose
//! Writing a dynamic array facade (vector, string, fixed array, string view) is mostly
//! translation work: insert-at, erase-range, append and friends all decompose into a handful of
//! storage primitives. The hard part lives below the facades, in one place: a buffer that owns
//! raw element slots, grows geometrically without overflowing, constructs and destroys elements
//! at the right moments, and reports allocation failure without ever corrupting the state it
//! already holds. That one place is this crate: [`Store`](storage::Store) and its leaves.
//!
//! The facades themselves are out of scope here; they own exactly one [`Store`](storage::Store)
//! each and forward to it.
//!
//! # Error Handling
//! Allocation can fail and requested capacities can exceed what a pointer can address. Neither
//! case panics: every operation that touches the allocator returns a [`Result`] carrying a
//! strongly typed error ([`StorageError`](storage::StorageError)), and a failed growth leaves the
//! engine exactly as it was before the call. Whether a failure is recoverable is the caller's
//! decision, not this crate's.
//!
//! # Dependencies
//! This crate doesn't use [`Vec`] or any other allocating container from [`std`]; the only parts
//! of [`std`] it leans on are `std::alloc` (behind the [`RawAllocator`](storage::RawAllocator)
//! trait, so the default global allocator is just one implementation) and `std::ptr`. The derive
//! macros from `derive_more` remove some very repetitive error-type plumbing.

#![warn(clippy::missing_safety_doc)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(clippy::missing_const_for_fn)]
#![warn(clippy::missing_panics_doc)]
#![warn(clippy::unwrap_used)]
#![allow(clippy::module_inception)]

pub mod storage;

#[cfg(test)]
pub(crate) mod util;
