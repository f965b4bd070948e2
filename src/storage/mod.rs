//! The storage engine and its leaves: allocator capability, growth policy, lifecycle helpers,
//! the raw buffer record and the [`Store`] that orchestrates them.
#![warn(missing_docs)]

pub mod alloc;
pub mod error;
pub mod growth;
pub mod lifecycle;
pub mod store;

pub(crate) mod buf;

#[doc(inline)]
pub use alloc::{Global, RawAllocator};
#[doc(inline)]
pub use error::{OutOfMemory, SizeOverflow, StorageError};
#[doc(inline)]
pub use store::Store;
