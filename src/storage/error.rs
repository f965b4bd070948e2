//! The failure taxonomy of the storage engine.
//!
//! Only two things can go wrong below the facade layer: the allocator refuses a request
//! ([`OutOfMemory`]), or the request itself asks for more slots than a pointer can address
//! ([`SizeOverflow`]). Both are reported through [`Result`]s rather than panics, and a failed
//! operation never disturbs the engine state that existed before the call.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

use derive_more::{Display, Error, From, IsVariant, TryInto};

/// The allocator declined a request. Carries the size of the failed request in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfMemory {
    /// Size in bytes of the allocation that failed.
    pub bytes: usize,
}

impl Display for OutOfMemory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Allocation of {} bytes failed!", self.bytes)
    }
}

impl Error for OutOfMemory {}

/// A requested capacity exceeds the maximum representable element count for the element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeOverflow {
    /// The number of element slots requested.
    pub requested: usize,
    /// The maximum number of slots the element type permits.
    pub max: usize,
}

impl Display for SizeOverflow {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Requested capacity of {} elements exceeds the maximum of {}!",
            self.requested, self.max
        )
    }
}

impl Error for SizeOverflow {}

/// Union of everything a fallible storage operation can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error, From, TryInto, IsVariant)]
pub enum StorageError {
    /// See [`OutOfMemory`].
    OutOfMemory(OutOfMemory),
    /// See [`SizeOverflow`].
    SizeOverflow(SizeOverflow),
}
