//! A module containing [`Store`] and associated types.
//!
//! The other included types are the borrowed iterators [`Iter`] and [`IterMut`], the
//! direction-inverting adapter [`Reverse`] and [`IntoIter`] for owned iteration.
//!
//! [`Store`] is also re-exported under the parent module.

mod iter;
mod store;
mod tests;

pub use iter::*;
pub use store::*;
