use std::fmt::{self, Debug, Formatter};
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ptr::NonNull;
use std::slice;

use crate::storage::alloc::RawAllocator;
use crate::storage::buf::RawBuf;
use crate::storage::lifecycle;

/// A forward iterator over references into a [`Store`](super::Store)'s buffer.
///
/// A non-owning value type: it wraps a raw position and a remaining count, and is invalidated
/// by anything that reallocates or frees the buffer. In Rust that rule needs no runtime check,
/// because the iterator holds a shared borrow of the Store for its whole lifetime.
pub struct Iter<'a, T> {
    ptr: NonNull<T>,
    left: usize,
    _phantom: PhantomData<&'a T>,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) const fn new(ptr: NonNull<T>, left: usize) -> Iter<'a, T> {
        Iter {
            ptr,
            left,
            _phantom: PhantomData,
        }
    }

    /// Returns the remainder of the iteration as a slice.
    pub const fn as_slice(&self) -> &'a [T] {
        // SAFETY: ptr denotes left live elements of the borrowed Store, which outlives 'a.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.left) }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.left > 0 {
            // SAFETY: left > 0, so ptr denotes a live element borrowed for 'a.
            let value = unsafe { &*self.ptr.as_ptr() };
            // SAFETY: Advancing within (one past) the iterated range.
            self.ptr = unsafe { self.ptr.add(1) };
            self.left -= 1;
            Some(value)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.left, Some(self.left))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.left > 0 {
            // SAFETY: left > 0, so ptr.add(left - 1) denotes a live element borrowed for 'a.
            let value = unsafe { &*self.ptr.add(self.left - 1).as_ptr() };
            self.left -= 1;
            Some(value)
        } else {
            None
        }
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.left
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter::new(self.ptr, self.left)
    }
}

impl<T: Debug> Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// A forward iterator over mutable references into a [`Store`](super::Store)'s buffer.
///
/// Converts one-way into its shared counterpart via [`into_const`](IterMut::into_const).
pub struct IterMut<'a, T> {
    ptr: NonNull<T>,
    left: usize,
    _phantom: PhantomData<&'a mut T>,
}

impl<'a, T> IterMut<'a, T> {
    pub(crate) const fn new(ptr: NonNull<T>, left: usize) -> IterMut<'a, T> {
        IterMut {
            ptr,
            left,
            _phantom: PhantomData,
        }
    }

    /// Gives up mutability, converting the remainder of this iteration into an [`Iter`]. There
    /// is no conversion in the other direction.
    pub const fn into_const(self) -> Iter<'a, T> {
        Iter::new(self.ptr, self.left)
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.left > 0 {
            // SAFETY: left > 0, so ptr denotes a live element exclusively borrowed for 'a;
            // the iterator never revisits a position, so the &mut is unique.
            let value = unsafe { &mut *self.ptr.as_ptr() };
            // SAFETY: Advancing within (one past) the iterated range.
            self.ptr = unsafe { self.ptr.add(1) };
            self.left -= 1;
            Some(value)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.left, Some(self.left))
    }
}

impl<T> DoubleEndedIterator for IterMut<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.left > 0 {
            // SAFETY: left > 0, so ptr.add(left - 1) denotes a live element exclusively
            // borrowed for 'a; positions are never revisited, so the &mut is unique.
            let value = unsafe { &mut *self.ptr.add(self.left - 1).as_ptr() };
            self.left -= 1;
            Some(value)
        } else {
            None
        }
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {
    fn len(&self) -> usize {
        self.left
    }
}

impl<T> FusedIterator for IterMut<'_, T> {}

/// An adapter composing a forward iterator and inverting its traversal direction.
///
/// Inverting again restores forward traversal, so `Reverse<Reverse<I>>` walks like `I`.
#[derive(Debug, Clone)]
pub struct Reverse<I>(I);

impl<I: DoubleEndedIterator> Reverse<I> {
    /// Wraps a forward iterator so that it is traversed back to front.
    pub fn new(inner: I) -> Reverse<I> {
        Reverse(inner)
    }

    /// Unwraps the adapter, restoring the inner iterator's own direction.
    pub fn into_inner(self) -> I {
        self.0
    }
}

impl<I: DoubleEndedIterator> Iterator for Reverse<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next_back()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<I: DoubleEndedIterator> DoubleEndedIterator for Reverse<I> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next()
    }
}

impl<I: DoubleEndedIterator + ExactSizeIterator> ExactSizeIterator for Reverse<I> {
    fn len(&self) -> usize {
        self.0.len()
    }
}

impl<I: DoubleEndedIterator + FusedIterator> FusedIterator for Reverse<I> {}

/// An owned iterator over a [`Store`](super::Store)'s elements. See
/// [`Store::into_iter`](super::Store::into_iter).
///
/// Takes over the Store's buffer; elements are read out by value from either end, and dropping
/// the iterator drops whatever was not consumed before freeing the buffer.
pub struct IntoIter<T, A: RawAllocator> {
    buf: RawBuf<T, A>,
    front: usize,
    back: usize,
}

impl<T, A: RawAllocator> IntoIter<T, A> {
    pub(crate) fn new(buf: RawBuf<T, A>, len: usize) -> IntoIter<T, A> {
        IntoIter {
            buf,
            front: 0,
            back: len,
        }
    }

    /// Returns the remainder of the iteration as a slice.
    pub const fn as_slice(&self) -> &[T] {
        // SAFETY: The slots from front to back hold the live, unconsumed elements.
        unsafe {
            slice::from_raw_parts(self.buf.ptr.add(self.front).as_ptr(), self.back - self.front)
        }
    }
}

impl<T, A: RawAllocator> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front < self.back {
            // SAFETY: front is in the unconsumed range, so the slot holds a live element. The
            // bitwise copy takes ownership; front moves past it so it is never touched again.
            let value = unsafe { self.buf.ptr.add(self.front).read() };
            self.front += 1;
            Some(value)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.back - self.front;
        (left, Some(left))
    }
}

impl<T, A: RawAllocator> DoubleEndedIterator for IntoIter<T, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front < self.back {
            self.back -= 1;
            // SAFETY: back was just moved onto the last unconsumed slot, which holds a live
            // element; ownership transfers with the bitwise copy and back excludes it now.
            Some(unsafe { self.buf.ptr.add(self.back).read() })
        } else {
            None
        }
    }
}

impl<T, A: RawAllocator> ExactSizeIterator for IntoIter<T, A> {
    fn len(&self) -> usize {
        self.back - self.front
    }
}

impl<T, A: RawAllocator> FusedIterator for IntoIter<T, A> {}

impl<T, A: RawAllocator> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        // SAFETY: The slots from front to back hold the live, unconsumed elements; the buffer
        // itself is freed by RawBuf's own drop immediately after.
        unsafe {
            lifecycle::destroy_range(self.buf.ptr.add(self.front), self.back - self.front)
        }
    }
}

impl<T: Debug, A: RawAllocator> Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}
