use std::borrow::{Borrow, BorrowMut};
use std::cmp::Ordering;
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::mem::{self, ManuallyDrop};
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};
use std::slice;

use super::iter::{IntoIter, Iter, IterMut, Reverse};
use crate::storage::alloc::{Global, RawAllocator};
use crate::storage::buf::{RawBuf, max_cap};
use crate::storage::error::{SizeOverflow, StorageError};
use crate::storage::growth::grow;
use crate::storage::lifecycle;

/// The growable contiguous-storage engine underneath every contiguous container.
///
/// A Store owns one buffer of raw element slots, of which the first `len` hold live values and
/// the rest are uninitialized. It grows geometrically by the `NUM/DEN` ratio baked into its
/// type (`3/2` by default), allocates through `A`, and reports allocation failure and capacity
/// overflow as [`StorageError`]s instead of panicking. A failed growth leaves the engine
/// exactly as it was before the call.
///
/// A Store never shares its buffer with another live instance, which is what makes the bitwise
/// ownership transfers in [`take`](Store::take) and the owned iterator safe.
///
/// # Time Complexity
/// For this analysis of time complexity, variables are defined as follows:
/// - `n`: The number of items in the Store.
///
/// | Method | Complexity |
/// |-|-|
/// | `len` / `capacity` / `as_ptr` | `O(1)` |
/// | `push` | `O(1)`*, `O(n)` |
/// | `reserve` | `O(n)`**, `O(1)` |
/// | `take` | `O(1)` |
/// | `try_clone` / `assign_from` | `O(n)` |
/// | `clear` | `O(n)` |
/// | `release` | `O(1)` |
/// | equality / ordering | `O(n)` |
///
/// \* Amortized: over N pushes from empty the engine reallocates O(log N) times and moves O(N)
/// elements in total.
///
/// \** If the Store already has the requested capacity, `reserve` is `O(1)`.
pub struct Store<T, A: RawAllocator = Global, const NUM: usize = 3, const DEN: usize = 2> {
    pub(crate) buf: RawBuf<T, A>,
    pub(crate) len: usize,
}

impl<T, A: RawAllocator, const NUM: usize, const DEN: usize> Store<T, A, NUM, DEN> {
    /// Creates a new Store with length and capacity 0. Memory will be allocated when the
    /// capacity changes.
    ///
    /// # Examples
    /// ```
    /// # use array_base::storage::Store;
    /// let store: Store<u8> = Store::new();
    /// assert_eq!(store.len(), 0);
    /// assert_eq!(store.capacity(), 0);
    /// ```
    pub fn new() -> Store<T, A, NUM, DEN>
    where
        A: Default,
    {
        Store::with_allocator(A::default())
    }

    /// Creates a new, empty Store that allocates through the provided allocator.
    pub const fn with_allocator(alloc: A) -> Store<T, A, NUM, DEN> {
        Store {
            buf: RawBuf::new(alloc),
            len: 0,
        }
    }

    /// Returns the number of live elements in the Store.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the Store contains no elements.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of element slots the current allocation can hold without
    /// reallocation. Unlike [`Vec`], the capacity is exactly what the growth policy produced,
    /// never rounded by the allocator.
    pub const fn capacity(&self) -> usize {
        self.buf.cap
    }

    /// The maximum capacity an engine of this element type can ever reach. Zero-sized types
    /// never allocate, so their limit is [`usize::MAX`].
    pub const fn max_capacity() -> usize {
        max_cap::<T>()
    }

    /// Returns a raw pointer to the buffer. Dangling while the capacity is 0; invalidated by
    /// any call that reallocates or frees the buffer.
    pub const fn as_ptr(&self) -> *const T {
        self.buf.ptr.as_ptr()
    }

    /// Returns a raw mutable pointer to the buffer. Dangling while the capacity is 0;
    /// invalidated by any call that reallocates or frees the buffer.
    pub const fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.ptr.as_ptr()
    }

    /// Returns a reference to the allocator this Store allocates through.
    pub const fn allocator(&self) -> &A {
        &self.buf.alloc
    }

    /// Ensures capacity for at least `required` elements, growing geometrically if needed.
    /// Never shrinks; a Store that already has the capacity is untouched, so existing pointers
    /// and iterators remain valid.
    ///
    /// # Errors
    /// [`SizeOverflow`](crate::storage::SizeOverflow) if `required` exceeds
    /// [`max_capacity`](Store::max_capacity), [`OutOfMemory`](crate::storage::OutOfMemory) if
    /// the allocator declines. Either way the Store is left exactly as it was.
    ///
    /// # Examples
    /// ```
    /// # use array_base::storage::Store;
    /// let mut store: Store<u8> = Store::new();
    /// store.reserve(10).expect("allocation failed");
    /// assert_eq!(store.capacity(), 10);
    /// store.reserve(5).expect("allocation failed");
    /// assert_eq!(store.capacity(), 10);
    /// ```
    pub fn reserve(&mut self, required: usize) -> Result<(), StorageError> {
        if required <= self.buf.cap {
            return Ok(());
        }

        let max = max_cap::<T>();
        if required > max {
            return Err(SizeOverflow {
                requested: required,
                max,
            }
            .into());
        }

        let new_cap = grow(self.buf.cap, required, max, NUM, DEN);
        self.buf.grow_to(new_cap, self.len)
    }

    /// Appends the provided value to the end of the Store, growing the buffer if it is full.
    ///
    /// # Errors
    /// As for [`reserve`](Store::reserve); on failure the value is not consumed observably (it
    /// is dropped with the error) and the Store is unchanged.
    ///
    /// # Examples
    /// ```
    /// # use array_base::storage::Store;
    /// let mut store = Store::<u8>::new();
    /// for i in 0..4 {
    ///     store.push(i).expect("allocation failed");
    /// }
    /// assert_eq!(&*store, &[0, 1, 2, 3]);
    /// ```
    pub fn push(&mut self, value: T) -> Result<(), StorageError> {
        if self.len == self.buf.cap {
            let required = match self.len.checked_add(1) {
                Some(required) => required,
                None => {
                    return Err(SizeOverflow {
                        requested: usize::MAX,
                        max: max_cap::<T>(),
                    }
                    .into());
                }
            };
            self.reserve(required)?;
        }

        // SAFETY: The capacity has just been adjusted to support the addition of the new item.
        unsafe { self.push_unchecked(value) }
        Ok(())
    }

    /// Appends the provided value, assuming that there is capacity for it.
    ///
    /// # Safety
    /// The caller must ensure that `len() < capacity()`, using [`reserve`](Store::reserve) or
    /// one of the sized constructors to arrange it. Pushing into a full Store is undefined
    /// behavior.
    pub const unsafe fn push_unchecked(&mut self, value: T) {
        debug_assert!(self.len < self.buf.cap);

        // SAFETY: It is up to the caller to ensure spare capacity, which puts the write in
        // bounds of the allocation, at the first dead slot.
        unsafe { self.buf.ptr.add(self.len).write(value) }
        self.len += 1;
    }

    /// Destroys all live elements and frees the buffer, resetting the Store to length and
    /// capacity 0.
    ///
    /// # Examples
    /// ```
    /// # use array_base::storage::Store;
    /// let mut store = Store::<u8>::filled(3, 7).expect("allocation failed");
    /// store.clear();
    /// assert_eq!(store.len(), 0);
    /// assert_eq!(store.capacity(), 0);
    /// ```
    pub fn clear(&mut self) {
        // SAFETY: The first len slots hold live elements; len is zeroed before anything else
        // can observe them.
        unsafe { lifecycle::destroy_range(self.buf.ptr, self.len) }
        self.len = 0;
        self.buf.release_storage();
    }

    /// Moves the entire buffer record out of the Store, leaving it empty without touching the
    /// elements. The moved-from Store is observably empty afterwards: length 0, capacity 0,
    /// dangling pointer.
    ///
    /// This is an O(1) bitwise transfer; no allocation and no element construction or
    /// destruction happens.
    ///
    /// # Examples
    /// ```
    /// # use array_base::storage::Store;
    /// let mut store = Store::<u8>::filled(3, 7).expect("allocation failed");
    /// let taken = store.take();
    /// assert_eq!(store.len(), 0);
    /// assert_eq!(store.capacity(), 0);
    /// assert_eq!(&*taken, &[7, 7, 7]);
    /// ```
    pub fn take(&mut self) -> Store<T, A, NUM, DEN>
    where
        A: Clone,
    {
        let empty = Store::with_allocator(self.buf.alloc.clone());
        mem::replace(self, empty)
    }

    /// Hands the raw buffer to the caller without destroying its elements, resetting the Store
    /// to empty. Returns the pointer, the number of live elements and the capacity.
    ///
    /// The caller takes over full responsibility for the allocation and the live elements; the
    /// parts can be handed back via [`from_parts`](Store::from_parts) to be used and dropped
    /// normally.
    pub const fn release(&mut self) -> (NonNull<T>, usize, usize) {
        let len = self.len;
        self.len = 0;
        let (ptr, cap) = self.buf.detach();
        (ptr, len, cap)
    }

    /// Reconstitutes a Store from parts produced by [`release`](Store::release).
    ///
    /// # Safety
    /// `ptr`, `len` and `cap` must have come from [`release`](Store::release) on a Store of
    /// the same element type whose allocator is interchangeable with `alloc`, the allocation
    /// must not be owned elsewhere, and the first `len` of the `cap` slots must hold live
    /// values.
    pub const unsafe fn from_parts(
        ptr: NonNull<T>,
        len: usize,
        cap: usize,
        alloc: A,
    ) -> Store<T, A, NUM, DEN> {
        Store {
            // SAFETY: The caller guarantees the parts came from a Store of the same type with
            // an interchangeable allocator.
            buf: unsafe { RawBuf::from_parts(ptr, cap, alloc) },
            len,
        }
    }

    /// Returns a forward iterator over references to the live elements.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.buf.ptr, self.len)
    }

    /// Returns a forward iterator over mutable references to the live elements.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self.buf.ptr, self.len)
    }

    /// Returns an iterator over references to the live elements in reverse order.
    pub fn iter_rev(&self) -> Reverse<Iter<'_, T>> {
        Reverse::new(self.iter())
    }

    /// Returns an iterator over mutable references to the live elements in reverse order.
    pub fn iter_mut_rev(&mut self) -> Reverse<IterMut<'_, T>> {
        Reverse::new(self.iter_mut())
    }
}

impl<T: Default, A: RawAllocator, const NUM: usize, const DEN: usize> Store<T, A, NUM, DEN> {
    /// Creates a Store of `len` default-constructed elements, with capacity exactly `len`.
    ///
    /// # Errors
    /// [`SizeOverflow`](crate::storage::SizeOverflow) or
    /// [`OutOfMemory`](crate::storage::OutOfMemory); no Store exists on failure.
    ///
    /// # Examples
    /// ```
    /// # use array_base::storage::Store;
    /// let store = Store::<u8>::with_len(3).expect("allocation failed");
    /// assert_eq!(&*store, &[0, 0, 0]);
    /// assert_eq!(store.capacity(), 3);
    ///
    /// let empty = Store::<u8>::with_len(0).expect("allocation failed");
    /// assert_eq!(empty.capacity(), 0);
    /// ```
    pub fn with_len(len: usize) -> Result<Store<T, A, NUM, DEN>, StorageError>
    where
        A: Default,
    {
        let buf = RawBuf::with_cap(A::default(), len)?;

        // SAFETY: The buffer was just allocated with len dead slots.
        unsafe { lifecycle::construct_range(buf.ptr, len) }

        Ok(Store { buf, len })
    }
}

impl<T: Clone, A: RawAllocator, const NUM: usize, const DEN: usize> Store<T, A, NUM, DEN> {
    /// Creates a Store of `len` clones of `value`, with capacity exactly `len`.
    ///
    /// # Errors
    /// [`SizeOverflow`](crate::storage::SizeOverflow) or
    /// [`OutOfMemory`](crate::storage::OutOfMemory); no Store exists on failure.
    ///
    /// # Examples
    /// ```
    /// # use array_base::storage::Store;
    /// let store = Store::<char>::filled(5, 'x').expect("allocation failed");
    /// assert_eq!(store.len(), 5);
    /// assert!(store.iter().all(|c| *c == 'x'));
    /// ```
    pub fn filled(len: usize, value: T) -> Result<Store<T, A, NUM, DEN>, StorageError>
    where
        A: Default,
    {
        let buf = RawBuf::with_cap(A::default(), len)?;

        // SAFETY: The buffer was just allocated with len dead slots.
        unsafe { lifecycle::fill_range(buf.ptr, len, &value) }

        Ok(Store { buf, len })
    }

    /// Creates a new Store holding a clone of every element of this one, with capacity exactly
    /// [`len`](Store::len). The clone owns a separate buffer; nothing is shared.
    ///
    /// This is the fallible counterpart of [`Clone::clone`], which a storage engine cannot
    /// offer without hiding allocation failure behind a panic.
    ///
    /// # Errors
    /// [`SizeOverflow`](crate::storage::SizeOverflow) or
    /// [`OutOfMemory`](crate::storage::OutOfMemory); `self` is never affected.
    pub fn try_clone(&self) -> Result<Store<T, A, NUM, DEN>, StorageError>
    where
        A: Clone,
    {
        let buf = RawBuf::with_cap(self.buf.alloc.clone(), self.len)?;

        // SAFETY: self holds len live elements; the new buffer holds len dead slots and, being
        // freshly allocated, cannot overlap them.
        unsafe { lifecycle::clone_range(buf.ptr, self.buf.ptr, self.len) }

        Ok(Store { buf, len: self.len })
    }

    /// Replaces this Store's contents with clones of `other`'s elements, reusing the existing
    /// buffer when it is large enough.
    ///
    /// Offers the strong failure guarantee: when a larger buffer is needed, it is allocated
    /// and confirmed before any existing element is destroyed, so a failed call leaves `self`
    /// fully intact. (Aliasing `self` with `other` is rejected by the borrow checker, so
    /// self-assignment needs no runtime guard.)
    ///
    /// # Errors
    /// [`SizeOverflow`](crate::storage::SizeOverflow) or
    /// [`OutOfMemory`](crate::storage::OutOfMemory); `self` is unchanged on failure.
    ///
    /// # Examples
    /// ```
    /// # use array_base::storage::Store;
    /// let mut a = Store::<u8>::filled(2, 1).expect("allocation failed");
    /// let b = Store::<u8>::filled(4, 9).expect("allocation failed");
    /// a.assign_from(&b).expect("allocation failed");
    /// assert_eq!(a, b);
    /// ```
    pub fn assign_from(&mut self, other: &Store<T, A, NUM, DEN>) -> Result<(), StorageError>
    where
        A: Clone,
    {
        if other.len > self.buf.cap {
            // Secure the new buffer first; only a confirmed allocation may destroy anything.
            let new_buf = RawBuf::with_cap(self.buf.alloc.clone(), other.len)?;

            // SAFETY: The first len slots hold live elements; len is zeroed immediately after.
            unsafe { lifecycle::destroy_range(self.buf.ptr, self.len) }
            self.len = 0;
            // Dropping the old buffer frees its storage; the elements are already dead.
            self.buf = new_buf;
        } else {
            // SAFETY: The first len slots hold live elements; len is zeroed immediately after.
            unsafe { lifecycle::destroy_range(self.buf.ptr, self.len) }
            self.len = 0;
        }

        // SAFETY: The buffer has at least other.len dead slots, and the no-aliasing guarantee
        // between live Stores makes the ranges disjoint.
        unsafe { lifecycle::clone_range(self.buf.ptr, other.buf.ptr, other.len) }
        self.len = other.len;
        Ok(())
    }
}

impl<T, A: RawAllocator + Default, const NUM: usize, const DEN: usize> Default
    for Store<T, A, NUM, DEN>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, A: RawAllocator, const NUM: usize, const DEN: usize> Drop for Store<T, A, NUM, DEN> {
    fn drop(&mut self) {
        // SAFETY: The first len slots hold live elements; the buffer itself is freed by
        // RawBuf's own drop immediately after.
        unsafe { lifecycle::destroy_range(self.buf.ptr, self.len) }
    }
}

impl<T, A: RawAllocator, const NUM: usize, const DEN: usize> IntoIterator
    for Store<T, A, NUM, DEN>
{
    type Item = T;

    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> Self::IntoIter {
        let this = ManuallyDrop::new(self);
        // SAFETY: this is never dropped, so the buffer read here has exactly one owner: the
        // returned iterator.
        let buf = unsafe { ptr::read(&this.buf) };
        IntoIter::new(buf, this.len)
    }
}

impl<'a, T, A: RawAllocator, const NUM: usize, const DEN: usize> IntoIterator
    for &'a Store<T, A, NUM, DEN>
{
    type Item = &'a T;

    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: RawAllocator, const NUM: usize, const DEN: usize> IntoIterator
    for &'a mut Store<T, A, NUM, DEN>
{
    type Item = &'a mut T;

    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, A: RawAllocator, const NUM: usize, const DEN: usize> Deref for Store<T, A, NUM, DEN> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        // SAFETY: The buffer uses Layout::array and is therefore valid and properly aligned
        // for cap slots; the first len are initialized and len never exceeds isize::MAX
        // elements. The safe API exposes no way to mutate through a shared borrow.
        unsafe { slice::from_raw_parts(self.buf.ptr.as_ptr(), self.len) }
    }
}

impl<T, A: RawAllocator, const NUM: usize, const DEN: usize> DerefMut for Store<T, A, NUM, DEN> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: As for Deref; the exclusive borrow of self covers the whole slice lifetime.
        unsafe { slice::from_raw_parts_mut(self.buf.ptr.as_ptr(), self.len) }
    }
}

impl<T, A: RawAllocator, const NUM: usize, const DEN: usize> AsRef<[T]> for Store<T, A, NUM, DEN> {
    fn as_ref(&self) -> &[T] {
        self
    }
}

impl<T, A: RawAllocator, const NUM: usize, const DEN: usize> AsMut<[T]> for Store<T, A, NUM, DEN> {
    fn as_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T, A: RawAllocator, const NUM: usize, const DEN: usize> Borrow<[T]>
    for Store<T, A, NUM, DEN>
{
    fn borrow(&self) -> &[T] {
        self.as_ref()
    }
}

impl<T, A: RawAllocator, const NUM: usize, const DEN: usize> BorrowMut<[T]>
    for Store<T, A, NUM, DEN>
{
    fn borrow_mut(&mut self) -> &mut [T] {
        self.as_mut()
    }
}

// SAFETY: A Store's buffer has exactly one owner and its safe API follows the borrow checker,
// so sending it between threads is safe whenever its element and allocator are.
unsafe impl<T: Send, A: RawAllocator + Send, const NUM: usize, const DEN: usize> Send
    for Store<T, A, NUM, DEN>
{
}

// SAFETY: No interior mutability is reachable through a shared Store, so sharing one between
// threads is safe whenever its element and allocator are.
unsafe impl<T: Sync, A: RawAllocator + Sync, const NUM: usize, const DEN: usize> Sync
    for Store<T, A, NUM, DEN>
{
}

impl<T: PartialEq, A: RawAllocator, const NUM: usize, const DEN: usize> PartialEq
    for Store<T, A, NUM, DEN>
{
    fn eq(&self, other: &Self) -> bool {
        **self == **other
    }
}

impl<T: Eq, A: RawAllocator, const NUM: usize, const DEN: usize> Eq for Store<T, A, NUM, DEN> {}

impl<T: PartialOrd, A: RawAllocator, const NUM: usize, const DEN: usize> PartialOrd
    for Store<T, A, NUM, DEN>
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        (**self).partial_cmp(&**other)
    }
}

impl<T: Ord, A: RawAllocator, const NUM: usize, const DEN: usize> Ord for Store<T, A, NUM, DEN> {
    fn cmp(&self, other: &Self) -> Ordering {
        (**self).cmp(&**other)
    }
}

impl<T: Hash, A: RawAllocator, const NUM: usize, const DEN: usize> Hash for Store<T, A, NUM, DEN> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (**self).hash(state);
    }
}

impl<T: Debug, A: RawAllocator, const NUM: usize, const DEN: usize> Debug
    for Store<T, A, NUM, DEN>
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("contents", &&**self)
            .field("len", &self.len)
            .field("cap", &self.buf.cap)
            .finish()
    }
}

impl<T: Debug, A: RawAllocator, const NUM: usize, const DEN: usize> Display
    for Store<T, A, NUM, DEN>
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
