#![cfg(test)]

use std::ptr::NonNull;

use super::*;
use crate::storage::alloc::{Global, RawAllocator};
use crate::util::alloc::{CountedDrop, FailingAlloc, ZeroSizedType};

fn assert_invariants<T, A: RawAllocator, const NUM: usize, const DEN: usize>(
    store: &Store<T, A, NUM, DEN>,
) {
    assert!(
        store.len() <= store.capacity(),
        "Live elements must always fit in the allocation."
    );
    if store.capacity() == 0 {
        assert_eq!(
            store.as_ptr(),
            NonNull::<T>::dangling().as_ptr(),
            "A Store without capacity must hold the dangling sentinel."
        );
    }
}

#[test]
fn test_empty_state() {
    let store: Store<u8> = Store::new();
    assert_eq!(store.len(), 0);
    assert_eq!(store.capacity(), 0);
    assert!(store.is_empty());
    assert_invariants(&store);

    let sized = Store::<u8>::with_len(0).expect("empty construction should not allocate");
    assert_eq!(sized.len(), 0);
    assert_eq!(
        sized.capacity(),
        0,
        "Sized construction of 0 elements should not allocate."
    );
    assert_invariants(&sized);
}

#[test]
fn test_fill_construct() {
    let store = Store::<char>::filled(5, 'x').expect("allocation should succeed");
    assert_eq!(store.len(), 5);
    assert_eq!(
        store.capacity(),
        5,
        "Fill construction should allocate exactly the requested count."
    );
    assert!(store.iter().all(|c| *c == 'x'));
    assert_invariants(&store);
}

#[test]
fn test_default_construct_elements() {
    let store = Store::<u32>::with_len(4).expect("allocation should succeed");
    assert_eq!(&*store, &[0, 0, 0, 0]);
    assert_eq!(store.capacity(), 4);
}

#[test]
fn test_growth_sequence_three_halves() {
    let mut store: Store<u32> = Store::new();
    let mut caps = [0; 4];

    for (i, slot) in caps.iter_mut().enumerate() {
        store.push(i as u32).expect("allocation should succeed");
        *slot = store.capacity();
        assert_invariants(&store);
    }

    assert_eq!(
        caps,
        [1, 2, 3, 4],
        "A 3/2 engine should follow the geometric sequence from capacity 1."
    );
}

#[test]
fn test_growth_sequence_five_thirds() {
    let mut store: Store<u32, Global, 5, 3> = Store::new();
    let mut caps = [0; 4];

    for (i, slot) in caps.iter_mut().enumerate() {
        store.push(i as u32).expect("allocation should succeed");
        *slot = store.capacity();
    }

    assert_eq!(
        caps,
        [1, 2, 3, 5],
        "A 5/3 engine should take its wider geometric steps."
    );
}

#[test]
fn test_reserve_never_shrinks() {
    let mut store: Store<u32> = Store::new();
    store.reserve(3).expect("allocation should succeed");
    assert_eq!(store.capacity(), 3);

    let ptr = store.as_ptr();
    store.reserve(2).expect("a no-op reserve cannot fail");
    assert_eq!(store.capacity(), 3, "Reserve must never shrink.");
    assert_eq!(
        store.as_ptr(),
        ptr,
        "A satisfied reserve must not relocate the buffer."
    );
}

#[test]
fn test_reserve_idempotent() {
    let mut store: Store<u32> = Store::new();
    for i in 0..10 {
        store.push(i).expect("allocation should succeed");
    }

    let (ptr, cap) = (store.as_ptr(), store.capacity());
    store.reserve(cap).expect("a no-op reserve cannot fail");
    store.reserve(1).expect("a no-op reserve cannot fail");
    assert_eq!(store.capacity(), cap);
    assert_eq!(
        store.as_ptr(),
        ptr,
        "Reserving within capacity must keep pointers and iterators valid."
    );
}

#[test]
fn test_amortized_reallocation_count() {
    let mut store: Store<u32> = Store::new();
    let mut reallocations = 0;
    let mut cap = 0;

    for i in 0..1024 {
        store.push(i).expect("allocation should succeed");
        if store.capacity() != cap {
            cap = store.capacity();
            reallocations += 1;
        }
    }

    assert!(
        reallocations <= 32,
        "1024 pushes should trigger O(log n) reallocations, not {reallocations}."
    );
}

#[test]
fn test_take_round_trip() {
    let mut store = Store::<u8>::filled(3, 9).expect("allocation should succeed");
    let (ptr, len, cap) = (store.as_ptr(), store.len(), store.capacity());

    let taken = store.take();

    assert_eq!(store.len(), 0, "The moved-from Store must be empty.");
    assert_eq!(store.capacity(), 0);
    assert_invariants(&store);

    assert_eq!(taken.as_ptr(), ptr, "The buffer must transfer verbatim.");
    assert_eq!(taken.len(), len);
    assert_eq!(taken.capacity(), cap);
    assert_eq!(&*taken, &[9, 9, 9]);

    store.push(1).expect("a moved-from Store should be reusable");
    assert_eq!(&*store, &[1]);
}

#[test]
fn test_try_clone_fidelity() {
    let mut store: Store<u32> = Store::new();
    store.reserve(8).expect("allocation should succeed");
    for i in 0..5 {
        store.push(i).expect("allocation should succeed");
    }

    let copy = store.try_clone().expect("allocation should succeed");
    assert_eq!(copy, store, "A clone must compare equal to its source.");
    assert_ne!(
        copy.as_ptr(),
        store.as_ptr(),
        "A clone must own a separate buffer."
    );
    assert_eq!(
        copy.capacity(),
        store.len(),
        "A clone's capacity is its source's length, not its capacity."
    );
}

#[test]
fn test_assign_from() {
    let mut dst = Store::<u32>::filled(6, 1).expect("allocation should succeed");
    let small = Store::<u32>::filled(2, 7).expect("allocation should succeed");

    let ptr = dst.as_ptr();
    dst.assign_from(&small).expect("no allocation is needed");
    assert_eq!(dst, small);
    assert_eq!(
        dst.as_ptr(),
        ptr,
        "Assignment into sufficient capacity should reuse the buffer."
    );
    assert_eq!(dst.capacity(), 6, "Assignment must not shrink capacity.");

    let large = Store::<u32>::filled(10, 3).expect("allocation should succeed");
    dst.assign_from(&large).expect("allocation should succeed");
    assert_eq!(dst, large);
    assert_eq!(dst.capacity(), 10);
}

#[test]
fn test_assign_from_strong_guarantee() {
    let alloc = FailingAlloc::after(1);
    let mut dst: Store<String, FailingAlloc> = Store::with_allocator(alloc);
    dst.push(String::from("keep"))
        .expect("the first allocation is budgeted");

    let mut src: Store<String, FailingAlloc> = Store::with_allocator(FailingAlloc::after(2));
    src.reserve(3).expect("the first allocation is budgeted");
    for word in ["a", "b", "c"] {
        src.push(String::from(word)).expect("capacity is reserved");
    }

    let (ptr, len, cap) = (dst.as_ptr(), dst.len(), dst.capacity());
    let result = dst.assign_from(&src);

    assert!(
        result.expect_err("the budget is spent").is_out_of_memory(),
        "An exhausted allocator should surface as OutOfMemory."
    );
    assert_eq!(
        (dst.as_ptr(), dst.len(), dst.capacity()),
        (ptr, len, cap),
        "A failed assignment must leave the destination untouched."
    );
    assert_eq!(&*dst, &[String::from("keep")]);
}

#[test]
fn test_push_failure_preserves_state() {
    let mut store: Store<u32, FailingAlloc> = Store::with_allocator(FailingAlloc::after(1));
    store.reserve(2).expect("the first allocation is budgeted");
    store.push(1).expect("capacity is reserved");
    store.push(2).expect("capacity is reserved");
    assert_eq!(store.allocator().remaining(), 0);

    let (ptr, len, cap) = (store.as_ptr(), store.len(), store.capacity());
    let result = store.push(3);

    assert!(
        result.expect_err("the budget is spent").is_out_of_memory(),
        "An exhausted allocator should surface as OutOfMemory."
    );
    assert_eq!(
        (store.as_ptr(), store.len(), store.capacity()),
        (ptr, len, cap),
        "A failed growth must leave size, capacity and data untouched."
    );
    assert_eq!(&*store, &[1, 2], "Existing elements must survive a failure.");

    assert_invariants(&store);
}

#[test]
fn test_grow_failure_with_drop_elements() {
    // Elements with drop glue take the allocate-relocate-free path instead of reallocate.
    let mut store: Store<String, FailingAlloc> = Store::with_allocator(FailingAlloc::after(1));
    store.push(String::from("first")).expect("budgeted");

    let err = store
        .push(String::from("second"))
        .expect_err("the budget is spent");
    assert!(err.is_out_of_memory());
    assert_eq!(&*store, &[String::from("first")]);
    assert_eq!(store.capacity(), 1);
}

#[test]
fn test_size_overflow() {
    let mut store: Store<u64> = Store::new();
    let err = store
        .reserve(usize::MAX)
        .expect_err("the request exceeds the representable count");

    assert!(err.is_size_overflow());
    assert_eq!(store.capacity(), 0, "A rejected reserve must change nothing.");

    assert_eq!(
        Store::<u64>::max_capacity(),
        isize::MAX as usize / size_of::<u64>()
    );
}

#[test]
fn test_clear_counts_drops_and_frees() {
    let counter = CountedDrop::new(0);
    let mut store: Store<CountedDrop> = Store::new();
    for _ in 0..10 {
        store.push(counter.clone()).expect("allocation should succeed");
    }

    store.clear();
    assert_eq!(
        counter.take(),
        10,
        "Clearing should drop every live element."
    );
    assert_eq!(store.capacity(), 0, "Clearing should free the buffer.");
    assert_invariants(&store);

    store.push(counter.clone()).expect("a cleared Store should be reusable");
    assert_eq!(store.len(), 1);
}

#[test]
fn test_drop() {
    let counter = CountedDrop::new(0);
    let mut store: Store<CountedDrop> = Store::new();
    for _ in 0..10 {
        store.push(counter.clone()).expect("allocation should succeed");
    }

    drop(store);

    assert_eq!(counter.take(), 10, "10 elements should have been dropped.");
}

#[test]
fn test_release_and_from_parts() {
    let mut store = Store::<u8>::filled(3, 5).expect("allocation should succeed");
    let expected_ptr = store.as_ptr();

    let (ptr, len, cap) = store.release();
    assert_eq!(ptr.as_ptr().cast_const(), expected_ptr);
    assert_eq!((len, cap), (3, 3));
    assert_eq!(store.len(), 0, "Release must reset the Store to empty.");
    assert_eq!(store.capacity(), 0);
    assert_invariants(&store);

    // SAFETY: The parts come straight from release on a Store<u8, Global> and are owned by
    // nothing else.
    let rebuilt: Store<u8> = unsafe { Store::from_parts(ptr, len, cap, Global) };
    assert_eq!(&*rebuilt, &[5, 5, 5]);
}

#[test]
fn test_zst_support() {
    let mut store: Store<ZeroSizedType> = Store::new();
    assert_eq!(Store::<ZeroSizedType>::max_capacity(), usize::MAX);

    for _ in 0..5 {
        store.push(ZeroSizedType).expect("ZSTs never allocate");
    }

    assert_eq!(store.len(), 5);
    assert_eq!(
        store.as_ptr(),
        NonNull::<ZeroSizedType>::dangling().as_ptr(),
        "The pointer should stay dangling for a ZST."
    );
    assert_eq!(store[0], ZeroSizedType);
    assert_eq!(store.iter().count(), 5);

    store.clear();
    assert_eq!(store.capacity(), 0);
}

#[test]
fn test_equality_and_ordering() {
    let a = Store::<u8>::filled(3, 1).expect("allocation should succeed");
    let mut b: Store<u8> = Store::new();
    for _ in 0..3 {
        b.push(1).expect("allocation should succeed");
    }

    assert_eq!(
        a, b,
        "Different construction methods should produce equal results."
    );

    let mut c = b.try_clone().expect("allocation should succeed");
    c.push(1).expect("allocation should succeed");
    assert!(a < c, "A proper prefix should order before its extension.");

    c[2] = 0;
    assert!(
        c < a,
        "Ordering should be lexicographic, element before length."
    );
}

#[test]
fn test_iteration() {
    let mut store: Store<u32> = Store::new();
    for i in 0..5 {
        store.push(i).expect("allocation should succeed");
    }

    assert!(store.iter().copied().eq(0..5));
    assert!(store.iter_rev().copied().eq((0..5).rev()));
    assert_eq!(store.iter().as_slice(), &[0, 1, 2, 3, 4]);

    let mut iter = store.iter();
    assert_eq!(iter.len(), 5);
    assert_eq!(iter.next(), Some(&0));
    assert_eq!(iter.next_back(), Some(&4));
    assert_eq!(iter.as_slice(), &[1, 2, 3]);

    for value in store.iter_mut() {
        *value *= 10;
    }
    assert_eq!(&*store, &[0, 10, 20, 30, 40]);

    let mut halves = store.iter_mut();
    *halves.next().expect("the Store is not empty") = 1;
    let rest = halves.into_const();
    assert!(
        rest.copied().eq([10, 20, 30, 40]),
        "A converted iterator should continue from the same position."
    );
    assert_eq!(store[0], 1);
}

#[test]
fn test_reverse_adapter_round_trip() {
    let mut store: Store<u32> = Store::new();
    for i in 0..4 {
        store.push(i).expect("allocation should succeed");
    }

    let double_reversed = Reverse::new(store.iter_rev());
    assert!(
        double_reversed.copied().eq(0..4),
        "Reversing twice should restore forward traversal."
    );
}

#[test]
fn test_into_iter() {
    let mut store: Store<u32> = Store::new();
    for i in 0..5 {
        store.push(i).expect("allocation should succeed");
    }

    let mut iter = store.into_iter();
    assert_eq!(iter.next(), Some(0));
    assert_eq!(iter.next_back(), Some(4));
    assert_eq!(iter.as_slice(), &[1, 2, 3]);
    assert_eq!(iter.len(), 3);
    assert!(iter.eq([1, 2, 3]));
}

#[test]
fn test_into_iter_drops_unconsumed() {
    let counter = CountedDrop::new(0);
    let mut store: Store<CountedDrop> = Store::new();
    for _ in 0..5 {
        store.push(counter.clone()).expect("allocation should succeed");
    }

    let mut iter = store.into_iter();
    drop(iter.next());
    drop(iter.next());
    drop(iter);

    assert_eq!(
        counter.take(),
        5,
        "Consumed and unconsumed elements alike should be dropped exactly once."
    );
}

#[test]
fn test_push_unchecked() {
    let mut store: Store<u32> = Store::new();
    store.reserve(3).expect("allocation should succeed");
    let ptr = store.as_ptr();

    for i in 0..3 {
        // SAFETY: Capacity for 3 elements was reserved above.
        unsafe { store.push_unchecked(i) }
    }

    assert_eq!(&*store, &[0, 1, 2]);
    assert_eq!(
        store.as_ptr(),
        ptr,
        "Unchecked pushes must never touch the allocation."
    );
}

#[test]
fn test_format() {
    let mut store: Store<u32> = Store::new();
    store.push(1).expect("allocation should succeed");
    store.push(2).expect("allocation should succeed");

    assert_eq!(format!("{store}"), "[1, 2]");
    let debug = format!("{store:?}");
    assert!(debug.contains("len: 2"), "Debug output should expose len: {debug}");
}
