//! Test instrumentation for allocation and drop behavior: a zero-sized element type, a
//! drop-counting element type and an allocator that fails on cue.

use std::alloc::Layout;
use std::cell::{Cell, RefCell};
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;
use std::rc::Rc;

use crate::storage::{Global, OutOfMemory, RawAllocator};

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ZeroSizedType;

#[derive(Debug, Clone)]
pub struct CountedDrop(pub Rc<RefCell<usize>>);

impl CountedDrop {
    pub fn new(value: usize) -> CountedDrop {
        CountedDrop(Rc::new(RefCell::new(value)))
    }
}

impl Deref for CountedDrop {
    type Target = Rc<RefCell<usize>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for CountedDrop {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Drop for CountedDrop {
    fn drop(&mut self) {
        self.0.replace_with(|v| *v + 1);
    }
}

/// An allocator that delegates to [`Global`] for a budgeted number of allocation calls and
/// fails every call after that. Clones share the budget, so an engine and the test observing
/// it count against the same allowance.
#[derive(Debug, Clone)]
pub struct FailingAlloc {
    budget: Rc<Cell<usize>>,
}

impl FailingAlloc {
    /// Allows `calls` successful `allocate`/`reallocate` calls before failing.
    pub fn after(calls: usize) -> FailingAlloc {
        FailingAlloc {
            budget: Rc::new(Cell::new(calls)),
        }
    }

    /// The number of successful allocation calls still allowed.
    pub fn remaining(&self) -> usize {
        self.budget.get()
    }

    fn spend(&self) -> bool {
        let left = self.budget.get();
        if left == 0 {
            false
        } else {
            self.budget.set(left - 1);
            true
        }
    }
}

impl RawAllocator for FailingAlloc {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, OutOfMemory> {
        if self.spend() {
            Global.allocate(layout)
        } else {
            Err(OutOfMemory {
                bytes: layout.size(),
            })
        }
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, OutOfMemory> {
        if self.spend() {
            // SAFETY: Delegated unchanged; the caller upholds the reallocate contract.
            unsafe { Global.reallocate(ptr, old_layout, new_size) }
        } else {
            Err(OutOfMemory { bytes: new_size })
        }
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // Freeing is always allowed, or failure tests would leak their buffers.
        // SAFETY: Delegated unchanged; the caller upholds the deallocate contract.
        unsafe { Global.deallocate(ptr, layout) }
    }
}
