use std::alloc::{Layout, alloc, dealloc};
use std::any::type_name;
use std::marker::PhantomData;
use std::mem::{self, MaybeUninit};
use std::ptr::NonNull;

use tracing::debug;

use crate::{Error, Result};

/// An owned block of uninitialized memory with room for `capacity` values of `T`.
///
/// The block has no idea which of its slots hold constructed values. Constructing values in the
/// slots and destroying them again is the responsibility of the owner (typically a
/// [`DynamicSequence`][crate::DynamicSequence]), which must destroy every value it constructed
/// before the block is dropped. Dropping the block only releases the memory.
///
/// A block cannot be cloned. Ownership of the memory is transferred either by a plain Rust move
/// or via [`take()`][Self::take], which leaves an empty block behind.
///
/// # Examples
///
/// ```
/// use dynamic_sequence::RawStorage;
///
/// let mut storage = RawStorage::<u64>::allocate(4).unwrap();
/// assert_eq!(storage.capacity(), 4);
///
/// storage.slot_mut(0).write(42);
///
/// // SAFETY: We just initialized slot 0.
/// assert_eq!(unsafe { storage.slot(0).assume_init_read() }, 42);
/// ```
#[derive(Debug)]
pub struct RawStorage<T> {
    /// Start of the memory block. Dangling (but well-aligned) if nothing is allocated.
    first_slot_ptr: NonNull<T>,

    /// Number of `T`-sized slots in the block.
    capacity: usize,

    // The block is logically a container of `T` for auto trait purposes.
    _slots: PhantomData<T>,
}

impl<T> RawStorage<T> {
    /// Creates an empty block that owns no memory.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            first_slot_ptr: NonNull::dangling(),
            capacity: 0,
            _slots: PhantomData,
        }
    }

    /// Allocates a block with room for exactly `capacity` values of `T`.
    ///
    /// A zero capacity produces an empty block without calling the allocator. Zero-sized types
    /// never call the allocator either, although the block still reports the requested capacity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityOverflow`] if the byte size of the block cannot be represented
    /// and [`Error::AllocationFailed`] if the global allocator cannot provide the memory.
    pub fn allocate(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Ok(Self::new());
        }

        let Ok(layout) = Layout::array::<T>(capacity) else {
            return Err(Error::CapacityOverflow);
        };

        if layout.size() == 0 {
            return Ok(Self {
                first_slot_ptr: NonNull::dangling(),
                capacity,
                _slots: PhantomData,
            });
        }

        // SAFETY: The layout has a non-zero size, guarded by the check above.
        let ptr = unsafe { alloc(layout) };

        let Some(first_slot_ptr) = NonNull::new(ptr.cast::<T>()) else {
            debug!(
                capacity,
                size = layout.size(),
                align = layout.align(),
                item = type_name::<T>(),
                "allocation of raw storage failed"
            );

            return Err(Error::AllocationFailed { layout });
        };

        Ok(Self {
            first_slot_ptr,
            capacity,
            _slots: PhantomData,
        })
    }

    /// Number of slots in the block.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Address of the first slot. Never null, dangling if the block owns no memory.
    #[must_use]
    pub fn as_ptr(&self) -> *const T {
        self.first_slot_ptr.as_ptr()
    }

    /// Mutable address of the first slot. Never null, dangling if the block owns no memory.
    #[must_use]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.first_slot_ptr.as_ptr()
    }

    /// Returns a pointer to the slot at `offset`.
    ///
    /// The offset may equal the capacity, yielding the one-past-the-end address that is needed
    /// to describe the end of a range of slots.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is greater than the capacity.
    #[must_use]
    pub fn slot_ptr(&self, offset: usize) -> NonNull<T> {
        assert!(
            offset <= self.capacity,
            "slot offset {offset} is beyond the end of raw storage of {} with capacity {}",
            type_name::<T>(),
            self.capacity
        );

        // SAFETY: The offset is within the allocated block or one past its end, guarded by the
        // assertion above. For zero-sized types the offset is zero bytes.
        unsafe { self.first_slot_ptr.add(offset) }
    }

    /// Returns the slot at `index` as possibly uninitialized memory.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not less than the capacity.
    #[must_use]
    pub fn slot(&self, index: usize) -> &MaybeUninit<T> {
        let slot_ptr = self.checked_slot_ptr(index);

        // SAFETY: The slot lies inside our allocation and `MaybeUninit` makes no claims about
        // the contents. The returned reference borrows `self`, so the memory outlives it.
        unsafe { slot_ptr.cast::<MaybeUninit<T>>().as_ref() }
    }

    /// Returns the slot at `index` as possibly uninitialized memory for writing.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not less than the capacity.
    #[must_use]
    pub fn slot_mut(&mut self, index: usize) -> &mut MaybeUninit<T> {
        let slot_ptr = self.checked_slot_ptr(index);

        // SAFETY: The slot lies inside our allocation and `MaybeUninit` makes no claims about
        // the contents. We hold `&mut self`, so nobody else can reference the slot.
        unsafe { slot_ptr.cast::<MaybeUninit<T>>().as_mut() }
    }

    fn checked_slot_ptr(&self, index: usize) -> NonNull<T> {
        assert!(
            index < self.capacity,
            "slot index {index} out of bounds in raw storage of {} with capacity {}",
            type_name::<T>(),
            self.capacity
        );

        self.slot_ptr(index)
    }

    /// Exchanges the memory owned by two blocks.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Transfers the memory of this block into a new block, leaving this one empty.
    ///
    /// Dropping the emptied block afterwards does nothing, so it is always safe to transfer the
    /// memory out of a block that is still going to be dropped.
    #[must_use]
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }

    #[must_use]
    fn layout(&self) -> Layout {
        Layout::array::<T>(self.capacity)
            .expect("the layout was already successfully calculated when the block was allocated")
    }
}

impl<T> Default for RawStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for RawStorage<T> {
    fn drop(&mut self) {
        if self.capacity == 0 {
            return;
        }

        let layout = self.layout();

        if layout.size() == 0 {
            return;
        }

        // SAFETY: The layout matches the one used in `allocate()` because the capacity has not
        // changed since, and the memory is still owned by this block.
        unsafe {
            dealloc(self.first_slot_ptr.as_ptr().cast(), layout);
        }
    }
}

// SAFETY: The block is just memory that may contain values of `T`. As long as `T` itself can move
// between threads, the block can do so, too.
unsafe impl<T: Send> Send for RawStorage<T> {}

// SAFETY: Shared references to the block only ever hand out shared references to its slots.
unsafe impl<T: Sync> Sync for RawStorage<T> {}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;

    assert_impl_all!(RawStorage<u32>: Send, Sync, Default);
    assert_not_impl_any!(RawStorage<u32>: Clone, Copy);
    assert_not_impl_any!(RawStorage<Cell<u32>>: Sync);
    assert_not_impl_any!(RawStorage<Rc<u32>>: Send, Sync);

    #[test]
    fn zero_capacity_owns_nothing() {
        let storage = RawStorage::<u64>::allocate(0).unwrap();

        assert_eq!(storage.capacity(), 0);
        assert_eq!(storage.as_ptr(), NonNull::<u64>::dangling().as_ptr());
    }

    #[test]
    fn allocate_reports_capacity() {
        let storage = RawStorage::<u64>::allocate(7).unwrap();

        assert_eq!(storage.capacity(), 7);
        assert_eq!(storage.as_ptr().align_offset(align_of::<u64>()), 0);
    }

    #[test]
    fn slots_are_contiguous() {
        let storage = RawStorage::<u32>::allocate(3).unwrap();

        let first = storage.slot_ptr(0).as_ptr() as usize;
        let third = storage.slot_ptr(2).as_ptr() as usize;

        assert_eq!(third - first, 2 * size_of::<u32>());
    }

    #[test]
    fn write_then_read_slot() {
        let mut storage = RawStorage::<String>::allocate(2).unwrap();

        storage.slot_mut(1).write("hello".to_string());

        // SAFETY: We initialized slot 1 above and read it out exactly once.
        let value = unsafe { storage.slot(1).assume_init_read() };
        assert_eq!(value, "hello");
    }

    #[test]
    fn one_past_end_is_addressable() {
        let storage = RawStorage::<u16>::allocate(4).unwrap();

        let end = storage.slot_ptr(4).as_ptr() as usize;
        let start = storage.as_ptr() as usize;

        assert_eq!(end - start, 4 * size_of::<u16>());
    }

    #[test]
    fn one_past_end_of_empty_is_start() {
        let storage = RawStorage::<u16>::new();

        assert_eq!(storage.slot_ptr(0).as_ptr().cast_const(), storage.as_ptr());
    }

    #[test]
    #[should_panic(expected = "beyond the end of raw storage")]
    fn offset_beyond_one_past_end_panics() {
        let storage = RawStorage::<u16>::allocate(4).unwrap();
        _ = storage.slot_ptr(5);
    }

    #[test]
    #[should_panic(expected = "out of bounds in raw storage")]
    fn slot_at_capacity_panics() {
        let storage = RawStorage::<u16>::allocate(4).unwrap();
        _ = storage.slot(4);
    }

    #[test]
    #[should_panic(expected = "out of bounds in raw storage")]
    fn slot_mut_in_empty_block_panics() {
        let mut storage = RawStorage::<u16>::new();
        _ = storage.slot_mut(0);
    }

    #[test]
    fn swap_exchanges_memory() {
        let mut a = RawStorage::<u8>::allocate(2).unwrap();
        let mut b = RawStorage::<u8>::allocate(5).unwrap();

        let a_ptr = a.as_ptr();
        let b_ptr = b.as_ptr();

        a.swap(&mut b);

        assert_eq!(a.capacity(), 5);
        assert_eq!(b.capacity(), 2);
        assert_eq!(a.as_ptr(), b_ptr);
        assert_eq!(b.as_ptr(), a_ptr);
    }

    #[test]
    fn take_leaves_empty_source() {
        let mut source = RawStorage::<u64>::allocate(3).unwrap();
        let source_ptr = source.as_ptr();

        let target = source.take();

        assert_eq!(target.capacity(), 3);
        assert_eq!(target.as_ptr(), source_ptr);
        assert_eq!(source.capacity(), 0);
        assert_eq!(source.as_ptr(), NonNull::<u64>::dangling().as_ptr());

        // Both are dropped here; only `target` releases memory.
    }

    #[test]
    fn taken_source_can_be_reused() {
        let mut source = RawStorage::<u64>::allocate(3).unwrap();
        drop(source.take());

        source = RawStorage::allocate(8).unwrap();
        source.slot_mut(7).write(1);

        assert_eq!(source.capacity(), 8);
    }

    #[test]
    fn drop_does_not_drop_slot_contents() {
        struct Droppable {
            dropped: Rc<Cell<bool>>,
        }

        impl Drop for Droppable {
            fn drop(&mut self) {
                self.dropped.set(true);
            }
        }

        let dropped = Rc::new(Cell::new(false));

        {
            let mut storage = RawStorage::<Droppable>::allocate(1).unwrap();
            storage.slot_mut(0).write(Droppable {
                dropped: Rc::clone(&dropped),
            });

            // SAFETY: Slot 0 was initialized above. We drop it manually before letting the
            // block go, which is what owners of the block are expected to do.
            let value = unsafe { storage.slot(0).assume_init_read() };
            assert!(!dropped.get());
            drop(storage);
            assert!(!dropped.get());
            drop(value);
        }

        assert!(dropped.get());
    }

    #[test]
    fn zero_sized_type_never_allocates() {
        let mut storage = RawStorage::<()>::allocate(1000).unwrap();

        assert_eq!(storage.capacity(), 1000);
        assert_eq!(storage.slot_ptr(0), storage.slot_ptr(1000));

        storage.slot_mut(999).write(());
    }

    #[test]
    fn impossible_capacity_is_overflow() {
        let result = RawStorage::<u64>::allocate(usize::MAX);

        assert!(matches!(result, Err(Error::CapacityOverflow)));
    }

    #[test]
    fn unsatisfiable_allocation_is_reported() {
        // Representable as a layout but far beyond any real address space.
        let capacity = usize::try_from(isize::MAX).unwrap();
        let result = RawStorage::<u8>::allocate(capacity);

        assert!(matches!(result, Err(Error::AllocationFailed { .. })));
    }
}
