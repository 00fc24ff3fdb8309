use std::any::type_name;
use std::num::NonZero;
use std::ops::{Deref, DerefMut};
use std::{fmt, iter, mem, ptr, slice, thread};

use new_zealand::nz;
use tracing::trace;

use crate::{
    DropPolicy, DynamicSequenceBuilder, Error, IntoIter, RawStorage, Result, or_handle_alloc_error,
};

/// Capacity of the first block allocated when an empty sequence grows.
const MIN_GROWN_CAPACITY: NonZero<usize> = nz!(1);

/// A growable contiguous sequence of `T`.
///
/// The sequence owns a [`RawStorage<T>`] block and counts how many of the leading slots in that
/// block hold live values. Slots `[0, len)` are live, slots `[len, capacity)` are raw memory.
///
/// # Growth
///
/// When an insertion finds no free slot, the sequence allocates a new block with twice the
/// capacity (or one slot, if it had none), constructs the new element directly in the new
/// block, then moves the existing elements over and releases the old block. Moving an element
/// in Rust is a bitwise copy that cannot fail, so relocation never needs to fall back to cloning.
///
/// Every fallible step of a growing operation happens before anything is relocated. If the
/// allocation fails or constructing the new element panics, the sequence is left exactly as it
/// was before the call.
///
/// # Views
///
/// Slices and iterators obtained from the sequence borrow it, so the compiler ensures none of
/// them outlive an operation that changes the capacity or shifts elements around.
///
/// # Examples
///
/// ```
/// use dynamic_sequence::DynamicSequence;
///
/// let mut sequence = DynamicSequence::new();
/// sequence.push_back(1);
/// sequence.push_back(2);
/// sequence.push_back(3);
///
/// sequence.insert(1, 99);
/// assert_eq!(*sequence, [1, 99, 2, 3]);
///
/// sequence.erase_at(0);
/// assert_eq!(*sequence, [99, 2, 3]);
///
/// sequence.resize(5);
/// assert_eq!(*sequence, [99, 2, 3, 0, 0]);
/// ```
///
/// # Thread safety
///
/// The sequence is [`Send`] if `T` is [`Send`] and [`Sync`] if `T` is [`Sync`]. It contains no
/// synchronization of its own; mutation requires exclusive access like any other Rust value.
pub struct DynamicSequence<T> {
    storage: RawStorage<T>,

    /// Number of leading slots in `storage` that hold live values.
    len: usize,

    drop_policy: DropPolicy,
}

impl<T> DynamicSequence<T> {
    /// Creates an empty sequence. No memory is allocated until the first insertion.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            storage: RawStorage::new(),
            len: 0,
            drop_policy: DropPolicy::MayDropItems,
        }
    }

    /// Starts building a sequence with custom settings.
    ///
    /// # Examples
    ///
    /// ```
    /// use dynamic_sequence::DynamicSequence;
    ///
    /// let sequence = DynamicSequence::<u64>::builder().capacity(8).build();
    /// assert_eq!(sequence.capacity(), 8);
    /// ```
    #[inline]
    pub fn builder() -> DynamicSequenceBuilder<T> {
        DynamicSequenceBuilder::new()
    }

    pub(crate) fn try_new_inner(capacity: usize, drop_policy: DropPolicy) -> Result<Self> {
        Ok(Self {
            storage: RawStorage::allocate(capacity)?,
            len: 0,
            drop_policy,
        })
    }

    /// Creates an empty sequence with room for exactly `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if the capacity cannot be represented. Allocator failure is reported via
    /// [`std::alloc::handle_alloc_error`].
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        or_handle_alloc_error(Self::try_with_capacity(capacity))
    }

    /// Creates an empty sequence with room for exactly `capacity` elements.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be allocated.
    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        Self::try_new_inner(capacity, DropPolicy::default())
    }

    /// Number of live elements in the sequence.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the sequence contains no elements.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements the sequence can hold without allocating a new block.
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// The policy applied to live elements when the sequence is dropped.
    #[must_use]
    pub fn drop_policy(&self) -> DropPolicy {
        self.drop_policy
    }

    /// The live elements as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: Slots [0, len) hold live values and the storage pointer is non-null and
        // aligned even when nothing is allocated.
        unsafe { slice::from_raw_parts(self.storage.as_ptr(), self.len) }
    }

    /// The live elements as a mutable slice.
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: Slots [0, len) hold live values and the storage pointer is non-null and
        // aligned even when nothing is allocated. We hold `&mut self`, so access is exclusive.
        unsafe { slice::from_raw_parts_mut(self.storage.as_mut_ptr(), self.len) }
    }

    /// Iterates over the elements in index order.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Iterates mutably over the elements in index order.
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// Ensures the sequence can hold at least `new_capacity` elements.
    ///
    /// Does nothing if the capacity is already sufficient. Otherwise, moves the elements into a
    /// new block of exactly `new_capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if the capacity cannot be represented. Allocator failure is reported via
    /// [`std::alloc::handle_alloc_error`].
    pub fn reserve(&mut self, new_capacity: usize) {
        or_handle_alloc_error(self.try_reserve(new_capacity));
    }

    /// Ensures the sequence can hold at least `new_capacity` elements.
    ///
    /// # Errors
    ///
    /// Returns an error if a new block cannot be allocated. The sequence is unchanged.
    pub fn try_reserve(&mut self, new_capacity: usize) -> Result<()> {
        if new_capacity <= self.capacity() {
            return Ok(());
        }

        let new_storage = RawStorage::allocate(new_capacity)?;
        self.relocate_into(new_storage, None);

        Ok(())
    }

    /// Constructs a new element at `index`, shifting all elements after it one slot further.
    ///
    /// The element is produced by `construct`, which is called exactly once. Returns a
    /// reference to the new element.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`. Allocator failure is reported via
    /// [`std::alloc::handle_alloc_error`]. If `construct` panics, the sequence is unchanged.
    pub fn emplace_at<F>(&mut self, index: usize, construct: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        or_handle_alloc_error(self.try_emplace_at(index, construct))
    }

    /// Constructs a new element at `index`, shifting all elements after it one slot further.
    ///
    /// # Errors
    ///
    /// Returns an error if the sequence is full and a larger block cannot be allocated.
    /// The sequence is unchanged and `construct` is not called.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn try_emplace_at<F>(&mut self, index: usize, construct: F) -> Result<&mut T>
    where
        F: FnOnce() -> T,
    {
        #[cfg(debug_assertions)]
        self.integrity_check();

        assert!(
            index <= self.len,
            "insertion index {index} out of bounds in sequence of {} with length {}",
            type_name::<T>(),
            self.len
        );

        if self.len < self.capacity() {
            // Construct first, so a panic leaves the elements where they were.
            let value = construct();

            let hole = self.storage.slot_ptr(index);
            // Cannot overflow because index < capacity.
            let after_hole = self.storage.slot_ptr(index.wrapping_add(1));
            // Cannot underflow, guarded by the assertion above.
            let tail_len = self.len.wrapping_sub(index);

            // SAFETY: Slots [index, len) hold live values and the destination range ends at
            // len + 1, which is within capacity because len < capacity. `copy` allows overlap.
            unsafe {
                ptr::copy(hole.as_ptr(), after_hole.as_ptr(), tail_len);
            }

            // SAFETY: The value that used to be in the hole was moved one slot further,
            // so the slot is logically uninitialized and writing does not leak anything.
            unsafe {
                hole.write(value);
            }
        } else {
            let mut new_storage = RawStorage::allocate(self.grown_capacity()?)?;

            // The new element goes into the new block before anything is relocated. If this
            // panics, the new block is released and the sequence is untouched.
            new_storage.slot_mut(index).write(construct());

            self.relocate_into(new_storage, Some(index));
        }

        // Cannot overflow because len < capacity before the insertion.
        self.len = self.len.wrapping_add(1);

        // SAFETY: The slot was initialized above and is counted as live.
        Ok(unsafe { self.storage.slot_mut(index).assume_init_mut() })
    }

    /// Inserts `value` at `index`, shifting all elements after it one slot further.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`. Allocator failure is reported via
    /// [`std::alloc::handle_alloc_error`].
    pub fn insert(&mut self, index: usize, value: T) -> &mut T {
        self.emplace_at(index, || value)
    }

    /// Inserts `value` at `index`, shifting all elements after it one slot further.
    ///
    /// # Errors
    ///
    /// Returns an error if the sequence is full and a larger block cannot be allocated.
    /// The sequence is unchanged and `value` is dropped.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn try_insert(&mut self, index: usize, value: T) -> Result<&mut T> {
        self.try_emplace_at(index, || value)
    }

    /// Constructs a new element after the last one and returns a reference to it.
    ///
    /// Amortized O(1): the capacity doubles whenever the sequence is full.
    ///
    /// # Panics
    ///
    /// Allocator failure is reported via [`std::alloc::handle_alloc_error`]. If `construct`
    /// panics, the sequence is unchanged.
    pub fn emplace_back<F>(&mut self, construct: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        or_handle_alloc_error(self.try_emplace_back(construct))
    }

    /// Constructs a new element after the last one and returns a reference to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the sequence is full and a larger block cannot be allocated.
    /// The sequence is unchanged and `construct` is not called.
    pub fn try_emplace_back<F>(&mut self, construct: F) -> Result<&mut T>
    where
        F: FnOnce() -> T,
    {
        self.try_emplace_at(self.len, construct)
    }

    /// Appends `value` after the last element.
    ///
    /// # Panics
    ///
    /// Allocator failure is reported via [`std::alloc::handle_alloc_error`].
    pub fn push_back(&mut self, value: T) {
        self.emplace_back(|| value);
    }

    /// Appends `value` after the last element.
    ///
    /// # Errors
    ///
    /// Returns an error if the sequence is full and a larger block cannot be allocated.
    /// The sequence is unchanged and `value` is dropped.
    pub fn try_push_back(&mut self, value: T) -> Result<()> {
        self.try_emplace_back(|| value).map(|_| ())
    }

    /// Removes the element at `index` and returns it, shifting all elements after it one
    /// slot back.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        #[cfg(debug_assertions)]
        self.integrity_check();

        assert!(
            index < self.len,
            "index {index} out of bounds in sequence of {} with length {}",
            type_name::<T>(),
            self.len
        );

        let hole = self.storage.slot_ptr(index);
        // Cannot overflow because index < len <= capacity.
        let after_hole = self.storage.slot_ptr(index.wrapping_add(1));
        // Cannot underflow because index < len.
        let tail_len = self.len.wrapping_sub(index).wrapping_sub(1);

        // SAFETY: The slot holds a live value because index < len. Ownership moves out here
        // and the slot is overwritten (or stops being counted) below.
        let value = unsafe { hole.read() };

        // SAFETY: Slots [index + 1, len) hold live values. Moving them one slot back fills
        // the hole; `copy` allows overlap.
        unsafe {
            ptr::copy(after_hole.as_ptr(), hole.as_ptr(), tail_len);
        }

        // Cannot underflow because index < len.
        self.len = self.len.wrapping_sub(1);

        value
    }

    /// Destroys the element at `index`, shifting all elements after it one slot back.
    ///
    /// Returns the element that now occupies `index`, or `None` if the erased element was
    /// the last one.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use dynamic_sequence::DynamicSequence;
    ///
    /// let mut sequence: DynamicSequence<_> = [1, 2, 3].into_iter().collect();
    ///
    /// assert_eq!(sequence.erase_at(1), Some(&mut 3));
    /// assert_eq!(sequence.erase_at(1), None);
    /// assert_eq!(*sequence, [1]);
    /// ```
    pub fn erase_at(&mut self, index: usize) -> Option<&mut T> {
        drop(self.remove(index));

        self.as_mut_slice().get_mut(index)
    }

    /// Removes the last element and returns it, or `None` if the sequence is empty.
    pub fn pop(&mut self) -> Option<T> {
        let last = self.len.checked_sub(1)?;

        // Stop counting the slot as live before reading it out, so it is read exactly once.
        self.len = last;

        // SAFETY: The slot held the last live value and is no longer counted as live.
        Some(unsafe { self.storage.slot(last).assume_init_read() })
    }

    /// Destroys the last element.
    ///
    /// # Panics
    ///
    /// Panics if the sequence is empty. Use [`pop()`][Self::pop] if emptiness is a possibility.
    pub fn pop_back(&mut self) {
        assert!(
            !self.is_empty(),
            "pop_back() called on an empty sequence of {}",
            type_name::<T>()
        );

        drop(self.pop());
    }

    /// Destroys all elements from `len` onwards. Does nothing if `len >= self.len()`.
    ///
    /// The capacity is not changed.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }

        // Cannot underflow, guarded by the check above.
        let surplus_len = self.len.wrapping_sub(len);
        let surplus =
            ptr::slice_from_raw_parts_mut(self.storage.slot_ptr(len).as_ptr(), surplus_len);

        // Stop counting the surplus as live first, so a panicking destructor cannot lead to
        // the same value being dropped twice.
        self.len = len;

        // SAFETY: The surplus slots held live values that are no longer counted as live.
        unsafe {
            ptr::drop_in_place(surplus);
        }
    }

    /// Destroys all elements. The capacity is not changed.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Resizes the sequence to `new_len` elements.
    ///
    /// Shrinking destroys the surplus elements. Growing first ensures a capacity of at least
    /// `new_len`, then fills the new slots with values produced by `produce`.
    ///
    /// # Panics
    ///
    /// Panics if the capacity cannot be represented. Allocator failure is reported via
    /// [`std::alloc::handle_alloc_error`]. If `produce` panics, the elements produced so far
    /// remain in the sequence.
    pub fn resize_with<F>(&mut self, new_len: usize, produce: F)
    where
        F: FnMut() -> T,
    {
        or_handle_alloc_error(self.try_resize_with(new_len, produce));
    }

    /// Resizes the sequence to `new_len` elements.
    ///
    /// # Errors
    ///
    /// Returns an error if growing requires a new block that cannot be allocated.
    /// The sequence is unchanged.
    pub fn try_resize_with<F>(&mut self, new_len: usize, produce: F) -> Result<()>
    where
        F: FnMut() -> T,
    {
        if new_len <= self.len {
            self.truncate(new_len);
            return Ok(());
        }

        self.try_reserve(new_len)?;

        // Cannot underflow, guarded by the check above.
        let additional = new_len.wrapping_sub(self.len);
        self.extend_within_capacity(iter::repeat_with(produce).take(additional));

        Ok(())
    }

    /// Exchanges the contents of two sequences in O(1).
    ///
    /// The drop policies stay with their sequences.
    pub fn swap_with(&mut self, other: &mut Self) {
        self.storage.swap(&mut other.storage);
        mem::swap(&mut self.len, &mut other.len);
    }

    /// Transfers the elements and storage of this sequence into a new sequence, leaving this
    /// one empty but fully usable.
    ///
    /// The new sequence has the same drop policy.
    ///
    /// # Examples
    ///
    /// ```
    /// use dynamic_sequence::DynamicSequence;
    ///
    /// let mut source: DynamicSequence<_> = [1, 2].into_iter().collect();
    /// let target = source.take();
    ///
    /// assert_eq!(*target, [1, 2]);
    /// assert!(source.is_empty());
    /// assert_eq!(source.capacity(), 0);
    ///
    /// source.push_back(3);
    /// assert_eq!(*source, [3]);
    /// ```
    #[must_use]
    pub fn take(&mut self) -> Self {
        Self {
            storage: self.storage.take(),
            len: mem::take(&mut self.len),
            drop_policy: self.drop_policy,
        }
    }

    fn grown_capacity(&self) -> Result<usize> {
        match self.capacity() {
            0 => Ok(MIN_GROWN_CAPACITY.get()),
            capacity => capacity.checked_mul(2).ok_or(Error::CapacityOverflow),
        }
    }

    /// Moves every live element into `new_storage` and adopts it, releasing the current block.
    ///
    /// If `gap` is set, the elements at and after that index land one slot further, skipping
    /// the slot at `gap`. The contents of the gap slot are the caller's business.
    fn relocate_into(&mut self, mut new_storage: RawStorage<T>, gap: Option<usize>) {
        trace!(
            old_capacity = self.capacity(),
            new_capacity = new_storage.capacity(),
            len = self.len,
            item = type_name::<T>(),
            "relocating sequence into new storage"
        );

        let split = gap.unwrap_or(self.len);
        // Cannot overflow because gap < new capacity.
        let suffix_target = gap.map_or(split, |gap| gap.wrapping_add(1));
        // Cannot underflow because gap <= len.
        let suffix_len = self.len.wrapping_sub(split);

        // SAFETY: Slots [0, split) of our storage are live. The new storage is fresh and the
        // caller sized it to fit every element plus the gap.
        unsafe {
            relocate(&self.storage, 0, &mut new_storage, 0, split);
        }

        // SAFETY: As above, for the elements from the gap onwards.
        unsafe {
            relocate(
                &self.storage,
                split,
                &mut new_storage,
                suffix_target,
                suffix_len,
            );
        }

        self.storage.swap(&mut new_storage);

        // `new_storage` now holds the old block. All its values were moved out, so dropping it
        // only releases the memory.
    }

    /// Appends items into the spare capacity, committing the new length even if the iterator
    /// panics part-way, so every appended item stays owned by the sequence.
    ///
    /// # Panics
    ///
    /// Panics if the items do not fit into the current capacity.
    fn extend_within_capacity<I>(&mut self, items: I)
    where
        I: Iterator<Item = T>,
    {
        let storage = &mut self.storage;
        let mut len = scopeguard::guard(self.len, |len| self.len = len);

        for item in items {
            storage.slot_mut(*len).write(item);

            // Cannot overflow because slot_mut() checked that len < capacity.
            *len = len.wrapping_add(1);
        }
    }

    #[cfg_attr(test, mutants::skip)] // Debug-only assertion with no observable effect to mutate.
    #[cfg(debug_assertions)]
    fn integrity_check(&self) {
        assert!(
            self.len <= self.storage.capacity(),
            "sequence of {} has length {} beyond its capacity {}",
            type_name::<T>(),
            self.len,
            self.storage.capacity()
        );
    }
}

impl<T: Default> DynamicSequence<T> {
    /// Creates a sequence of `len` default-constructed elements with a capacity of exactly `len`.
    ///
    /// # Panics
    ///
    /// Panics if the capacity cannot be represented. Allocator failure is reported via
    /// [`std::alloc::handle_alloc_error`].
    #[must_use]
    pub fn with_len(len: usize) -> Self {
        or_handle_alloc_error(Self::try_with_len(len))
    }

    /// Creates a sequence of `len` default-constructed elements with a capacity of exactly `len`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be allocated.
    pub fn try_with_len(len: usize) -> Result<Self> {
        let mut sequence = Self::try_with_capacity(len)?;
        sequence.extend_within_capacity(iter::repeat_with(T::default).take(len));
        Ok(sequence)
    }

    /// Resizes the sequence to `new_len` elements, filling new slots with default values.
    ///
    /// # Panics
    ///
    /// Panics if the capacity cannot be represented. Allocator failure is reported via
    /// [`std::alloc::handle_alloc_error`].
    pub fn resize(&mut self, new_len: usize) {
        self.resize_with(new_len, T::default);
    }

    /// Resizes the sequence to `new_len` elements, filling new slots with default values.
    ///
    /// # Errors
    ///
    /// Returns an error if growing requires a new block that cannot be allocated.
    /// The sequence is unchanged.
    pub fn try_resize(&mut self, new_len: usize) -> Result<()> {
        self.try_resize_with(new_len, T::default)
    }
}

impl<T: Clone> DynamicSequence<T> {
    /// Creates a deep copy with a capacity of exactly `len`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage for the copy cannot be allocated.
    pub fn try_clone(&self) -> Result<Self> {
        let mut copy = Self::try_new_inner(self.len, self.drop_policy)?;
        copy.extend_within_capacity(self.iter().cloned());
        Ok(copy)
    }
}

impl<T: Clone> Clone for DynamicSequence<T> {
    fn clone(&self) -> Self {
        or_handle_alloc_error(self.try_clone())
    }

    /// Makes this sequence an element-wise copy of `source`.
    ///
    /// If `source` fits into the current capacity, the existing block is reused: the common
    /// prefix is assigned element by element, then surplus elements are destroyed or missing
    /// ones are cloned in. Otherwise a complete copy is built first and swapped in, leaving this
    /// sequence untouched if building the copy fails.
    fn clone_from(&mut self, source: &Self) {
        if source.len > self.capacity() {
            let mut replacement = source.clone();
            self.swap_with(&mut replacement);

            // The previous elements are dropped as part of the assignment, whatever the policy.
            replacement.clear();
            return;
        }

        let overlap = self.len.min(source.len);
        let (source_prefix, source_rest) = source.as_slice().split_at(overlap);
        let (prefix, _) = self.as_mut_slice().split_at_mut(overlap);

        prefix.clone_from_slice(source_prefix);

        self.truncate(source.len);
        self.extend_within_capacity(source_rest.iter().cloned());
    }
}

impl<T> Drop for DynamicSequence<T> {
    fn drop(&mut self) {
        let was_empty = self.is_empty();

        self.clear();

        // Release the memory before a potential panic below.
        drop(self.storage.take());

        // If we are already panicking, we do not want to panic again because that will
        // simply obscure whatever the original panic was, leading to debug difficulties.
        if self.drop_policy == DropPolicy::MustNotDropItems && !thread::panicking() {
            assert!(
                was_empty,
                "dropped a non-empty sequence of {} with a policy that says it must be empty when dropped",
                type_name::<T>()
            );
        }
    }
}

impl<T> Default for DynamicSequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for DynamicSequence<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for DynamicSequence<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug> fmt::Debug for DynamicSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for DynamicSequence<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for DynamicSequence<T> {}

impl<T> Extend<T> for DynamicSequence<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, items: I) {
        let items = items.into_iter();

        let required = self.len.checked_add(items.size_hint().0);

        // Growing to exactly the hinted size would make every small extension reallocate,
        // so never grow by less than the regular doubling step.
        if let Some(required) = required.filter(|&required| required > self.capacity()) {
            let grown = self.grown_capacity().unwrap_or(required);
            self.reserve(required.max(grown));
        }

        for item in items {
            self.push_back(item);
        }
    }
}

impl<T> FromIterator<T> for DynamicSequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(items: I) -> Self {
        let mut sequence = Self::new();
        sequence.extend(items);
        sequence
    }
}

impl<T> IntoIterator for DynamicSequence<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(mut self) -> IntoIter<T> {
        let len = mem::take(&mut self.len);

        // SAFETY: The first `len` slots hold live values, which the iterator takes over.
        // We stopped counting them as ours above, so they are not dropped twice.
        unsafe { IntoIter::new(self.storage.take(), len) }
    }
}

impl<'a, T> IntoIterator for &'a DynamicSequence<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynamicSequence<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// Moves `count` values from the slots of `source` starting at `source_offset` into the slots
/// of `target` starting at `target_offset`.
///
/// # Safety
///
/// The source slots must hold live values. They are logically uninitialized afterwards.
/// The target slots must not hold live values. Both ranges must be within capacity.
unsafe fn relocate<T>(
    source: &RawStorage<T>,
    source_offset: usize,
    target: &mut RawStorage<T>,
    target_offset: usize,
    count: usize,
) {
    debug_assert!(
        source_offset
            .checked_add(count)
            .is_some_and(|end| end <= source.capacity())
    );
    debug_assert!(
        target_offset
            .checked_add(count)
            .is_some_and(|end| end <= target.capacity())
    );

    let source_ptr = source.slot_ptr(source_offset);
    let target_ptr = target.slot_ptr(target_offset);

    // SAFETY: Forwarding the guarantees from the caller. The blocks are distinct objects
    // (one borrowed shared, one exclusive), so the ranges cannot overlap.
    unsafe {
        ptr::copy_nonoverlapping(source_ptr.as_ptr(), target_ptr.as_ptr(), count);
    }
}
