use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

use crate::{DropPolicy, DynamicSequence, Result, or_handle_alloc_error};

/// Builder for creating an instance of [`DynamicSequence`].
///
/// All settings are optional. A builder with no settings produces the same empty sequence as
/// [`DynamicSequence::new()`].
///
/// # Examples
///
/// ```
/// use dynamic_sequence::{DropPolicy, DynamicSequence};
///
/// let sequence = DynamicSequence::<String>::builder()
///     .capacity(16)
///     .drop_policy(DropPolicy::MayDropItems)
///     .build();
///
/// assert_eq!(sequence.capacity(), 16);
/// assert!(sequence.is_empty());
/// ```
#[must_use]
pub struct DynamicSequenceBuilder<T> {
    capacity: usize,
    drop_policy: DropPolicy,

    // The builder never holds a `T`, so it is Send + Sync regardless of `T`.
    _item: PhantomData<fn() -> T>,
}

impl<T> DynamicSequenceBuilder<T> {
    #[inline]
    pub(crate) fn new() -> Self {
        Self {
            capacity: 0,
            drop_policy: DropPolicy::default(),
            _item: PhantomData,
        }
    }

    /// Sets the number of elements the sequence can hold before it first needs to grow.
    ///
    /// Zero (the default) means the sequence does not allocate until the first insertion.
    #[inline]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the [drop policy][DropPolicy] for the sequence. This governs how
    /// to treat remaining elements when the sequence is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use dynamic_sequence::{DropPolicy, DynamicSequence};
    ///
    /// let sequence = DynamicSequence::<u8>::builder()
    ///     .drop_policy(DropPolicy::MustNotDropItems)
    ///     .build();
    ///
    /// assert_eq!(sequence.drop_policy(), DropPolicy::MustNotDropItems);
    /// ```
    #[inline]
    pub fn drop_policy(mut self, policy: DropPolicy) -> Self {
        self.drop_policy = policy;
        self
    }

    /// Builds the sequence with the specified configuration.
    ///
    /// # Panics
    ///
    /// Panics if the requested capacity cannot be represented. Allocator failure is reported
    /// via [`std::alloc::handle_alloc_error`].
    #[must_use]
    #[inline]
    pub fn build(self) -> DynamicSequence<T> {
        or_handle_alloc_error(self.try_build())
    }

    /// Builds the sequence with the specified configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage for the requested capacity cannot be allocated.
    #[inline]
    pub fn try_build(self) -> Result<DynamicSequence<T>> {
        DynamicSequence::try_new_inner(self.capacity, self.drop_policy)
    }
}

impl<T> fmt::Debug for DynamicSequenceBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("capacity", &self.capacity)
            .field("drop_policy", &self.drop_policy)
            .finish()
    }
}
