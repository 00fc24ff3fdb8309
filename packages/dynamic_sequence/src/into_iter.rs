use std::iter::FusedIterator;
use std::{fmt, ptr, slice};

use crate::RawStorage;

/// An iterator that moves the elements out of a [`DynamicSequence`][crate::DynamicSequence].
///
/// Created by the [`IntoIterator`] implementation of the sequence. Elements that are not
/// consumed are dropped together with the iterator.
pub struct IntoIter<T> {
    storage: RawStorage<T>,

    // Slots [front, back) hold the values that have not been yielded yet.
    front: usize,
    back: usize,
}

impl<T> IntoIter<T> {
    /// # Safety
    ///
    /// The first `len` slots of `storage` must hold live values that nobody else will drop.
    pub(crate) unsafe fn new(storage: RawStorage<T>, len: usize) -> Self {
        debug_assert!(len <= storage.capacity());

        Self {
            storage,
            front: 0,
            back: len,
        }
    }

    /// The elements that have not been yielded yet.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        let remaining = self.back.wrapping_sub(self.front);

        // SAFETY: Slots [front, back) hold live values.
        unsafe { slice::from_raw_parts(self.storage.slot_ptr(self.front).as_ptr(), remaining) }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }

        let index = self.front;
        // Cannot overflow because front < back.
        self.front = index.wrapping_add(1);

        // SAFETY: The slot holds a live value that we stopped tracking above.
        Some(unsafe { self.storage.slot(index).assume_init_read() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back.wrapping_sub(self.front);
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }

        // Cannot underflow because back > front.
        self.back = self.back.wrapping_sub(1);

        // SAFETY: The slot holds a live value that we stopped tracking above.
        Some(unsafe { self.storage.slot(self.back).assume_init_read() })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        let remaining = ptr::slice_from_raw_parts_mut(
            self.storage.slot_ptr(self.front).as_ptr(),
            self.back.wrapping_sub(self.front),
        );

        // A panicking destructor must not cause a second attempt at the same values.
        self.front = self.back;

        // SAFETY: The slots held live values that are no longer tracked. The storage itself is
        // released afterwards by its own destructor.
        unsafe {
            ptr::drop_in_place(remaining);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}
