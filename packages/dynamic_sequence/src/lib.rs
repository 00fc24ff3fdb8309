#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A growable contiguous sequence built from two layers that keep raw memory separate from the
//! lifecycle of the elements living in it.
//!
//! This crate provides:
//!
//! - [`RawStorage<T>`] owns an uninitialized block of memory with room for a fixed number of
//!   `T` values. It allocates and releases the memory but never constructs or drops a `T`.
//! - [`DynamicSequence<T>`] tracks how many leading slots of its storage hold live values and
//!   implements growth, positional insertion and removal, resizing and copying on top of it.
//!
//! # Key Features
//!
//! - **Amortized O(1) appends**: the capacity doubles whenever the sequence is full
//! - **Strong panic safety for growth**: if allocation fails or constructing the new element
//!   panics, the sequence is left exactly as it was
//! - **Fallible allocation**: every allocating operation has a `try_*` twin that returns
//!   [`Error`] instead of aborting
//! - **Slice access**: the sequence dereferences to `[T]`, so everything slices can do is available
//! - **Capacity reuse on assignment**: [`Clone::clone_from`] reuses the existing block when the
//!   source fits into it
//! - **Drop policies**: a sequence can be told to panic if it is dropped while not empty
//!
//! # Examples
//!
//! ```rust
//! use dynamic_sequence::DynamicSequence;
//!
//! let mut sequence = DynamicSequence::new();
//!
//! for value in 1..=3 {
//!     sequence.push_back(value);
//! }
//!
//! // Constructs the value in place and returns a reference to it.
//! *sequence.emplace_at(0, || 10) += 5;
//! assert_eq!(*sequence, [15, 1, 2, 3]);
//!
//! // Capacity is only ever increased, never decreased.
//! sequence.reserve(32);
//! sequence.clear();
//! assert_eq!(sequence.capacity(), 32);
//! ```
//!
//! ## Working with raw storage
//!
//! ```rust
//! use dynamic_sequence::RawStorage;
//!
//! let mut storage = RawStorage::<u64>::allocate(4).unwrap();
//! storage.slot_mut(0).write(42);
//!
//! // SAFETY: We initialized slot 0 above.
//! let value = unsafe { storage.slot(0).assume_init_read() };
//! assert_eq!(value, 42);
//! ```

mod builder;
mod drop_policy;
mod error;
mod into_iter;
mod raw_storage;
mod sequence;

pub use builder::*;
pub use drop_policy::*;
pub use error::Error;
pub(crate) use error::{Result, or_handle_alloc_error};
pub use into_iter::IntoIter;
pub use raw_storage::RawStorage;
pub use sequence::DynamicSequence;
