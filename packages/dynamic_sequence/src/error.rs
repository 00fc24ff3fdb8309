use std::alloc::{Layout, handle_alloc_error};

use thiserror::Error;

/// Errors that can occur when a sequence or raw storage block needs more memory.
///
/// Returned by the `try_*` family of methods. When one of these is returned, the
/// collection that produced it is left exactly as it was before the call.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The requested number of elements cannot be expressed as a memory layout, either
    /// because the byte size overflows or because the capacity cannot be doubled any further.
    #[error("requested capacity exceeds the maximum size of a single allocation")]
    CapacityOverflow,

    /// The global allocator could not satisfy the request.
    #[error(
        "memory allocator failed to allocate {} bytes aligned to {}",
        .layout.size(),
        .layout.align()
    )]
    AllocationFailed {
        /// The layout that was requested from the allocator.
        layout: Layout,
    },
}

/// A specialized `Result` type for storage operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;

/// Unwraps the result of a fallible storage operation on behalf of the infallible API.
///
/// Allocator failure is reported through [`handle_alloc_error`], the same as the standard
/// library collections do, whereas an impossible capacity is a panic.
pub(crate) fn or_handle_alloc_error<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(Error::AllocationFailed { layout }) => handle_alloc_error(layout),
        Err(Error::CapacityOverflow) => panic!("{}", Error::CapacityOverflow),
    }
}
