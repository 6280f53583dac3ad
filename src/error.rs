use thiserror::Error;

/// Errors reported when creating or growing a [`HashTable`].
///
/// Looking up or removing an absent key is not an error; those operations
/// return `None`.
///
/// [`HashTable`]: crate::HashTable
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// The requested bucket count is not one of [`PRIMES`](crate::primes::PRIMES).
    #[error("bucket count {requested} is not in the prime table")]
    InvalidCapacity {
        /// The rejected bucket count.
        requested: usize,
    },
    /// The requested load factor is not strictly positive.
    #[error("load factor must be greater than 0, got {requested}")]
    InvalidLoadFactor {
        /// The rejected load factor.
        requested: f32,
    },
    /// Reserving memory for entries or buckets failed.
    #[error("failed to allocate memory for the hash table")]
    AllocationFailure,
}

impl From<alloc::collections::TryReserveError> for Error {
    fn from(_: alloc::collections::TryReserveError) -> Self {
        Error::AllocationFailure
    }
}
