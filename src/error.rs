use thiserror::Error;

/// Errors returned when constructing a table or set.
///
/// Every other operation is total: a missing key is reported as `false`,
/// and allocation failure aborts through
/// [`handle_alloc_error`](alloc::alloc::handle_alloc_error).
#[derive(Clone, Copy, Debug, PartialEq, Error)]
#[non_exhaustive]
pub enum Error {
    /// The load factor was not inside the open interval `(0, 1)`.
    #[error("load factor {0} is outside the open interval (0, 1)")]
    InvalidLoadFactor(f64),

    /// The requested size needs more slots than can be allocated.
    #[error("{expected} expected elements need a table larger than the maximum capacity")]
    CapacityOverflow {
        /// The number of elements the caller asked room for.
        expected: usize,
    },
}
