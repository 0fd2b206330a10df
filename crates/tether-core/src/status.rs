//! Status codes reported by native engines.
//!
//! [`NativeStatus`] covers every failure a
//! [`NativeArrayApi`](crate::NativeArrayApi) call can report. Success is
//! the `Ok` arm of the returned `Result`.

use std::error::Error;
use std::fmt;

/// Failure reported by a native engine operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NativeStatus {
    /// Handle is not allocated or was already released.
    InvalidHandle,
    /// An argument is out of range or otherwise invalid.
    InvalidArgument,
    /// Element index outside the array.
    OutOfBounds,
    /// Mutation attempted on a read-only array.
    ReadOnly,
    /// Nested arrays exceeded the recursion bound.
    RecursionLimit,
    /// Requested size exceeds the engine's capacity.
    CapacityExceeded,
    /// Internal error (e.g. poisoned mutex after a prior panic).
    InternalError,
}

impl fmt::Display for NativeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidHandle => write!(f, "invalid or released array handle"),
            Self::InvalidArgument => write!(f, "invalid argument"),
            Self::OutOfBounds => write!(f, "index out of bounds"),
            Self::ReadOnly => write!(f, "array is read-only"),
            Self::RecursionLimit => write!(f, "maximum recursion depth reached"),
            Self::CapacityExceeded => write!(f, "array capacity exceeded"),
            Self::InternalError => write!(f, "internal engine error"),
        }
    }
}

impl Error for NativeStatus {}
