//! Contract violations reported by the collections.

use std::fmt;

/// Error returned by the fallible `try_*` operations.
///
/// Every variant is a caller-side precondition failure. The panicking
/// counterparts (`value`, `pop_back`, `undo`, ...) panic with this
/// error's [`Display`](fmt::Display) text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Index is not below the collection length.
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Length of the collection at the time of the call.
        len: usize,
    },
    /// Operation requires at least one element.
    EmptyCollection {
        /// Name of the rejected operation.
        operation: &'static str,
    },
    /// Undo requested with an empty undo stack.
    NothingToUndo,
    /// Redo requested with an empty redo stack.
    NothingToRedo,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index out of range: index {index}, length {len}")
            }
            Self::EmptyCollection { operation } => {
                write!(f, "{operation} called on an empty collection")
            }
            Self::NothingToUndo => write!(f, "nothing to undo"),
            Self::NothingToRedo => write!(f, "nothing to redo"),
        }
    }
}

impl std::error::Error for Error {}

/// Result alias for the fallible collection operations.
pub type Result<T> = std::result::Result<T, Error>;
