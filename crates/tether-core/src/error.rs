//! Error types for Tether arrays.
//!
//! [`ArrayError`] covers every failure a container operation can report.
//! Contract violations are detected before any engine call is made, so a
//! failed operation never leaves a partial mutation behind.

use std::error::Error;
use std::fmt;

use crate::status::NativeStatus;
use crate::variant::VariantKind;

/// Errors from managed array operations.
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayError {
    /// A required source collection was absent.
    NullSource {
        /// Name of the missing argument.
        argument: &'static str,
    },
    /// Index outside the valid range for the operation.
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Array length at the time of the call.
        len: usize,
    },
    /// `[index, index + count)` is not a sub-range of the array.
    Range {
        /// Start of the requested range.
        index: usize,
        /// Length of the requested range.
        count: usize,
        /// Array length at the time of the call.
        len: usize,
    },
    /// Mutation attempted on a read-only array.
    ReadOnly,
    /// An argument is invalid (e.g. a zero slice step).
    Argument {
        /// Description of the problem.
        reason: String,
    },
    /// A typed view could not convert an element.
    Conversion(ConversionError),
    /// The native engine reported a failure.
    Native(NativeStatus),
}

impl fmt::Display for ArrayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NullSource { argument } => write!(f, "source '{argument}' is absent"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for array of length {len}")
            }
            Self::Range { index, count, len } => write!(
                f,
                "range starting at {index} with count {count} exceeds array length {len}"
            ),
            Self::ReadOnly => write!(f, "array is read-only"),
            Self::Argument { reason } => write!(f, "invalid argument: {reason}"),
            Self::Conversion(e) => write!(f, "element conversion failed: {e}"),
            Self::Native(status) => write!(f, "native engine error: {status}"),
        }
    }
}

impl Error for ArrayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Conversion(e) => Some(e),
            Self::Native(status) => Some(status),
            _ => None,
        }
    }
}

impl From<NativeStatus> for ArrayError {
    fn from(status: NativeStatus) -> Self {
        Self::Native(status)
    }
}

impl From<ConversionError> for ArrayError {
    fn from(e: ConversionError) -> Self {
        Self::Conversion(e)
    }
}

/// A [`Variant`](crate::Variant) could not be converted to an element type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConversionError {
    /// The variant holds a different kind of value.
    WrongKind {
        /// Name of the requested element type.
        expected: &'static str,
        /// Kind actually stored.
        found: VariantKind,
    },
    /// The variant has the right kind but the value does not fit losslessly.
    NotRepresentable {
        /// Name of the requested element type.
        expected: &'static str,
        /// Text form of the rejected value.
        value: String,
    },
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongKind { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            Self::NotRepresentable { expected, value } => {
                write!(f, "{value} is not representable as {expected}")
            }
        }
    }
}

impl Error for ConversionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            ArrayError::IndexOutOfRange { index: 4, len: 2 }.to_string(),
            "index 4 out of range for array of length 2"
        );
        assert_eq!(ArrayError::ReadOnly.to_string(), "array is read-only");
        assert_eq!(
            ArrayError::Conversion(ConversionError::WrongKind {
                expected: "i64",
                found: VariantKind::String,
            })
            .to_string(),
            "element conversion failed: expected i64, found string"
        );
    }

    #[test]
    fn conversion_error_is_source() {
        let err = ArrayError::from(ConversionError::NotRepresentable {
            expected: "i32",
            value: "4294967296".into(),
        });
        assert!(err.source().is_some());
        assert!(ArrayError::ReadOnly.source().is_none());
    }

    #[test]
    fn native_status_converts() {
        assert_eq!(
            ArrayError::from(NativeStatus::InvalidHandle),
            ArrayError::Native(NativeStatus::InvalidHandle)
        );
    }
}
