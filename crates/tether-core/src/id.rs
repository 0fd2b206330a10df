//! Opaque identifiers that cross the native boundary.

use std::fmt;

/// Opaque id of a native array handle.
///
/// Ids are issued by a [`NativeArrayApi`](crate::NativeArrayApi)
/// implementation and are meaningless to anyone else. [`RawArray::NULL`]
/// is never issued and stands for "not allocated".
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RawArray(pub u64);

impl RawArray {
    /// The unallocated handle.
    pub const NULL: RawArray = RawArray(0);

    /// Whether this is [`RawArray::NULL`].
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl Default for RawArray {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for RawArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

impl From<u64> for RawArray {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Reference to a foreign object stored inside a [`Variant`](crate::Variant).
///
/// Object references are copied, never duplicated: a deep copy of an
/// array still points at the same objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ObjectId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_handle_is_default() {
        assert!(RawArray::default().is_null());
        assert!(!RawArray(7).is_null());
    }

    #[test]
    fn raw_array_displays_as_hex() {
        assert_eq!(RawArray(0x1_0000_0001).to_string(), "0x0000000100000001");
    }
}
