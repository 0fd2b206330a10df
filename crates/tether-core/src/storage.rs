//! Engine-side array storage.
//!
//! A [`SharedArray`] is the reference-counted storage behind one native
//! array: the element vector and its read-only flag. Every handle an
//! engine issues and every [`Variant::Array`] points at one of these;
//! clones alias the same elements.
//!
//! Recursive operations never hold a lock while descending: they take a
//! cheap snapshot of the element list (clones share nested storage) and
//! release the lock first, so arrays that contain themselves cannot
//! deadlock. Depth is bounded by the caller-supplied `depth_left`.

use std::cmp::Ordering;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use smallvec::SmallVec;

use crate::status::NativeStatus;
use crate::variant::Variant;

/// Element snapshot taken without holding the storage lock.
pub type ElementSnapshot = SmallVec<[Variant; 8]>;

/// The contents of one native array.
#[derive(Debug, Default)]
pub struct ArrayStorage {
    /// Elements in index order.
    pub elements: Vec<Variant>,
    /// One-way read-only flag.
    pub read_only: bool,
}

/// Shared, reference-counted native array storage.
#[derive(Clone, Default)]
pub struct SharedArray(Arc<Mutex<ArrayStorage>>);

impl SharedArray {
    /// Create empty, writable storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create writable storage holding `elements`.
    pub fn from_elements(elements: Vec<Variant>) -> Self {
        Self(Arc::new(Mutex::new(ArrayStorage {
            elements,
            read_only: false,
        })))
    }

    /// Lock the storage. A poisoned lock is recovered.
    pub fn lock(&self) -> MutexGuard<'_, ArrayStorage> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.lock().elements.len()
    }

    /// Whether the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the read-only flag is set.
    pub fn is_read_only(&self) -> bool {
        self.lock().read_only
    }

    /// Whether both references point at the same storage.
    pub fn ptr_eq(&self, other: &SharedArray) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Clone the element list and release the lock.
    pub fn snapshot(&self) -> ElementSnapshot {
        self.lock().elements.iter().cloned().collect()
    }

    /// Copy into new, writable storage.
    ///
    /// Shallow copies share nested arrays; deep copies duplicate them.
    /// The read-only flag is never inherited.
    pub fn duplicate(&self, deep: bool, depth_left: usize) -> Result<SharedArray, NativeStatus> {
        if deep && depth_left == 0 {
            return Err(NativeStatus::RecursionLimit);
        }
        let snapshot = self.snapshot();
        let elements = if deep {
            snapshot
                .iter()
                .map(|v| v.duplicate(true, depth_left - 1))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            snapshot.into_vec()
        };
        Ok(SharedArray::from_elements(elements))
    }

    /// Same length and every element recursively equal.
    pub fn recursive_eq(&self, other: &SharedArray, depth_left: usize) -> Result<bool, NativeStatus> {
        if self.ptr_eq(other) {
            return Ok(true);
        }
        if depth_left == 0 {
            return Err(NativeStatus::RecursionLimit);
        }
        let lhs = self.snapshot();
        let rhs = other.snapshot();
        if lhs.len() != rhs.len() {
            return Ok(false);
        }
        for (a, b) in lhs.iter().zip(rhs.iter()) {
            if !a.recursive_eq(b, depth_left - 1)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Lexicographic ordering; `None` as soon as a pair is incomparable.
    pub fn compare(&self, other: &SharedArray, depth_left: usize) -> Option<Ordering> {
        if self.ptr_eq(other) {
            return Some(Ordering::Equal);
        }
        if depth_left == 0 {
            return None;
        }
        let lhs = self.snapshot();
        let rhs = other.snapshot();
        for (a, b) in lhs.iter().zip(rhs.iter()) {
            match a.compare(b, depth_left - 1)? {
                Ordering::Equal => continue,
                decided => return Some(decided),
            }
        }
        Some(lhs.len().cmp(&rhs.len()))
    }

    /// Text form, e.g. `[1, "a", [2]]`. Nesting past `depth_left` prints
    /// as `[...]`.
    pub fn stringify(&self, depth_left: usize) -> String {
        let mut out = String::new();
        self.write_to(&mut out, depth_left);
        out
    }

    pub(crate) fn write_to(&self, out: &mut String, depth_left: usize) {
        if depth_left == 0 {
            out.push_str("[...]");
            return;
        }
        out.push('[');
        for (i, element) in self.snapshot().iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            element.write_nested(out, depth_left - 1);
        }
        out.push(']');
    }
}

impl fmt::Debug for SharedArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let storage = self.lock();
        f.debug_struct("SharedArray")
            .field("len", &storage.elements.len())
            .field("read_only", &storage.read_only)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> SharedArray {
        SharedArray::from_elements(values.iter().copied().map(Variant::Int).collect())
    }

    #[test]
    fn clones_alias_storage() {
        let a = ints(&[1, 2]);
        let b = a.clone();
        b.lock().elements.push(Variant::Int(3));
        assert_eq!(a.len(), 3);
        assert!(a.ptr_eq(&b));
    }

    #[test]
    fn duplicate_drops_read_only() {
        let a = ints(&[1]);
        a.lock().read_only = true;
        let copy = a.duplicate(false, 4).unwrap();
        assert!(!copy.is_read_only());
        assert!(a.is_read_only());
    }

    #[test]
    fn self_containing_array_hits_recursion_limit() {
        let a = ints(&[1]);
        a.lock().elements.push(Variant::Array(a.clone()));
        assert_eq!(a.duplicate(true, 16).unwrap_err(), NativeStatus::RecursionLimit);
        // Shallow copy still works and shares the cycle.
        let shallow = a.duplicate(false, 16).unwrap();
        assert!(shallow.snapshot()[1].as_array().unwrap().ptr_eq(&a));
        // Break the cycle so the test does not leak.
        a.lock().elements.clear();
    }

    #[test]
    fn self_comparison_short_circuits() {
        let a = ints(&[1]);
        a.lock().elements.push(Variant::Array(a.clone()));
        assert_eq!(a.recursive_eq(&a, 4), Ok(true));
        let other = a.duplicate(false, 4).unwrap();
        // Different storage whose nested element is `a` itself.
        assert_eq!(a.recursive_eq(&other, 4), Ok(true));
        a.lock().elements.clear();
    }

    #[test]
    fn lexicographic_compare() {
        assert_eq!(ints(&[1, 2]).compare(&ints(&[1, 3]), 4), Some(Ordering::Less));
        assert_eq!(ints(&[1, 2]).compare(&ints(&[1]), 4), Some(Ordering::Greater));
        let mixed = SharedArray::from_elements(vec![Variant::Nil]);
        assert_eq!(mixed.compare(&ints(&[1]), 4), None);
    }

    #[test]
    fn deep_cycle_stringifies_with_ellipsis() {
        let a = ints(&[1]);
        a.lock().elements.push(Variant::Array(a.clone()));
        assert_eq!(a.stringify(2), "[1, [1, [...]]]");
        a.lock().elements.clear();
    }
}
