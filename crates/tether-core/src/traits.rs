//! The native engine interface.
//!
//! [`NativeArrayApi`] is the fixed operation set the managed layer
//! consumes. Engines own every array they hand out; callers only ever
//! hold [`RawArray`] ids and must release each one exactly once.
//!
//! `size`, `is_read_only`, `element` and `replace_element` model direct
//! access to a handle's fields and backing storage. Everything else is an
//! engine operation.

use std::sync::Arc;

use crate::id::RawArray;
use crate::status::NativeStatus;
use crate::storage::SharedArray;
use crate::variant::Variant;

/// Shared reference to an engine, as held by every managed container.
pub type SharedApi = Arc<dyn NativeArrayApi>;

/// Operations a native engine exposes over its variant arrays.
///
/// Every method fails with [`NativeStatus::InvalidHandle`] when given an
/// unallocated or released handle. Engines are shared across threads, but
/// a single handle is not: callers serialize access per handle.
pub trait NativeArrayApi: Send + Sync {
    /// Allocate an empty, writable array.
    fn new_empty(&self) -> Result<RawArray, NativeStatus>;

    /// Whether `raw` refers to a live array of this engine.
    fn is_allocated(&self, raw: RawArray) -> bool;

    /// Release `raw`. Further use of the id fails with `InvalidHandle`.
    fn release(&self, raw: RawArray) -> Result<(), NativeStatus>;

    /// Element count.
    fn size(&self, raw: RawArray) -> Result<usize, NativeStatus>;

    /// Read-only flag.
    fn is_read_only(&self, raw: RawArray) -> Result<bool, NativeStatus>;

    /// Copy of the element at `index`.
    fn element(&self, raw: RawArray, index: usize) -> Result<Variant, NativeStatus>;

    /// Overwrite the slot at `index`, returning the previous value so the
    /// caller disposes of it.
    fn replace_element(
        &self,
        raw: RawArray,
        index: usize,
        value: Variant,
    ) -> Result<Variant, NativeStatus>;

    /// New array with the same elements; nested arrays are duplicated
    /// when `deep`. The copy is never read-only.
    fn duplicate(&self, raw: RawArray, deep: bool) -> Result<RawArray, NativeStatus>;

    /// Grow with `Nil` or shrink, dropping removed slots.
    fn resize(&self, raw: RawArray, new_size: usize) -> Result<(), NativeStatus>;

    /// Overwrite every slot with a clone of `value`.
    fn fill(&self, raw: RawArray, value: &Variant) -> Result<(), NativeStatus>;

    /// Append `value`, returning its index.
    fn add(&self, raw: RawArray, value: Variant) -> Result<usize, NativeStatus>;

    /// Append every element of `other` in one call.
    fn add_range(&self, raw: RawArray, other: RawArray) -> Result<(), NativeStatus>;

    /// Insert `value` before `index` (`index == size` appends).
    fn insert(&self, raw: RawArray, index: usize, value: Variant) -> Result<(), NativeStatus>;

    /// Remove the element at `index`.
    fn remove_at(&self, raw: RawArray, index: usize) -> Result<(), NativeStatus>;

    /// First index `>= start` holding `value`, or `-1`.
    fn index_of(&self, raw: RawArray, value: &Variant, start: usize) -> Result<i64, NativeStatus>;

    /// Last index `<= start` holding `value`, or `-1`.
    fn last_index_of(
        &self,
        raw: RawArray,
        value: &Variant,
        start: usize,
    ) -> Result<i64, NativeStatus>;

    /// Binary search over the sorted range `[index, index + count)`.
    ///
    /// Returns the index of `value`, or the bitwise complement of the
    /// insertion point that keeps the range sorted.
    fn binary_search(
        &self,
        raw: RawArray,
        index: usize,
        count: usize,
        value: &Variant,
    ) -> Result<i64, NativeStatus>;

    /// New array holding every `step`-th element from `begin` towards
    /// `end` (exclusive). Negative positions are relative to the size.
    fn slice(
        &self,
        raw: RawArray,
        begin: i64,
        end: i64,
        step: i64,
        deep: bool,
    ) -> Result<RawArray, NativeStatus>;

    /// Largest element, or `Nil` when empty or not mutually comparable.
    fn max(&self, raw: RawArray) -> Result<Variant, NativeStatus>;

    /// Smallest element, or `Nil` when empty or not mutually comparable.
    fn min(&self, raw: RawArray) -> Result<Variant, NativeStatus>;

    /// Same size and every element recursively equal.
    fn recursive_equal(&self, raw: RawArray, other: RawArray) -> Result<bool, NativeStatus>;

    /// Set the one-way read-only flag.
    fn make_read_only(&self, raw: RawArray) -> Result<(), NativeStatus>;

    /// Text form of the array.
    fn stringify(&self, raw: RawArray) -> Result<String, NativeStatus>;

    /// New handle referring to `shared` (e.g. taken out of a variant).
    fn adopt_shared(&self, shared: SharedArray) -> Result<RawArray, NativeStatus>;

    /// The storage behind `raw`, for placing the array inside a variant.
    fn share(&self, raw: RawArray) -> Result<SharedArray, NativeStatus>;
}
