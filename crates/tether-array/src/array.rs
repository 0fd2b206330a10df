//! The untyped managed container.

use std::fmt;
use std::ops::Add;
use std::sync::Arc;

use tether_core::{
    ArrayError, NativeArrayApi, NativeStatus, RawArray, SharedApi, SharedArray, Variant,
};

use crate::handle::ArrayHandle;
use crate::iter::Iter;

/// A managed array of [`Variant`] values whose storage lives in a native
/// engine.
///
/// Owns its engine handle: the handle is released exactly once, either by
/// [`release`](VarArray::release) / [`dispose`](VarArray::dispose) or when
/// the value is dropped. Every check (read-only, bounds, range) runs before
/// the engine is called, so a failed operation leaves the array untouched.
///
/// Nested arrays are shared by reference: a [`Variant::Array`] element
/// aliases the storage it was taken from until duplicated deeply.
pub struct VarArray {
    handle: ArrayHandle,
}

fn found(index: i64) -> Option<usize> {
    usize::try_from(index).ok()
}

impl VarArray {
    /// Allocate an empty array.
    pub fn new(api: &SharedApi) -> Result<Self, ArrayError> {
        let raw = api.new_empty()?;
        Ok(Self::adopt(api, raw))
    }

    fn adopt(api: &SharedApi, raw: RawArray) -> Self {
        Self {
            handle: ArrayHandle::adopt(api, raw),
        }
    }

    /// Allocate an array holding `items` in iteration order.
    pub fn from_iter_in<I>(api: &SharedApi, items: I) -> Result<Self, ArrayError>
    where
        I: IntoIterator<Item = Variant>,
    {
        let mut array = Self::new(api)?;
        array.add_range(items)?;
        Ok(array)
    }

    /// Like [`from_iter_in`](Self::from_iter_in), for a source that may be
    /// absent. `None` fails with [`ArrayError::NullSource`].
    pub fn from_source<I>(api: &SharedApi, source: Option<I>) -> Result<Self, ArrayError>
    where
        I: IntoIterator<Item = Variant>,
    {
        match source {
            Some(items) => Self::from_iter_in(api, items),
            None => Err(ArrayError::NullSource {
                argument: "collection",
            }),
        }
    }

    /// Allocate an array holding a copy of `values`: one resize, then one
    /// write per slot.
    pub fn from_slice(api: &SharedApi, values: &[Variant]) -> Result<Self, ArrayError> {
        let mut array = Self::new(api)?;
        array.resize(values.len())?;
        for (index, value) in values.iter().enumerate() {
            array.set(index, value.clone())?;
        }
        Ok(array)
    }

    /// Take ownership of an engine handle, typically one the engine
    /// returned from another call.
    ///
    /// An unallocated id is replaced by a fresh empty array rather than
    /// failing.
    pub fn from_raw(api: &SharedApi, raw: RawArray) -> Result<Self, ArrayError> {
        if api.is_allocated(raw) {
            return Ok(Self::adopt(api, raw));
        }
        log::debug!("array {raw} is not allocated, allocating an empty one");
        Self::new(api)
    }

    /// Wrap existing storage, e.g. taken out of a [`Variant::Array`]. The
    /// new container aliases `shared`.
    pub fn from_shared(api: &SharedApi, shared: SharedArray) -> Result<Self, ArrayError> {
        let raw = api.adopt_shared(shared)?;
        Ok(Self::adopt(api, raw))
    }

    /// This array as a variant. The variant aliases the same storage.
    pub fn to_variant(&self) -> Result<Variant, ArrayError> {
        Ok(Variant::Array(self.api().share(self.raw())?))
    }

    /// The engine id this container owns.
    pub fn raw(&self) -> RawArray {
        self.handle.raw()
    }

    /// The engine this container belongs to.
    pub fn api(&self) -> &SharedApi {
        self.handle.api()
    }

    fn same_engine(&self, other: &VarArray) -> bool {
        Arc::ptr_eq(self.api(), other.api())
    }

    fn size(&self) -> Result<usize, ArrayError> {
        Ok(self.api().size(self.raw())?)
    }

    fn ensure_writable(&self) -> Result<(), ArrayError> {
        if self.api().is_read_only(self.raw())? {
            return Err(ArrayError::ReadOnly);
        }
        Ok(())
    }

    fn check_index(index: usize, len: usize) -> Result<(), ArrayError> {
        if index >= len {
            return Err(ArrayError::IndexOutOfRange { index, len });
        }
        Ok(())
    }

    /// Number of elements; `0` once released.
    pub fn len(&self) -> usize {
        self.size().unwrap_or(0)
    }

    /// Whether the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether [`make_read_only`](Self::make_read_only) was called on this
    /// storage.
    pub fn is_read_only(&self) -> bool {
        self.api().is_read_only(self.raw()).unwrap_or(false)
    }

    /// Whether the engine handle has been released.
    pub fn is_released(&self) -> bool {
        self.handle.is_released()
    }

    /// Copy of the element at `index`.
    pub fn get(&self, index: usize) -> Result<Variant, ArrayError> {
        Self::check_index(index, self.size()?)?;
        Ok(self.api().element(self.raw(), index)?)
    }

    /// Replace the element at `index`. The previous value is dropped
    /// before this returns.
    pub fn set(&mut self, index: usize, value: Variant) -> Result<(), ArrayError> {
        self.ensure_writable()?;
        Self::check_index(index, self.size()?)?;
        let previous = self.api().replace_element(self.raw(), index, value)?;
        drop(previous);
        Ok(())
    }

    /// Append `value`, returning its index.
    pub fn add(&mut self, value: Variant) -> Result<usize, ArrayError> {
        self.ensure_writable()?;
        Ok(self.api().add(self.raw(), value)?)
    }

    /// Insert `value` before `index`; `index == len` appends.
    pub fn insert(&mut self, index: usize, value: Variant) -> Result<(), ArrayError> {
        self.ensure_writable()?;
        let len = self.size()?;
        if index > len {
            return Err(ArrayError::IndexOutOfRange { index, len });
        }
        Ok(self.api().insert(self.raw(), index, value)?)
    }

    /// Append every item.
    ///
    /// When the iterator reports an exact length the array is resized once
    /// and filled by index; otherwise items are appended one at a time.
    /// A failure part way through truncates the array back to its
    /// original length. For another container use
    /// [`append_array`](Self::append_array).
    pub fn add_range<I>(&mut self, items: I) -> Result<(), ArrayError>
    where
        I: IntoIterator<Item = Variant>,
    {
        self.ensure_writable()?;
        let mut items = items.into_iter();
        let start = self.size()?;
        let result = match items.size_hint() {
            (0, Some(0)) => return Ok(()),
            (count, Some(upper)) if count == upper => self.fill_from(start, count, items),
            _ => items.try_for_each(|item| self.api().add(self.raw(), item).map(|_| ())),
        };
        if let Err(status) = result {
            if let Err(rollback) = self.api().resize(self.raw(), start) {
                log::warn!("rollback of array {} failed: {rollback}", self.raw());
            }
            return Err(status.into());
        }
        Ok(())
    }

    /// Grow by `count` slots and write `items` into them. An iterator that
    /// yields fewer items than it promised leaves no trailing `Nil`s.
    fn fill_from<I>(&self, start: usize, count: usize, items: I) -> Result<(), NativeStatus>
    where
        I: Iterator<Item = Variant>,
    {
        let target = start
            .checked_add(count)
            .ok_or(NativeStatus::CapacityExceeded)?;
        self.api().resize(self.raw(), target)?;
        let mut written = 0;
        for item in items.take(count) {
            let previous = self.api().replace_element(self.raw(), start + written, item)?;
            drop(previous);
            written += 1;
        }
        if written < count {
            self.api().resize(self.raw(), start + written)?;
        }
        Ok(())
    }

    /// Append every element of `other` with one bulk engine call.
    ///
    /// Arrays of another engine instance are copied element by element.
    pub fn append_array(&mut self, other: &VarArray) -> Result<(), ArrayError> {
        self.ensure_writable()?;
        if self.same_engine(other) {
            return Ok(self.api().add_range(self.raw(), other.raw())?);
        }
        let items = other.iter().collect::<Vec<_>>();
        self.add_range(items)
    }

    /// Remove the first element equal to `value`. Returns whether one was
    /// found.
    pub fn remove(&mut self, value: &Variant) -> Result<bool, ArrayError> {
        self.ensure_writable()?;
        match self.index_of(value)? {
            Some(index) => {
                self.api().remove_at(self.raw(), index)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove the element at `index`.
    pub fn remove_at(&mut self, index: usize) -> Result<(), ArrayError> {
        self.ensure_writable()?;
        Self::check_index(index, self.size()?)?;
        Ok(self.api().remove_at(self.raw(), index)?)
    }

    /// Index of the first element equal to `value`.
    pub fn index_of(&self, value: &Variant) -> Result<Option<usize>, ArrayError> {
        self.index_of_from(value, 0)
    }

    /// Index of the first element at or after `start` equal to `value`.
    ///
    /// `start` may equal the length. An empty array answers `None` without
    /// calling the engine.
    pub fn index_of_from(&self, value: &Variant, start: usize) -> Result<Option<usize>, ArrayError> {
        let len = self.size()?;
        if start > len {
            return Err(ArrayError::IndexOutOfRange { index: start, len });
        }
        if len == 0 {
            return Ok(None);
        }
        Ok(found(self.api().index_of(self.raw(), value, start)?))
    }

    /// Index of the last element equal to `value`.
    pub fn last_index_of(&self, value: &Variant) -> Result<Option<usize>, ArrayError> {
        let len = self.size()?;
        if len == 0 {
            return Ok(None);
        }
        Ok(found(self.api().last_index_of(self.raw(), value, len - 1)?))
    }

    /// Index of the last element at or before `start` equal to `value`.
    ///
    /// An empty array answers `None` without calling the engine, whatever
    /// `start` is.
    pub fn last_index_of_from(
        &self,
        value: &Variant,
        start: usize,
    ) -> Result<Option<usize>, ArrayError> {
        let len = self.size()?;
        if len == 0 {
            return Ok(None);
        }
        Self::check_index(start, len)?;
        Ok(found(self.api().last_index_of(self.raw(), value, start)?))
    }

    /// Whether any element equals `value`.
    pub fn contains(&self, value: &Variant) -> Result<bool, ArrayError> {
        Ok(self.index_of(value)?.is_some())
    }

    /// Binary search over the whole (sorted) array. See
    /// [`binary_search_range`](Self::binary_search_range).
    pub fn binary_search(&self, value: &Variant) -> Result<i64, ArrayError> {
        let len = self.size()?;
        self.binary_search_range(0, len, value)
    }

    /// Binary search over the sorted range `[index, index + count)`.
    ///
    /// Returns the index of `value`, or the bitwise complement (`!i`) of
    /// the position where it would be inserted to keep the range sorted.
    /// Results on an unsorted range are unspecified.
    pub fn binary_search_range(
        &self,
        index: usize,
        count: usize,
        value: &Variant,
    ) -> Result<i64, ArrayError> {
        let len = self.size()?;
        if index.checked_add(count).is_none_or(|end| end > len) {
            return Err(ArrayError::Range { index, count, len });
        }
        if len == 0 {
            return Ok(-1);
        }
        Ok(self.api().binary_search(self.raw(), index, count, value)?)
    }

    /// Grow with `Nil` or shrink to `new_size` elements.
    pub fn resize(&mut self, new_size: usize) -> Result<(), ArrayError> {
        self.ensure_writable()?;
        Ok(self.api().resize(self.raw(), new_size)?)
    }

    /// Remove every element.
    pub fn clear(&mut self) -> Result<(), ArrayError> {
        self.resize(0)
    }

    /// Set every slot to `value`. Arrays and objects are stored by
    /// reference.
    pub fn fill(&mut self, value: &Variant) -> Result<(), ArrayError> {
        self.ensure_writable()?;
        Ok(self.api().fill(self.raw(), value)?)
    }

    /// New array with the same elements.
    ///
    /// Shallow copies share nested arrays with `self`; deep copies
    /// duplicate them. Objects are never duplicated. The copy is never
    /// read-only.
    pub fn duplicate(&self, deep: bool) -> Result<VarArray, ArrayError> {
        let raw = self.api().duplicate(self.raw(), deep)?;
        Ok(Self::adopt(self.api(), raw))
    }

    /// New array of every `step`-th element from `start` towards `end`
    /// (exclusive).
    ///
    /// Negative positions count from the end (`-2` is `len - 2`) and both
    /// bounds are clamped. A negative `step` walks backwards and needs
    /// `start > end`. `deep` copies nested arrays.
    pub fn slice_range(
        &self,
        start: i64,
        end: i64,
        step: i64,
        deep: bool,
    ) -> Result<VarArray, ArrayError> {
        if step == 0 {
            return Err(ArrayError::Argument {
                reason: "slice step cannot be zero".to_owned(),
            });
        }
        let raw = self.api().slice(self.raw(), start, end, step, deep)?;
        Ok(Self::adopt(self.api(), raw))
    }

    /// Shallow copy of the elements from `start` to the end.
    pub fn slice_from(&self, start: usize) -> Result<VarArray, ArrayError> {
        let len = self.size()?;
        if start > len {
            return Err(ArrayError::IndexOutOfRange { index: start, len });
        }
        self.slice_range(start as i64, len as i64, 1, false)
    }

    /// Shallow copy of up to `length` elements from `start`.
    pub fn slice(&self, start: usize, length: usize) -> Result<VarArray, ArrayError> {
        let len = self.size()?;
        if start > len {
            return Err(ArrayError::IndexOutOfRange { index: start, len });
        }
        if length > len {
            return Err(ArrayError::IndexOutOfRange { index: length, len });
        }
        self.slice_range(start as i64, (start + length) as i64, 1, false)
    }

    /// New array holding `left`'s elements followed by `right`'s. Absent
    /// sides count as empty; neither input changes.
    pub fn concat(
        api: &SharedApi,
        left: Option<&VarArray>,
        right: Option<&VarArray>,
    ) -> Result<VarArray, ArrayError> {
        let mut joined = match left {
            Some(left) => left.duplicate(false)?,
            None => VarArray::new(api)?,
        };
        if let Some(right) = right {
            joined.append_array(right)?;
        }
        Ok(joined)
    }

    /// Same length and every element recursively equal. Nested arrays
    /// compare by content.
    pub fn recursive_equal(&self, other: &VarArray) -> Result<bool, ArrayError> {
        if self.same_engine(other) {
            return Ok(self.api().recursive_equal(self.raw(), other.raw())?);
        }
        let lhs = self.api().share(self.raw())?;
        let rhs = other.api().share(other.raw())?;
        Ok(lhs.recursive_eq(&rhs, tether_core::DEFAULT_MAX_RECURSION)?)
    }

    /// Forbid further mutation of this storage. One-way.
    pub fn make_read_only(&mut self) -> Result<(), ArrayError> {
        if self.api().is_read_only(self.raw())? {
            return Ok(());
        }
        Ok(self.api().make_read_only(self.raw())?)
    }

    /// Largest element; `Nil` when empty or not mutually comparable.
    pub fn max(&self) -> Result<Variant, ArrayError> {
        Ok(self.api().max(self.raw())?)
    }

    /// Smallest element; `Nil` when empty or not mutually comparable.
    pub fn min(&self) -> Result<Variant, ArrayError> {
        Ok(self.api().min(self.raw())?)
    }

    /// Copy every element into `dest` starting at `at`.
    pub fn copy_to(&self, dest: &mut [Variant], at: usize) -> Result<(), ArrayError> {
        let len = self.size()?;
        if at > dest.len() || dest.len() - at < len {
            return Err(ArrayError::IndexOutOfRange {
                index: at,
                len: dest.len(),
            });
        }
        for (index, slot) in dest[at..at + len].iter_mut().enumerate() {
            *slot = self.api().element(self.raw(), index)?;
        }
        Ok(())
    }

    /// Elements in index order.
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self)
    }

    /// Release the engine handle now, consuming the container.
    pub fn release(self) -> Result<(), ArrayError> {
        Ok(self.handle.release()?)
    }

    /// Release the engine handle now. Later calls, and the eventual drop,
    /// do nothing.
    pub fn dispose(&mut self) -> Result<(), ArrayError> {
        Ok(self.handle.dispose()?)
    }
}

impl PartialEq for VarArray {
    fn eq(&self, other: &Self) -> bool {
        self.recursive_equal(other).unwrap_or(false)
    }
}

impl Add for &VarArray {
    type Output = Result<VarArray, ArrayError>;

    fn add(self, rhs: &VarArray) -> Self::Output {
        VarArray::concat(self.api(), Some(self), Some(rhs))
    }
}

impl<'a> IntoIterator for &'a VarArray {
    type Item = Variant;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for VarArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.api().stringify(self.raw()) {
            Ok(text) => f.write_str(&text),
            Err(status) => write!(f, "<{status}>"),
        }
    }
}

impl fmt::Debug for VarArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VarArray")
            .field("raw", &self.raw())
            .field("len", &self.len())
            .field("read_only", &self.is_read_only())
            .field("released", &self.is_released())
            .finish()
    }
}
