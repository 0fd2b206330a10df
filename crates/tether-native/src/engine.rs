//! The reference engine.
//!
//! Handles live in a [`HandleTable`] of [`SharedArray`] references behind
//! one mutex. Operations resolve a handle to its storage (a cheap `Arc`
//! clone), drop the table lock, then work on the storage alone, so the
//! table is never held while element values are compared or dropped.

use std::cmp::Ordering;
use std::sync::{Mutex, MutexGuard};

use tether_core::{
    ArrayStorage, HandleTable, NativeArrayApi, NativeStatus, RawArray, SharedArray, Variant,
};

use crate::config::{ConfigError, EngineConfig};
use crate::metrics::{CallCounters, EngineMetrics, Op};
use crate::ops;

/// In-process native array engine.
///
/// Thread-safe; share it as a [`SharedApi`](tether_core::SharedApi).
pub struct NativeEngine {
    arrays: Mutex<HandleTable<SharedArray>>,
    config: EngineConfig,
    counters: CallCounters,
}

impl NativeEngine {
    /// Create an engine after validating `config`.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            arrays: Mutex::new(HandleTable::new()),
            config,
            counters: CallCounters::default(),
        })
    }

    /// Create an engine with [`EngineConfig::default`].
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// The engine's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Snapshot of per-operation call counts and live handles.
    pub fn metrics(&self) -> EngineMetrics {
        self.counters.snapshot(self.live_handles())
    }

    /// Zero every call counter. Live handles are unaffected.
    pub fn reset_metrics(&self) {
        self.counters.reset();
    }

    /// Number of handles allocated and not yet released.
    pub fn live_handles(&self) -> usize {
        self.table().map_or(0, |t| t.len())
    }

    fn table(&self) -> Result<MutexGuard<'_, HandleTable<SharedArray>>, NativeStatus> {
        self.arrays.lock().map_err(|_| NativeStatus::InternalError)
    }

    fn resolve(&self, raw: RawArray) -> Result<SharedArray, NativeStatus> {
        if raw.is_null() {
            return Err(NativeStatus::InvalidHandle);
        }
        self.table()?
            .get(raw.0)
            .cloned()
            .ok_or(NativeStatus::InvalidHandle)
    }

    fn allocate(&self, shared: SharedArray) -> Result<RawArray, NativeStatus> {
        let raw = RawArray(self.table()?.insert(shared));
        log::trace!("allocated array {raw}");
        Ok(raw)
    }

    fn check_capacity(&self, new_len: usize) -> Result<(), NativeStatus> {
        if new_len > self.config.max_len {
            return Err(NativeStatus::CapacityExceeded);
        }
        Ok(())
    }

    fn depth(&self) -> usize {
        self.config.max_recursion_depth
    }
}

impl Default for NativeEngine {
    fn default() -> Self {
        Self {
            arrays: Mutex::new(HandleTable::new()),
            config: EngineConfig::default(),
            counters: CallCounters::default(),
        }
    }
}

fn writable(shared: &SharedArray) -> Result<MutexGuard<'_, ArrayStorage>, NativeStatus> {
    let storage = shared.lock();
    if storage.read_only {
        return Err(NativeStatus::ReadOnly);
    }
    Ok(storage)
}

impl NativeArrayApi for NativeEngine {
    fn new_empty(&self) -> Result<RawArray, NativeStatus> {
        self.counters.record(Op::NewEmpty);
        self.allocate(SharedArray::new())
    }

    fn is_allocated(&self, raw: RawArray) -> bool {
        !raw.is_null() && self.table().is_ok_and(|t| t.contains(raw.0))
    }

    fn release(&self, raw: RawArray) -> Result<(), NativeStatus> {
        self.counters.record(Op::Release);
        if raw.is_null() {
            return Err(NativeStatus::InvalidHandle);
        }
        // Bind the removed storage so it drops after the table guard.
        let removed = self.table()?.remove(raw.0);
        match removed {
            Some(_) => {
                log::trace!("released array {raw}");
                Ok(())
            }
            None => Err(NativeStatus::InvalidHandle),
        }
    }

    fn size(&self, raw: RawArray) -> Result<usize, NativeStatus> {
        Ok(self.resolve(raw)?.len())
    }

    fn is_read_only(&self, raw: RawArray) -> Result<bool, NativeStatus> {
        Ok(self.resolve(raw)?.is_read_only())
    }

    fn element(&self, raw: RawArray, index: usize) -> Result<Variant, NativeStatus> {
        let shared = self.resolve(raw)?;
        let storage = shared.lock();
        storage
            .elements
            .get(index)
            .cloned()
            .ok_or(NativeStatus::OutOfBounds)
    }

    fn replace_element(
        &self,
        raw: RawArray,
        index: usize,
        value: Variant,
    ) -> Result<Variant, NativeStatus> {
        let shared = self.resolve(raw)?;
        let mut storage = writable(&shared)?;
        let slot = storage
            .elements
            .get_mut(index)
            .ok_or(NativeStatus::OutOfBounds)?;
        Ok(std::mem::replace(slot, value))
    }

    fn duplicate(&self, raw: RawArray, deep: bool) -> Result<RawArray, NativeStatus> {
        self.counters.record(Op::Duplicate);
        let copy = self.resolve(raw)?.duplicate(deep, self.depth())?;
        self.allocate(copy)
    }

    fn resize(&self, raw: RawArray, new_size: usize) -> Result<(), NativeStatus> {
        self.counters.record(Op::Resize);
        self.check_capacity(new_size)?;
        let shared = self.resolve(raw)?;
        let removed = {
            let mut storage = writable(&shared)?;
            if new_size < storage.elements.len() {
                storage.elements.split_off(new_size)
            } else {
                storage.elements.resize_with(new_size, Variant::default);
                Vec::new()
            }
        };
        drop(removed);
        Ok(())
    }

    fn fill(&self, raw: RawArray, value: &Variant) -> Result<(), NativeStatus> {
        self.counters.record(Op::Fill);
        let shared = self.resolve(raw)?;
        let previous: Vec<Variant> = {
            let mut storage = writable(&shared)?;
            storage
                .elements
                .iter_mut()
                .map(|slot| std::mem::replace(slot, value.clone()))
                .collect()
        };
        drop(previous);
        Ok(())
    }

    fn add(&self, raw: RawArray, value: Variant) -> Result<usize, NativeStatus> {
        self.counters.record(Op::Add);
        let shared = self.resolve(raw)?;
        let mut storage = writable(&shared)?;
        let index = storage.elements.len();
        self.check_capacity(index + 1)?;
        storage.elements.push(value);
        Ok(index)
    }

    fn add_range(&self, raw: RawArray, other: RawArray) -> Result<(), NativeStatus> {
        self.counters.record(Op::AddRange);
        let target = self.resolve(raw)?;
        let source = self.resolve(other)?;
        // Snapshot first: `raw` and `other` may share storage.
        let appended = source.snapshot();
        let mut storage = writable(&target)?;
        self.check_capacity(storage.elements.len() + appended.len())?;
        storage.elements.extend(appended);
        Ok(())
    }

    fn insert(&self, raw: RawArray, index: usize, value: Variant) -> Result<(), NativeStatus> {
        self.counters.record(Op::Insert);
        let shared = self.resolve(raw)?;
        let mut storage = writable(&shared)?;
        let len = storage.elements.len();
        if index > len {
            return Err(NativeStatus::OutOfBounds);
        }
        self.check_capacity(len + 1)?;
        storage.elements.insert(index, value);
        Ok(())
    }

    fn remove_at(&self, raw: RawArray, index: usize) -> Result<(), NativeStatus> {
        self.counters.record(Op::RemoveAt);
        let shared = self.resolve(raw)?;
        let removed = {
            let mut storage = writable(&shared)?;
            if index >= storage.elements.len() {
                return Err(NativeStatus::OutOfBounds);
            }
            storage.elements.remove(index)
        };
        drop(removed);
        Ok(())
    }

    fn index_of(&self, raw: RawArray, value: &Variant, start: usize) -> Result<i64, NativeStatus> {
        self.counters.record(Op::IndexOf);
        let elements = self.resolve(raw)?.snapshot();
        Ok(ops::find_forward(&elements, value, start))
    }

    fn last_index_of(
        &self,
        raw: RawArray,
        value: &Variant,
        start: usize,
    ) -> Result<i64, NativeStatus> {
        self.counters.record(Op::LastIndexOf);
        let elements = self.resolve(raw)?.snapshot();
        Ok(ops::find_backward(&elements, value, start))
    }

    fn binary_search(
        &self,
        raw: RawArray,
        index: usize,
        count: usize,
        value: &Variant,
    ) -> Result<i64, NativeStatus> {
        self.counters.record(Op::BinarySearch);
        let elements = self.resolve(raw)?.snapshot();
        match index.checked_add(count) {
            Some(end) if end <= elements.len() => {}
            _ => return Err(NativeStatus::InvalidArgument),
        }
        Ok(ops::binary_search(
            &elements,
            index,
            count,
            value,
            self.depth(),
        ))
    }

    fn slice(
        &self,
        raw: RawArray,
        begin: i64,
        end: i64,
        step: i64,
        deep: bool,
    ) -> Result<RawArray, NativeStatus> {
        self.counters.record(Op::Slice);
        if step == 0 {
            return Err(NativeStatus::InvalidArgument);
        }
        let elements = self.resolve(raw)?.snapshot();
        let picked = ops::slice_positions(elements.len(), begin, end, step)
            .into_iter()
            .map(|i| elements[i].duplicate(deep, self.depth()))
            .collect::<Result<Vec<_>, _>>()?;
        self.allocate(SharedArray::from_elements(picked))
    }

    fn max(&self, raw: RawArray) -> Result<Variant, NativeStatus> {
        self.counters.record(Op::Max);
        let elements = self.resolve(raw)?.snapshot();
        Ok(ops::extremum(&elements, Ordering::Greater, self.depth()))
    }

    fn min(&self, raw: RawArray) -> Result<Variant, NativeStatus> {
        self.counters.record(Op::Min);
        let elements = self.resolve(raw)?.snapshot();
        Ok(ops::extremum(&elements, Ordering::Less, self.depth()))
    }

    fn recursive_equal(&self, raw: RawArray, other: RawArray) -> Result<bool, NativeStatus> {
        self.counters.record(Op::RecursiveEqual);
        let lhs = self.resolve(raw)?;
        let rhs = self.resolve(other)?;
        lhs.recursive_eq(&rhs, self.depth())
    }

    fn make_read_only(&self, raw: RawArray) -> Result<(), NativeStatus> {
        self.counters.record(Op::MakeReadOnly);
        self.resolve(raw)?.lock().read_only = true;
        Ok(())
    }

    fn stringify(&self, raw: RawArray) -> Result<String, NativeStatus> {
        self.counters.record(Op::Stringify);
        Ok(self.resolve(raw)?.stringify(self.depth()))
    }

    fn adopt_shared(&self, shared: SharedArray) -> Result<RawArray, NativeStatus> {
        self.counters.record(Op::AdoptShared);
        self.allocate(shared)
    }

    fn share(&self, raw: RawArray) -> Result<SharedArray, NativeStatus> {
        self.counters.record(Op::Share);
        self.resolve(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> NativeEngine {
        NativeEngine::default()
    }

    fn filled(engine: &NativeEngine, values: &[i64]) -> RawArray {
        let raw = engine.new_empty().unwrap();
        for &v in values {
            engine.add(raw, Variant::Int(v)).unwrap();
        }
        raw
    }

    fn contents(engine: &NativeEngine, raw: RawArray) -> Vec<Variant> {
        engine.share(raw).unwrap().snapshot().into_vec()
    }

    #[test]
    fn new_config_is_validated() {
        let bad = EngineConfig {
            max_len: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(NativeEngine::new(bad), Err(ConfigError::ZeroCapacity)));
        assert!(NativeEngine::new(EngineConfig::default()).is_ok());
    }

    #[test]
    fn release_invalidates_handle() {
        let e = engine();
        let raw = e.new_empty().unwrap();
        assert!(e.is_allocated(raw));
        assert_eq!(e.live_handles(), 1);
        e.release(raw).unwrap();
        assert!(!e.is_allocated(raw));
        assert_eq!(e.release(raw), Err(NativeStatus::InvalidHandle));
        assert_eq!(e.size(raw), Err(NativeStatus::InvalidHandle));
        assert_eq!(e.live_handles(), 0);
    }

    #[test]
    fn null_handle_is_never_allocated() {
        let e = engine();
        assert!(!e.is_allocated(RawArray::NULL));
        assert_eq!(e.size(RawArray::NULL), Err(NativeStatus::InvalidHandle));
    }

    #[test]
    fn element_access_and_bounds() {
        let e = engine();
        let raw = filled(&e, &[1, 2]);
        assert_eq!(e.element(raw, 1), Ok(Variant::Int(2)));
        assert_eq!(e.element(raw, 2), Err(NativeStatus::OutOfBounds));
        let old = e.replace_element(raw, 0, Variant::from("x")).unwrap();
        assert_eq!(old, Variant::Int(1));
        assert_eq!(e.element(raw, 0), Ok(Variant::from("x")));
    }

    #[test]
    fn read_only_rejects_every_mutation() {
        let e = engine();
        let raw = filled(&e, &[1]);
        e.make_read_only(raw).unwrap();
        assert_eq!(e.is_read_only(raw), Ok(true));
        let ro = Err(NativeStatus::ReadOnly);
        assert_eq!(e.add(raw, Variant::Nil).map(|_| ()), ro);
        assert_eq!(e.insert(raw, 0, Variant::Nil), ro);
        assert_eq!(e.remove_at(raw, 0), ro);
        assert_eq!(e.resize(raw, 4), ro);
        assert_eq!(e.fill(raw, &Variant::Nil), ro);
        assert_eq!(e.replace_element(raw, 0, Variant::Nil).map(|_| ()), ro);
        assert_eq!(e.add_range(raw, raw), ro);
        assert_eq!(contents(&e, raw), vec![Variant::Int(1)]);
    }

    #[test]
    fn duplicate_is_writable_and_independent() {
        let e = engine();
        let raw = filled(&e, &[1, 2]);
        e.make_read_only(raw).unwrap();
        let copy = e.duplicate(raw, false).unwrap();
        assert_eq!(e.is_read_only(copy), Ok(false));
        e.add(copy, Variant::Int(3)).unwrap();
        assert_eq!(e.size(raw), Ok(2));
        assert_eq!(e.size(copy), Ok(3));
    }

    #[test]
    fn resize_grows_with_nil_and_shrinks() {
        let e = engine();
        let raw = filled(&e, &[1, 2, 3]);
        e.resize(raw, 5).unwrap();
        assert_eq!(e.element(raw, 4), Ok(Variant::Nil));
        e.resize(raw, 1).unwrap();
        assert_eq!(contents(&e, raw), vec![Variant::Int(1)]);
    }

    #[test]
    fn capacity_is_enforced() {
        let e = NativeEngine::new(EngineConfig {
            max_len: 2,
            ..EngineConfig::default()
        })
        .unwrap();
        let raw = filled(&e, &[1, 2]);
        assert_eq!(e.add(raw, Variant::Nil), Err(NativeStatus::CapacityExceeded));
        assert_eq!(e.resize(raw, 3), Err(NativeStatus::CapacityExceeded));
        assert_eq!(e.add_range(raw, raw), Err(NativeStatus::CapacityExceeded));
        assert_eq!(e.size(raw), Ok(2));
    }

    #[test]
    fn add_range_onto_itself() {
        let e = engine();
        let raw = filled(&e, &[1, 2]);
        e.add_range(raw, raw).unwrap();
        let ints: Vec<_> = contents(&e, raw).iter().filter_map(Variant::as_int).collect();
        assert_eq!(ints, vec![1, 2, 1, 2]);
    }

    #[test]
    fn insert_and_remove_bounds() {
        let e = engine();
        let raw = filled(&e, &[1, 3]);
        e.insert(raw, 1, Variant::Int(2)).unwrap();
        e.insert(raw, 3, Variant::Int(4)).unwrap();
        assert_eq!(e.insert(raw, 9, Variant::Nil), Err(NativeStatus::OutOfBounds));
        assert_eq!(e.remove_at(raw, 4), Err(NativeStatus::OutOfBounds));
        e.remove_at(raw, 0).unwrap();
        let ints: Vec<_> = contents(&e, raw).iter().filter_map(Variant::as_int).collect();
        assert_eq!(ints, vec![2, 3, 4]);
    }

    #[test]
    fn search_operations() {
        let e = engine();
        let raw = filled(&e, &[1, 3, 5, 3]);
        assert_eq!(e.index_of(raw, &Variant::Int(3), 0), Ok(1));
        assert_eq!(e.index_of(raw, &Variant::Float(3.0), 2), Ok(3));
        assert_eq!(e.last_index_of(raw, &Variant::Int(3), 3), Ok(3));
        assert_eq!(e.last_index_of(raw, &Variant::Int(3), 2), Ok(1));
        assert_eq!(e.index_of(raw, &Variant::Int(9), 0), Ok(-1));
    }

    #[test]
    fn binary_search_range_checked() {
        let e = engine();
        let raw = filled(&e, &[1, 3, 5, 7]);
        assert_eq!(e.binary_search(raw, 0, 4, &Variant::Int(4)), Ok(-3));
        assert_eq!(e.binary_search(raw, 0, 4, &Variant::Int(5)), Ok(2));
        assert_eq!(
            e.binary_search(raw, 2, 3, &Variant::Int(5)),
            Err(NativeStatus::InvalidArgument)
        );
        assert_eq!(
            e.binary_search(raw, usize::MAX, 2, &Variant::Int(5)),
            Err(NativeStatus::InvalidArgument)
        );
    }

    #[test]
    fn slice_copies_selected_positions() {
        let e = engine();
        let raw = filled(&e, &[0, 1, 2, 3, 4]);
        let sliced = e.slice(raw, 4, 0, -2, false).unwrap();
        let ints: Vec<_> = contents(&e, sliced).iter().filter_map(Variant::as_int).collect();
        assert_eq!(ints, vec![4, 2]);
        assert_eq!(e.slice(raw, 0, 5, 0, false), Err(NativeStatus::InvalidArgument));
    }

    #[test]
    fn deep_slice_duplicates_nested_arrays() {
        let e = engine();
        let inner = SharedArray::from_elements(vec![Variant::Int(1)]);
        let raw = e.new_empty().unwrap();
        e.add(raw, Variant::Array(inner.clone())).unwrap();

        let shallow = e.slice(raw, 0, 1, 1, false).unwrap();
        assert!(contents(&e, shallow)[0].as_array().unwrap().ptr_eq(&inner));

        let deep = e.slice(raw, 0, 1, 1, true).unwrap();
        let copied = contents(&e, deep)[0].as_array().cloned().unwrap();
        assert!(!copied.ptr_eq(&inner));
        assert_eq!(copied.snapshot()[0], Variant::Int(1));
    }

    #[test]
    fn max_min_and_incomparable() {
        let e = engine();
        let raw = filled(&e, &[4, -2, 9]);
        assert_eq!(e.max(raw), Ok(Variant::Int(9)));
        assert_eq!(e.min(raw), Ok(Variant::Int(-2)));
        e.add(raw, Variant::Nil).unwrap();
        assert_eq!(e.max(raw), Ok(Variant::Nil));
        let empty = e.new_empty().unwrap();
        assert_eq!(e.min(empty), Ok(Variant::Nil));
    }

    #[test]
    fn recursive_equal_and_stringify() {
        let e = engine();
        let a = filled(&e, &[1, 2]);
        let b = filled(&e, &[1, 2]);
        assert_eq!(e.recursive_equal(a, b), Ok(true));
        e.add(b, Variant::from("s")).unwrap();
        assert_eq!(e.recursive_equal(a, b), Ok(false));
        assert_eq!(e.stringify(b).unwrap(), "[1, 2, \"s\"]");
    }

    #[test]
    fn self_containing_array_is_bounded() {
        let e = NativeEngine::new(EngineConfig {
            max_recursion_depth: 8,
            ..EngineConfig::default()
        })
        .unwrap();
        let raw = e.new_empty().unwrap();
        let shared = e.share(raw).unwrap();
        e.add(raw, Variant::Array(shared)).unwrap();
        assert_eq!(e.duplicate(raw, true), Err(NativeStatus::RecursionLimit));
        assert!(e.stringify(raw).unwrap().contains("[...]"));
        e.resize(raw, 0).unwrap();
    }

    #[test]
    fn adopt_shared_aliases_storage() {
        let e = engine();
        let raw = filled(&e, &[1]);
        let again = e.adopt_shared(e.share(raw).unwrap()).unwrap();
        assert_ne!(raw, again);
        e.add(again, Variant::Int(2)).unwrap();
        assert_eq!(e.size(raw), Ok(2));
        e.release(raw).unwrap();
        assert_eq!(e.size(again), Ok(2));
    }

    #[test]
    fn field_accesses_are_not_counted() {
        let e = engine();
        let raw = filled(&e, &[1]);
        e.reset_metrics();
        e.size(raw).unwrap();
        e.is_read_only(raw).unwrap();
        e.element(raw, 0).unwrap();
        e.replace_element(raw, 0, Variant::Nil).unwrap();
        assert!(e.is_allocated(raw));
        assert_eq!(e.metrics().total_calls(), 0);

        e.index_of(raw, &Variant::Nil, 0).unwrap();
        let m = e.metrics();
        assert_eq!(m.calls(Op::IndexOf), 1);
        assert_eq!(m.total_calls(), 1);
        assert_eq!(m.live_handles, 1);
    }
}
