//! Typed views over untyped arrays.
//!
//! A [`TypedArray<E, A>`] pairs an untyped container `A` with the
//! [`Converter`] of its element type. It holds no handle of its own: `A` is
//! an owned [`VarArray`] (the default), a `&VarArray` for read-only access,
//! or a `&mut VarArray` for mutation through someone else's container.
//! Whoever owns the `VarArray` owns its release; the view has no `Drop`.
//!
//! Elements written through the view always convert back. Elements added
//! through the untyped side are only checked when read through the view.

use std::borrow::{Borrow, BorrowMut};
use std::fmt;

use tether_core::{ArrayError, Converter, Element, RawArray, SharedApi, Variant};

use crate::array::VarArray;
use crate::iter::TypedIter;

/// A view of a [`VarArray`] whose elements are all `E`.
pub struct TypedArray<E, A = VarArray> {
    inner: A,
    conv: Converter<E>,
}

impl<E: Element> TypedArray<E> {
    /// Allocate an empty typed array.
    pub fn new(api: &SharedApi) -> Result<Self, ArrayError> {
        Ok(Self::from_untyped(VarArray::new(api)?))
    }

    /// Allocate a typed array holding `items` in iteration order.
    pub fn from_iter_in<I>(api: &SharedApi, items: I) -> Result<Self, ArrayError>
    where
        I: IntoIterator<Item = E>,
    {
        let mut array = Self::new(api)?;
        array.add_range(items)?;
        Ok(array)
    }

    /// Like [`from_iter_in`](Self::from_iter_in), for a source that may be
    /// absent.
    pub fn from_source<I>(api: &SharedApi, source: Option<I>) -> Result<Self, ArrayError>
    where
        I: IntoIterator<Item = E>,
    {
        match source {
            Some(items) => Self::from_iter_in(api, items),
            None => Err(ArrayError::NullSource {
                argument: "collection",
            }),
        }
    }

    /// Allocate a typed array holding a copy of `values`.
    pub fn from_slice(api: &SharedApi, values: &[E]) -> Result<Self, ArrayError> {
        let conv = Converter::<E>::of();
        let variants: Vec<Variant> = values.iter().map(|v| conv.to_variant(v)).collect();
        Ok(Self::from_untyped(VarArray::from_slice(api, &variants)?))
    }

    /// Take ownership of an engine handle. See [`VarArray::from_raw`].
    pub fn from_raw(api: &SharedApi, raw: RawArray) -> Result<Self, ArrayError> {
        Ok(Self::from_untyped(VarArray::from_raw(api, raw)?))
    }

    /// New typed array of `left`'s elements followed by `right`'s.
    pub fn concat<B: Borrow<VarArray>>(
        api: &SharedApi,
        left: Option<&TypedArray<E, B>>,
        right: Option<&TypedArray<E, B>>,
    ) -> Result<Self, ArrayError> {
        let joined = VarArray::concat(api, left.map(|l| l.untyped()), right.map(|r| r.untyped()))?;
        Ok(Self::from_untyped(joined))
    }
}

impl<E: Element, A: Borrow<VarArray>> TypedArray<E, A> {
    /// View `inner` through `E`'s own converter.
    pub fn from_untyped(inner: A) -> Self {
        Self::with_converter(inner, Converter::of())
    }
}

impl<E, A: Borrow<VarArray>> TypedArray<E, A> {
    /// View `inner` through an explicit converter.
    pub fn with_converter(inner: A, conv: Converter<E>) -> Self {
        Self { inner, conv }
    }

    /// The untyped container.
    pub fn untyped(&self) -> &VarArray {
        self.inner.borrow()
    }

    /// Give back the untyped container.
    pub fn into_untyped(self) -> A {
        self.inner
    }

    /// The converter in use.
    pub fn converter(&self) -> Converter<E> {
        self.conv
    }

    fn read(&self, value: &Variant) -> Result<E, ArrayError> {
        Ok(self.conv.from_variant(value)?)
    }

    fn write(&self, value: &E) -> Variant {
        self.conv.to_variant(value)
    }

    fn retype(&self, inner: VarArray) -> TypedArray<E> {
        TypedArray::with_converter(inner, self.conv)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.untyped().len()
    }

    /// Whether the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.untyped().is_empty()
    }

    /// Whether the storage is read-only.
    pub fn is_read_only(&self) -> bool {
        self.untyped().is_read_only()
    }

    /// Element at `index`, converted.
    pub fn get(&self, index: usize) -> Result<E, ArrayError> {
        let value = self.untyped().get(index)?;
        self.read(&value)
    }

    /// See [`VarArray::index_of`].
    pub fn index_of(&self, value: &E) -> Result<Option<usize>, ArrayError> {
        self.untyped().index_of(&self.write(value))
    }

    /// See [`VarArray::index_of_from`].
    pub fn index_of_from(&self, value: &E, start: usize) -> Result<Option<usize>, ArrayError> {
        self.untyped().index_of_from(&self.write(value), start)
    }

    /// See [`VarArray::last_index_of`].
    pub fn last_index_of(&self, value: &E) -> Result<Option<usize>, ArrayError> {
        self.untyped().last_index_of(&self.write(value))
    }

    /// See [`VarArray::last_index_of_from`].
    pub fn last_index_of_from(&self, value: &E, start: usize) -> Result<Option<usize>, ArrayError> {
        self.untyped().last_index_of_from(&self.write(value), start)
    }

    /// Whether any element equals `value`.
    pub fn contains(&self, value: &E) -> Result<bool, ArrayError> {
        self.untyped().contains(&self.write(value))
    }

    /// See [`VarArray::binary_search`].
    pub fn binary_search(&self, value: &E) -> Result<i64, ArrayError> {
        self.untyped().binary_search(&self.write(value))
    }

    /// See [`VarArray::binary_search_range`].
    pub fn binary_search_range(
        &self,
        index: usize,
        count: usize,
        value: &E,
    ) -> Result<i64, ArrayError> {
        self.untyped()
            .binary_search_range(index, count, &self.write(value))
    }

    /// Owned typed copy. See [`VarArray::duplicate`].
    pub fn duplicate(&self, deep: bool) -> Result<TypedArray<E>, ArrayError> {
        Ok(self.retype(self.untyped().duplicate(deep)?))
    }

    /// See [`VarArray::slice_range`].
    pub fn slice_range(
        &self,
        start: i64,
        end: i64,
        step: i64,
        deep: bool,
    ) -> Result<TypedArray<E>, ArrayError> {
        Ok(self.retype(self.untyped().slice_range(start, end, step, deep)?))
    }

    /// See [`VarArray::slice_from`].
    pub fn slice_from(&self, start: usize) -> Result<TypedArray<E>, ArrayError> {
        Ok(self.retype(self.untyped().slice_from(start)?))
    }

    /// See [`VarArray::slice`].
    pub fn slice(&self, start: usize, length: usize) -> Result<TypedArray<E>, ArrayError> {
        Ok(self.retype(self.untyped().slice(start, length)?))
    }

    /// See [`VarArray::recursive_equal`].
    pub fn recursive_equal<B: Borrow<VarArray>>(
        &self,
        other: &TypedArray<E, B>,
    ) -> Result<bool, ArrayError> {
        self.untyped().recursive_equal(other.untyped())
    }

    /// Largest element, `None` when empty or not mutually comparable.
    pub fn max(&self) -> Result<Option<E>, ArrayError> {
        let value = self.untyped().max()?;
        self.read_extremum(&value)
    }

    /// Smallest element, `None` when empty or not mutually comparable.
    pub fn min(&self) -> Result<Option<E>, ArrayError> {
        let value = self.untyped().min()?;
        self.read_extremum(&value)
    }

    fn read_extremum(&self, value: &Variant) -> Result<Option<E>, ArrayError> {
        if value.is_nil() {
            return Ok(None);
        }
        self.read(value).map(Some)
    }

    /// Convert every element into `dest` starting at `at`. Nothing is
    /// written unless every element converts.
    pub fn copy_to(&self, dest: &mut [E], at: usize) -> Result<(), ArrayError> {
        let len = self.len();
        if at > dest.len() || dest.len() - at < len {
            return Err(ArrayError::IndexOutOfRange {
                index: at,
                len: dest.len(),
            });
        }
        let converted = self.iter().collect::<Result<Vec<E>, _>>()?;
        for (slot, value) in dest[at..].iter_mut().zip(converted) {
            *slot = value;
        }
        Ok(())
    }

    /// The underlying array as a variant. See [`VarArray::to_variant`].
    pub fn to_variant(&self) -> Result<Variant, ArrayError> {
        self.untyped().to_variant()
    }

    /// Converted elements in index order.
    pub fn iter(&self) -> TypedIter<'_, E> {
        TypedIter::new(self.untyped(), self.conv)
    }
}

impl<E, A: BorrowMut<VarArray>> TypedArray<E, A> {
    /// The untyped container, mutably.
    pub fn untyped_mut(&mut self) -> &mut VarArray {
        self.inner.borrow_mut()
    }

    /// Replace the element at `index`.
    pub fn set(&mut self, index: usize, value: E) -> Result<(), ArrayError> {
        let value = self.write(&value);
        self.untyped_mut().set(index, value)
    }

    /// Append `value`, returning its index.
    pub fn add(&mut self, value: E) -> Result<usize, ArrayError> {
        let value = self.write(&value);
        self.untyped_mut().add(value)
    }

    /// Insert `value` before `index`.
    pub fn insert(&mut self, index: usize, value: E) -> Result<(), ArrayError> {
        let value = self.write(&value);
        self.untyped_mut().insert(index, value)
    }

    /// Append every element of an untyped array in one bulk call. The
    /// elements are checked when read.
    pub fn append_array(&mut self, other: &VarArray) -> Result<(), ArrayError> {
        self.untyped_mut().append_array(other)
    }

    /// Append every element of a typed array of the same element type in
    /// one bulk call.
    pub fn append_typed<B: Borrow<VarArray>>(
        &mut self,
        other: &TypedArray<E, B>,
    ) -> Result<(), ArrayError> {
        self.untyped_mut().append_array(other.untyped())
    }

    /// Append every item; see [`VarArray::add_range`] for the strategy.
    pub fn add_range<I>(&mut self, items: I) -> Result<(), ArrayError>
    where
        I: IntoIterator<Item = E>,
    {
        let conv = self.conv;
        self.untyped_mut()
            .add_range(items.into_iter().map(move |item| conv.to_variant(&item)))
    }

    /// Remove the first element equal to `value`.
    pub fn remove(&mut self, value: &E) -> Result<bool, ArrayError> {
        let value = self.write(value);
        self.untyped_mut().remove(&value)
    }

    /// Remove the element at `index`.
    pub fn remove_at(&mut self, index: usize) -> Result<(), ArrayError> {
        self.untyped_mut().remove_at(index)
    }

    /// Grow with `Nil` or shrink.
    ///
    /// Grown slots hold `Nil` and fail to convert until set, unless `E`
    /// accepts `Nil`.
    pub fn resize(&mut self, new_size: usize) -> Result<(), ArrayError> {
        self.untyped_mut().resize(new_size)
    }

    /// Remove every element.
    pub fn clear(&mut self) -> Result<(), ArrayError> {
        self.untyped_mut().clear()
    }

    /// Set every slot to `value`.
    pub fn fill(&mut self, value: &E) -> Result<(), ArrayError> {
        let value = self.write(value);
        self.untyped_mut().fill(&value)
    }

    /// Forbid further mutation. One-way.
    pub fn make_read_only(&mut self) -> Result<(), ArrayError> {
        self.untyped_mut().make_read_only()
    }
}

impl<E, A: Borrow<VarArray>, B: Borrow<VarArray>> PartialEq<TypedArray<E, B>> for TypedArray<E, A> {
    fn eq(&self, other: &TypedArray<E, B>) -> bool {
        self.recursive_equal(other).unwrap_or(false)
    }
}

impl<'a, E, A: Borrow<VarArray>> IntoIterator for &'a TypedArray<E, A> {
    type Item = Result<E, ArrayError>;
    type IntoIter = TypedIter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<E, A: Borrow<VarArray>> fmt::Display for TypedArray<E, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.untyped(), f)
    }
}

impl<E, A: Borrow<VarArray>> fmt::Debug for TypedArray<E, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedArray")
            .field("element", &std::any::type_name::<E>())
            .field("inner", self.untyped())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tether_core::ConversionError;
    use tether_native::{NativeEngine, Op};

    fn engine() -> (Arc<NativeEngine>, SharedApi) {
        let engine = Arc::new(NativeEngine::with_defaults());
        let api: SharedApi = engine.clone();
        (engine, api)
    }

    #[test]
    fn typed_get_set() {
        let (_engine, api) = engine();
        let mut array = TypedArray::<i64>::from_iter_in(&api, [1, 2, 3]).unwrap();
        array.set(0, 10).unwrap();
        assert_eq!(array.get(0).unwrap(), 10);
        assert_eq!(array.len(), 3);
        assert_eq!(array.to_string(), "[10, 2, 3]");
    }

    #[test]
    fn untyped_insertions_fail_on_typed_read() {
        let (_engine, api) = engine();
        let mut untyped = VarArray::new(&api).unwrap();
        untyped.add(Variant::Int(1)).unwrap();
        untyped.add(Variant::Float(1.5)).unwrap();
        let view = TypedArray::<i64, &VarArray>::from_untyped(&untyped);
        assert_eq!(view.get(0).unwrap(), 1);
        assert!(matches!(
            view.get(1),
            Err(ArrayError::Conversion(ConversionError::WrongKind { expected: "i64", .. }))
        ));
        let collected: Vec<_> = view.iter().collect();
        assert!(collected[0].is_ok());
        assert!(collected[1].is_err());
    }

    #[test]
    fn borrowed_mutable_view_shares_storage() {
        let (_engine, api) = engine();
        let mut untyped = VarArray::new(&api).unwrap();
        {
            let mut view = TypedArray::<String, _>::from_untyped(&mut untyped);
            view.add("a".to_owned()).unwrap();
            view.add_range(["b".to_owned(), "c".to_owned()]).unwrap();
        }
        assert_eq!(untyped.len(), 3);
        assert_eq!(untyped.get(2).unwrap(), Variant::from("c"));
    }

    #[test]
    fn typed_add_range_tiers() {
        let (engine, api) = engine();
        let mut a = TypedArray::<i32>::new(&api).unwrap();
        let b = TypedArray::<i32>::from_slice(&api, &[4, 5]).unwrap();
        let raw = VarArray::from_iter_in(&api, [Variant::Int(6)]).unwrap();

        engine.reset_metrics();
        a.append_typed(&b).unwrap();
        a.append_array(&raw).unwrap();
        assert_eq!(engine.metrics().calls(Op::AddRange), 2);

        engine.reset_metrics();
        a.add_range(vec![7, 8]).unwrap();
        assert_eq!(engine.metrics().calls(Op::Resize), 1);

        engine.reset_metrics();
        a.add_range((9..12).filter(|i| i % 2 == 1)).unwrap();
        assert_eq!(engine.metrics().calls(Op::Add), 2);

        let all: Vec<i32> = a.iter().collect::<Result<_, _>>().unwrap();
        assert_eq!(all, vec![4, 5, 6, 7, 8, 9, 11]);
    }

    #[test]
    fn typed_search_and_extrema() {
        let (_engine, api) = engine();
        let array = TypedArray::<f64>::from_slice(&api, &[1.0, 3.0, 5.0, 7.0]).unwrap();
        assert_eq!(array.binary_search(&4.0).unwrap(), -3);
        assert_eq!(array.index_of(&5.0).unwrap(), Some(2));
        assert_eq!(array.max().unwrap(), Some(7.0));
        assert_eq!(array.min().unwrap(), Some(1.0));
        assert_eq!(TypedArray::<f64>::new(&api).unwrap().max().unwrap(), None);
    }

    #[test]
    fn typed_duplicate_and_slice_are_owned() {
        let (_engine, api) = engine();
        let untyped = VarArray::from_iter_in(&api, (0..6).map(Variant::Int)).unwrap();
        let view = TypedArray::<i64, &VarArray>::from_untyped(&untyped);
        let reversed = view.slice_range(5, 1, -2, false).unwrap();
        assert_eq!(reversed.get(0).unwrap(), 5);
        assert_eq!(reversed.get(1).unwrap(), 3);
        let copy: TypedArray<i64> = view.duplicate(false).unwrap();
        assert_eq!(copy, view);
    }

    #[test]
    fn typed_concat_leaves_inputs_alone() {
        let (_engine, api) = engine();
        let left = TypedArray::<i64>::from_slice(&api, &[1, 2]).unwrap();
        let right = TypedArray::<i64>::from_slice(&api, &[3]).unwrap();
        let joined = TypedArray::<i64>::concat(&api, Some(&left), Some(&right)).unwrap();
        assert_eq!(joined.to_string(), "[1, 2, 3]");
        assert_eq!(left.len(), 2);
        assert_eq!(right.len(), 1);
        let only_right = TypedArray::<i64>::concat(&api, None, Some(&right)).unwrap();
        assert_eq!(only_right.get(0).unwrap(), 3);
    }

    #[test]
    fn typed_copy_to_is_all_or_nothing() {
        let (_engine, api) = engine();
        let mut untyped = VarArray::from_iter_in(&api, [Variant::Int(1)]).unwrap();
        untyped.add(Variant::from("x")).unwrap();
        let view = TypedArray::<i64, &VarArray>::from_untyped(&untyped);
        let mut dest = [0i64; 2];
        assert!(view.copy_to(&mut dest, 0).is_err());
        assert_eq!(dest, [0, 0]);
    }

    #[test]
    fn custom_converter() {
        fn to(v: &u8) -> Variant {
            Variant::Int((*v).into())
        }
        fn from(v: &Variant) -> Result<u8, ConversionError> {
            v.as_int()
                .and_then(|i| u8::try_from(i).ok())
                .ok_or(ConversionError::NotRepresentable {
                    expected: "u8",
                    value: v.to_string(),
                })
        }
        let (_engine, api) = engine();
        let mut view = TypedArray::with_converter(VarArray::new(&api).unwrap(), Converter::new(to, from));
        view.add(200).unwrap();
        assert_eq!(view.get(0).unwrap(), 200);
        view.untyped_mut().add(Variant::Int(300)).unwrap();
        assert!(view.get(1).is_err());
    }
}
