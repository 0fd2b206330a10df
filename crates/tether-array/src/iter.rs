//! Element iterators.

use std::iter::FusedIterator;

use tether_core::{ArrayError, Converter, Variant};

use crate::array::VarArray;

/// Iterator over a [`VarArray`]'s elements in index order.
///
/// The length is read once when iteration starts. If the storage shrinks
/// underneath (through an aliasing handle) or the handle is released, the
/// iterator ends early instead of failing.
pub struct Iter<'a> {
    array: &'a VarArray,
    next: usize,
    end: usize,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(array: &'a VarArray) -> Self {
        Self {
            array,
            next: 0,
            end: array.len(),
        }
    }
}

impl Iterator for Iter<'_> {
    type Item = Variant;

    fn next(&mut self) -> Option<Variant> {
        if self.next >= self.end {
            return None;
        }
        match self.array.api().element(self.array.raw(), self.next) {
            Ok(value) => {
                self.next += 1;
                Some(value)
            }
            Err(status) => {
                log::debug!(
                    "iteration of array {} stopped at {} of {}: {status}",
                    self.array.raw(),
                    self.next,
                    self.end
                );
                self.next = self.end;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl FusedIterator for Iter<'_> {}

/// Iterator over a typed view, converting each element.
pub struct TypedIter<'a, E> {
    inner: Iter<'a>,
    conv: Converter<E>,
}

impl<'a, E> TypedIter<'a, E> {
    pub(crate) fn new(array: &'a VarArray, conv: Converter<E>) -> Self {
        Self {
            inner: Iter::new(array),
            conv,
        }
    }
}

impl<E> Iterator for TypedIter<'_, E> {
    type Item = Result<E, ArrayError>;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.inner.next()?;
        Some(self.conv.from_variant(&value).map_err(ArrayError::from))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<E> FusedIterator for TypedIter<'_, E> {}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tether_core::{SharedApi, Variant};
    use tether_native::NativeEngine;

    use super::*;

    fn api() -> SharedApi {
        Arc::new(NativeEngine::with_defaults())
    }

    #[test]
    fn ends_when_alias_shrinks_storage() {
        let api = api();
        let array = VarArray::from_iter_in(&api, (1..=4).map(Variant::Int)).unwrap();
        let Variant::Array(shared) = array.to_variant().unwrap() else {
            panic!("expected array variant");
        };
        let mut alias = VarArray::from_shared(&api, shared).unwrap();

        let mut iter = array.iter();
        assert_eq!(iter.size_hint(), (4, Some(4)));
        assert_eq!(iter.next(), Some(Variant::Int(1)));
        alias.resize(1).unwrap();
        assert_eq!(iter.next(), None);
        assert_eq!(iter.size_hint(), (0, Some(0)));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn typed_iter_reports_conversion_errors() {
        let api = api();
        let array =
            VarArray::from_slice(&api, &[Variant::Int(1), Variant::from("two")]).unwrap();
        let items: Vec<_> = TypedIter::new(&array, Converter::<i64>::of()).collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().ok(), Some(&1));
        assert!(items[1].is_err());
    }
}
