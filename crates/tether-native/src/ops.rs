//! Array algorithms over element slices.
//!
//! Everything here works on a snapshot taken by the engine; none of it
//! touches handles or locks.

use std::cmp::Ordering;

use tether_core::Variant;

/// Positions selected by a stepped slice of an array of `len` elements.
///
/// `begin` and `end` may be negative (relative to `len`) and are clamped
/// into range. `step` must be non-zero. A direction that cannot reach
/// `end` selects nothing.
pub(crate) fn slice_positions(len: usize, begin: i64, end: i64, step: i64) -> Vec<usize> {
    debug_assert!(step != 0);
    let s = len as i64;
    if s == 0 || (begin < -s && step < 0) || (begin >= s && step > 0) {
        return Vec::new();
    }

    let mut begin = begin.clamp(-s, s - 1);
    if begin < 0 {
        begin += s;
    }
    let mut end = end.clamp(-s - 1, s);
    if end < 0 {
        end += s;
    }

    if (step > 0 && begin > end) || (step < 0 && begin < end) {
        return Vec::new();
    }

    let span = end - begin;
    let count = span / step + i64::from(span % step != 0);
    let mut out = Vec::with_capacity(count.max(0) as usize);
    let mut src = begin;
    for _ in 0..count {
        out.push(src as usize);
        src += step;
    }
    out
}

/// Classic bisection over `elements[index..index + count]`.
///
/// Returns the matching index, or `!lo` where `lo` is the insertion point.
/// Nested arrays are compared at most `depth` levels down.
pub(crate) fn binary_search(
    elements: &[Variant],
    index: usize,
    count: usize,
    value: &Variant,
    depth: usize,
) -> i64 {
    let mut lo = index as i64;
    let mut hi = (index + count) as i64 - 1;
    while lo <= hi {
        let mid = lo + ((hi - lo) >> 1);
        let item = &elements[mid as usize];
        if item.recursive_eq(value, depth).unwrap_or(false) {
            return mid;
        }
        if item.compare(value, depth) == Some(Ordering::Less) {
            lo = mid + 1;
        } else {
            hi = mid - 1;
        }
    }
    !lo
}

/// The element that wins every comparison in direction `want`.
///
/// `Nil` when `elements` is empty or any candidate pair is incomparable.
pub(crate) fn extremum(elements: &[Variant], want: Ordering, depth: usize) -> Variant {
    let Some((first, rest)) = elements.split_first() else {
        return Variant::Nil;
    };
    let mut best = first;
    for candidate in rest {
        match candidate.compare(best, depth) {
            Some(ord) if ord == want => best = candidate,
            Some(_) => {}
            None => return Variant::Nil,
        }
    }
    best.clone()
}

/// First position `>= start` equal to `value`.
pub(crate) fn find_forward(elements: &[Variant], value: &Variant, start: usize) -> i64 {
    elements
        .iter()
        .enumerate()
        .skip(start)
        .find(|(_, e)| *e == value)
        .map_or(-1, |(i, _)| i as i64)
}

/// Last position `<= start` equal to `value`. `start` past the end is
/// clamped to the last element.
pub(crate) fn find_backward(elements: &[Variant], value: &Variant, start: usize) -> i64 {
    if elements.is_empty() {
        return -1;
    }
    let start = start.min(elements.len() - 1);
    elements[..=start]
        .iter()
        .rposition(|e| e == value)
        .map_or(-1, |i| i as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tether_core::SharedArray;

    fn ints(values: &[i64]) -> Vec<Variant> {
        values.iter().copied().map(Variant::Int).collect()
    }

    #[test]
    fn slice_forward_and_backward() {
        assert_eq!(slice_positions(5, 1, 4, 1), vec![1, 2, 3]);
        assert_eq!(slice_positions(5, 0, 5, 2), vec![0, 2, 4]);
        assert_eq!(slice_positions(5, 4, 0, -1), vec![4, 3, 2, 1]);
        assert_eq!(slice_positions(5, -1, -6, -2), vec![4, 2, 0]);
    }

    #[test]
    fn slice_negative_and_clamped_bounds() {
        assert_eq!(slice_positions(5, -2, 5, 1), vec![3, 4]);
        assert_eq!(slice_positions(5, -100, 100, 1), vec![0, 1, 2, 3, 4]);
        assert_eq!(slice_positions(5, 100, -100, -1), vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn slice_empty_cases() {
        assert!(slice_positions(0, 0, 1, 1).is_empty());
        assert!(slice_positions(5, 5, 10, 1).is_empty());
        assert!(slice_positions(5, -6, 0, -1).is_empty());
        assert!(slice_positions(5, 3, 1, 1).is_empty());
        assert!(slice_positions(5, 1, 3, -1).is_empty());
        assert!(slice_positions(5, 2, 2, 1).is_empty());
    }

    #[test]
    fn bisection_found_and_missing() {
        let sorted = ints(&[1, 3, 5, 7]);
        assert_eq!(binary_search(&sorted, 0, 4, &Variant::Int(5), 4), 2);
        assert_eq!(binary_search(&sorted, 0, 4, &Variant::Int(4), 4), !2);
        assert_eq!(binary_search(&sorted, 0, 4, &Variant::Int(0), 4), !0);
        assert_eq!(binary_search(&sorted, 0, 4, &Variant::Int(9), 4), !4);
        assert_eq!(binary_search(&sorted, 2, 2, &Variant::Int(1), 4), !2);
        assert_eq!(binary_search(&sorted, 1, 0, &Variant::Int(3), 4), !1);
    }

    #[test]
    fn bisection_respects_recursion_depth() {
        let nested: Vec<Variant> = [1, 3, 5]
            .iter()
            .map(|v| Variant::Array(SharedArray::from_elements(vec![Variant::Int(*v)])))
            .collect();
        let needle = Variant::Array(SharedArray::from_elements(vec![Variant::Int(5)]));
        assert_eq!(binary_search(&nested, 0, 3, &needle, 2), 2);
        // With no depth left nested arrays neither match nor order.
        assert_eq!(binary_search(&nested, 0, 3, &needle, 0), !0);
    }

    #[test]
    fn extremum_of_mixed_numbers() {
        let values = vec![Variant::Int(2), Variant::Float(3.5), Variant::Int(-1)];
        assert_eq!(extremum(&values, Ordering::Greater, 8), Variant::Float(3.5));
        assert_eq!(extremum(&values, Ordering::Less, 8), Variant::Int(-1));
    }

    #[test]
    fn extremum_nil_when_empty_or_incomparable() {
        assert!(extremum(&[], Ordering::Greater, 8).is_nil());
        let values = vec![Variant::Int(1), Variant::from("a")];
        assert!(extremum(&values, Ordering::Greater, 8).is_nil());
    }

    #[test]
    fn search_directions() {
        let values = ints(&[1, 2, 1, 2]);
        assert_eq!(find_forward(&values, &Variant::Int(2), 0), 1);
        assert_eq!(find_forward(&values, &Variant::Int(2), 2), 3);
        assert_eq!(find_forward(&values, &Variant::Int(9), 0), -1);
        assert_eq!(find_forward(&values, &Variant::Int(1), 4), -1);
        assert_eq!(find_backward(&values, &Variant::Int(1), 3), 2);
        assert_eq!(find_backward(&values, &Variant::Int(1), 1), 0);
        assert_eq!(find_backward(&values, &Variant::Int(2), 0), -1);
        assert_eq!(find_backward(&values, &Variant::Int(2), 99), 3);
        assert_eq!(find_backward(&[], &Variant::Int(2), 0), -1);
    }

    proptest! {
        #[test]
        fn forward_slice_matches_step_by(
            len in 0usize..40,
            a in 0usize..40,
            b in 0usize..40,
            step in 1i64..6,
        ) {
            let (begin, end) = (a.min(len), b.min(len));
            let expected: Vec<usize> = if len == 0 || begin >= len {
                Vec::new()
            } else {
                (begin..end).step_by(step as usize).collect()
            };
            prop_assert_eq!(slice_positions(len, begin as i64, end as i64, step), expected);
        }

        #[test]
        fn backward_slice_matches_reversed_step_by(
            len in 1usize..40,
            a in 0usize..40,
            b in 0usize..40,
            step in 1i64..6,
        ) {
            let begin = a.min(len - 1);
            let end = b.min(begin);
            // Exclusive lower bound `end`, walking down from `begin`.
            let expected: Vec<usize> = (end + 1..=begin).rev().step_by(step as usize).collect();
            prop_assert_eq!(slice_positions(len, begin as i64, end as i64, -step), expected);
        }

        #[test]
        fn bisection_agrees_with_sorted_vec(
            mut values in prop::collection::vec(-50i64..50, 0..30),
            needle in -60i64..60,
        ) {
            values.sort_unstable();
            values.dedup();
            let elements = ints(&values);
            let got = binary_search(&elements, 0, elements.len(), &Variant::Int(needle), 4);
            match values.binary_search(&needle) {
                Ok(i) => prop_assert_eq!(got, i as i64),
                Err(i) => prop_assert_eq!(got, !(i as i64)),
            }
        }
    }
}
