//! Benchmark profiles for Tether variant arrays.
//!
//! - [`mixed_sequence`]: deterministic element mix of ints, floats and strings
//! - [`nested_profile`]: an array of small nested arrays, for deep copies

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use tether_array::VarArray;
use tether_core::{ArrayError, SharedApi, SharedArray, Variant};

/// `len` variants cycling through int, float and short string kinds.
pub fn mixed_sequence(len: usize) -> Vec<Variant> {
    (0..len)
        .map(|i| match i % 3 {
            0 => Variant::Int(i as i64),
            1 => Variant::Float(i as f64 * 0.5),
            _ => Variant::String(format!("s{i}")),
        })
        .collect()
}

/// An array of `outer` nested arrays with `inner` ints each.
pub fn nested_profile(api: &SharedApi, outer: usize, inner: usize) -> Result<VarArray, ArrayError> {
    let children: Vec<Variant> = (0..outer)
        .map(|o| {
            let elements = (0..inner).map(|i| Variant::Int((o * inner + i) as i64)).collect();
            Variant::Array(SharedArray::from_elements(elements))
        })
        .collect();
    VarArray::from_slice(api, &children)
}
