//! Test fixtures for Tether development.
//!
//! Builds an instrumented [`NativeEngine`] together with its type-erased
//! [`SharedApi`], plus small helpers for integer arrays.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::Arc;

use tether_array::VarArray;
use tether_core::{SharedApi, Variant};
use tether_native::{EngineConfig, NativeEngine};

/// A fresh engine with default configuration.
///
/// The concrete handle reads metrics; the [`SharedApi`] goes to containers.
pub fn engine() -> (Arc<NativeEngine>, SharedApi) {
    wrap(NativeEngine::with_defaults())
}

/// A fresh engine with the given configuration.
///
/// # Panics
///
/// If `config` is invalid.
pub fn engine_with(config: EngineConfig) -> (Arc<NativeEngine>, SharedApi) {
    wrap(NativeEngine::new(config).expect("invalid test engine config"))
}

fn wrap(engine: NativeEngine) -> (Arc<NativeEngine>, SharedApi) {
    let engine = Arc::new(engine);
    let api: SharedApi = engine.clone();
    (engine, api)
}

/// Integer variants.
pub fn ints(values: &[i64]) -> Vec<Variant> {
    values.iter().copied().map(Variant::Int).collect()
}

/// A new array holding `values`.
pub fn int_array(api: &SharedApi, values: &[i64]) -> VarArray {
    VarArray::from_slice(api, &ints(values)).expect("fixture allocation failed")
}

/// The integer elements of `array`, in order. Non-integers are skipped.
pub fn int_values(array: &VarArray) -> Vec<i64> {
    array.iter().filter_map(|v| v.as_int()).collect()
}
