//! Tether: managed handles over natively owned variant arrays.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Tether sub-crates. For most users, adding `tether` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use tether::prelude::*;
//!
//! let api: SharedApi = Arc::new(NativeEngine::with_defaults());
//!
//! let mut numbers = VarArray::from_iter_in(&api, (0..6).map(Variant::Int)).unwrap();
//! numbers.add(Variant::from("six")).unwrap();
//! assert_eq!(numbers.to_string(), "[0, 1, 2, 3, 4, 5, \"six\"]");
//!
//! // Every second element, walking backwards from index 5.
//! let odd = numbers.slice_range(5, 0, -2, false).unwrap();
//! assert_eq!(odd.to_string(), "[5, 3, 1]");
//!
//! // A typed view over the same storage.
//! let mut typed = TypedArray::<i64>::from_untyped(odd);
//! typed.add(-1).unwrap();
//! assert_eq!(typed.min().unwrap(), Some(-1));
//!
//! // Absent values report the complement of their insertion point.
//! let sorted = TypedArray::<i64>::from_slice(&api, &[1, 3, 5, 7]).unwrap();
//! assert_eq!(sorted.binary_search(&4).unwrap(), !2);
//!
//! // Handles are released on drop, or explicitly.
//! numbers.release().unwrap();
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `tether-core` | `Variant`, ids, conversion, errors, the engine trait |
//! | [`native`] | `tether-native` | Reference engine, its configuration and metrics |
//! | [`array`] | `tether-array` | `VarArray`, `TypedArray`, iterators, disposal registry |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and ids (`tether-core`).
///
/// Contains [`types::Variant`], element conversion, error types and the
/// [`types::NativeArrayApi`] trait engines implement.
pub use tether_core as types;

/// Reference native engine (`tether-native`).
///
/// [`native::NativeEngine`] with [`native::EngineConfig`] and per-operation
/// [`native::EngineMetrics`].
pub use tether_native as native;

/// Managed containers (`tether-array`).
///
/// [`array::VarArray`], [`array::TypedArray`], and the process-wide
/// [`array::registry`].
pub use tether_array as array;

/// Common imports for typical Tether usage.
///
/// ```rust
/// use tether::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use tether_core::{
        Converter, Element, NativeArrayApi, ObjectId, RawArray, SharedApi, SharedArray, Variant,
        VariantKind,
    };

    // Errors
    pub use tether_core::{ArrayError, ConversionError, NativeStatus};

    // Engine
    pub use tether_native::{EngineConfig, EngineMetrics, NativeEngine};

    // Containers
    pub use tether_array::{TypedArray, VarArray};
}
