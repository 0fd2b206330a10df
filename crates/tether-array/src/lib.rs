//! Managed containers over native-owned variant arrays.
//!
//! [`VarArray`] owns one engine handle and exposes the full indexing,
//! mutation, search, slicing and duplication API over [`Variant`]
//! elements. [`TypedArray`] views a `VarArray` through a fixed element
//! type without owning anything itself.
//!
//! Every handle is released exactly once: explicitly with
//! [`VarArray::release`] or [`VarArray::dispose`], on drop otherwise, or by
//! [`registry::dispose_all`] at host teardown.
//!
//! [`Variant`]: tether_core::Variant

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod array;
mod handle;
pub mod iter;
pub mod registry;
pub mod typed;

pub use array::VarArray;
pub use iter::{Iter, TypedIter};
pub use typed::TypedArray;
