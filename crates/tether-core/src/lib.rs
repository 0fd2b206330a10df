//! Core types and traits for Tether.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the native engine and the managed layer:
//! the [`Variant`] value model, the engine-side [`SharedArray`] storage,
//! opaque handle ids, element conversion, status codes, error types and
//! the [`NativeArrayApi`] trait every engine implements.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod convert;
pub mod error;
pub mod id;
pub mod status;
pub mod storage;
pub mod table;
pub mod traits;
pub mod variant;

pub use convert::{Converter, Element};
pub use error::{ArrayError, ConversionError};
pub use id::{ObjectId, RawArray};
pub use status::NativeStatus;
pub use storage::{ArrayStorage, SharedArray};
pub use table::HandleTable;
pub use traits::{NativeArrayApi, SharedApi};
pub use variant::{Variant, VariantKind};

/// Default bound on nested-array recursion for deep operations.
///
/// Deep duplication, recursive equality, ordering and stringification
/// stop descending after this many levels.
pub const DEFAULT_MAX_RECURSION: usize = 100;
