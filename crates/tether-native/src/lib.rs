//! Reference native engine for Tether variant arrays.
//!
//! [`NativeEngine`] implements [`NativeArrayApi`](tether_core::NativeArrayApi)
//! over a slot+generation handle table. It plays the role of the external
//! runtime that owns array storage: callers receive opaque
//! [`RawArray`](tether_core::RawArray) ids and must release them.
//!
//! Every engine operation is counted (see [`metrics`]), which lets tests
//! observe whether a managed call reached the engine at all.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod engine;
pub mod metrics;
mod ops;

pub use config::{ConfigError, EngineConfig};
pub use engine::NativeEngine;
pub use metrics::{EngineMetrics, Op};
