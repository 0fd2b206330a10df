//! Engine configuration parameters.

use std::error::Error;
use std::fmt;

/// Configuration for [`NativeEngine`](crate::NativeEngine).
///
/// Validated at construction; immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// How many nested array levels deep operations descend before
    /// failing with `RecursionLimit`.
    ///
    /// Default: 100. Must be at least 1.
    pub max_recursion_depth: usize,

    /// Maximum element count of a single array.
    ///
    /// Default: `i32::MAX`, the engine's native index width. Must be at
    /// least 1.
    pub max_len: usize,
}

impl EngineConfig {
    /// Default recursion bound.
    pub const DEFAULT_MAX_RECURSION_DEPTH: usize = tether_core::DEFAULT_MAX_RECURSION;

    /// Default per-array capacity.
    pub const DEFAULT_MAX_LEN: usize = i32::MAX as usize;

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_recursion_depth == 0 {
            return Err(ConfigError::ZeroRecursionDepth);
        }
        if self.max_len == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_recursion_depth: Self::DEFAULT_MAX_RECURSION_DEPTH,
            max_len: Self::DEFAULT_MAX_LEN,
        }
    }
}

/// Errors detected by [`EngineConfig::validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `max_recursion_depth` is zero.
    ZeroRecursionDepth,
    /// `max_len` is zero.
    ZeroCapacity,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroRecursionDepth => write!(f, "max_recursion_depth must be at least 1"),
            Self::ZeroCapacity => write!(f, "max_len must be at least 1"),
        }
    }
}

impl Error for ConfigError {}
