//! Per-operation call counters for the native engine.
//!
//! [`CallCounters`] is incremented on every engine operation. Direct field
//! and storage accesses (`size`, `is_read_only`, `element`,
//! `replace_element`, `is_allocated`) are not operations and are not
//! counted. [`EngineMetrics`] is the plain snapshot handed to callers.

use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

/// An engine operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    /// `new_empty`.
    NewEmpty,
    /// `release`.
    Release,
    /// `duplicate`.
    Duplicate,
    /// `resize`.
    Resize,
    /// `fill`.
    Fill,
    /// `add`.
    Add,
    /// `add_range`.
    AddRange,
    /// `insert`.
    Insert,
    /// `remove_at`.
    RemoveAt,
    /// `index_of`.
    IndexOf,
    /// `last_index_of`.
    LastIndexOf,
    /// `binary_search`.
    BinarySearch,
    /// `slice`.
    Slice,
    /// `max`.
    Max,
    /// `min`.
    Min,
    /// `recursive_equal`.
    RecursiveEqual,
    /// `make_read_only`.
    MakeReadOnly,
    /// `stringify`.
    Stringify,
    /// `adopt_shared`.
    AdoptShared,
    /// `share`.
    Share,
}

impl Op {
    /// Every operation, in reporting order.
    pub const ALL: [Op; 20] = [
        Op::NewEmpty,
        Op::Release,
        Op::Duplicate,
        Op::Resize,
        Op::Fill,
        Op::Add,
        Op::AddRange,
        Op::Insert,
        Op::RemoveAt,
        Op::IndexOf,
        Op::LastIndexOf,
        Op::BinarySearch,
        Op::Slice,
        Op::Max,
        Op::Min,
        Op::RecursiveEqual,
        Op::MakeReadOnly,
        Op::Stringify,
        Op::AdoptShared,
        Op::Share,
    ];

    /// The engine function name.
    pub fn name(self) -> &'static str {
        match self {
            Op::NewEmpty => "new_empty",
            Op::Release => "release",
            Op::Duplicate => "duplicate",
            Op::Resize => "resize",
            Op::Fill => "fill",
            Op::Add => "add",
            Op::AddRange => "add_range",
            Op::Insert => "insert",
            Op::RemoveAt => "remove_at",
            Op::IndexOf => "index_of",
            Op::LastIndexOf => "last_index_of",
            Op::BinarySearch => "binary_search",
            Op::Slice => "slice",
            Op::Max => "max",
            Op::Min => "min",
            Op::RecursiveEqual => "recursive_equal",
            Op::MakeReadOnly => "make_read_only",
            Op::Stringify => "stringify",
            Op::AdoptShared => "adopt_shared",
            Op::Share => "share",
        }
    }
}

/// Atomic counters, one per [`Op`].
#[derive(Debug, Default)]
pub(crate) struct CallCounters {
    counts: [AtomicU64; Op::ALL.len()],
}

impl CallCounters {
    pub(crate) fn record(&self, op: Op) {
        self.counts[op as usize].fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn reset(&self) {
        for count in &self.counts {
            count.store(0, Ordering::Relaxed);
        }
    }

    pub(crate) fn snapshot(&self, live_handles: usize) -> EngineMetrics {
        let calls = Op::ALL
            .iter()
            .map(|&op| (op.name(), self.counts[op as usize].load(Ordering::Relaxed)))
            .collect();
        EngineMetrics {
            calls,
            live_handles,
        }
    }
}

/// Snapshot of engine activity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineMetrics {
    /// Calls per operation, keyed by engine function name, in [`Op::ALL`] order.
    pub calls: IndexMap<&'static str, u64>,
    /// Handles allocated and not yet released.
    pub live_handles: usize,
}

impl EngineMetrics {
    /// Number of calls to `op`.
    pub fn calls(&self, op: Op) -> u64 {
        self.calls.get(op.name()).copied().unwrap_or(0)
    }

    /// Number of calls across all operations.
    pub fn total_calls(&self) -> u64 {
        self.calls.values().sum()
    }
}
