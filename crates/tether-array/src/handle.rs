//! The owning array handle.
//!
//! An [`ArrayHandle`] is the single owner of one engine array id. The id
//! and its engine live in a shared [`HandleCell`] so the disposal registry
//! can reach it through a weak reference. The cell's `released` flag is
//! swapped exactly once: whichever path gets there first (explicit
//! release, `Drop`, or registry teardown) issues the engine release, all
//! others are no-ops.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tether_core::{NativeStatus, RawArray, SharedApi};

use crate::registry;

/// Engine id plus its release guard.
pub(crate) struct HandleCell {
    api: SharedApi,
    raw: RawArray,
    released: AtomicBool,
}

impl HandleCell {
    /// Release the id unless some other path already did.
    ///
    /// `Ok(true)` when this call reached the engine.
    pub(crate) fn release(&self) -> Result<bool, NativeStatus> {
        if self.released.swap(true, Ordering::AcqRel) {
            return Ok(false);
        }
        self.api.release(self.raw).map(|()| true)
    }

    pub(crate) fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    pub(crate) fn raw(&self) -> RawArray {
        self.raw
    }
}

/// Move-only owner of one engine array.
pub(crate) struct ArrayHandle {
    cell: Arc<HandleCell>,
    token: u64,
}

impl ArrayHandle {
    /// Take ownership of `raw` and register it for teardown.
    pub(crate) fn adopt(api: &SharedApi, raw: RawArray) -> Self {
        let cell = Arc::new(HandleCell {
            api: Arc::clone(api),
            raw,
            released: AtomicBool::new(false),
        });
        let token = registry::register(&cell);
        Self { cell, token }
    }

    pub(crate) fn raw(&self) -> RawArray {
        self.cell.raw
    }

    pub(crate) fn api(&self) -> &SharedApi {
        &self.cell.api
    }

    pub(crate) fn is_released(&self) -> bool {
        self.cell.is_released()
    }

    /// Release now. Tolerated after any earlier release.
    pub(crate) fn dispose(&self) -> Result<(), NativeStatus> {
        self.cell.release().map(|_| ())
    }

    /// Release and give up the handle. The following `Drop` finds the
    /// flag set and does not reach the engine again.
    pub(crate) fn release(self) -> Result<(), NativeStatus> {
        self.dispose()
    }
}

impl Drop for ArrayHandle {
    fn drop(&mut self) {
        registry::unregister(self.token);
        match self.cell.release() {
            Ok(true) => log::debug!("released array {} on drop", self.cell.raw),
            Ok(false) => {}
            Err(status) => log::warn!("release of array {} on drop failed: {status}", self.cell.raw),
        }
    }
}
