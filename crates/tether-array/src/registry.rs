//! Process-wide disposal registry.
//!
//! Every live array handle is registered here by weak reference. The
//! registry never keeps a container alive; it exists so a host can release
//! whatever is still allocated at teardown with [`dispose_all`].
//!
//! Registration and unregistration may run concurrently with `Drop` on
//! other threads. The table lock is never held while the engine is called.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use smallvec::SmallVec;
use tether_core::HandleTable;

use crate::handle::HandleCell;

static REGISTRY: Mutex<HandleTable<Weak<HandleCell>>> = Mutex::new(HandleTable::new());

fn registry() -> MutexGuard<'static, HandleTable<Weak<HandleCell>>> {
    REGISTRY.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Record `cell`, returning the token to unregister it with.
pub(crate) fn register(cell: &Arc<HandleCell>) -> u64 {
    let token = registry().insert(Arc::downgrade(cell));
    log::debug!("registered array {} (token {token:#x})", cell.raw());
    token
}

/// Forget a registration. Unknown tokens are ignored.
pub(crate) fn unregister(token: u64) {
    // Bind so the weak reference drops after the guard.
    let removed = registry().remove(token);
    if removed.is_some() {
        log::debug!("unregistered token {token:#x}");
    }
}

/// Number of registered handles that have not been released.
pub fn live_count() -> usize {
    registry()
        .iter()
        .filter_map(|(_, weak)| weak.upgrade())
        .filter(|cell| !cell.is_released())
        .count()
}

/// Release every registered handle that is still allocated.
///
/// Containers stay valid Rust values afterwards: further operations on
/// them fail with `InvalidHandle`, and their eventual `Drop` issues no
/// second engine release. Returns the number of handles this call
/// released.
pub fn dispose_all() -> usize {
    let cells: SmallVec<[Arc<HandleCell>; 16]> = registry()
        .iter()
        .filter_map(|(_, weak)| weak.upgrade())
        .collect();

    let mut released = 0;
    for cell in &cells {
        match cell.release() {
            Ok(true) => released += 1,
            Ok(false) => {}
            Err(status) => log::warn!("teardown release of array {} failed: {status}", cell.raw()),
        }
    }
    log::info!("disposal registry released {released} of {} handles", cells.len());
    released
}
