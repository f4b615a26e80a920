//! Deadlock-free acquisition of per-node locks: sort by address, dedup,
//! drop nulls, lock ascending, unlock descending.
//!
//! A rotation or a fixup recolor needs several node locks held at once and
//! released later, possibly after other code has run in between (the
//! validation step). That doesn't fit a stack of `MutexGuard`s cleanly, so
//! nodes use `parking_lot::Mutex` and these helpers drive its `RawMutex`
//! directly with manual `lock()`/`unlock()` calls, the same shape as the
//! source material's `node->lock.lock()` / `node->lock.unlock()`.

use lock_api::RawMutex;

use crate::node::Node;

fn sorted_unique(nodes: &[*mut Node]) -> Vec<*mut Node> {
    let mut set: Vec<*mut Node> = nodes.iter().copied().filter(|p| !p.is_null()).collect();
    set.sort_by_key(|p| *p as usize);
    set.dedup();
    set
}

/// Sort, dedup, and lock `nodes` in ascending address order. Returns the
/// locked set so callers can unlock it later with [`unlock_all`].
pub(crate) fn lock_all(nodes: &[*mut Node]) -> Vec<*mut Node> {
    let set = sorted_unique(nodes);
    for &node in &set {
        unsafe { (*node).lock.raw().lock() };
    }
    set
}

/// Release a lock set obtained from [`lock_all`], in reverse (descending
/// address) order.
pub(crate) fn unlock_all(set: &[*mut Node]) {
    for &node in set.iter().rev() {
        unsafe { (*node).lock.raw().unlock() };
    }
}
