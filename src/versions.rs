//! The seqlock version protocol: `begin_write`/`end_write` bracket every
//! pointer or color mutation a writer makes to a node.

use std::sync::atomic::Ordering;

use crate::node::Node;

/// Bump `node`'s version to odd, signaling readers to retry. No-op on null.
pub(crate) fn begin_write(node: *mut Node) {
    if node.is_null() {
        return;
    }
    unsafe { (*node).version.fetch_add(1, Ordering::AcqRel) };
}

/// Bump `node`'s version back to even. No-op on null.
pub(crate) fn end_write(node: *mut Node) {
    if node.is_null() {
        return;
    }
    unsafe { (*node).version.fetch_add(1, Ordering::Release) };
}
