//! Node layout and the color/version primitives writers and readers share.

use std::sync::atomic::{AtomicPtr, AtomicU64, AtomicU8, Ordering};

use arc_swap::ArcSwap;
use parking_lot::Mutex;

pub(crate) const BLACK: u8 = 0;
pub(crate) const RED: u8 = 1;

/// One key/value pair and its position in the tree.
///
/// `#[repr(align(64))]` keeps `version` and `color` off a cache line shared
/// with a neighboring node, which matters because readers poll `version`
/// under contention.
///
/// `left`/`right` are the owning edges (the node they point at is freed by
/// whichever of its parent's child slots holds it); `parent` is a
/// non-owning back-reference used only for navigation during rotations and
/// fixup, never for ownership.
#[repr(align(64))]
pub(crate) struct Node {
    pub key: Box<[u8]>,
    pub value: ArcSwap<Vec<u8>>,
    pub left: AtomicPtr<Node>,
    pub right: AtomicPtr<Node>,
    pub parent: AtomicPtr<Node>,
    pub version: AtomicU64,
    pub color: AtomicU8,
    /// Serializes writers that intend to mutate this node. Readers never
    /// take this lock. Acquired through `crate::lock_order`'s sorted,
    /// address-ordered helpers rather than directly, since lock sets are
    /// released later and out of scope-order, which doesn't fit a
    /// `MutexGuard`.
    pub lock: Mutex<()>,
}

impl Node {
    pub fn new(key: &[u8], value: &[u8]) -> Node {
        Node {
            key: key.to_vec().into_boxed_slice(),
            value: ArcSwap::from_pointee(value.to_vec()),
            left: AtomicPtr::new(std::ptr::null_mut()),
            right: AtomicPtr::new(std::ptr::null_mut()),
            parent: AtomicPtr::new(std::ptr::null_mut()),
            version: AtomicU64::new(0),
            color: AtomicU8::new(RED),
            lock: Mutex::new(()),
        }
    }
}

/// `node`'s color, or `BLACK` if `node` is null (a null child counts as a
/// black leaf for red-black purposes).
pub(crate) fn color_of(node: *mut Node) -> u8 {
    if node.is_null() {
        BLACK
    } else {
        unsafe { (*node).color.load(Ordering::Relaxed) }
    }
}
