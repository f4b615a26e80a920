//! Single-threaded introspection: an in-order dump and an invariant
//! checker, generalizing the source material's `printList`/`printTree`
//! console helpers into data instead of console output.
//!
//! Both take `&mut Tree`. That isn't incidental: the borrow checker then
//! rules out any concurrent `put`/`get` for the duration of the call,
//! turning "not safe against concurrent mutation" from a doc comment into
//! something the compiler enforces.

use std::sync::atomic::Ordering;

use crate::node::{color_of, Node, BLACK, RED};
use crate::tree::Tree;

impl Tree {
    /// Every key/value pair currently stored, in ascending key order.
    pub fn in_order(&mut self) -> Vec<(Vec<u8>, Vec<u8>)> {
        let mut out = Vec::new();
        unsafe { collect(self.root.load(Ordering::Relaxed), &mut out) };
        out
    }

    /// Check BST ordering, the red-black color rules, black-height
    /// equality across all root-to-null paths, and parent-pointer
    /// consistency. Returns a description of the first violation found.
    pub fn check_invariants(&mut self) -> Result<(), String> {
        let root = self.root.load(Ordering::Relaxed);
        if !root.is_null() && color_of(root) != BLACK {
            return Err("root is not black".to_string());
        }
        unsafe { check_node(root, None, None) }.map(|_| ())
    }
}

unsafe fn collect(node: *mut Node, out: &mut Vec<(Vec<u8>, Vec<u8>)>) {
    if node.is_null() {
        return;
    }
    collect((*node).left.load(Ordering::Relaxed), out);
    let value = (*(*node).value.load_full()).clone();
    out.push(((*node).key.to_vec(), value));
    collect((*node).right.load(Ordering::Relaxed), out);
}

/// Recursively validates `node`'s subtree against the open interval
/// `(lower, upper)` and returns its black-height, or an error describing
/// the first violation found in this subtree.
unsafe fn check_node<'a>(
    node: *mut Node,
    lower: Option<&'a [u8]>,
    upper: Option<&'a [u8]>,
) -> Result<usize, String> {
    if node.is_null() {
        return Ok(1);
    }

    let key: &[u8] = &(*node).key;
    if let Some(lower) = lower {
        if key <= lower {
            return Err(format!("key {key:?} out of order (must be > {lower:?})"));
        }
    }
    if let Some(upper) = upper {
        if key >= upper {
            return Err(format!("key {key:?} out of order (must be < {upper:?})"));
        }
    }

    let left = (*node).left.load(Ordering::Relaxed);
    let right = (*node).right.load(Ordering::Relaxed);

    if !left.is_null() && (*left).parent.load(Ordering::Relaxed) != node {
        return Err(format!("left child of {key:?} has a stale parent pointer"));
    }
    if !right.is_null() && (*right).parent.load(Ordering::Relaxed) != node {
        return Err(format!("right child of {key:?} has a stale parent pointer"));
    }

    if color_of(node) == RED && (color_of(left) == RED || color_of(right) == RED) {
        return Err(format!("red node {key:?} has a red child"));
    }

    let left_height = check_node(left, lower, Some(key))?;
    let right_height = check_node(right, Some(key), upper)?;
    if left_height != right_height {
        return Err(format!(
            "black-height mismatch at {key:?}: {left_height} (left) vs {right_height} (right)"
        ));
    }

    Ok(left_height + usize::from(color_of(node) == BLACK))
}
