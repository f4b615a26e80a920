//! Left and right rotations: locked, validated, three-to-four-node pointer
//! surgery that preserves BST order. Color changes are the fixup caller's
//! responsibility.

use std::sync::atomic::Ordering;

use crate::lock_order::{lock_all, unlock_all};
use crate::node::Node;
use crate::tree::Tree;
use crate::versions::{begin_write, end_write};

/// Promote `node.right` into `node`'s place; `node` becomes its new left
/// child. No-op if `node` has no right child.
pub(crate) fn left_rotate(tree: &Tree, node: *mut Node) {
    loop {
        let first = unsafe { (*node).right.load(Ordering::Relaxed) };
        if first.is_null() {
            return;
        }
        let second = unsafe { (*first).left.load(Ordering::Relaxed) };
        let grandparent = unsafe { (*node).parent.load(Ordering::Relaxed) };

        let set = lock_all(&[grandparent, node, first, second]);

        begin_write(node);
        begin_write(first);
        begin_write(grandparent);
        begin_write(second);

        let valid = unsafe {
            (*node).right.load(Ordering::Relaxed) == first
                && (*first).left.load(Ordering::Relaxed) == second
                && (*node).parent.load(Ordering::Relaxed) == grandparent
                && (grandparent.is_null()
                    || (*grandparent).left.load(Ordering::Relaxed) == node
                    || (*grandparent).right.load(Ordering::Relaxed) == node)
        };

        if !valid {
            end_write(second);
            end_write(grandparent);
            end_write(first);
            end_write(node);
            unlock_all(&set);
            continue;
        }

        unsafe {
            (*node).right.store(second, Ordering::Relaxed);
            if !second.is_null() {
                (*second).parent.store(node, Ordering::Relaxed);
            }
            (*first).parent.store(grandparent, Ordering::Relaxed);
            if grandparent.is_null() {
                tree.root.store(first, Ordering::Release);
            } else if (*grandparent).left.load(Ordering::Relaxed) == node {
                (*grandparent).left.store(first, Ordering::Relaxed);
            } else {
                (*grandparent).right.store(first, Ordering::Release);
            }
            (*first).left.store(node, Ordering::Relaxed);
            (*node).parent.store(first, Ordering::Relaxed);
        }

        end_write(second);
        end_write(grandparent);
        end_write(first);
        end_write(node);
        unlock_all(&set);
        return;
    }
}

/// Mirror of [`left_rotate`]: promote `node.left`, `node` becomes its new
/// right child.
pub(crate) fn right_rotate(tree: &Tree, node: *mut Node) {
    loop {
        let first = unsafe { (*node).left.load(Ordering::Relaxed) };
        if first.is_null() {
            return;
        }
        let second = unsafe { (*first).right.load(Ordering::Relaxed) };
        let grandparent = unsafe { (*node).parent.load(Ordering::Relaxed) };

        let set = lock_all(&[grandparent, node, first, second]);

        begin_write(node);
        begin_write(first);
        begin_write(grandparent);
        begin_write(second);

        let valid = unsafe {
            (*node).left.load(Ordering::Relaxed) == first
                && (*first).right.load(Ordering::Relaxed) == second
                && (*node).parent.load(Ordering::Relaxed) == grandparent
                && (grandparent.is_null()
                    || (*grandparent).left.load(Ordering::Relaxed) == node
                    || (*grandparent).right.load(Ordering::Relaxed) == node)
        };

        if !valid {
            end_write(second);
            end_write(grandparent);
            end_write(first);
            end_write(node);
            unlock_all(&set);
            continue;
        }

        unsafe {
            (*node).left.store(second, Ordering::Relaxed);
            if !second.is_null() {
                (*second).parent.store(node, Ordering::Relaxed);
            }
            (*first).parent.store(grandparent, Ordering::Relaxed);
            if grandparent.is_null() {
                tree.root.store(first, Ordering::Release);
            } else if (*grandparent).left.load(Ordering::Relaxed) == node {
                (*grandparent).left.store(first, Ordering::Relaxed);
            } else {
                (*grandparent).right.store(first, Ordering::Release);
            }
            (*first).right.store(node, Ordering::Relaxed);
            (*node).parent.store(first, Ordering::Relaxed);
        }

        end_write(second);
        end_write(grandparent);
        end_write(first);
        end_write(node);
        unlock_all(&set);
        return;
    }
}
