//! The public `Tree` type: construction, `put`, `get`, and teardown.

use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};
use std::sync::Arc;

use crate::fixup::fix_insert;
use crate::lock_order::{lock_all, unlock_all};
use crate::node::{Node, BLACK};
use crate::versions::{begin_write, end_write};

/// Sentinel returned by [`Tree::get`] for keys that are absent.
///
/// An empty value is also legal to store; callers that must distinguish
/// "absent" from "present but empty" need to avoid ever storing one.
pub const NULL_VALUE: &[u8] = &[];

/// A concurrent, ordered, grow-only key/value map backed by a red-black
/// tree.
///
/// `get` is lock-free: it descends optimistically and validates what it
/// read against a per-node seqlock, retrying from the root on any
/// overlap with a writer. `put` locates its insertion point the same way,
/// then links the new node (or replaces an existing value) under the
/// smallest set of per-node locks the operation needs, always acquired in
/// ascending address order to stay deadlock-free against other writers.
///
/// Deletion, iteration cursors, and persistence are out of scope; see
/// [`Tree::in_order`] and [`Tree::check_invariants`] for the
/// non-concurrent introspection helpers this crate does provide.
pub struct Tree {
    pub(crate) root: AtomicPtr<Node>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Construct an empty tree.
    pub fn new() -> Tree {
        Tree {
            root: AtomicPtr::new(ptr::null_mut()),
        }
    }

    /// Insert `key`/`value`, or replace the value already stored for `key`.
    ///
    /// Returns once the new value is visible to subsequent `get(key)` calls
    /// from any thread.
    pub fn put(&self, key: &[u8], value: &[u8]) {
        let node = Box::into_raw(Box::new(Node::new(key, value)));

        'retry: loop {
            // Empty-tree fast path: no locking needed, just a CAS on root.
            let root_ptr = self.root.load(Ordering::Acquire);
            if root_ptr.is_null() {
                match self.root.compare_exchange(
                    ptr::null_mut(),
                    node,
                    Ordering::Release,
                    Ordering::Acquire,
                ) {
                    Ok(_) => {
                        unsafe { (*node).color.store(BLACK, Ordering::Relaxed) };
                        return;
                    }
                    Err(_) => continue 'retry,
                }
            }

            let mut current = root_ptr;
            let mut parent: *mut Node = ptr::null_mut();
            let mut go_right = false;

            'descend: loop {
                if current.is_null() {
                    continue 'retry;
                }

                let v1 = unsafe { (*current).version.load(Ordering::Acquire) };
                if v1 & 1 != 0 {
                    current = self.root.load(Ordering::Acquire);
                    parent = ptr::null_mut();
                    continue 'descend;
                }

                let cur_key: &[u8] = unsafe { &(*current).key };
                if cur_key == key {
                    // Key already present: serialize on this node's lock and
                    // swap in the new value. The node allocated above goes
                    // unused.
                    let set = lock_all(&[current]);
                    begin_write(current);
                    unsafe { (*current).value.store(Arc::new(value.to_vec())) };
                    end_write(current);
                    unlock_all(&set);
                    unsafe { drop(Box::from_raw(node)) };
                    return;
                }

                parent = current;
                go_right = cur_key < key;
                let next = unsafe {
                    if go_right {
                        (*current).right.load(Ordering::Acquire)
                    } else {
                        (*current).left.load(Ordering::Acquire)
                    }
                };

                let v2 = unsafe { (*current).version.load(Ordering::Acquire) };
                if v1 != v2 || v2 & 1 != 0 {
                    current = self.root.load(Ordering::Acquire);
                    parent = ptr::null_mut();
                    continue 'descend;
                }

                if next.is_null() {
                    break 'descend;
                }
                current = next;
            }

            if parent.is_null() {
                continue 'retry;
            }

            let set = lock_all(&[parent]);
            begin_write(parent);

            let observed = unsafe {
                if go_right {
                    (*parent).right.load(Ordering::Acquire)
                } else {
                    (*parent).left.load(Ordering::Acquire)
                }
            };
            if !observed.is_null() {
                // Another writer beat us to this slot; retry the descent.
                end_write(parent);
                unlock_all(&set);
                continue 'retry;
            }

            unsafe {
                (*node).parent.store(parent, Ordering::Relaxed);
                if go_right {
                    (*parent).right.store(node, Ordering::Release);
                } else {
                    (*parent).left.store(node, Ordering::Release);
                }
            }
            end_write(parent);
            unlock_all(&set);

            fix_insert(self, node);
            return;
        }
    }

    /// Look up `key`, returning a copy of its stored value, or
    /// [`NULL_VALUE`] if `key` is absent.
    pub fn get(&self, key: &[u8]) -> Vec<u8> {
        'retry: loop {
            let mut current = self.root.load(Ordering::Acquire);

            loop {
                if current.is_null() {
                    return NULL_VALUE.to_vec();
                }

                let v1 = unsafe { (*current).version.load(Ordering::Acquire) };
                if v1 & 1 != 0 {
                    continue 'retry;
                }

                let cur_key: &[u8] = unsafe { &(*current).key };
                if cur_key == key {
                    let value = unsafe { (*current).value.load_full() };
                    let v2 = unsafe { (*current).version.load(Ordering::Acquire) };
                    if v1 == v2 && v2 & 1 == 0 {
                        return (*value).clone();
                    }
                    continue;
                }

                let next = unsafe {
                    if cur_key < key {
                        (*current).right.load(Ordering::Relaxed)
                    } else {
                        (*current).left.load(Ordering::Relaxed)
                    }
                };

                let v2 = unsafe { (*current).version.load(Ordering::Acquire) };
                if v2 != v1 || v2 & 1 != 0 {
                    continue 'retry;
                }

                current = next;
            }
        }
    }
}

impl Drop for Tree {
    fn drop(&mut self) {
        let root = self.root.load(Ordering::Acquire);
        unsafe { free_subtree(root) };
    }
}

/// Post-order free of everything reachable from `node`. Only safe to call
/// when no put/get on this tree can still be in flight, which `Drop`
/// guarantees by construction (it requires exclusive access to the `Tree`).
unsafe fn free_subtree(node: *mut Node) {
    if node.is_null() {
        return;
    }
    let left = (*node).left.load(Ordering::Relaxed);
    let right = (*node).right.load(Ordering::Relaxed);
    free_subtree(left);
    free_subtree(right);
    drop(Box::from_raw(node));
}
