//! Red-black insert fixup: recolor when the uncle is red, rotate when it is
//! black, re-reading parent/grandparent from `z` each iteration since
//! concurrent rotations may have moved them.

use std::ptr;
use std::sync::atomic::Ordering;

use crate::lock_order::{lock_all, unlock_all};
use crate::node::{color_of, Node, BLACK, RED};
use crate::rotate::{left_rotate, right_rotate};
use crate::tree::Tree;
use crate::versions::{begin_write, end_write};

pub(crate) fn fix_insert(tree: &Tree, mut z: *mut Node) {
    loop {
        let parent = unsafe { (*z).parent.load(Ordering::Relaxed) };
        if parent.is_null() || color_of(parent) == BLACK {
            break;
        }

        let grandparent = unsafe { (*parent).parent.load(Ordering::Relaxed) };
        if grandparent.is_null() {
            break;
        }

        let parent_is_left = unsafe { (*grandparent).left.load(Ordering::Relaxed) == parent };
        let uncle = unsafe {
            if parent_is_left {
                (*grandparent).right.load(Ordering::Relaxed)
            } else {
                (*grandparent).left.load(Ordering::Relaxed)
            }
        };

        if color_of(uncle) == RED {
            let set = lock_all(&[grandparent, parent, uncle]);

            begin_write(grandparent);
            begin_write(parent);
            begin_write(uncle);

            let valid = unsafe {
                (*parent).parent.load(Ordering::Relaxed) == grandparent
                    && ((*grandparent).left.load(Ordering::Relaxed) == parent
                        || (*grandparent).right.load(Ordering::Relaxed) == parent)
                    && uncle
                        == if parent_is_left {
                            (*grandparent).right.load(Ordering::Relaxed)
                        } else {
                            (*grandparent).left.load(Ordering::Relaxed)
                        }
                    && color_of(parent) == RED
                    && color_of(uncle) == RED
            };

            if valid {
                unsafe {
                    (*parent).color.store(BLACK, Ordering::Relaxed);
                    (*uncle).color.store(BLACK, Ordering::Relaxed);
                    (*grandparent).color.store(RED, Ordering::Relaxed);
                }
            }

            end_write(uncle);
            end_write(parent);
            end_write(grandparent);
            unlock_all(&set);

            if valid {
                z = grandparent;
            }
            continue;
        }

        // Uncle black: rotate into one of the two canonical shapes, then
        // recolor parent/grandparent.
        if parent_is_left {
            if unsafe { (*parent).right.load(Ordering::Relaxed) } == z {
                left_rotate(tree, parent);
                z = parent;
                let new_parent = unsafe { (*z).parent.load(Ordering::Relaxed) };
                let new_grandparent = if new_parent.is_null() {
                    ptr::null_mut()
                } else {
                    unsafe { (*new_parent).parent.load(Ordering::Relaxed) }
                };
                if new_parent.is_null() || new_grandparent.is_null() {
                    break;
                }
            }
            let parent = unsafe { (*z).parent.load(Ordering::Relaxed) };
            let grandparent = unsafe { (*parent).parent.load(Ordering::Relaxed) };
            right_rotate(tree, grandparent);

            if !recolor_pair(parent, grandparent) {
                continue;
            }
        } else {
            if unsafe { (*parent).left.load(Ordering::Relaxed) } == z {
                right_rotate(tree, parent);
                z = parent;
                let new_parent = unsafe { (*z).parent.load(Ordering::Relaxed) };
                let new_grandparent = if new_parent.is_null() {
                    ptr::null_mut()
                } else {
                    unsafe { (*new_parent).parent.load(Ordering::Relaxed) }
                };
                if new_parent.is_null() || new_grandparent.is_null() {
                    break;
                }
            }
            let parent = unsafe { (*z).parent.load(Ordering::Relaxed) };
            let grandparent = unsafe { (*parent).parent.load(Ordering::Relaxed) };
            left_rotate(tree, grandparent);

            if !recolor_pair(parent, grandparent) {
                continue;
            }
        }

        break;
    }

    let root = tree.root.load(Ordering::Acquire);
    if !root.is_null() {
        let set = lock_all(&[root]);
        begin_write(root);
        unsafe { (*root).color.store(BLACK, Ordering::Relaxed) };
        end_write(root);
        unlock_all(&set);
    }
}

/// After a rotation around `grandparent`, `parent` should now be
/// `grandparent`'s parent. Validate that under lock and, if still true,
/// color `parent` BLACK and `grandparent` RED. Returns whether the
/// validation held (and the recolor therefore happened).
fn recolor_pair(parent: *mut Node, grandparent: *mut Node) -> bool {
    let set = lock_all(&[parent, grandparent]);
    begin_write(parent);
    begin_write(grandparent);

    let valid = unsafe {
        (*grandparent).parent.load(Ordering::Relaxed) == parent
            && ((*parent).left.load(Ordering::Relaxed) == grandparent
                || (*parent).right.load(Ordering::Relaxed) == grandparent)
    };

    if valid {
        unsafe {
            (*parent).color.store(BLACK, Ordering::Relaxed);
            (*grandparent).color.store(RED, Ordering::Relaxed);
        }
    }

    end_write(grandparent);
    end_write(parent);
    unlock_all(&set);

    valid
}
