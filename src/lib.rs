//! A concurrent, ordered key/value map implemented as a red-black tree.
//!
//! Keys and values are opaque byte sequences. Reads ([`Tree::get`]) are
//! lock-free: each descent samples a per-node version counter before and
//! after reading the node's fields and restarts from the root whenever a
//! writer appears to have overlapped. Writes ([`Tree::put`]) find their
//! target the same optimistic way, then take the smallest set of per-node
//! locks the mutation needs, always in ascending memory-address order, so
//! writers can never deadlock against each other.
//!
//! This is a grow-only map: there is no delete, no range scan, and no
//! persistence. See [`Tree::in_order`] and [`Tree::check_invariants`] for
//! the non-concurrent introspection this crate does provide, useful for
//! tests and debugging but not part of the concurrent contract.
//!
//! ```
//! use concurrent_rbtree::{Tree, NULL_VALUE};
//!
//! let tree = Tree::new();
//! tree.put(b"a", b"v1");
//! assert_eq!(tree.get(b"a"), b"v1");
//! assert_eq!(tree.get(b"missing"), NULL_VALUE);
//! ```

mod debug;
mod fixup;
mod lock_order;
mod node;
mod rotate;
mod tree;
mod versions;

pub use tree::{Tree, NULL_VALUE};
