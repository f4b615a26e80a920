//! Exhaustive interleaving checks for the seqlock version protocol this
//! crate's `versions` module implements, reproduced here against loom's
//! own atomics since `parking_lot`/`arc_swap` aren't loom-instrumented (see
//! the crate docs for why the lock-ordered rotation path isn't modeled
//! here). Run with `RUSTFLAGS="--cfg loom" cargo test --release --test loom`.

#![cfg(loom)]

use loom::sync::atomic::{AtomicPtr, AtomicU64, Ordering};
use loom::sync::Arc;
use loom::thread;

/// A single node's worth of the seqlock protocol: a version counter guarding
/// a value pointer, exactly as `versions::begin_write`/`end_write` and
/// `Tree::get`'s sample-validate-retry loop use it, minus everything else a
/// real node carries.
struct Slot {
    version: AtomicU64,
    value: AtomicPtr<u64>,
}

fn begin_write(slot: &Slot) {
    slot.version.fetch_add(1, Ordering::AcqRel);
}

fn end_write(slot: &Slot) {
    slot.version.fetch_add(1, Ordering::Release);
}

/// Read `slot.value` the way `Tree::get` reads a node's value: sample the
/// version, read the value, resample the version, and only trust the read
/// if both samples agree and are even.
fn try_read(slot: &Slot) -> Option<u64> {
    let v1 = slot.version.load(Ordering::Acquire);
    if v1 & 1 != 0 {
        return None;
    }
    let value = unsafe { *slot.value.load(Ordering::Acquire) };
    let v2 = slot.version.load(Ordering::Acquire);
    if v1 == v2 && v2 & 1 == 0 {
        Some(value)
    } else {
        None
    }
}

#[test]
fn reader_never_observes_a_torn_write() {
    loom::model(|| {
        let before = Box::into_raw(Box::new(0u64));
        let after = Box::into_raw(Box::new(1u64));

        let slot = Arc::new(Slot {
            version: AtomicU64::new(0),
            value: AtomicPtr::new(before),
        });

        let writer = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || {
                begin_write(&slot);
                slot.value.store(after, Ordering::Relaxed);
                end_write(&slot);
            })
        };

        let reader = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || {
                let mut observed = Vec::new();
                for _ in 0..3 {
                    if let Some(v) = try_read(&slot) {
                        observed.push(v);
                    }
                }
                observed
            })
        };

        writer.join().unwrap();
        let observed = reader.join().unwrap();
        for v in observed {
            assert!(v == 0 || v == 1, "reader observed torn value {v}");
        }

        unsafe {
            drop(Box::from_raw(before));
            drop(Box::from_raw(after));
        }
    });
}

#[test]
fn two_readers_agree_with_final_writer_state() {
    loom::model(|| {
        let before = Box::into_raw(Box::new(0u64));
        let after = Box::into_raw(Box::new(7u64));

        let slot = Arc::new(Slot {
            version: AtomicU64::new(0),
            value: AtomicPtr::new(before),
        });

        let writer = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || {
                begin_write(&slot);
                slot.value.store(after, Ordering::Relaxed);
                end_write(&slot);
            })
        };

        let spawn_reader = |slot: Arc<Slot>| {
            thread::spawn(move || {
                for _ in 0..2 {
                    if let Some(v) = try_read(&slot) {
                        assert!(v == 0 || v == 7);
                    }
                }
            })
        };

        let r1 = spawn_reader(Arc::clone(&slot));
        let r2 = spawn_reader(Arc::clone(&slot));

        writer.join().unwrap();
        r1.join().unwrap();
        r2.join().unwrap();

        assert_eq!(try_read(&slot), Some(7));

        unsafe {
            drop(Box::from_raw(before));
            drop(Box::from_raw(after));
        }
    });
}
