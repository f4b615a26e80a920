use criterion::{black_box, criterion_group, criterion_main, Criterion};

use concurrent_rbtree::Tree;

fn put_n(n: usize) {
    let tree = Tree::new();
    for i in 0..n {
        let s = i.to_string();
        tree.put(s.as_bytes(), s.as_bytes());
    }
    black_box(&tree);
}

fn put_1000(c: &mut Criterion) {
    c.bench_function("put_1000", |b| b.iter(|| put_n(black_box(1000))));
}

fn single_writer_with_m_readers(n: usize, m: usize) {
    let tree = std::sync::Arc::new(Tree::new());

    let readers: Vec<_> = (0..m)
        .map(|_| {
            let tree = std::sync::Arc::clone(&tree);
            std::thread::spawn(move || {
                for i in 0..n {
                    let s = i.to_string();
                    black_box(tree.get(s.as_bytes()));
                }
            })
        })
        .collect();

    let writer = {
        let tree = std::sync::Arc::clone(&tree);
        std::thread::spawn(move || {
            for i in 0..n {
                let s = i.to_string();
                tree.put(s.as_bytes(), s.as_bytes());
            }
        })
    };

    writer.join().unwrap();
    for r in readers {
        r.join().unwrap();
    }
}

fn n1000_m10(c: &mut Criterion) {
    c.bench_function("n1000_m10", |b| {
        b.iter(|| single_writer_with_m_readers(black_box(1000), 10))
    });
}

fn n100_m10(c: &mut Criterion) {
    c.bench_function("n100_m10", |b| {
        b.iter(|| single_writer_with_m_readers(black_box(100), 10))
    });
}

criterion_group!(benches, put_1000, n100_m10, n1000_m10);
criterion_main!(benches);
