//! Benchmarks for grid building, layout, and drop resolution.
//!
//! Run with: cargo bench -p dockframe-split

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use dockframe_split::{
    LayoutOptions, Point, Rect, Side, SplitRatio, SplitTree, parse_grid, tree_from_grid,
};
use std::hint::black_box;

const DEMO: &str = "aaabbcccc\naaabbcccc\nddeeeeeff";

fn demo_mapping() -> Vec<(char, Vec<u32>)> {
    ('a'..='f').zip(0..).map(|(key, id)| (key, vec![id])).collect()
}

/// Balanced-ish tree of `leaf_count` leaves, alternating split sides.
fn build_tree(leaf_count: u32) -> SplitTree<u32> {
    let mut tree = SplitTree::singleton(0);
    let sides = [Side::Right, Side::Bottom, Side::Left, Side::Top];
    for content in 1..leaf_count {
        let leaves: Vec<_> = tree.leaves().map(|(id, _)| id).collect();
        let target = leaves[(content as usize * 7) % leaves.len()];
        let ratio = SplitRatio::from_parts(u64::from(content % 5) + 1, 7).expect("ratio below 1");
        let _ = tree
            .insert(target, content, sides[content as usize % sides.len()], ratio)
            .expect("bench insert should succeed");
    }
    tree
}

/// `cols x rows` grid with one region per cell.
fn checkerboard(cols: u32, rows: u32) -> (String, Vec<(char, Vec<u32>)>) {
    let mut text = String::new();
    let mut mapping = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            let index = row * cols + col;
            let key = char::from_u32(0x100 + index).expect("valid scalar");
            text.push(key);
            mapping.push((key, vec![index]));
        }
        text.push('\n');
    }
    (text, mapping)
}

fn bench_grid_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid/build");

    group.bench_function("demo_parse", |b| {
        b.iter(|| black_box(parse_grid(black_box(DEMO), demo_mapping()).expect("demo parses")))
    });
    group.bench_function("demo_tree", |b| {
        b.iter(|| black_box(tree_from_grid(black_box(DEMO), demo_mapping()).expect("demo builds")))
    });

    for side in [4u32, 8, 16] {
        let (text, mapping) = checkerboard(side, side);
        group.bench_with_input(BenchmarkId::new("checkerboard", side), &text, |b, text| {
            b.iter_batched(
                || mapping.clone(),
                |mapping| black_box(tree_from_grid(text, mapping).expect("checkerboard builds")),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("split/layout");
    let area = Rect::from_size(1920, 1080);
    let plain = LayoutOptions::default();
    let constrained = LayoutOptions {
        divider_size: 4,
        min_leaf_width: 24,
        min_leaf_height: 16,
    };

    for leaf_count in [8u32, 32, 128] {
        let tree = build_tree(leaf_count);
        group.bench_with_input(BenchmarkId::new("plain", leaf_count), &tree, |b, tree| {
            b.iter(|| black_box(tree.layout(black_box(area), &plain)))
        });
        group.bench_with_input(BenchmarkId::new("constrained", leaf_count), &tree, |b, tree| {
            b.iter(|| black_box(tree.layout(black_box(area), &constrained)))
        });
    }

    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("split/resolve");
    let area = Rect::from_size(1920, 1080);
    let tree = build_tree(64);
    let placement = tree.layout(area, &LayoutOptions::default());
    let probes: Vec<Point> = (0..64)
        .map(|i| Point::new((i * 131) % area.width, (i * 71) % area.height))
        .collect();

    group.bench_function("drop_64_probes", |b| {
        b.iter(|| {
            for &point in &probes {
                black_box(tree.resolve_drop(&placement, black_box(point), 0.25));
            }
        })
    });
    group.bench_function("divider_64_probes", |b| {
        b.iter(|| {
            for &point in &probes {
                black_box(tree.resolve_divider(&placement, black_box(point), 3));
            }
        })
    });

    group.finish();
}

fn bench_mutations(c: &mut Criterion) {
    let mut group = c.benchmark_group("split/mutate");
    let base = build_tree(32);
    let leaves: Vec<_> = base.leaves().map(|(id, _)| id).collect();
    let first = leaves[0];
    let last = leaves[leaves.len() - 1];

    group.bench_function("insert_remove", |b| {
        b.iter_batched(
            || base.clone(),
            |mut tree| {
                let fresh = tree
                    .insert(last, u32::MAX, Side::Bottom, SplitRatio::HALF)
                    .expect("insert should succeed");
                black_box(tree.remove(fresh).expect("remove should succeed"));
            },
            BatchSize::SmallInput,
        );
    });
    group.bench_function("move_leaf", |b| {
        b.iter_batched(
            || base.clone(),
            |mut tree| {
                tree.move_leaf(first, last, Side::Right)
                    .expect("move should succeed");
                black_box(tree.leaf_count());
            },
            BatchSize::SmallInput,
        );
    });
    group.bench_function("json_round_trip", |b| {
        b.iter(|| {
            let json = base.to_json().expect("encode");
            black_box(SplitTree::<u32>::from_json(&json).expect("decode"))
        })
    });

    group.finish();
}

criterion_group!(benches, bench_grid_build, bench_layout, bench_resolve, bench_mutations);

criterion_main!(benches);
