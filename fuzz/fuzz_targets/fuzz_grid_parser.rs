#![no_main]

use std::collections::BTreeMap;

use dockframe_split::{BuildError, GridError, GridMatrix, LayoutOptions, Rect, tree_from_grid};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Grids are small; cap input so the greedy scan stays fast.
    let Ok(text) = std::str::from_utf8(&data[..data.len().min(512)]) else {
        return;
    };
    let Ok(matrix) = GridMatrix::parse(text) else {
        return;
    };

    // One content item per block, numbered in scan order.
    let mut mapping: BTreeMap<char, Vec<usize>> = BTreeMap::new();
    for (index, (key, _)) in matrix.blocks().into_iter().enumerate() {
        mapping.entry(key).or_default().push(index);
    }
    let regions = mapping.values().map(Vec::len).sum::<usize>();

    match tree_from_grid(text, mapping) {
        Ok(tree) => {
            assert_eq!(tree.leaf_count(), regions, "one leaf per region");
            tree.validate().expect("built tree must be valid");

            let cols = i32::try_from(matrix.cols()).unwrap_or(i32::MAX);
            let rows = i32::try_from(matrix.rows()).unwrap_or(i32::MAX);
            let bounds = Rect::from_size(cols.saturating_mul(8), rows.saturating_mul(8));
            let placement = tree.layout(bounds, &LayoutOptions::default());
            let covered: i64 = placement.leaf_rects().map(|(_, rect)| rect.area()).sum();
            assert_eq!(covered, bounds.area(), "leaves must tile the grid");
        }
        Err(GridError::Build(BuildError::Unsplittable(_))) => {}
        Err(err) => panic!("complete mapping must not fail with {err}"),
    }
});
