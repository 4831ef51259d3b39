#![no_main]

use arbitrary::Arbitrary;
use dockframe_split::{LayoutOptions, NodeId, Point, Rect, Side, SplitRatio, SplitTree};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum FuzzSide {
    Left,
    Right,
    Top,
    Bottom,
}

impl From<FuzzSide> for Side {
    fn from(side: FuzzSide) -> Self {
        match side {
            FuzzSide::Left => Side::Left,
            FuzzSide::Right => Side::Right,
            FuzzSide::Top => Side::Top,
            FuzzSide::Bottom => Side::Bottom,
        }
    }
}

/// Node references are indexes into the current preorder, so most ops hit.
#[derive(Debug, Arbitrary)]
enum Op {
    Insert { target: u8, side: FuzzSide, ratio: u8 },
    Remove { target: u8 },
    Move { source: u8, target: u8, side: FuzzSide },
    Swap { first: u8, second: u8 },
    SetRatio { split: u8, ratio: u8 },
    Clear,
}

#[derive(Debug, Arbitrary)]
struct Input {
    width: u16,
    height: u16,
    ops: Vec<Op>,
}

fn pick(tree: &SplitTree<u32>, index: u8) -> NodeId {
    let order = tree.preorder();
    order
        .get(usize::from(index) % order.len().max(1))
        .copied()
        .unwrap_or(NodeId::MIN)
}

fn ratio(raw: u8) -> SplitRatio {
    SplitRatio::from_parts(u64::from(raw) + 1, 257).unwrap_or(SplitRatio::HALF)
}

fuzz_target!(|input: Input| {
    let mut tree = SplitTree::singleton(0_u32);
    let mut fresh = 1_u32;
    let bounds = Rect::from_size(i32::from(input.width), i32::from(input.height));

    for op in input.ops.into_iter().take(256) {
        // Errors are expected for ops aimed at splits or missing nodes.
        let _ = match op {
            Op::Insert { target, side, ratio: raw } => {
                fresh += 1;
                if tree.is_empty() {
                    tree.insert_root(fresh).map(drop)
                } else {
                    tree.insert(pick(&tree, target), fresh, side.into(), ratio(raw)).map(drop)
                }
            }
            Op::Remove { target } => tree.remove(pick(&tree, target)).map(drop),
            Op::Move { source, target, side } => {
                tree.move_leaf(pick(&tree, source), pick(&tree, target), side.into())
            }
            Op::Swap { first, second } => tree.swap(pick(&tree, first), pick(&tree, second)),
            Op::SetRatio { split, ratio: raw } => {
                tree.set_ratio(pick(&tree, split), ratio(raw)).map(drop)
            }
            Op::Clear => {
                let _ = tree.clear();
                Ok(())
            }
        };
        tree.validate().expect("mutations must keep the tree valid");

        let placement = tree.layout(bounds, &LayoutOptions::default());
        let covered: i64 = placement.leaf_rects().map(|(_, rect)| rect.area()).sum();
        if !tree.is_empty() {
            assert_eq!(covered, bounds.area(), "leaves must tile the bounds");
        }
        let probe = Point::new(i32::from(input.width) / 2, i32::from(input.height) / 3);
        assert_eq!(
            tree.resolve_drop(&placement, probe, 0.25),
            tree.resolve_drop(&placement, probe, 0.25)
        );
    }
});
