//! Layout resolver: pixel geometry for every node, and pointer hit-testing
//! against that geometry.
//!
//! [`SplitTree::layout`] is a pure function of the tree and the bounds. A
//! split divides its rectangle along its axis at `round(available * ratio)`
//! where `available` excludes the divider gap; each side is then nudged so
//! both subtrees keep their minimum extent whenever both minima fit.
//! Degenerate bounds are handed unchanged to every descendant.

use std::collections::BTreeMap;

use dockframe_core::{Point, Rect};
use serde::{Deserialize, Serialize};

use crate::tree::{NodeId, Side, SplitAxis, SplitNode, SplitRatio, SplitTree};

/// Geometry knobs for [`SplitTree::layout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutOptions {
    /// Gap between the two children of every split, in pixels.
    pub divider_size: i32,
    pub min_leaf_width: i32,
    pub min_leaf_height: i32,
}

/// Rectangles for every node of one layout pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    bounds: Rect,
    rects: BTreeMap<NodeId, Rect>,
    /// Leaf IDs in preorder.
    leaves: Vec<NodeId>,
}

impl Placement {
    /// Placement of an empty tree.
    #[must_use]
    pub fn empty(bounds: Rect) -> Self {
        Self {
            bounds,
            rects: BTreeMap::new(),
            leaves: Vec::new(),
        }
    }

    #[must_use]
    pub const fn bounds(&self) -> Rect {
        self.bounds
    }

    #[must_use]
    pub fn rect(&self, id: NodeId) -> Option<Rect> {
        self.rects.get(&id).copied()
    }

    /// All node rectangles in ID order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, Rect)> + '_ {
        self.rects.iter().map(|(id, rect)| (*id, *rect))
    }

    /// Leaf rectangles in preorder.
    pub fn leaf_rects(&self) -> impl Iterator<Item = (NodeId, Rect)> + '_ {
        self.leaves
            .iter()
            .filter_map(|id| self.rects.get(id).map(|rect| (*id, *rect)))
    }

    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// First leaf in preorder whose rectangle contains `point`.
    #[must_use]
    pub fn leaf_at(&self, point: Point) -> Option<NodeId> {
        self.leaf_rects()
            .find(|(_, rect)| rect.contains(point))
            .map(|(id, _)| id)
    }
}

/// Divide `extent` into `(first, gap, second)` for one split.
#[must_use]
pub fn divide(extent: i32, divider: i32, ratio: SplitRatio, first_min: i32, second_min: i32) -> (i32, i32, i32) {
    let extent = extent.max(0);
    let gap = divider.clamp(0, extent);
    let available = extent - gap;
    let mut first = ((f64::from(available) * ratio.get()).round() as i32).clamp(0, available);
    if first_min.saturating_add(second_min) <= available {
        first = first.clamp(first_min, available - second_min);
    }
    (first, gap, available - first)
}

fn split_rect(rect: Rect, split: &SplitNode, options: &LayoutOptions, mins: (i32, i32)) -> (Rect, Rect) {
    match split.axis {
        SplitAxis::Horizontal => {
            let (first, gap, second) = divide(rect.width, options.divider_size, split.ratio, mins.0, mins.1);
            (
                Rect::new(rect.x, rect.y, first, rect.height),
                Rect::new(rect.x.saturating_add(first).saturating_add(gap), rect.y, second, rect.height),
            )
        }
        SplitAxis::Vertical => {
            let (first, gap, second) = divide(rect.height, options.divider_size, split.ratio, mins.0, mins.1);
            (
                Rect::new(rect.x, rect.y, rect.width, first),
                Rect::new(rect.x, rect.y.saturating_add(first).saturating_add(gap), rect.width, second),
            )
        }
    }
}

/// Edge or center of a leaf targeted by a drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DockZone {
    Left,
    Right,
    Top,
    Bottom,
    /// Replace or stack onto the leaf instead of splitting it.
    Center,
}

impl DockZone {
    /// Side to split on; `None` for the center.
    #[must_use]
    pub const fn side(self) -> Option<Side> {
        match self {
            Self::Left => Some(Side::Left),
            Self::Right => Some(Side::Right),
            Self::Top => Some(Side::Top),
            Self::Bottom => Some(Side::Bottom),
            Self::Center => None,
        }
    }
}

/// Where a drop at some point would land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropTarget {
    Leaf { leaf: NodeId, zone: DockZone },
    /// The station is empty; the content becomes the root.
    EmptyStation,
    /// Outside the station, or in a gap between leaves.
    NoTarget,
}

/// Classify `point` within `rect` by its nearest edge.
///
/// Offsets are measured from pixel centers as fractions of the extent. The
/// nearest edge wins when it is closer than `edge_margin`; ties go to
/// left, right, top, bottom in that order.
#[must_use]
pub fn classify_zone(rect: Rect, point: Point, edge_margin: f64) -> DockZone {
    if rect.is_empty() {
        return DockZone::Center;
    }
    let margin = if edge_margin.is_nan() {
        0.0
    } else {
        edge_margin.clamp(0.0, 0.5)
    };
    let fx = (f64::from(point.x) - f64::from(rect.x) + 0.5) / f64::from(rect.width);
    let fy = (f64::from(point.y) - f64::from(rect.y) + 0.5) / f64::from(rect.height);
    let (zone, distance) = [
        (DockZone::Left, fx),
        (DockZone::Right, 1.0 - fx),
        (DockZone::Top, fy),
        (DockZone::Bottom, 1.0 - fy),
    ]
    .into_iter()
    .fold((DockZone::Center, f64::INFINITY), |best, candidate| {
        if candidate.1 < best.1 { candidate } else { best }
    });
    if distance < margin { zone } else { DockZone::Center }
}

/// A divider under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DividerHit {
    pub split: NodeId,
    pub axis: SplitAxis,
    /// The gap between the split's children (zero-width when dividers are 0px).
    pub band: Rect,
}

/// Tree mutation implied by dropping a placed leaf on a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveIntent {
    Split { source: NodeId, target: NodeId, side: Side },
    Swap { source: NodeId, target: NodeId },
    Noop,
}

impl<D> SplitTree<D> {
    /// Compute rectangles for every node inside `bounds`.
    #[must_use]
    pub fn layout(&self, bounds: Rect, options: &LayoutOptions) -> Placement {
        let mut placement = Placement::empty(bounds);
        let Some(root) = self.root() else {
            return placement;
        };
        let minimums = if options.min_leaf_width > 0 || options.min_leaf_height > 0 {
            self.minimum_extents(options)
        } else {
            BTreeMap::new()
        };
        let along = |id: NodeId, axis: SplitAxis| {
            minimums.get(&id).map_or(0, |&(w, h)| match axis {
                SplitAxis::Horizontal => w,
                SplitAxis::Vertical => h,
            })
        };

        let mut stack = vec![(root, bounds)];
        while let Some((id, rect)) = stack.pop() {
            let _ = placement.rects.insert(id, rect);
            let Some(node) = self.node(id) else {
                continue;
            };
            let Some(split) = node.split() else {
                placement.leaves.push(id);
                continue;
            };
            let (first, second) = if rect.is_empty() {
                (rect, rect)
            } else {
                let mins = (along(split.first, split.axis), along(split.second, split.axis));
                split_rect(rect, split, options, mins)
            };
            stack.push((split.second, second));
            stack.push((split.first, first));
        }
        placement
    }

    /// Minimum `(width, height)` of every subtree.
    fn minimum_extents(&self, options: &LayoutOptions) -> BTreeMap<NodeId, (i32, i32)> {
        let mut mins = BTreeMap::new();
        let divider = options.divider_size.max(0);
        for id in self.preorder().into_iter().rev() {
            let extent = match self.split(id) {
                None => (options.min_leaf_width.max(0), options.min_leaf_height.max(0)),
                Some(split) => {
                    let a: (i32, i32) = mins.get(&split.first).copied().unwrap_or_default();
                    let b: (i32, i32) = mins.get(&split.second).copied().unwrap_or_default();
                    match split.axis {
                        SplitAxis::Horizontal => (
                            a.0.saturating_add(divider).saturating_add(b.0),
                            a.1.max(b.1),
                        ),
                        SplitAxis::Vertical => (
                            a.0.max(b.0),
                            a.1.saturating_add(divider).saturating_add(b.1),
                        ),
                    }
                }
            };
            let _ = mins.insert(id, extent);
        }
        mins
    }

    /// Resolve the drop target under `point`. Pure; repeated calls with the
    /// same inputs return the same target.
    #[must_use]
    pub fn resolve_drop(&self, placement: &Placement, point: Point, edge_margin: f64) -> DropTarget {
        if !placement.bounds().contains(point) {
            return DropTarget::NoTarget;
        }
        if self.is_empty() {
            return DropTarget::EmptyStation;
        }
        placement
            .leaf_rects()
            .find(|(id, rect)| rect.contains(point) && self.content(*id).is_some())
            .map_or(DropTarget::NoTarget, |(leaf, rect)| DropTarget::Leaf {
                leaf,
                zone: classify_zone(rect, point, edge_margin),
            })
    }

    /// Gap between the children of `split_id` in `placement`.
    #[must_use]
    pub fn divider_band(&self, placement: &Placement, split_id: NodeId) -> Option<Rect> {
        let split = self.split(split_id)?;
        let rect = placement.rect(split_id)?;
        if rect.is_empty() {
            return None;
        }
        let first = placement.rect(split.first)?;
        let second = placement.rect(split.second)?;
        Some(match split.axis {
            SplitAxis::Horizontal => Rect::new(first.right(), rect.y, second.x - first.right(), rect.height),
            SplitAxis::Vertical => Rect::new(rect.x, first.bottom(), rect.width, second.y - first.bottom()),
        })
    }

    /// Deepest split whose divider, widened by `grab` pixels on each side,
    /// contains `point`.
    #[must_use]
    pub fn resolve_divider(&self, placement: &Placement, point: Point, grab: i32) -> Option<DividerHit> {
        let grab = grab.max(0);
        let mut best: Option<(usize, DividerHit)> = None;
        for id in self.preorder() {
            let Some(split) = self.split(id) else {
                continue;
            };
            let Some(band) = self.divider_band(placement, id) else {
                continue;
            };
            let widened = grab.saturating_mul(2);
            let zone = match split.axis {
                SplitAxis::Horizontal => Rect::new(
                    band.x.saturating_sub(grab),
                    band.y,
                    band.width.saturating_add(widened),
                    band.height,
                ),
                SplitAxis::Vertical => Rect::new(
                    band.x,
                    band.y.saturating_sub(grab),
                    band.width,
                    band.height.saturating_add(widened),
                ),
            };
            if !zone.contains(point) {
                continue;
            }
            let depth = self.ancestors(id).count();
            if best.is_none_or(|(deepest, _)| depth > deepest) {
                best = Some((
                    depth,
                    DividerHit {
                        split: id,
                        axis: split.axis,
                        band,
                    },
                ));
            }
        }
        best.map(|(_, hit)| hit)
    }

    /// Ratio that puts the divider of `split_id` under `point`.
    #[must_use]
    pub fn ratio_for_pointer(
        &self,
        placement: &Placement,
        split_id: NodeId,
        point: Point,
        options: &LayoutOptions,
    ) -> Option<SplitRatio> {
        let split = self.split(split_id)?;
        let rect = placement.rect(split_id)?;
        let (origin, extent, position) = match split.axis {
            SplitAxis::Horizontal => (rect.x, rect.width, point.x),
            SplitAxis::Vertical => (rect.y, rect.height, point.y),
        };
        let gap = options.divider_size.clamp(0, extent.max(0));
        let available = extent - gap;
        if available <= 0 {
            return None;
        }
        let first = f64::from(position) - f64::from(origin) - f64::from(gap) / 2.0;
        Some(SplitRatio::clamped(first / f64::from(available)))
    }

    /// Mutation implied by dropping leaf `source` on `target`.
    #[must_use]
    pub fn plan_move(&self, source: NodeId, target: DropTarget) -> MoveIntent {
        let DropTarget::Leaf { leaf, zone } = target else {
            return MoveIntent::Noop;
        };
        if leaf == source || self.content(source).is_none() || self.content(leaf).is_none() {
            return MoveIntent::Noop;
        }
        match zone.side() {
            Some(side) => MoveIntent::Split {
                source,
                target: leaf,
                side,
            },
            None => MoveIntent::Swap {
                source,
                target: leaf,
            },
        }
    }

    /// Parents of `id`, nearest first.
    fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }
}
