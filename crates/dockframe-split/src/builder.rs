//! Tree builder: recursive bisection of parsed grid regions into a split tree.
//!
//! At each step the bounding box of the remaining regions is searched for a
//! straight grid line that no region crosses. Among the valid lines the one
//! with the smallest difference in occupied cells between its two sides wins;
//! ties go to vertical lines (a side-by-side split), then to the lower
//! coordinate. Ratios come straight from integer cell offsets.

use std::fmt;

use crate::grid::{CellRect, GridMatrix, MalformedGridError, Region};
use crate::persist::DockLayout;
use crate::tree::{SplitAxis, SplitRatio, SplitTree, TreeError};

/// A chosen straight cut through a region set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cut {
    /// Axis of the resulting split (`Horizontal` = vertical cut line).
    pub axis: SplitAxis,
    /// Grid line index (column for `Horizontal`, row for `Vertical`).
    pub at: u32,
    pub ratio: SplitRatio,
    /// Difference in occupied cells between the two sides.
    pub imbalance: u64,
}

impl Cut {
    /// Whether `cells` lands on the first (left/top) side of this cut.
    #[must_use]
    pub fn keeps_first(&self, cells: &CellRect) -> bool {
        span(cells, self.axis).1 <= self.at
    }
}

const fn span(cells: &CellRect, axis: SplitAxis) -> (u32, u32) {
    match axis {
        SplitAxis::Horizontal => (cells.col, cells.right()),
        SplitAxis::Vertical => (cells.row, cells.bottom()),
    }
}

/// Bounding box of a non-empty cell set.
#[must_use]
pub fn bounding_box(cells: &[CellRect]) -> Option<CellRect> {
    let (first, rest) = cells.split_first()?;
    Some(rest.iter().fold(*first, |acc, c| acc.union(c)))
}

/// Best straight cut through `cells`, or `None` when no line separates them.
#[must_use]
pub fn find_cut(cells: &[CellRect]) -> Option<Cut> {
    let bounds = bounding_box(cells)?;
    let mut best: Option<Cut> = None;
    for axis in [SplitAxis::Horizontal, SplitAxis::Vertical] {
        let (start, end) = span(&bounds, axis);
        for at in start + 1..end {
            let mut before = 0_u64;
            let mut after = 0_u64;
            let crossed = cells.iter().any(|c| {
                let (lo, hi) = span(c, axis);
                if hi <= at {
                    before += c.area();
                    false
                } else if lo >= at {
                    after += c.area();
                    false
                } else {
                    true
                }
            });
            if crossed || before == 0 || after == 0 {
                continue;
            }
            let imbalance = before.abs_diff(after);
            if best.is_none_or(|b| imbalance < b.imbalance) {
                let Ok(ratio) = SplitRatio::from_parts(u64::from(at - start), u64::from(end - start))
                else {
                    continue;
                };
                best = Some(Cut {
                    axis,
                    at,
                    ratio,
                    imbalance,
                });
            }
        }
    }
    best
}

/// Build a split tree whose leaves reproduce `regions`.
pub fn build_tree<D: PartialEq>(regions: Vec<Region<D>>) -> Result<SplitTree<D>, BuildError> {
    if regions.is_empty() {
        return Err(BuildError::Empty);
    }
    let layout = bisect(regions)?;
    SplitTree::from_layout(layout).map_err(BuildError::Tree)
}

fn bisect<D>(mut regions: Vec<Region<D>>) -> Result<DockLayout<D>, UnsplittableRegionSetError> {
    if regions.len() == 1
        && let Some(region) = regions.pop()
    {
        return Ok(DockLayout::Leaf {
            content: region.content,
        });
    }
    let cells: Vec<CellRect> = regions.iter().map(|r| r.cells).collect();
    let Some(cut) = find_cut(&cells) else {
        return Err(UnsplittableRegionSetError {
            bounds: bounding_box(&cells).unwrap_or(CellRect::new(0, 0, 0, 0)),
            regions: cells,
        });
    };
    let (first, second): (Vec<_>, Vec<_>) = regions.into_iter().partition(|r| cut.keeps_first(&r.cells));
    Ok(DockLayout::Split {
        axis: cut.axis,
        ratio: cut.ratio,
        first: Box::new(bisect(first)?),
        second: Box::new(bisect(second)?),
    })
}

/// Parse a textual grid and build its tree in one step.
pub fn tree_from_grid<D, I>(layout: &str, mapping: I) -> Result<SplitTree<D>, GridError>
where
    D: PartialEq,
    I: IntoIterator<Item = (char, Vec<D>)>,
{
    let regions = GridMatrix::parse(layout)?.regions(mapping)?;
    Ok(build_tree(regions)?)
}

/// [`tree_from_grid`] for an explicit cell matrix (`None` = blank).
pub fn tree_from_cells<D, I>(cells: &[Vec<Option<char>>], mapping: I) -> Result<SplitTree<D>, GridError>
where
    D: PartialEq,
    I: IntoIterator<Item = (char, Vec<D>)>,
{
    let regions = crate::grid::parse_cells(cells, mapping)?;
    Ok(build_tree(regions)?)
}

/// No straight cut separates a multi-region set.
///
/// Regions coming from the grid parser tile their bounding box, so this
/// only shows up for pinwheel arrangements of blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsplittableRegionSetError {
    pub bounds: CellRect,
    pub regions: Vec<CellRect>,
}

impl fmt::Display for UnsplittableRegionSetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no straight cut separates {} regions inside {}x{} cells at ({}, {})",
            self.regions.len(),
            self.bounds.cols,
            self.bounds.rows,
            self.bounds.col,
            self.bounds.row
        )
    }
}

impl std::error::Error for UnsplittableRegionSetError {}

/// Errors from [`build_tree`].
#[derive(Debug, Clone, PartialEq)]
pub enum BuildError {
    Empty,
    Unsplittable(UnsplittableRegionSetError),
    /// The regions carry the same content twice.
    Tree(TreeError),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "no regions to build from"),
            Self::Unsplittable(err) => write!(f, "{err}"),
            Self::Tree(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Empty => None,
            Self::Unsplittable(err) => Some(err),
            Self::Tree(err) => Some(err),
        }
    }
}

impl From<UnsplittableRegionSetError> for BuildError {
    fn from(err: UnsplittableRegionSetError) -> Self {
        Self::Unsplittable(err)
    }
}

/// Errors from the parse-then-build pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    Malformed(MalformedGridError),
    Build(BuildError),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(err) => write!(f, "malformed grid: {err}"),
            Self::Build(err) => write!(f, "tree build failed: {err}"),
        }
    }
}

impl std::error::Error for GridError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Malformed(err) => Some(err),
            Self::Build(err) => Some(err),
        }
    }
}

impl From<MalformedGridError> for GridError {
    fn from(err: MalformedGridError) -> Self {
        Self::Malformed(err)
    }
}

impl From<BuildError> for GridError {
    fn from(err: BuildError) -> Self {
        Self::Build(err)
    }
}
