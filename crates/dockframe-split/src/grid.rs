//! Grid parser: turns a cell matrix of region identifiers into rectangular
//! regions with their content attached.
//!
//! ```text
//! aaabbcccc
//! aaabbcccc
//! ddeeeeeff
//! ```
//!
//! Each maximal block of one identifier becomes a [`Region`]. An identifier
//! may occur in several disjoint blocks when the mapping supplies one item
//! per block; items are consumed in row-major discovery order.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A rectangle in grid cell coordinates (half-open).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    pub col: u32,
    pub row: u32,
    pub cols: u32,
    pub rows: u32,
}

impl CellRect {
    #[must_use]
    pub const fn new(col: u32, row: u32, cols: u32, rows: u32) -> Self {
        Self {
            col,
            row,
            cols,
            rows,
        }
    }

    /// Exclusive right column.
    #[must_use]
    pub const fn right(&self) -> u32 {
        self.col + self.cols
    }

    /// Exclusive bottom row.
    #[must_use]
    pub const fn bottom(&self) -> u32 {
        self.row + self.rows
    }

    /// Number of covered cells.
    #[must_use]
    pub const fn area(&self) -> u64 {
        self.cols as u64 * self.rows as u64
    }

    /// Smallest cell rectangle covering both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let col = self.col.min(other.col);
        let row = self.row.min(other.row);
        Self::new(
            col,
            row,
            self.right().max(other.right()) - col,
            self.bottom().max(other.bottom()) - row,
        )
    }
}

/// One maximal rectangular block of a single identifier, carrying its content.
#[derive(Debug, Clone, PartialEq)]
pub struct Region<D> {
    pub key: char,
    /// Zero-based index among the blocks sharing `key`, in row-major order.
    pub occurrence: usize,
    pub cells: CellRect,
    pub content: D,
}

/// A rectangular matrix of cells; `None` marks a blank cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridMatrix {
    cols: usize,
    cells: Vec<Vec<Option<char>>>,
}

impl GridMatrix {
    /// Parse the textual grid format.
    ///
    /// Lines are split on `\n`; whitespace inside a line is ignored and lines
    /// that are empty after stripping are skipped.
    pub fn parse(layout: &str) -> Result<Self, MalformedGridError> {
        let rows = layout
            .lines()
            .map(|line| {
                line.chars()
                    .filter(|c| !c.is_whitespace())
                    .map(Some)
                    .collect::<Vec<_>>()
            })
            .filter(|row| !row.is_empty())
            .collect();
        Self::from_cells(rows)
    }

    /// Wrap an explicit cell matrix, rejecting ragged rows.
    pub fn from_cells(cells: Vec<Vec<Option<char>>>) -> Result<Self, MalformedGridError> {
        let cols = cells.first().map_or(0, Vec::len);
        if let Some((row, found)) = cells
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != cols)
            .map(|(index, row)| (index, row.len()))
        {
            return Err(MalformedGridError::RaggedRow {
                row,
                expected: cols,
                found,
            });
        }
        if cells.iter().flatten().all(Option::is_none) {
            return Err(MalformedGridError::EmptyGrid);
        }
        Ok(Self { cols, cells })
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Identifier at `(row, col)`; `None` for blanks and out-of-range cells.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<char> {
        self.cells.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    /// Greedy maximal-rectangle scan.
    ///
    /// Walks cells in row-major order; each unvisited identifier cell seeds a
    /// rectangle grown right, then down while every covered cell matches.
    #[must_use]
    pub fn blocks(&self) -> Vec<(char, CellRect)> {
        let rows = self.rows();
        let mut visited = vec![vec![false; self.cols]; rows];
        let mut blocks = Vec::new();
        for row in 0..rows {
            for col in 0..self.cols {
                if visited[row][col] {
                    continue;
                }
                let Some(key) = self.cell(row, col) else {
                    continue;
                };
                let free = |r: usize, c: usize| !visited[r][c] && self.cell(r, c) == Some(key);

                let mut width = 1;
                while col + width < self.cols && free(row, col + width) {
                    width += 1;
                }
                let mut height = 1;
                while row + height < rows && (col..col + width).all(|c| free(row + height, c)) {
                    height += 1;
                }
                for mark in &mut visited[row..row + height] {
                    mark[col..col + width].fill(true);
                }
                blocks.push((
                    key,
                    CellRect::new(col as u32, row as u32, width as u32, height as u32),
                ));
            }
        }
        blocks
    }

    /// Attach content to each block.
    ///
    /// Identifiers present in `mapping` but absent from the grid are ignored.
    pub fn regions<D, I>(&self, mapping: I) -> Result<Vec<Region<D>>, MalformedGridError>
    where
        I: IntoIterator<Item = (char, Vec<D>)>,
    {
        let mut mapping: FxHashMap<char, Vec<D>> = mapping.into_iter().collect();
        let blocks = self.blocks();

        // Unmapped identifiers are reported before count mismatches.
        if let Some((key, cells)) = blocks.iter().find(|(key, _)| !mapping.contains_key(key)) {
            return Err(MalformedGridError::UnmappedIdentifier {
                key: *key,
                row: cells.row as usize,
                col: cells.col as usize,
            });
        }

        let mut occurrences: Vec<(char, usize)> = Vec::new();
        for (key, _) in &blocks {
            match occurrences.iter_mut().find(|(seen, _)| seen == key) {
                Some((_, count)) => *count += 1,
                None => occurrences.push((*key, 1)),
            }
        }
        for (key, regions) in &occurrences {
            let items = mapping.get(key).map_or(0, Vec::len);
            if items != *regions {
                return Err(MalformedGridError::ContentCountMismatch {
                    key: *key,
                    regions: *regions,
                    items,
                });
            }
        }

        let mut queues: FxHashMap<char, std::vec::IntoIter<D>> = occurrences
            .iter()
            .filter_map(|(key, _)| mapping.remove(key).map(|items| (*key, items.into_iter())))
            .collect();
        let mut next_occurrence: FxHashMap<char, usize> = FxHashMap::default();
        let mut regions = Vec::with_capacity(blocks.len());
        for (key, cells) in blocks {
            let Some(content) = queues.get_mut(&key).and_then(Iterator::next) else {
                return Err(MalformedGridError::UnmappedIdentifier {
                    key,
                    row: cells.row as usize,
                    col: cells.col as usize,
                });
            };
            let occurrence = next_occurrence.entry(key).or_insert(0);
            regions.push(Region {
                key,
                occurrence: *occurrence,
                cells,
                content,
            });
            *occurrence += 1;
        }
        Ok(regions)
    }
}

/// Parse a textual grid and attach content from `mapping`.
pub fn parse_grid<D, I>(layout: &str, mapping: I) -> Result<Vec<Region<D>>, MalformedGridError>
where
    I: IntoIterator<Item = (char, Vec<D>)>,
{
    GridMatrix::parse(layout)?.regions(mapping)
}

/// Parse an explicit cell matrix (`None` = blank) and attach content.
pub fn parse_cells<D, I>(
    cells: &[Vec<Option<char>>],
    mapping: I,
) -> Result<Vec<Region<D>>, MalformedGridError>
where
    I: IntoIterator<Item = (char, Vec<D>)>,
{
    GridMatrix::from_cells(cells.to_vec())?.regions(mapping)
}

/// Bad grid input. Surfaced to the caller, nothing is recovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedGridError {
    /// Row `row` has `found` cells where the first row has `expected`.
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// The grid holds no identifier cells.
    EmptyGrid,
    /// `key` appears in the grid (first at `row`, `col`) but not in the mapping.
    UnmappedIdentifier { key: char, row: usize, col: usize },
    /// `key` forms `regions` blocks but the mapping supplies `items` contents.
    ContentCountMismatch {
        key: char,
        regions: usize,
        items: usize,
    },
}

impl fmt::Display for MalformedGridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RaggedRow {
                row,
                expected,
                found,
            } => write!(f, "row {row} has {found} cells, expected {expected}"),
            Self::EmptyGrid => write!(f, "grid has no identifier cells"),
            Self::UnmappedIdentifier { key, row, col } => {
                write!(f, "identifier '{key}' at row {row}, column {col} has no mapping")
            }
            Self::ContentCountMismatch {
                key,
                regions,
                items,
            } => write!(
                f,
                "identifier '{key}' forms {regions} region(s) but the mapping supplies {items} item(s)"
            ),
        }
    }
}

impl std::error::Error for MalformedGridError {}
