#![forbid(unsafe_code)]

//! Split layout engine for docking stations.
//!
//! A station's content is a binary space-partition tree: leaves hold
//! externally owned content, splits divide their rectangle horizontally or
//! vertically at a ratio. The pipeline is:
//!
//! 1. [`grid`] parses a textual or cell-matrix layout into regions.
//! 2. [`builder`] bisects the regions into a [`SplitTree`].
//! 3. [`resolver`] computes pixel rectangles and resolves pointer positions
//!    into drop targets and divider hits.
//! 4. [`gesture`] turns pointer events into hover feedback and commits.
//! 5. [`station`] owns one tree, re-lays it out after every mutation, and
//!    dispatches change events.
//!
//! ```rust,ignore
//! let mut station = Station::default().with_bounds(Rect::from_size(900, 600));
//! station.drop_grid("aab\naab\nccc", [('a', vec![editor]), ('b', vec![outline]), ('c', vec![console])])?;
//! station.drop(terminal, Point::new(890, 500))?;
//! ```

pub mod builder;
pub mod config;
pub mod gesture;
pub mod grid;
pub mod persist;
pub mod resolver;
pub mod station;
pub mod tree;

pub use dockframe_core::{Point, Rect};

pub use builder::{BuildError, GridError, UnsplittableRegionSetError, build_tree, tree_from_cells, tree_from_grid};
pub use config::{ConfigError, ConfigRegistry, StationConfig};
pub use gesture::{DragEffect, DragGrab, DragMachine, DragPhase, PointerEvent};
pub use grid::{CellRect, GridMatrix, MalformedGridError, Region, parse_cells, parse_grid};
pub use persist::{DockLayout, LayoutCodecError};
pub use resolver::{DividerHit, DockZone, DropTarget, LayoutOptions, MoveIntent, Placement};
pub use station::{
    DropOutcome, RejectedDrop, Station, StationError, StationEvent, StationEventKind, SubscriptionId,
};
pub use tree::{
    CorruptionKind, DockNode, DockNodeKind, NodeId, Side, SplitAxis, SplitNode, SplitRatio, SplitTree,
    TreeError,
};
