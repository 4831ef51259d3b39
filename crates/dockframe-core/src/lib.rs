#![forbid(unsafe_code)]

//! Core: geometry shared by the docking layers.
//!
//! # Role in dockframe
//! `dockframe-core` owns the pixel-space primitives ([`geometry::Rect`],
//! [`geometry::Point`]) that the split layout engine (`dockframe-split`)
//! produces and consumes. It has no knowledge of trees, content, or
//! stations, so hosts can depend on it without pulling in the engine.

pub mod geometry;

pub use geometry::{Point, Rect};
