//! Drag gesture state machine.
//!
//! Pointer events drive `Idle -> Armed -> Dragging -> Idle`. A press on a
//! divider arms a resize, a press on a leaf arms a content drag. Movement
//! past the drag threshold starts the drag; from then on each move reports a
//! hover target or a prospective ratio. Nothing here mutates the tree: the
//! caller applies [`DragEffect::Commit`] and simply drops everything else.

use dockframe_core::Point;

use crate::config::StationConfig;
use crate::resolver::{DropTarget, Placement};
use crate::tree::{NodeId, SplitRatio, SplitTree};

/// Discrete pointer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Press(Point),
    Move(Point),
    Release(Point),
    Cancel,
}

/// What a gesture is holding on to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragGrab {
    Content { leaf: NodeId },
    Divider { split: NodeId },
}

/// Current gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    /// Pressed, but the pointer has not yet travelled past the threshold.
    Armed { grab: DragGrab, origin: Point },
    Dragging {
        grab: DragGrab,
        origin: Point,
        last: Point,
    },
}

/// Outcome of feeding one event to the machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEffect {
    /// The event did not change anything observable.
    Idle,
    Armed(DragGrab),
    /// Speculative drop target for hover feedback.
    Hover { source: NodeId, target: DropTarget },
    /// Prospective ratio while dragging a divider.
    Resize { split: NodeId, ratio: SplitRatio },
    /// The gesture finished at `position`; the caller applies it.
    Commit { grab: DragGrab, position: Point },
    /// Released before the threshold was crossed.
    Clicked(DragGrab),
    Cancelled,
}

/// Gesture tracker for one station.
#[derive(Debug, Clone, Default)]
pub struct DragMachine {
    phase: DragPhase,
}

impl DragMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn phase(&self) -> DragPhase {
        self.phase
    }

    /// Armed or dragging.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self.phase, DragPhase::Idle)
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging { .. })
    }

    /// Forget any gesture in progress.
    pub fn reset(&mut self) {
        self.phase = DragPhase::Idle;
    }

    /// Advance the machine by one event against the current geometry.
    pub fn apply<D>(
        &mut self,
        tree: &SplitTree<D>,
        placement: &Placement,
        config: &StationConfig,
        event: PointerEvent,
    ) -> DragEffect {
        match (self.phase, event) {
            (DragPhase::Idle, PointerEvent::Press(position)) => {
                let Some(grab) = grab_at(tree, placement, config, position) else {
                    return DragEffect::Idle;
                };
                self.phase = DragPhase::Armed {
                    grab,
                    origin: position,
                };
                DragEffect::Armed(grab)
            }
            (DragPhase::Armed { grab, origin }, PointerEvent::Move(position)) => {
                let threshold = i64::from(config.drag_threshold.max(0));
                if origin.distance_squared(position) < threshold * threshold {
                    return DragEffect::Idle;
                }
                self.phase = DragPhase::Dragging {
                    grab,
                    origin,
                    last: position,
                };
                preview(tree, placement, config, grab, position)
            }
            (DragPhase::Dragging { grab, origin, .. }, PointerEvent::Move(position)) => {
                self.phase = DragPhase::Dragging {
                    grab,
                    origin,
                    last: position,
                };
                preview(tree, placement, config, grab, position)
            }
            (DragPhase::Armed { grab, .. }, PointerEvent::Release(_)) => {
                self.phase = DragPhase::Idle;
                DragEffect::Clicked(grab)
            }
            (DragPhase::Dragging { grab, .. }, PointerEvent::Release(position)) => {
                self.phase = DragPhase::Idle;
                DragEffect::Commit { grab, position }
            }
            (DragPhase::Armed { .. } | DragPhase::Dragging { .. }, PointerEvent::Cancel) => {
                self.phase = DragPhase::Idle;
                DragEffect::Cancelled
            }
            // Stray moves/releases while idle, and presses during a gesture.
            _ => DragEffect::Idle,
        }
    }
}

fn grab_at<D>(tree: &SplitTree<D>, placement: &Placement, config: &StationConfig, position: Point) -> Option<DragGrab> {
    if let Some(hit) = tree.resolve_divider(placement, position, config.divider_grab) {
        return Some(DragGrab::Divider { split: hit.split });
    }
    placement
        .leaf_at(position)
        .filter(|leaf| tree.content(*leaf).is_some())
        .map(|leaf| DragGrab::Content { leaf })
}

fn preview<D>(
    tree: &SplitTree<D>,
    placement: &Placement,
    config: &StationConfig,
    grab: DragGrab,
    position: Point,
) -> DragEffect {
    match grab {
        DragGrab::Content { leaf } => DragEffect::Hover {
            source: leaf,
            target: tree.resolve_drop(placement, position, config.effective_edge_margin()),
        },
        DragGrab::Divider { split } => tree
            .ratio_for_pointer(placement, split, position, &config.layout_options())
            .map_or(DragEffect::Idle, |ratio| DragEffect::Resize { split, ratio }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::DockZone;
    use crate::tree::Side;
    use dockframe_core::Rect;

    struct Fixture {
        tree: SplitTree<&'static str>,
        placement: Placement,
        config: StationConfig,
        machine: DragMachine,
    }

    impl Fixture {
        /// `left | right` over 200x100, divider at x = 100.
        fn new() -> Self {
            let mut tree = SplitTree::singleton("left");
            let left = tree.root().expect("root");
            let _ = tree
                .insert(left, "right", Side::Right, SplitRatio::HALF)
                .expect("insert");
            let config = StationConfig::default();
            let placement = tree.layout(Rect::from_size(200, 100), &config.layout_options());
            Self {
                tree,
                placement,
                config,
                machine: DragMachine::new(),
            }
        }

        fn send(&mut self, event: PointerEvent) -> DragEffect {
            self.machine
                .apply(&self.tree, &self.placement, &self.config, event)
        }

        fn leaf(&self, name: &'static str) -> NodeId {
            self.tree.find_leaf(&name).expect("leaf")
        }
    }

    #[test]
    fn small_moves_stay_armed() {
        let mut fx = Fixture::new();
        let left = fx.leaf("left");
        assert_eq!(
            fx.send(PointerEvent::Press(Point::new(20, 50))),
            DragEffect::Armed(DragGrab::Content { leaf: left })
        );
        assert_eq!(fx.send(PointerEvent::Move(Point::new(22, 51))), DragEffect::Idle);
        assert!(fx.machine.is_active());
        assert!(!fx.machine.is_dragging());
        assert_eq!(
            fx.send(PointerEvent::Release(Point::new(22, 51))),
            DragEffect::Clicked(DragGrab::Content { leaf: left })
        );
        assert_eq!(fx.machine.phase(), DragPhase::Idle);
    }

    #[test]
    fn content_drag_hovers_then_commits() {
        let mut fx = Fixture::new();
        let left = fx.leaf("left");
        let right = fx.leaf("right");
        let _ = fx.send(PointerEvent::Press(Point::new(20, 50)));
        assert_eq!(
            fx.send(PointerEvent::Move(Point::new(190, 50))),
            DragEffect::Hover {
                source: left,
                target: DropTarget::Leaf {
                    leaf: right,
                    zone: DockZone::Right
                },
            }
        );
        assert_eq!(
            fx.send(PointerEvent::Release(Point::new(190, 50))),
            DragEffect::Commit {
                grab: DragGrab::Content { leaf: left },
                position: Point::new(190, 50),
            }
        );
        assert!(!fx.machine.is_active());
    }

    #[test]
    fn divider_drag_reports_ratio() {
        let mut fx = Fixture::new();
        let root = fx.tree.root().expect("root");
        assert_eq!(
            fx.send(PointerEvent::Press(Point::new(101, 40))),
            DragEffect::Armed(DragGrab::Divider { split: root })
        );
        match fx.send(PointerEvent::Move(Point::new(50, 40))) {
            DragEffect::Resize { split, ratio } => {
                assert_eq!(split, root);
                assert_eq!(ratio.get(), 0.25);
            }
            other => panic!("expected resize, got {other:?}"),
        }
    }

    #[test]
    fn cancel_discards_gesture() {
        let mut fx = Fixture::new();
        let before = fx.tree.clone();
        let _ = fx.send(PointerEvent::Press(Point::new(20, 50)));
        let _ = fx.send(PointerEvent::Move(Point::new(150, 50)));
        assert_eq!(fx.send(PointerEvent::Cancel), DragEffect::Cancelled);
        assert_eq!(fx.machine.phase(), DragPhase::Idle);
        assert_eq!(fx.tree, before);
        assert_eq!(fx.send(PointerEvent::Cancel), DragEffect::Idle);
    }

    #[test]
    fn press_outside_is_ignored() {
        let mut fx = Fixture::new();
        assert_eq!(fx.send(PointerEvent::Press(Point::new(500, 50))), DragEffect::Idle);
        assert_eq!(fx.send(PointerEvent::Release(Point::new(500, 50))), DragEffect::Idle);
    }

    #[test]
    fn second_press_does_not_restart() {
        let mut fx = Fixture::new();
        let _ = fx.send(PointerEvent::Press(Point::new(20, 50)));
        let phase = fx.machine.phase();
        assert_eq!(fx.send(PointerEvent::Press(Point::new(180, 50))), DragEffect::Idle);
        assert_eq!(fx.machine.phase(), phase);
    }

    #[test]
    fn zero_threshold_drags_immediately() {
        let mut fx = Fixture::new();
        fx.config.drag_threshold = 0;
        let _ = fx.send(PointerEvent::Press(Point::new(20, 50)));
        assert!(matches!(
            fx.send(PointerEvent::Move(Point::new(20, 50))),
            DragEffect::Hover { .. }
        ));
    }
}
