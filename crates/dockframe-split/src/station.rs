//! Station facade: owns one split tree, its bounds, and the current placement.
//!
//! Every successful mutation is followed by exactly one full re-layout from
//! the root. Observers subscribe per [`StationEventKind`] and are called
//! synchronously, in subscription order, after the state they describe is in
//! place.
//!
//! Applied mutations are logged at `debug` under the `dockframe.station`
//! target; failures are only returned, never logged.

use std::fmt;

use dockframe_core::{Point, Rect};
use rustc_hash::FxHashMap;

use crate::builder::{GridError, tree_from_grid};
use crate::config::{ConfigRegistry, StationConfig};
use crate::gesture::{DragEffect, DragGrab, DragMachine, DragPhase, PointerEvent};
use crate::resolver::{DockZone, DropTarget, MoveIntent, Placement};
use crate::tree::{NodeId, SplitRatio, SplitTree, TreeError};

/// Kinds of station events, used as subscription keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StationEventKind {
    TreeReplaced,
    ContentAdded,
    ContentRemoved,
    ContentMoved,
    RatioChanged,
    LayoutChanged,
}

/// A change observers can react to.
#[derive(Debug, Clone, PartialEq)]
pub enum StationEvent {
    /// The whole tree was swapped out.
    TreeReplaced { leaves: usize },
    ContentAdded { leaf: NodeId },
    ContentRemoved { leaf: NodeId },
    /// A placed leaf moved or swapped content with another leaf.
    ContentMoved { leaf: NodeId, intent: MoveIntent },
    RatioChanged { split: NodeId, ratio: SplitRatio },
    /// A fresh placement was published.
    LayoutChanged { bounds: Rect, leaves: usize },
}

impl StationEvent {
    #[must_use]
    pub const fn kind(&self) -> StationEventKind {
        match self {
            Self::TreeReplaced { .. } => StationEventKind::TreeReplaced,
            Self::ContentAdded { .. } => StationEventKind::ContentAdded,
            Self::ContentRemoved { .. } => StationEventKind::ContentRemoved,
            Self::ContentMoved { .. } => StationEventKind::ContentMoved,
            Self::RatioChanged { .. } => StationEventKind::RatioChanged,
            Self::LayoutChanged { .. } => StationEventKind::LayoutChanged,
        }
    }
}

/// Handle returned by [`Station::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&StationEvent)>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    table: FxHashMap<StationEventKind, Vec<(SubscriptionId, Listener)>>,
}

impl Listeners {
    fn subscribe(&mut self, kind: StationEventKind, listener: Listener) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.table.entry(kind).or_default().push((id, listener));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for listeners in self.table.values_mut() {
            if let Some(index) = listeners.iter().position(|(sub, _)| *sub == id) {
                let _ = listeners.remove(index);
                return true;
            }
        }
        false
    }

    fn dispatch(&mut self, event: &StationEvent) {
        if let Some(listeners) = self.table.get_mut(&event.kind()) {
            for (_, listener) in listeners.iter_mut() {
                listener(event);
            }
        }
    }

    fn len(&self) -> usize {
        self.table.values().map(Vec::len).sum()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("subscriptions", &self.len())
            .finish()
    }
}

/// Result of a successful drop.
#[derive(Debug, Clone, PartialEq)]
pub struct DropOutcome<D> {
    /// Leaf now holding the dropped content.
    pub leaf: NodeId,
    /// `None` when the content became the root of an empty station.
    pub zone: Option<DockZone>,
    /// Content pushed out by a center drop, for the host to stack or close.
    pub displaced: Option<D>,
}

/// A drop that did not happen; the content goes back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedDrop<D> {
    pub content: D,
    pub error: StationError,
}

impl<D> fmt::Display for RejectedDrop<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "drop rejected: {}", self.error)
    }
}

impl<D: fmt::Debug> std::error::Error for RejectedDrop<D> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Errors from station operations.
#[derive(Debug, Clone, PartialEq)]
pub enum StationError {
    Tree(TreeError),
    Grid(GridError),
    /// The pointer is outside the station or over a gap.
    NoTarget,
    /// No leaf holds the given content.
    ContentNotFound,
    NoDragInProgress,
}

impl fmt::Display for StationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tree(err) => write!(f, "{err}"),
            Self::Grid(err) => write!(f, "{err}"),
            Self::NoTarget => write!(f, "no drop target at pointer position"),
            Self::ContentNotFound => write!(f, "content is not placed in this station"),
            Self::NoDragInProgress => write!(f, "no drag gesture in progress"),
        }
    }
}

impl std::error::Error for StationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Tree(err) => Some(err),
            Self::Grid(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TreeError> for StationError {
    fn from(err: TreeError) -> Self {
        Self::Tree(err)
    }
}

impl From<GridError> for StationError {
    fn from(err: GridError) -> Self {
        Self::Grid(err)
    }
}

/// A docking station: one split tree laid out inside one rectangle.
#[derive(Debug)]
pub struct Station<D> {
    tree: SplitTree<D>,
    bounds: Rect,
    config: StationConfig,
    placement: Placement,
    gesture: DragMachine,
    listeners: Listeners,
}

impl<D> Station<D> {
    /// Empty station with zero-sized bounds.
    #[must_use]
    pub fn new(config: StationConfig) -> Self {
        Self {
            tree: SplitTree::new(),
            bounds: Rect::default(),
            config,
            placement: Placement::empty(Rect::default()),
            gesture: DragMachine::new(),
            listeners: Listeners::default(),
        }
    }

    /// Empty station configured from a registry profile (default if unknown).
    #[must_use]
    pub fn from_registry(registry: &ConfigRegistry, profile: &str) -> Self {
        Self::new(registry.resolve(profile).clone())
    }

    /// Builder-style initial bounds.
    #[must_use]
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self.placement = self.tree.layout(bounds, &self.config.layout_options());
        self
    }

    #[must_use]
    pub const fn tree(&self) -> &SplitTree<D> {
        &self.tree
    }

    #[must_use]
    pub const fn placement(&self) -> &Placement {
        &self.placement
    }

    #[must_use]
    pub const fn bounds(&self) -> Rect {
        self.bounds
    }

    #[must_use]
    pub const fn config(&self) -> &StationConfig {
        &self.config
    }

    #[must_use]
    pub const fn gesture_phase(&self) -> DragPhase {
        self.gesture.phase()
    }

    /// Consume the station, handing the tree (and its content) back.
    #[must_use]
    pub fn into_tree(self) -> SplitTree<D> {
        self.tree
    }

    /// Register `listener` for events of `kind`.
    pub fn subscribe(
        &mut self,
        kind: StationEventKind,
        listener: impl FnMut(&StationEvent) + 'static,
    ) -> SubscriptionId {
        self.listeners.subscribe(kind, Box::new(listener))
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Move the station to new bounds and publish a fresh placement.
    pub fn resize(&mut self, bounds: Rect) -> &Placement {
        self.bounds = bounds;
        self.relayout();
        &self.placement
    }

    /// Swap configuration and re-layout with it.
    pub fn set_config(&mut self, config: StationConfig) {
        self.config = config;
        self.gesture.reset();
        self.relayout();
    }

    /// Replace the tree wholesale, returning the previous one.
    pub fn drop_tree(&mut self, tree: SplitTree<D>) -> SplitTree<D> {
        let previous = std::mem::replace(&mut self.tree, tree);
        self.gesture.reset();
        let leaves = self.tree.leaf_count();
        tracing::debug!(
            target: "dockframe.station",
            op = "drop_tree",
            leaves,
            previous_leaves = previous.leaf_count(),
            "tree replaced"
        );
        self.emit(StationEvent::TreeReplaced { leaves });
        self.relayout();
        previous
    }

    /// Remove all content, releasing it in preorder.
    pub fn clear(&mut self) -> Vec<D> {
        let released = self.tree.clear();
        self.gesture.reset();
        tracing::debug!(
            target: "dockframe.station",
            op = "clear",
            released = released.len(),
            "station cleared"
        );
        self.emit(StationEvent::TreeReplaced { leaves: 0 });
        self.relayout();
        released
    }

    /// Speculative drop target under `point`; never mutates.
    #[must_use]
    pub fn hover(&self, point: Point) -> DropTarget {
        self.tree
            .resolve_drop(&self.placement, point, self.config.effective_edge_margin())
    }

    /// Change a split's ratio, returning the previous one.
    pub fn set_ratio(&mut self, split: NodeId, ratio: SplitRatio) -> Result<SplitRatio, StationError> {
        let previous = self.tree.set_ratio(split, ratio)?;
        tracing::debug!(
            target: "dockframe.station",
            op = "set_ratio",
            split = split.get(),
            ratio = ratio.get(),
            previous = previous.get(),
            "split ratio changed"
        );
        self.emit(StationEvent::RatioChanged { split, ratio });
        self.relayout();
        Ok(previous)
    }

    /// Abort the gesture in progress without touching the tree.
    pub fn cancel_drag(&mut self) -> Result<(), StationError> {
        if !self.gesture.is_active() {
            return Err(StationError::NoDragInProgress);
        }
        self.gesture.reset();
        Ok(())
    }

    fn emit(&mut self, event: StationEvent) {
        self.listeners.dispatch(&event);
    }

    fn relayout(&mut self) {
        let leaves = self.tree.leaf_count();
        let _span = tracing::trace_span!(
            "dockframe.layout",
            leaves,
            width = self.bounds.width,
            height = self.bounds.height,
        )
        .entered();
        self.placement = self.tree.layout(self.bounds, &self.config.layout_options());
        tracing::debug!(
            target: "dockframe.station",
            op = "layout",
            leaves,
            x = self.bounds.x,
            y = self.bounds.y,
            width = self.bounds.width,
            height = self.bounds.height,
            "placement published"
        );
        self.emit(StationEvent::LayoutChanged {
            bounds: self.bounds,
            leaves,
        });
    }
}

impl<D: PartialEq> Station<D> {
    /// Parse a grid, build its tree, and drop it in; returns the previous tree.
    pub fn drop_grid<I>(&mut self, layout: &str, mapping: I) -> Result<SplitTree<D>, StationError>
    where
        I: IntoIterator<Item = (char, Vec<D>)>,
    {
        let tree = tree_from_grid(layout, mapping)?;
        Ok(self.drop_tree(tree))
    }

    /// Drop new content at `point`.
    pub fn drop(&mut self, content: D, point: Point) -> Result<DropOutcome<D>, RejectedDrop<D>> {
        let target = self.hover(point);
        self.drop_at(content, target)
    }

    /// Drop new content on an already resolved target.
    ///
    /// Edge zones split the leaf, giving the new content `drop_ratio` of the
    /// space. The center zone replaces the leaf's content and hands the old
    /// content back in [`DropOutcome::displaced`].
    pub fn drop_at(&mut self, content: D, target: DropTarget) -> Result<DropOutcome<D>, RejectedDrop<D>> {
        let reject = |content: D, error: StationError| Err(RejectedDrop { content, error });
        let outcome = match target {
            DropTarget::NoTarget => return reject(content, StationError::NoTarget),
            DropTarget::EmptyStation => match self.tree.try_insert_root(content) {
                Ok(leaf) => DropOutcome {
                    leaf,
                    zone: None,
                    displaced: None,
                },
                Err((err, content)) => return reject(content, err.into()),
            },
            DropTarget::Leaf { leaf, zone } => match zone.side() {
                Some(side) => {
                    let share = self.config.effective_drop_ratio();
                    let ratio = if side.attaches_first() { share } else { share.complement() };
                    match self.tree.try_insert(leaf, content, side, ratio) {
                        Ok(added) => DropOutcome {
                            leaf: added,
                            zone: Some(zone),
                            displaced: None,
                        },
                        Err((err, content)) => return reject(content, err.into()),
                    }
                }
                None => match self.tree.try_replace(leaf, content) {
                    Ok(displaced) => DropOutcome {
                        leaf,
                        zone: Some(zone),
                        displaced: Some(displaced),
                    },
                    Err((err, content)) => return reject(content, err.into()),
                },
            },
        };

        tracing::debug!(
            target: "dockframe.station",
            op = "drop",
            leaf = outcome.leaf.get(),
            zone = ?outcome.zone,
            replaced = outcome.displaced.is_some(),
            leaves = self.tree.leaf_count(),
            "content dropped"
        );
        if outcome.displaced.is_some() {
            self.emit(StationEvent::ContentRemoved { leaf: outcome.leaf });
        }
        self.emit(StationEvent::ContentAdded { leaf: outcome.leaf });
        self.relayout();
        Ok(outcome)
    }

    /// Take `content` out of the station.
    ///
    /// Dragging the only content empties the station.
    pub fn drag(&mut self, content: &D) -> Result<D, StationError> {
        let leaf = self
            .tree
            .find_leaf(content)
            .ok_or(StationError::ContentNotFound)?;
        let removed = if self.tree.root() == Some(leaf) {
            self.tree.clear().pop().ok_or(StationError::ContentNotFound)?
        } else {
            self.tree.remove(leaf)?
        };
        tracing::debug!(
            target: "dockframe.station",
            op = "drag",
            leaf = leaf.get(),
            leaves = self.tree.leaf_count(),
            "content removed"
        );
        self.emit(StationEvent::ContentRemoved { leaf });
        self.relayout();
        Ok(removed)
    }

    /// Move placed `content` to the drop target under `point` in one step.
    pub fn relocate(&mut self, content: &D, point: Point) -> Result<MoveIntent, StationError> {
        let leaf = self
            .tree
            .find_leaf(content)
            .ok_or(StationError::ContentNotFound)?;
        let target = self.hover(point);
        if target == DropTarget::NoTarget {
            return Err(StationError::NoTarget);
        }
        let intent = self.tree.plan_move(leaf, target);
        self.apply_move(intent)?;
        Ok(intent)
    }

    /// Feed one pointer event to the gesture machine and apply a committed gesture.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Result<DragEffect, StationError> {
        let effect = self
            .gesture
            .apply(&self.tree, &self.placement, &self.config, event);
        if let DragEffect::Commit { grab, position } = effect {
            match grab {
                DragGrab::Content { leaf } => {
                    let target = self.hover(position);
                    if target == DropTarget::NoTarget {
                        return Err(StationError::NoTarget);
                    }
                    let intent = self.tree.plan_move(leaf, target);
                    self.apply_move(intent)?;
                }
                DragGrab::Divider { split } => {
                    let ratio = self.tree.ratio_for_pointer(
                        &self.placement,
                        split,
                        position,
                        &self.config.layout_options(),
                    );
                    if let Some(ratio) = ratio {
                        let _ = self.set_ratio(split, ratio)?;
                    }
                }
            }
        }
        Ok(effect)
    }

    fn apply_move(&mut self, intent: MoveIntent) -> Result<(), StationError> {
        let leaf = match intent {
            MoveIntent::Noop => return Ok(()),
            MoveIntent::Split {
                source,
                target,
                side,
            } => {
                let share = self.config.effective_drop_ratio();
                let ratio = if side.attaches_first() { share } else { share.complement() };
                self.tree.move_leaf_with_ratio(source, target, side, ratio)?;
                source
            }
            MoveIntent::Swap { source, target } => {
                self.tree.swap(source, target)?;
                source
            }
        };
        tracing::debug!(
            target: "dockframe.station",
            op = "move",
            leaf = leaf.get(),
            intent = ?intent,
            "content moved"
        );
        self.emit(StationEvent::ContentMoved { leaf, intent });
        self.relayout();
        Ok(())
    }
}

impl<D> Default for Station<D> {
    fn default() -> Self {
        Self::new(StationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Side, SplitAxis};
    use std::cell::RefCell;
    use std::rc::Rc;

    const DEMO: &str = "aaabbcccc\naaabbcccc\nddeeeeeff";

    fn demo_station() -> Station<&'static str> {
        let mut station = Station::default().with_bounds(Rect::from_size(900, 600));
        let _ = station
            .drop_grid(
                DEMO,
                [
                    ('a', vec!["White"]),
                    ('b', vec!["Green"]),
                    ('c', vec!["Red"]),
                    ('d', vec!["Black"]),
                    ('e', vec!["Blue"]),
                    ('f', vec!["Yellow"]),
                ],
            )
            .expect("demo grid");
        station
    }

    fn rect_of(station: &Station<&'static str>, name: &'static str) -> Rect {
        let leaf = station.tree().find_leaf(&name).expect("leaf");
        station.placement().rect(leaf).expect("placed")
    }

    #[test]
    fn drop_into_empty_station_becomes_root() {
        let mut station = Station::default().with_bounds(Rect::from_size(100, 100));
        let outcome = station.drop("first", Point::new(50, 50)).expect("drop");
        assert_eq!(station.tree().root(), Some(outcome.leaf));
        assert_eq!(outcome.zone, None);
        assert_eq!(station.placement().rect(outcome.leaf), Some(Rect::from_size(100, 100)));
    }

    #[test]
    fn edge_drop_splits_with_configured_share() {
        let mut station = Station::new(StationConfig {
            drop_ratio: 0.25,
            ..StationConfig::default()
        })
        .with_bounds(Rect::from_size(200, 100));
        let _ = station.drop("host", Point::new(10, 10)).expect("root");
        let outcome = station.drop("guest", Point::new(195, 50)).expect("edge drop");
        assert_eq!(outcome.zone, Some(DockZone::Right));
        let guest = station.placement().rect(outcome.leaf).expect("placed");
        assert_eq!(guest, Rect::new(150, 0, 50, 100));
    }

    #[test]
    fn center_drop_returns_displaced_content() {
        let mut station = demo_station();
        let center = rect_of(&station, "Red").center();
        let outcome = station.drop("Purple", center).expect("center drop");
        assert_eq!(outcome.zone, Some(DockZone::Center));
        assert_eq!(outcome.displaced, Some("Red"));
        assert_eq!(station.tree().content(outcome.leaf), Some(&"Purple"));
        assert_eq!(station.tree().leaf_count(), 6);
    }

    #[test]
    fn rejected_drop_returns_content() {
        let mut station = demo_station();
        let rejected = station.drop("Orange", Point::new(2000, 10)).unwrap_err();
        assert_eq!(rejected.content, "Orange");
        assert_eq!(rejected.error, StationError::NoTarget);

        let white = station.tree().find_leaf(&"White").expect("white");
        let rejected = station.drop("White", Point::new(890, 590)).unwrap_err();
        assert_eq!(rejected.content, "White");
        assert_eq!(
            rejected.error,
            StationError::Tree(TreeError::DuplicateContent { existing: white })
        );
        assert_eq!(station.tree().leaf_count(), 6);
    }

    #[test]
    fn yellow_right_edge_drop_puts_yellow_first() {
        let mut station = demo_station();
        let yellow = station.tree().find_leaf(&"Yellow").expect("yellow");
        let outcome = station.drop("Cyan", Point::new(895, 500)).expect("drop");
        let parent = station.tree().parent(outcome.leaf).expect("parent");
        let split = station.tree().split(parent).expect("split");
        assert_eq!(split.axis, SplitAxis::Horizontal);
        assert_eq!((split.first, split.second), (yellow, outcome.leaf));
    }

    #[test]
    fn dragging_last_content_empties_station() {
        let mut station = Station::default().with_bounds(Rect::from_size(10, 10));
        let _ = station.drop(7_u32, Point::new(1, 1)).expect("drop");
        assert_eq!(station.drag(&7), Ok(7));
        assert!(station.tree().is_empty());
        assert!(station.placement().is_empty());
        assert_eq!(station.drag(&7), Err(StationError::ContentNotFound));
    }

    #[test]
    fn drag_collapses_parent() {
        let mut station = demo_station();
        assert_eq!(station.drag(&"White"), Ok("White"));
        station.tree().validate().expect("valid");
        assert_eq!(station.tree().leaf_count(), 5);
        assert_eq!(rect_of(&station, "Green"), Rect::new(0, 0, 500, 400));
    }

    #[test]
    fn relocate_moves_and_swaps() {
        let mut station = demo_station();
        let black = station.tree().find_leaf(&"Black").expect("black");
        let red_center = rect_of(&station, "Red").center();
        let intent = station.relocate(&"Black", red_center).expect("swap");
        assert!(matches!(intent, MoveIntent::Swap { .. }));
        assert_eq!(station.tree().content(black), Some(&"Red"));

        let white_top = Point::new(150, 5);
        let intent = station.relocate(&"Yellow", white_top).expect("split");
        assert!(matches!(intent, MoveIntent::Split { side: Side::Top, .. }));
        station.tree().validate().expect("valid");
        assert_eq!(rect_of(&station, "Yellow"), Rect::new(0, 0, 300, 200));
    }

    #[test]
    fn listeners_fire_in_subscription_order() {
        let mut station = Station::default().with_bounds(Rect::from_size(100, 100));
        let log = Rc::new(RefCell::new(Vec::new()));
        let first = {
            let log = Rc::clone(&log);
            station.subscribe(StationEventKind::ContentAdded, move |event| {
                log.borrow_mut().push(format!("first {:?}", event.kind()));
            })
        };
        {
            let log = Rc::clone(&log);
            let _ = station.subscribe(StationEventKind::ContentAdded, move |event| {
                log.borrow_mut().push(format!("second {:?}", event.kind()));
            });
        }
        {
            let log = Rc::clone(&log);
            let _ = station.subscribe(StationEventKind::LayoutChanged, move |_| {
                log.borrow_mut().push("layout".to_string());
            });
        }

        let _ = station.drop("a", Point::new(5, 5)).expect("drop");
        assert_eq!(
            *log.borrow(),
            vec!["first ContentAdded", "second ContentAdded", "layout"]
        );

        assert!(station.unsubscribe(first));
        assert!(!station.unsubscribe(first));
        log.borrow_mut().clear();
        let _ = station.drop("b", Point::new(99, 50)).expect("drop");
        assert_eq!(*log.borrow(), vec!["second ContentAdded", "layout"]);
    }

    #[test]
    fn pointer_drag_commits_move() {
        let mut station = demo_station();
        let white = station.tree().find_leaf(&"White").expect("white");
        let effect = station
            .handle_pointer(PointerEvent::Press(Point::new(100, 100)))
            .expect("press");
        assert_eq!(effect, DragEffect::Armed(DragGrab::Content { leaf: white }));
        let effect = station
            .handle_pointer(PointerEvent::Move(Point::new(895, 500)))
            .expect("move");
        assert!(matches!(effect, DragEffect::Hover { .. }));
        assert_eq!(rect_of(&station, "White"), Rect::new(0, 0, 300, 400));

        let _ = station
            .handle_pointer(PointerEvent::Release(Point::new(895, 500)))
            .expect("release");
        let yellow = station.tree().find_leaf(&"Yellow").expect("yellow");
        let parent = station.tree().parent(white).expect("parent");
        let split = station.tree().split(parent).expect("split");
        assert_eq!((split.first, split.second), (yellow, white));
        station.tree().validate().expect("valid");
    }

    #[test]
    fn pointer_divider_drag_sets_ratio() {
        let mut station = Station::default().with_bounds(Rect::from_size(200, 100));
        let _ = station.drop("l", Point::new(10, 10)).expect("root");
        let _ = station.drop("r", Point::new(195, 50)).expect("edge");
        let root = station.tree().root().expect("root");
        let _ = station
            .handle_pointer(PointerEvent::Press(Point::new(100, 50)))
            .expect("press");
        let _ = station
            .handle_pointer(PointerEvent::Move(Point::new(60, 50)))
            .expect("move");
        assert_eq!(
            station.tree().split(root).map(|s| s.ratio),
            Some(SplitRatio::HALF)
        );
        let _ = station
            .handle_pointer(PointerEvent::Release(Point::new(60, 50)))
            .expect("release");
        assert_eq!(station.tree().split(root).map(|s| s.ratio.get()), Some(0.3));
    }

    #[test]
    fn cancel_requires_active_gesture() {
        let mut station = demo_station();
        assert_eq!(station.cancel_drag(), Err(StationError::NoDragInProgress));
        let _ = station
            .handle_pointer(PointerEvent::Press(Point::new(100, 100)))
            .expect("press");
        assert_eq!(station.cancel_drag(), Ok(()));
        assert_eq!(station.gesture_phase(), DragPhase::Idle);
    }

    #[test]
    fn registry_profile_configures_station() {
        let mut registry = ConfigRegistry::default();
        let _ = registry.insert(
            "gapped",
            StationConfig {
                divider_size: 10,
                ..StationConfig::default()
            },
        );
        let station: Station<u8> = Station::from_registry(&registry, "gapped");
        assert_eq!(station.config().divider_size, 10);
        let station: Station<u8> = Station::from_registry(&registry, "nope");
        assert_eq!(station.config().divider_size, 0);
    }

    #[test]
    fn set_config_resets_gesture_and_relayouts() {
        let mut station = Station::default().with_bounds(Rect::from_size(200, 100));
        let _ = station.drop("l", Point::new(10, 10)).expect("root");
        let _ = station.drop("r", Point::new(195, 50)).expect("edge");
        let layouts = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&layouts);
        let _ = station.subscribe(StationEventKind::LayoutChanged, move |event| {
            sink.borrow_mut().push(event.clone());
        });
        let _ = station
            .handle_pointer(PointerEvent::Press(Point::new(20, 50)))
            .expect("press");
        assert_ne!(station.gesture_phase(), DragPhase::Idle);

        station.set_config(StationConfig {
            divider_size: 10,
            ..StationConfig::default()
        });
        assert_eq!(station.gesture_phase(), DragPhase::Idle);
        assert_eq!(station.config().divider_size, 10);
        assert_eq!(rect_of(&station, "l"), Rect::new(0, 0, 95, 100));
        assert_eq!(rect_of(&station, "r"), Rect::new(105, 0, 95, 100));
        assert_eq!(
            *layouts.borrow(),
            [StationEvent::LayoutChanged {
                bounds: Rect::from_size(200, 100),
                leaves: 2
            }]
        );
    }

    #[test]
    fn huge_divider_grab_is_accepted_without_overflow() {
        let config = StationConfig {
            divider_grab: i32::MAX,
            ..StationConfig::default()
        };
        assert!(config.validate().is_empty());
        let mut station = Station::new(config).with_bounds(Rect::from_size(200, 100));
        let _ = station.drop("l", Point::new(10, 10)).expect("root");
        let _ = station.drop("r", Point::new(195, 50)).expect("edge");
        let root = station.tree().root().expect("root");
        assert_eq!(
            station.handle_pointer(PointerEvent::Press(Point::new(20, 50))),
            Ok(DragEffect::Armed(DragGrab::Divider { split: root }))
        );
    }

    #[test]
    fn into_tree_hands_content_back() {
        let mut station = Station::default().with_bounds(Rect::from_size(200, 100));
        let _ = station.drop("l", Point::new(10, 10)).expect("root");
        let _ = station.drop("r", Point::new(195, 50)).expect("edge");
        let tree = station.into_tree();
        assert_eq!(tree.leaf_count(), 2);
        assert_eq!(tree.into_contents(), vec!["l", "r"]);
    }

    #[test]
    fn malformed_grid_leaves_station_untouched() {
        let mut station = demo_station();
        let before = station.tree().clone();
        let err = station.drop_grid("ab\na", [('a', vec!["x"]), ('b', vec!["y"])]);
        assert!(matches!(err, Err(StationError::Grid(GridError::Malformed(_)))));
        assert_eq!(*station.tree(), before);
    }
}
