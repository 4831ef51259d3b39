//! Split tree model for one docking station.
//!
//! The tree is stored as an arena of node records keyed by [`NodeId`] with
//! explicit parent links, so leaf handles stay stable across mutations and
//! insert/remove only touch the path between a node and its parent.
//!
//! Invariants held after every public operation:
//!
//! - Every split has exactly two children and a ratio strictly inside `(0, 1)`.
//! - A single root; every other node has exactly one parent.
//! - No content value appears in two leaves.
//!
//! Mutations validate their preconditions before touching the arena, so a
//! failed call leaves the tree exactly as it was.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier for nodes within one [`SplitTree`].
///
/// IDs start at 1 and are never reused by the tree that allocated them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// Lowest ID a tree hands out.
    pub const MIN: Self = Self(1);

    /// Get the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    fn checked_next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Orientation of a split node.
///
/// `Horizontal` lays children side by side (first child on the left);
/// `Vertical` stacks them (first child on top).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitAxis {
    Horizontal,
    Vertical,
}

/// Side of an existing leaf where new content is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    /// Split orientation produced by attaching on this side.
    #[must_use]
    pub const fn axis(self) -> SplitAxis {
        match self {
            Self::Left | Self::Right => SplitAxis::Horizontal,
            Self::Top | Self::Bottom => SplitAxis::Vertical,
        }
    }

    /// Whether the attached content becomes the first (left/top) child.
    #[must_use]
    pub const fn attaches_first(self) -> bool {
        matches!(self, Self::Left | Self::Top)
    }
}

/// Share of a split's axis given to its first child.
///
/// Always finite and strictly between 0 and 1.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SplitRatio(f64);

impl SplitRatio {
    /// Even split.
    pub const HALF: Self = Self(0.5);

    /// Smallest ratio produced by [`SplitRatio::clamped`].
    pub const MIN_CLAMPED: f64 = 0.001;

    /// Create a ratio, rejecting values outside `(0, 1)`.
    pub fn new(value: f64) -> Result<Self, TreeError> {
        if value.is_finite() && value > 0.0 && value < 1.0 {
            Ok(Self(value))
        } else {
            Err(TreeError::InvalidRatio { value })
        }
    }

    /// Ratio `first / total` from integer extents.
    pub fn from_parts(first: u64, total: u64) -> Result<Self, TreeError> {
        if first == 0 || first >= total {
            return Err(TreeError::InvalidRatio {
                value: if total == 0 {
                    f64::NAN
                } else {
                    first as f64 / total as f64
                },
            });
        }
        Self::new(first as f64 / total as f64)
    }

    /// Clamp an arbitrary value into the valid range. NaN maps to one half.
    #[must_use]
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            return Self::HALF;
        }
        Self(value.clamp(Self::MIN_CLAMPED, 1.0 - Self::MIN_CLAMPED))
    }

    /// Raw value.
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }

    /// Share left for the second child.
    #[must_use]
    pub fn complement(self) -> Self {
        Self(1.0 - self.0)
    }
}

impl Default for SplitRatio {
    fn default() -> Self {
        Self::HALF
    }
}

impl TryFrom<f64> for SplitRatio {
    type Error = TreeError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SplitRatio> for f64 {
    fn from(ratio: SplitRatio) -> Self {
        ratio.0
    }
}

/// Split payload with child references.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitNode {
    pub axis: SplitAxis,
    pub ratio: SplitRatio,
    pub first: NodeId,
    pub second: NodeId,
}

impl SplitNode {
    /// The child that is not `child`, if `child` belongs to this split.
    #[must_use]
    pub fn sibling_of(&self, child: NodeId) -> Option<NodeId> {
        if self.first == child {
            Some(self.second)
        } else if self.second == child {
            Some(self.first)
        } else {
            None
        }
    }
}

/// Node payload variant.
#[derive(Debug, Clone, PartialEq)]
pub enum DockNodeKind<D> {
    /// Externally owned content placed in this leaf.
    Leaf(D),
    Split(SplitNode),
}

/// One node record in the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct DockNode<D> {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub kind: DockNodeKind<D>,
}

impl<D> DockNode<D> {
    /// Content if this node is a leaf.
    #[must_use]
    pub fn content(&self) -> Option<&D> {
        match &self.kind {
            DockNodeKind::Leaf(content) => Some(content),
            DockNodeKind::Split(_) => None,
        }
    }

    /// Split payload if this node is a split.
    #[must_use]
    pub fn split(&self) -> Option<&SplitNode> {
        match &self.kind {
            DockNodeKind::Split(split) => Some(split),
            DockNodeKind::Leaf(_) => None,
        }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, DockNodeKind::Leaf(_))
    }
}

/// Binary space-partition tree owning the layout of one station.
///
/// Content of type `D` is an opaque handle owned by the host; the tree only
/// stores it and hands it back on removal.
#[derive(Debug, Clone)]
pub struct SplitTree<D> {
    root: Option<NodeId>,
    next_id: NodeId,
    nodes: BTreeMap<NodeId, DockNode<D>>,
}

impl<D> Default for SplitTree<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> SplitTree<D> {
    /// Empty tree with no content.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: None,
            next_id: NodeId::MIN,
            nodes: BTreeMap::new(),
        }
    }

    /// Tree with one root leaf.
    #[must_use]
    pub fn singleton(content: D) -> Self {
        let root = NodeId::MIN;
        let mut nodes = BTreeMap::new();
        let _ = nodes.insert(
            root,
            DockNode {
                id: root,
                parent: None,
                kind: DockNodeKind::Leaf(content),
            },
        );
        Self {
            root: Some(root),
            next_id: NodeId(2),
            nodes,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Root node ID, `None` for an empty tree.
    #[must_use]
    pub const fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Lookup a node by ID.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&DockNode<D>> {
        self.nodes.get(&id)
    }

    /// Iterate nodes in ID order.
    pub fn nodes(&self) -> impl Iterator<Item = &DockNode<D>> {
        self.nodes.values()
    }

    /// Parent of a node; `None` for the root or unknown IDs.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    /// Content held by a leaf.
    #[must_use]
    pub fn content(&self, id: NodeId) -> Option<&D> {
        self.nodes.get(&id).and_then(DockNode::content)
    }

    /// Split payload of a split node.
    #[must_use]
    pub fn split(&self, id: NodeId) -> Option<&SplitNode> {
        self.nodes.get(&id).and_then(DockNode::split)
    }

    /// Number of leaves (content items).
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.nodes.values().filter(|node| node.is_leaf()).count()
    }

    /// Number of split nodes.
    #[must_use]
    pub fn split_count(&self) -> usize {
        self.nodes.len() - self.leaf_count()
    }

    /// Node IDs in preorder (split, first subtree, second subtree).
    #[must_use]
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(split) = self.split(id) {
                stack.push(split.second);
                stack.push(split.first);
            }
        }
        out
    }

    /// Leaves with their content in preorder (left-to-right, top-to-bottom).
    pub fn leaves(&self) -> impl Iterator<Item = (NodeId, &D)> + '_ {
        self.preorder()
            .into_iter()
            .filter_map(|id| self.content(id).map(|content| (id, content)))
    }

    /// Length of the longest root-to-leaf path in nodes; 0 when empty.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|root| (root, 1)).into_iter().collect();
        while let Some((id, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let Some(split) = self.split(id) {
                stack.push((split.first, depth + 1));
                stack.push((split.second, depth + 1));
            }
        }
        deepest
    }

    /// Change the ratio of a split, returning the previous ratio.
    pub fn set_ratio(&mut self, split_id: NodeId, ratio: SplitRatio) -> Result<SplitRatio, TreeError> {
        let node = self
            .nodes
            .get_mut(&split_id)
            .ok_or(TreeError::NodeNotFound { node: split_id })?;
        let DockNodeKind::Split(split) = &mut node.kind else {
            return Err(TreeError::NotASplit { node: split_id });
        };
        Ok(std::mem::replace(&mut split.ratio, ratio))
    }

    /// Exchange the content of two leaves. Swapping a leaf with itself is a no-op.
    pub fn swap(&mut self, first: NodeId, second: NodeId) -> Result<(), TreeError> {
        self.require_leaf(first)?;
        self.require_leaf(second)?;
        if first == second {
            return Ok(());
        }
        let Some(mut first_node) = self.nodes.remove(&first) else {
            return Err(TreeError::NodeNotFound { node: first });
        };
        if let Some(second_node) = self.nodes.get_mut(&second) {
            std::mem::swap(&mut first_node.kind, &mut second_node.kind);
        }
        let _ = self.nodes.insert(first, first_node);
        Ok(())
    }

    /// Delete a leaf and promote its sibling into the parent's position.
    ///
    /// Returns the released content. The sole root leaf cannot be removed;
    /// use [`SplitTree::clear`] to empty the tree.
    pub fn remove(&mut self, target: NodeId) -> Result<D, TreeError> {
        let parent_id = self.require_leaf(target)?;
        let Some(parent_id) = parent_id else {
            return Err(TreeError::RootRemoval { node: target });
        };
        self.promote_sibling(target, parent_id);
        match self.nodes.remove(&target) {
            Some(DockNode {
                kind: DockNodeKind::Leaf(content),
                ..
            }) => Ok(content),
            _ => Err(TreeError::NodeNotFound { node: target }),
        }
    }

    /// Remove everything, releasing content in preorder.
    pub fn clear(&mut self) -> Vec<D> {
        let order = self.preorder();
        let mut nodes = std::mem::take(&mut self.nodes);
        self.root = None;
        order
            .into_iter()
            .filter_map(|id| match nodes.remove(&id) {
                Some(DockNode {
                    kind: DockNodeKind::Leaf(content),
                    ..
                }) => Some(content),
                _ => None,
            })
            .collect()
    }

    /// Consume the tree, releasing content in preorder.
    #[must_use]
    pub fn into_contents(mut self) -> Vec<D> {
        self.clear()
    }

    /// Returns the leaf's parent (if any), or an error when `id` is missing or a split.
    fn require_leaf(&self, id: NodeId) -> Result<Option<NodeId>, TreeError> {
        match self.nodes.get(&id) {
            Some(DockNode {
                parent,
                kind: DockNodeKind::Leaf(_),
                ..
            }) => Ok(*parent),
            Some(_) => Err(TreeError::NotALeaf { node: id }),
            None => Err(TreeError::NodeNotFound { node: id }),
        }
    }

    fn allocate_id(&mut self) -> Result<NodeId, TreeError> {
        let current = self.next_id;
        self.next_id = current
            .checked_next()
            .ok_or(TreeError::IdOverflow { current })?;
        Ok(current)
    }

    /// Detach `child` from `parent_id`, drop the parent split and move the
    /// sibling into its place. `child` stays in the arena with no parent.
    fn promote_sibling(&mut self, child: NodeId, parent_id: NodeId) {
        let Some(parent) = self.nodes.remove(&parent_id) else {
            return;
        };
        let DockNodeKind::Split(split) = parent.kind else {
            debug_assert!(false, "parent {parent_id} of {child} is not a split");
            return;
        };
        let Some(sibling) = split.sibling_of(child) else {
            debug_assert!(false, "split {parent_id} does not own {child}");
            return;
        };
        if let Some(sibling_node) = self.nodes.get_mut(&sibling) {
            sibling_node.parent = parent.parent;
        }
        if let Some(child_node) = self.nodes.get_mut(&child) {
            child_node.parent = None;
        }
        match parent.parent {
            Some(grandparent) => self.replace_child(grandparent, parent_id, sibling),
            None => self.root = Some(sibling),
        }
    }

    fn replace_child(&mut self, parent_id: NodeId, old_child: NodeId, new_child: NodeId) {
        let Some(DockNode {
            kind: DockNodeKind::Split(split),
            ..
        }) = self.nodes.get_mut(&parent_id)
        else {
            debug_assert!(false, "replace_child on non-split {parent_id}");
            return;
        };
        if split.first == old_child {
            split.first = new_child;
        } else if split.second == old_child {
            split.second = new_child;
        } else {
            debug_assert!(false, "split {parent_id} does not own {old_child}");
        }
    }

    /// Wrap leaf `target` in a new split whose other child is `incoming`.
    ///
    /// `incoming` must already be in the arena without a parent.
    fn wrap_with_split(
        &mut self,
        split_id: NodeId,
        target: NodeId,
        incoming: NodeId,
        side: Side,
        ratio: SplitRatio,
    ) {
        let target_parent = self.parent(target);
        let (first, second) = if side.attaches_first() {
            (incoming, target)
        } else {
            (target, incoming)
        };
        for child in [target, incoming] {
            if let Some(node) = self.nodes.get_mut(&child) {
                node.parent = Some(split_id);
            }
        }
        let _ = self.nodes.insert(
            split_id,
            DockNode {
                id: split_id,
                parent: target_parent,
                kind: DockNodeKind::Split(SplitNode {
                    axis: side.axis(),
                    ratio,
                    first,
                    second,
                }),
            },
        );
        match target_parent {
            Some(parent_id) => self.replace_child(parent_id, target, split_id),
            None => self.root = Some(split_id),
        }
    }

    /// Append a parentless leaf; used while assembling trees bottom-up.
    pub(crate) fn push_leaf(&mut self, content: D) -> Result<NodeId, TreeError> {
        let id = self.allocate_id()?;
        let _ = self.nodes.insert(
            id,
            DockNode {
                id,
                parent: None,
                kind: DockNodeKind::Leaf(content),
            },
        );
        Ok(id)
    }

    /// Append a split over two parentless subtrees.
    pub(crate) fn push_split(
        &mut self,
        axis: SplitAxis,
        ratio: SplitRatio,
        first: NodeId,
        second: NodeId,
    ) -> Result<NodeId, TreeError> {
        let id = self.allocate_id()?;
        for child in [first, second] {
            if let Some(node) = self.nodes.get_mut(&child) {
                node.parent = Some(id);
            }
        }
        let _ = self.nodes.insert(
            id,
            DockNode {
                id,
                parent: None,
                kind: DockNodeKind::Split(SplitNode {
                    axis,
                    ratio,
                    first,
                    second,
                }),
            },
        );
        Ok(id)
    }

    pub(crate) fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }
}

impl<D: PartialEq> SplitTree<D> {
    /// Leaf holding `content`, if any.
    #[must_use]
    pub fn find_leaf(&self, content: &D) -> Option<NodeId> {
        self.nodes
            .values()
            .find(|node| node.content() == Some(content))
            .map(|node| node.id)
    }

    /// Whether some leaf holds `content`.
    #[must_use]
    pub fn contains(&self, content: &D) -> bool {
        self.find_leaf(content).is_some()
    }

    /// Place the first content into an empty tree.
    pub fn insert_root(&mut self, content: D) -> Result<NodeId, TreeError> {
        self.try_insert_root(content).map_err(|(err, _)| err)
    }

    /// [`SplitTree::insert_root`], handing the content back on failure.
    pub fn try_insert_root(&mut self, content: D) -> Result<NodeId, (TreeError, D)> {
        if let Some(root) = self.root {
            return Err((TreeError::NotEmpty { root }, content));
        }
        let id = match self.allocate_id() {
            Ok(id) => id,
            Err(err) => return Err((err, content)),
        };
        let _ = self.nodes.insert(
            id,
            DockNode {
                id,
                parent: None,
                kind: DockNodeKind::Leaf(content),
            },
        );
        self.root = Some(id);
        Ok(id)
    }

    /// Replace leaf `target` with a split holding `target` and a new leaf
    /// for `content` on `side`. `ratio` is the first child's share.
    ///
    /// Returns the ID of the new leaf. `target` keeps its ID.
    ///
    /// Content only needs `PartialEq`, so the duplicate check scans every
    /// leaf: O(n) rather than O(depth). Station-sized trees hold a handful of
    /// leaves.
    pub fn insert(
        &mut self,
        target: NodeId,
        content: D,
        side: Side,
        ratio: SplitRatio,
    ) -> Result<NodeId, TreeError> {
        self.try_insert(target, content, side, ratio)
            .map_err(|(err, _)| err)
    }

    /// [`SplitTree::insert`], handing the content back on failure.
    pub fn try_insert(
        &mut self,
        target: NodeId,
        content: D,
        side: Side,
        ratio: SplitRatio,
    ) -> Result<NodeId, (TreeError, D)> {
        if let Err(err) = self.require_leaf(target) {
            return Err((err, content));
        }
        if let Some(existing) = self.find_leaf(&content) {
            return Err((TreeError::DuplicateContent { existing }, content));
        }
        let split_id = self.next_id;
        let (Some(leaf_id), Some(next)) = (
            split_id.checked_next(),
            split_id.checked_next().and_then(NodeId::checked_next),
        ) else {
            return Err((TreeError::IdOverflow { current: split_id }, content));
        };
        self.next_id = next;
        let _ = self.nodes.insert(
            leaf_id,
            DockNode {
                id: leaf_id,
                parent: None,
                kind: DockNodeKind::Leaf(content),
            },
        );
        self.wrap_with_split(split_id, target, leaf_id, side, ratio);
        Ok(leaf_id)
    }

    /// Move leaf `source` next to leaf `target` with an even split.
    ///
    /// Equivalent to `remove(source)` followed by
    /// `insert(target, content, side, 0.5)`, applied atomically. `source`
    /// keeps its ID.
    pub fn move_leaf(&mut self, source: NodeId, target: NodeId, side: Side) -> Result<(), TreeError> {
        self.move_leaf_with_ratio(source, target, side, SplitRatio::HALF)
    }

    /// [`SplitTree::move_leaf`] with an explicit first-child ratio.
    pub fn move_leaf_with_ratio(
        &mut self,
        source: NodeId,
        target: NodeId,
        side: Side,
        ratio: SplitRatio,
    ) -> Result<(), TreeError> {
        let source_parent = self.require_leaf(source)?;
        let _ = self.require_leaf(target)?;
        if source == target {
            return Err(TreeError::SameNode { node: source });
        }
        // Two distinct leaves means the source cannot be the root.
        let Some(source_parent) = source_parent else {
            return Err(TreeError::RootRemoval { node: source });
        };
        let split_id = self.allocate_id()?;
        self.promote_sibling(source, source_parent);
        self.wrap_with_split(split_id, target, source, side, ratio);
        Ok(())
    }

    /// Put `content` into leaf `target`, returning the displaced content.
    pub fn replace(&mut self, target: NodeId, content: D) -> Result<D, TreeError> {
        self.try_replace(target, content).map_err(|(err, _)| err)
    }

    /// [`SplitTree::replace`], handing the content back on failure.
    pub fn try_replace(&mut self, target: NodeId, content: D) -> Result<D, (TreeError, D)> {
        if let Err(err) = self.require_leaf(target) {
            return Err((err, content));
        }
        if let Some(existing) = self.find_leaf(&content)
            && existing != target
        {
            return Err((TreeError::DuplicateContent { existing }, content));
        }
        match self.nodes.get_mut(&target) {
            Some(DockNode {
                kind: DockNodeKind::Leaf(slot),
                ..
            }) => Ok(std::mem::replace(slot, content)),
            _ => Err((TreeError::NodeNotFound { node: target }, content)),
        }
    }

    /// Check every structural invariant.
    pub fn validate(&self) -> Result<(), TreeError> {
        let Some(root) = self.root else {
            if let Some(node) = self.nodes.keys().next() {
                return Err(TreeError::Corrupt {
                    node: *node,
                    reason: CorruptionKind::Unreachable,
                });
            }
            return Ok(());
        };
        if let Some(parent) = self.parent(root) {
            return Err(TreeError::Corrupt {
                node: root,
                reason: CorruptionKind::RootHasParent { parent },
            });
        }

        let mut visited = BTreeSet::new();
        let mut stack = vec![(root, None)];
        let mut contents: Vec<(NodeId, &D)> = Vec::new();
        while let Some((id, expected_parent)) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                return Err(TreeError::Corrupt {
                    node: expected_parent.unwrap_or(id),
                    reason: CorruptionKind::MissingChild { child: id },
                });
            };
            if !visited.insert(id) {
                return Err(TreeError::Corrupt {
                    node: id,
                    reason: CorruptionKind::Cycle,
                });
            }
            if node.parent != expected_parent {
                return Err(TreeError::Corrupt {
                    node: id,
                    reason: CorruptionKind::ParentMismatch {
                        expected: expected_parent,
                        actual: node.parent,
                    },
                });
            }
            match &node.kind {
                DockNodeKind::Leaf(content) => {
                    if let Some((existing, _)) = contents.iter().find(|(_, seen)| *seen == content) {
                        return Err(TreeError::Corrupt {
                            node: id,
                            reason: CorruptionKind::DuplicateContent {
                                existing: *existing,
                            },
                        });
                    }
                    contents.push((id, content));
                }
                DockNodeKind::Split(split) => {
                    if split.first == split.second {
                        return Err(TreeError::Corrupt {
                            node: id,
                            reason: CorruptionKind::SingleChildSplit,
                        });
                    }
                    if SplitRatio::new(split.ratio.get()).is_err() {
                        return Err(TreeError::Corrupt {
                            node: id,
                            reason: CorruptionKind::InvalidRatio,
                        });
                    }
                    stack.push((split.second, Some(id)));
                    stack.push((split.first, Some(id)));
                }
            }
        }
        if let Some(orphan) = self.nodes.keys().find(|id| !visited.contains(id)) {
            return Err(TreeError::Corrupt {
                node: *orphan,
                reason: CorruptionKind::Unreachable,
            });
        }
        if let Some(max) = self.nodes.keys().next_back()
            && *max >= self.next_id
        {
            return Err(TreeError::Corrupt {
                node: *max,
                reason: CorruptionKind::StaleIdCounter,
            });
        }
        Ok(())
    }

    fn subtree_eq(&self, id: NodeId, other: &Self, other_id: NodeId) -> bool {
        let mut stack = vec![(id, other_id)];
        while let Some((left, right)) = stack.pop() {
            let (Some(left), Some(right)) = (self.nodes.get(&left), other.nodes.get(&right)) else {
                return false;
            };
            match (&left.kind, &right.kind) {
                (DockNodeKind::Leaf(a), DockNodeKind::Leaf(b)) => {
                    if a != b {
                        return false;
                    }
                }
                (DockNodeKind::Split(a), DockNodeKind::Split(b)) => {
                    if a.axis != b.axis || a.ratio != b.ratio {
                        return false;
                    }
                    stack.push((a.first, b.first));
                    stack.push((a.second, b.second));
                }
                _ => return false,
            }
        }
        true
    }
}

/// Structural equality: shape, axes, ratios, and leaf content must match.
/// Node IDs are handles, not structure, and are ignored.
impl<D: PartialEq> PartialEq for SplitTree<D> {
    fn eq(&self, other: &Self) -> bool {
        match (self.root, other.root) {
            (None, None) => true,
            (Some(left), Some(right)) => self.subtree_eq(left, other, right),
            _ => false,
        }
    }
}

/// Which invariant a corrupt tree violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorruptionKind {
    RootHasParent {
        parent: NodeId,
    },
    MissingChild {
        child: NodeId,
    },
    ParentMismatch {
        expected: Option<NodeId>,
        actual: Option<NodeId>,
    },
    Cycle,
    SingleChildSplit,
    InvalidRatio,
    Unreachable,
    DuplicateContent {
        existing: NodeId,
    },
    StaleIdCounter,
}

impl fmt::Display for CorruptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootHasParent { parent } => write!(f, "root has parent {parent}"),
            Self::MissingChild { child } => write!(f, "references missing child {child}"),
            Self::ParentMismatch { expected, actual } => write!(
                f,
                "parent mismatch: expected {:?}, got {:?}",
                expected.map(NodeId::get),
                actual.map(NodeId::get)
            ),
            Self::Cycle => write!(f, "is reachable twice"),
            Self::SingleChildSplit => write!(f, "split does not have two distinct children"),
            Self::InvalidRatio => write!(f, "split ratio outside (0, 1)"),
            Self::Unreachable => write!(f, "is unreachable from the root"),
            Self::DuplicateContent { existing } => {
                write!(f, "holds content already placed in {existing}")
            }
            Self::StaleIdCounter => write!(f, "id is not below the allocation counter"),
        }
    }
}

/// Errors from split tree operations.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeError {
    /// The referenced node does not exist in this tree.
    NodeNotFound { node: NodeId },
    /// The sole root leaf cannot be removed; destroy or clear the station.
    RootRemoval { node: NodeId },
    NotALeaf { node: NodeId },
    NotASplit { node: NodeId },
    /// Operation needs two distinct nodes.
    SameNode { node: NodeId },
    /// Content is already placed in another leaf.
    DuplicateContent { existing: NodeId },
    /// The tree already has a root.
    NotEmpty { root: NodeId },
    InvalidRatio { value: f64 },
    /// A serialized leaf referenced content the resolver did not know.
    UnknownContentKey { key: String },
    IdOverflow { current: NodeId },
    Corrupt { node: NodeId, reason: CorruptionKind },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeNotFound { node } => write!(f, "node {node} not found"),
            Self::RootRemoval { node } => {
                write!(f, "cannot remove root leaf {node}; the station must be cleared instead")
            }
            Self::NotALeaf { node } => write!(f, "node {node} is not a leaf"),
            Self::NotASplit { node } => write!(f, "node {node} is not a split"),
            Self::SameNode { node } => {
                write!(f, "operation requires distinct nodes, got {node} twice")
            }
            Self::DuplicateContent { existing } => {
                write!(f, "content is already placed in leaf {existing}")
            }
            Self::NotEmpty { root } => write!(f, "tree already has root {root}"),
            Self::InvalidRatio { value } => {
                write!(f, "invalid split ratio {value}: must be finite and inside (0, 1)")
            }
            Self::UnknownContentKey { key } => write!(f, "unknown content key {key}"),
            Self::IdOverflow { current } => write!(f, "node id overflow after {current}"),
            Self::Corrupt { node, reason } => write!(f, "corrupt tree: node {node} {reason}"),
        }
    }
}

impl std::error::Error for TreeError {}
