//! Recursive layout encoding for split trees.
//!
//! [`DockLayout`] mirrors the tree shape without node IDs. Leaves carry a
//! content reference of the caller's choosing (an index, a stable key, or the
//! content itself), so the same shape can be persisted and restored against
//! freshly created content.
//!
//! JSON is produced with `serde_json`'s `float_roundtrip` parsing, so
//! ratios survive `to_json` / `from_json` bit for bit.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::tree::{NodeId, SplitAxis, SplitRatio, SplitTree, TreeError};

/// Serializable tree shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DockLayout<K> {
    Leaf {
        content: K,
    },
    Split {
        axis: SplitAxis,
        ratio: SplitRatio,
        first: Box<DockLayout<K>>,
        second: Box<DockLayout<K>>,
    },
}

impl<K> DockLayout<K> {
    /// Number of leaves in this layout.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Split { first, second, .. } => first.leaf_count() + second.leaf_count(),
        }
    }
}

impl<D> SplitTree<D> {
    /// Encode the tree shape, turning each leaf's content into a reference.
    ///
    /// Returns `None` for an empty tree.
    pub fn to_layout_with<'a, K, F>(&'a self, mut key: F) -> Option<DockLayout<K>>
    where
        F: FnMut(&'a D) -> K,
    {
        self.encode(self.root()?, &mut key)
    }

    /// Encode the tree with cloned content.
    #[must_use]
    pub fn to_layout(&self) -> Option<DockLayout<D>>
    where
        D: Clone,
    {
        self.to_layout_with(D::clone)
    }

    fn encode<'a, K, F>(&'a self, id: NodeId, key: &mut F) -> Option<DockLayout<K>>
    where
        F: FnMut(&'a D) -> K,
    {
        let node = self.node(id)?;
        if let Some(content) = node.content() {
            return Some(DockLayout::Leaf {
                content: key(content),
            });
        }
        let split = node.split()?;
        let first = self.encode(split.first, key)?;
        let second = self.encode(split.second, key)?;
        Some(DockLayout::Split {
            axis: split.axis,
            ratio: split.ratio,
            first: Box::new(first),
            second: Box::new(second),
        })
    }

    fn decode<K, F>(&mut self, layout: DockLayout<K>, resolve: &mut F) -> Result<NodeId, TreeError>
    where
        F: FnMut(K) -> Result<D, TreeError>,
    {
        match layout {
            DockLayout::Leaf { content } => {
                let content = resolve(content)?;
                self.push_leaf(content)
            }
            DockLayout::Split {
                axis,
                ratio,
                first,
                second,
            } => {
                let first = self.decode(*first, resolve)?;
                let second = self.decode(*second, resolve)?;
                self.push_split(axis, ratio, first, second)
            }
        }
    }
}

impl<D: PartialEq> SplitTree<D> {
    /// Rebuild a tree from a layout holding the content itself.
    pub fn from_layout(layout: DockLayout<D>) -> Result<Self, TreeError> {
        Self::assemble(layout, &mut |content| Ok(content))
    }

    /// Rebuild a tree, resolving each leaf reference to content.
    ///
    /// Fails with [`TreeError::UnknownContentKey`] when `resolve` returns
    /// `None`, and with [`TreeError::DuplicateContent`] when two leaves
    /// resolve to equal content.
    pub fn from_layout_with<K, F>(layout: DockLayout<K>, mut resolve: F) -> Result<Self, TreeError>
    where
        K: fmt::Debug,
        F: FnMut(K) -> Option<D>,
    {
        Self::assemble(layout, &mut |key: K| {
            let label = format!("{key:?}");
            resolve(key).ok_or(TreeError::UnknownContentKey { key: label })
        })
    }

    fn assemble<K, F>(layout: DockLayout<K>, resolve: &mut F) -> Result<Self, TreeError>
    where
        F: FnMut(K) -> Result<D, TreeError>,
    {
        let mut tree = Self::new();
        let root = tree.decode(layout, resolve)?;
        tree.set_root(root);
        match tree.validate() {
            Ok(()) => Ok(tree),
            Err(TreeError::Corrupt {
                reason: crate::tree::CorruptionKind::DuplicateContent { existing },
                ..
            }) => Err(TreeError::DuplicateContent { existing }),
            Err(err) => Err(err),
        }
    }
}

impl<D: Serialize> SplitTree<D> {
    /// Encode as JSON. An empty tree encodes as `null`.
    pub fn to_json(&self) -> Result<String, LayoutCodecError> {
        Ok(serde_json::to_string(&self.to_layout_with(|content| content))?)
    }

    /// Encode as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, LayoutCodecError> {
        Ok(serde_json::to_string_pretty(
            &self.to_layout_with(|content| content),
        )?)
    }
}

impl<D: DeserializeOwned + PartialEq> SplitTree<D> {
    /// Decode JSON produced by [`SplitTree::to_json`].
    pub fn from_json(json: &str) -> Result<Self, LayoutCodecError> {
        let layout: Option<DockLayout<D>> = serde_json::from_str(json)?;
        match layout {
            Some(layout) => Ok(Self::from_layout(layout)?),
            None => Ok(Self::new()),
        }
    }
}

/// Errors from the JSON layout codec.
#[derive(Debug)]
pub enum LayoutCodecError {
    Json(serde_json::Error),
    /// The document parsed but does not describe a valid tree.
    Tree(TreeError),
}

impl fmt::Display for LayoutCodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "layout JSON error: {err}"),
            Self::Tree(err) => write!(f, "invalid layout: {err}"),
        }
    }
}

impl std::error::Error for LayoutCodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Tree(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for LayoutCodecError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<TreeError> for LayoutCodecError {
    fn from(err: TreeError) -> Self {
        Self::Tree(err)
    }
}
