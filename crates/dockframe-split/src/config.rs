//! Station configuration and the named-profile registry.
//!
//! ```toml
//! # dockframe.toml
//! edge_margin = 0.2
//! divider_size = 4
//!
//! [profiles.compact]
//! divider_size = 1
//! min_leaf_width = 40
//! ```
//!
//! ```rust,ignore
//! let registry = ConfigRegistry::from_toml_file("dockframe.toml")?;
//! let station: Station<PanelId> = Station::from_registry(&registry, "compact");
//! ```
//!
//! Every field has a default, so partial documents are fine.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::resolver::LayoutOptions;
use crate::tree::SplitRatio;

/// Tunables for layout, drop resolution, and drag gestures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    /// Fraction of a leaf's width/height that counts as an edge drop zone.
    pub edge_margin: f64,
    /// Gap in pixels between the two children of every split.
    pub divider_size: i32,
    pub min_leaf_width: i32,
    pub min_leaf_height: i32,
    /// Pointer travel in pixels before a press becomes a drag.
    pub drag_threshold: i32,
    /// Extra pixels on each side of a divider that still hit it.
    pub divider_grab: i32,
    /// Share of the split given to content dropped on an edge.
    pub drop_ratio: f64,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            edge_margin: 0.25,
            divider_size: 0,
            min_leaf_width: 0,
            min_leaf_height: 0,
            drag_threshold: 4,
            divider_grab: 3,
            drop_ratio: 0.5,
        }
    }
}

impl StationConfig {
    #[cfg(feature = "toml-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    #[cfg(feature = "toml-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&read(path)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_str(&read(path)?)
    }

    /// Human-readable problems; empty when the config is usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !(0.0..=0.5).contains(&self.edge_margin) {
            errors.push(format!(
                "edge_margin must be in [0, 0.5], got {}",
                self.edge_margin
            ));
        }
        if self.divider_size < 0 {
            errors.push(format!("divider_size must be >= 0, got {}", self.divider_size));
        }
        if self.min_leaf_width < 0 {
            errors.push(format!(
                "min_leaf_width must be >= 0, got {}",
                self.min_leaf_width
            ));
        }
        if self.min_leaf_height < 0 {
            errors.push(format!(
                "min_leaf_height must be >= 0, got {}",
                self.min_leaf_height
            ));
        }
        if self.drag_threshold < 0 {
            errors.push(format!(
                "drag_threshold must be >= 0, got {}",
                self.drag_threshold
            ));
        }
        if self.divider_grab < 0 {
            errors.push(format!("divider_grab must be >= 0, got {}", self.divider_grab));
        }
        if SplitRatio::new(self.drop_ratio).is_err() {
            errors.push(format!(
                "drop_ratio must be inside (0, 1), got {}",
                self.drop_ratio
            ));
        }
        errors
    }

    /// Fail with [`ConfigError::Validation`] unless [`StationConfig::validate`] is clean.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Geometry options for [`crate::SplitTree::layout`].
    #[must_use]
    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            divider_size: self.divider_size.max(0),
            min_leaf_width: self.min_leaf_width.max(0),
            min_leaf_height: self.min_leaf_height.max(0),
        }
    }

    /// Edge margin clamped to `[0, 0.5]`; NaN disables edge zones.
    #[must_use]
    pub fn effective_edge_margin(&self) -> f64 {
        if self.edge_margin.is_nan() {
            0.0
        } else {
            self.edge_margin.clamp(0.0, 0.5)
        }
    }

    /// Drop ratio as a valid split ratio, falling back to one half.
    #[must_use]
    pub fn effective_drop_ratio(&self) -> SplitRatio {
        SplitRatio::new(self.drop_ratio).unwrap_or(SplitRatio::HALF)
    }
}

/// A default [`StationConfig`] plus named profiles.
///
/// Passed explicitly into station constructors; unknown profile names fall
/// back to the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigRegistry {
    #[serde(flatten)]
    pub default: StationConfig,
    #[serde(default)]
    pub profiles: BTreeMap<String, StationConfig>,
}

impl ConfigRegistry {
    #[must_use]
    pub fn new(default: StationConfig) -> Self {
        Self {
            default,
            profiles: BTreeMap::new(),
        }
    }

    /// Register or replace a profile, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, config: StationConfig) -> Option<StationConfig> {
        self.profiles.insert(name.into(), config)
    }

    /// Profile by name, or the default.
    #[must_use]
    pub fn resolve(&self, name: &str) -> &StationConfig {
        self.profiles.get(name).unwrap_or(&self.default)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    /// Problems across the default and every profile, prefixed by origin.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors: Vec<String> = self
            .default
            .validate()
            .into_iter()
            .map(|e| format!("default: {e}"))
            .collect();
        for (name, config) in &self.profiles {
            errors.extend(
                config
                    .validate()
                    .into_iter()
                    .map(|e| format!("profiles.{name}: {e}")),
            );
        }
        errors
    }

    #[cfg(feature = "toml-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    #[cfg(feature = "toml-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&read(path)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_str(&read(path)?)
    }
}

fn read(path: impl AsRef<Path>) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(ConfigError::Io)
}

/// Errors from loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    #[cfg(feature = "toml-config")]
    Toml(toml::de::Error),
    Json(serde_json::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "toml-config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => write!(f, "validation errors: {}", errors.join("; ")),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "toml-config")]
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
