// Grid configuration.
//
// Everything that sizes or tunes a `HexGrid` lives in `GridConfig`, loadable
// from JSON. Missing fields fall back to the defaults below, so a config file
// only needs to name what it changes.
//
// See also: `grid.rs`, which builds a grid from a validated config, and the
// `hexpath` binary, which reads a config path from its command line.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Hex radius of the map. A radius-R map holds `3R² + 3R + 1` cells.
    pub map_radius: u32,

    /// Center-to-corner size of one hex in world units. Scales
    /// `axis_to_world` and `cell_at_location`.
    pub cell_radius: f32,

    /// How many times the spatial index may split along any branch.
    pub octree_max_divisions: u32,

    /// Points a leaf holds before it splits.
    pub octree_node_capacity: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            map_radius: 6,
            cell_radius: 1.0,
            octree_max_divisions: 5,
            octree_node_capacity: 1,
        }
    }
}

impl GridConfig {
    pub fn with_radius(map_radius: u32, cell_radius: f32) -> Self {
        Self {
            map_radius,
            cell_radius,
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.cell_radius.is_finite() && self.cell_radius > 0.0) {
            return Err(ConfigError::Invalid("cell_radius must be positive and finite"));
        }
        if self.octree_node_capacity == 0 {
            return Err(ConfigError::Invalid("octree_node_capacity must be at least 1"));
        }
        // Cube coordinates are i32 and the index stores them as f32.
        if self.map_radius > 1 << 20 {
            return Err(ConfigError::Invalid("map_radius is too large"));
        }
        Ok(())
    }

    /// Number of cells a grid built from this config will hold.
    pub fn cell_count(&self) -> usize {
        let r = self.map_radius as usize;
        3 * r * r + 3 * r + 1
    }
}
