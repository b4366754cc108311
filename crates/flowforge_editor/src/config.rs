// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor configuration, stored as RON.

use crate::history::MAX_HISTORY;
use flowforge_graph::geometry::{NodeLayout, GRID_SIZE};
use flowforge_graph::viewport::ZoomLimits;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Environment variable naming a config file for the binary
pub const CONFIG_ENV: &str = "FLOWFORGE_CONFIG";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid RON
    #[error("Config parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Could not serialize
    #[error("Config serialize error: {0}")]
    Serialize(#[from] ron::Error),

    /// Values out of range
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Delay range for each node in the test walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTiming {
    /// Shortest delay per node
    pub min_delay_ms: u64,
    /// Longest delay per node
    pub max_delay_ms: u64,
}

impl RunTiming {
    /// No waiting at all
    pub const INSTANT: Self = Self {
        min_delay_ms: 0,
        max_delay_ms: 0,
    };
}

impl Default for RunTiming {
    fn default() -> Self {
        Self {
            min_delay_ms: 500,
            max_delay_ms: 1000,
        }
    }
}

/// Editor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Snapping grid in canvas units
    pub grid_size: f32,
    /// Zoom and fit limits
    pub zoom: ZoomLimits,
    /// Zoom change per wheel unit
    pub scroll_zoom_speed: f32,
    /// Undo depth
    pub history_limit: usize,
    /// Offset applied to pasted and duplicated nodes
    pub paste_offset: [f32; 2],
    /// Box selections smaller than this (per side, screen px) count as clicks
    pub box_select_threshold: f32,
    /// Node card size
    pub node_layout: NodeLayout,
    /// Test walk pacing
    pub run_timing: RunTiming,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            zoom: ZoomLimits::default(),
            scroll_zoom_speed: 0.001,
            history_limit: MAX_HISTORY,
            paste_offset: [40.0, 40.0],
            box_select_threshold: 5.0,
            node_layout: NodeLayout::default(),
            run_timing: RunTiming::default(),
        }
    }
}

impl EditorConfig {
    /// Parse from a RON string
    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Load `path` if given, falling back to defaults on any error
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::load(path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Using default config, failed to load {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Save config to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let pretty = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        let content = ron::ser::to_string_pretty(self, pretty)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the editor cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let zoom = &self.zoom;
        if !(zoom.min_zoom > 0.0 && zoom.min_zoom <= zoom.max_zoom) {
            return Err(ConfigError::Invalid(format!(
                "zoom range {}..{} is empty or non-positive",
                zoom.min_zoom, zoom.max_zoom
            )));
        }
        if zoom.zoom_step <= 1.0 {
            return Err(ConfigError::Invalid("zoom_step must be greater than 1".to_string()));
        }
        if self.grid_size < 0.0 {
            return Err(ConfigError::Invalid("grid_size must not be negative".to_string()));
        }
        if self.history_limit == 0 {
            return Err(ConfigError::Invalid("history_limit must be at least 1".to_string()));
        }
        if self.run_timing.min_delay_ms > self.run_timing.max_delay_ms {
            return Err(ConfigError::Invalid("run_timing min exceeds max".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EditorConfig::default();
        assert_eq!(config.grid_size, 20.0);
        assert_eq!(config.zoom.min_zoom, 0.1);
        assert_eq!(config.zoom.max_zoom, 3.0);
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.paste_offset, [40.0, 40.0]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serialization() {
        let config = EditorConfig {
            grid_size: 10.0,
            ..Default::default()
        };
        let ron_str = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        let loaded = EditorConfig::from_ron(&ron_str).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded = EditorConfig::from_ron("(grid_size: 25.0)").unwrap();
        assert_eq!(loaded.grid_size, 25.0);
        assert_eq!(loaded.history_limit, 50);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            EditorConfig::from_ron("(history_limit: 0)"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EditorConfig::from_ron("(run_timing: (min_delay_ms: 10, max_delay_ms: 5))"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(EditorConfig::from_ron("(grid_size: \"x\")"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let config = EditorConfig::load_or_default(Some(Path::new("/definitely/not/here.ron")));
        assert_eq!(config, EditorConfig::default());
    }
}
