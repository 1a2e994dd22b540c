use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("lane_width {lane_width} is narrower than a node ({diameter})")]
    LaneTooNarrow { lane_width: f64, diameter: f64 },
    #[error("corner_threshold_rows must be at least 1")]
    ZeroThreshold,
    #[error("invalid config JSON: {0}")]
    Json(String),
}

/// Geometry and label settings for the graph.
///
/// All lengths are logical pixels. Front-ends load this from JSON; missing
/// fields fall back to [`GraphConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Vertical distance between two consecutive commit rows.
    pub row_height: f64,
    /// Horizontal distance between two lanes.
    pub lane_width: f64,
    pub node_radius: f64,
    /// Row distance at or above which a lane-changing connector runs
    /// vertically and bends in at the parent, instead of a single S-curve.
    pub corner_threshold_rows: usize,
    /// Gap between the rightmost lane and the text columns.
    pub label_gap: f64,
    pub connector_width: f64,
    pub font_size: f64,
    /// Horizontal advance of one label character.
    pub char_width: f64,
    /// Messages longer than this are cut with an ellipsis.
    pub max_label_chars: usize,
    /// Characters shown from each commit hash.
    pub short_hash_len: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            row_height: 24.0,
            lane_width: 16.0,
            node_radius: 4.0,
            corner_threshold_rows: 2,
            label_gap: 12.0,
            connector_width: 2.0,
            font_size: 12.0,
            char_width: 7.0,
            max_label_chars: 72,
            short_hash_len: 7,
        }
    }
}

impl GraphConfig {
    /// Preset for character-cell renderers: one row per line, two cells per
    /// lane.
    pub fn terminal() -> Self {
        Self {
            row_height: 1.0,
            lane_width: 2.0,
            node_radius: 0.5,
            corner_threshold_rows: 2,
            label_gap: 1.0,
            connector_width: 1.0,
            font_size: 1.0,
            char_width: 1.0,
            max_label_chars: 60,
            short_hash_len: 7,
        }
    }

    pub fn from_json(data: &[u8]) -> Result<Self, ConfigError> {
        let config: GraphConfig =
            serde_json::from_slice(data).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("row_height", self.row_height),
            ("lane_width", self.lane_width),
            ("node_radius", self.node_radius),
            ("connector_width", self.connector_width),
            ("font_size", self.font_size),
            ("char_width", self.char_width),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        let diameter = self.node_radius * 2.0;
        if self.lane_width < diameter {
            return Err(ConfigError::LaneTooNarrow {
                lane_width: self.lane_width,
                diameter,
            });
        }
        if self.corner_threshold_rows == 0 {
            return Err(ConfigError::ZeroThreshold);
        }
        Ok(())
    }

    /// Centre x of a lane.
    pub fn lane_x(&self, lane: usize) -> f64 {
        (lane as f64 + 0.5) * self.lane_width
    }

    /// Centre y of a row.
    pub fn row_y(&self, row: usize) -> f64 {
        (row as f64 + 0.5) * self.row_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        assert_eq!(GraphConfig::default().validate(), Ok(()));
        assert_eq!(GraphConfig::terminal().validate(), Ok(()));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config = GraphConfig::from_json(br#"{"row_height": 30}"#)
            .unwrap_or_else(|_| GraphConfig::terminal());
        assert!((config.row_height - 30.0).abs() < f64::EPSILON);
        assert_eq!(config.corner_threshold_rows, 2);
    }

    #[test]
    fn rejects_narrow_lanes() {
        let config = GraphConfig {
            lane_width: 5.0,
            node_radius: 4.0,
            ..GraphConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::LaneTooNarrow { .. })
        ));
    }

    #[test]
    fn rejects_nan_row_height() {
        let config = GraphConfig {
            row_height: f64::NAN,
            ..GraphConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "row_height",
                ..
            })
        ));
    }

    #[test]
    fn lane_and_row_centres() {
        let config = GraphConfig::default();
        assert!((config.lane_x(0) - 8.0).abs() < f64::EPSILON);
        assert!((config.row_y(2) - 60.0).abs() < f64::EPSILON);
    }
}
