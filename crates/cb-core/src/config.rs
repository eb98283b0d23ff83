//! Canvas configuration.
//!
//! Every tunable of the interaction engine lives here so hosts can override
//! them with a single JSON object. Missing keys fall back to the defaults,
//! which reproduce the stock widget behavior.

use serde::Deserialize;

/// Errors produced while reading a host-supplied configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid canvas config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid canvas config: {field} must be {expected}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CanvasConfig {
    /// Grid pitch used by grid snapping, in canvas units.
    pub grid_size: f64,
    /// Maximum distance at which neighbor alignment engages, in canvas units.
    pub snap_threshold: f64,
    /// Whether grid snapping starts enabled.
    pub grid_snap: bool,
    /// Whether neighbor alignment starts enabled.
    pub neighbor_snap: bool,

    /// Quiet period before a committed change is exported.
    pub debounce_ms: f64,

    pub min_width: f64,
    pub min_height: f64,
    pub default_width: f64,
    pub default_height: f64,

    pub min_scale: f64,
    pub max_scale: f64,
    pub zoom_in_factor: f64,
    pub zoom_out_factor: f64,

    /// Distance of the Bézier control points from their anchors.
    pub curve_offset: f64,
    /// Radius of connection and resize handles, in screen pixels.
    pub handle_radius: f64,
    /// How close (screen pixels) a click must land to a link to select it.
    pub edge_hit_tolerance: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            grid_size: 20.0,
            snap_threshold: 12.0,
            grid_snap: false,
            neighbor_snap: true,
            debounce_ms: 200.0,
            min_width: 120.0,
            min_height: 60.0,
            default_width: 180.0,
            default_height: 80.0,
            min_scale: 0.2,
            max_scale: 3.0,
            zoom_in_factor: 1.1,
            zoom_out_factor: 0.9,
            curve_offset: 80.0,
            handle_radius: 8.0,
            edge_hit_tolerance: 6.0,
        }
    }
}

impl CanvasConfig {
    /// Parse a JSON object of overrides and validate the result.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("gridSize", self.grid_size),
            ("minWidth", self.min_width),
            ("minHeight", self.min_height),
            ("minScale", self.min_scale),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::OutOfRange {
                    field,
                    expected: "a positive number",
                });
            }
        }
        let non_negative = [
            ("debounceMs", self.debounce_ms),
            ("snapThreshold", self.snap_threshold),
            ("curveOffset", self.curve_offset),
            ("handleRadius", self.handle_radius),
            ("edgeHitTolerance", self.edge_hit_tolerance),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::OutOfRange {
                    field,
                    expected: "zero or a positive number",
                });
            }
        }
        if !self.max_scale.is_finite() || self.max_scale < self.min_scale {
            return Err(ConfigError::OutOfRange {
                field: "maxScale",
                expected: "at least minScale",
            });
        }
        if !self.zoom_in_factor.is_finite() || self.zoom_in_factor <= 1.0 {
            return Err(ConfigError::OutOfRange {
                field: "zoomInFactor",
                expected: "greater than 1",
            });
        }
        if self.zoom_out_factor <= 0.0
            || self.zoom_out_factor >= 1.0
            || self.zoom_out_factor.is_nan()
        {
            return Err(ConfigError::OutOfRange {
                field: "zoomOutFactor",
                expected: "between 0 and 1",
            });
        }
        if self.default_width < self.min_width || self.default_height < self.min_height {
            return Err(ConfigError::OutOfRange {
                field: "defaultWidth/defaultHeight",
                expected: "at least the minimum card size",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_widget() {
        let config = CanvasConfig::default();
        assert_eq!(config.grid_size, 20.0);
        assert_eq!(config.snap_threshold, 12.0);
        assert_eq!(config.debounce_ms, 200.0);
        assert_eq!((config.min_width, config.min_height), (120.0, 60.0));
        assert_eq!((config.default_width, config.default_height), (180.0, 80.0));
        assert_eq!((config.min_scale, config.max_scale), (0.2, 3.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = CanvasConfig::from_json(r#"{"gridSnap": true, "debounceMs": 500}"#).unwrap();
        assert!(config.grid_snap);
        assert_eq!(config.debounce_ms, 500.0);
        assert_eq!(config.grid_size, 20.0);
    }

    #[test]
    fn rejects_inverted_scale_limits() {
        let err = CanvasConfig::from_json(r#"{"minScale": 2.0, "maxScale": 1.0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "maxScale", .. }));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            CanvasConfig::from_json("{gridSnap"),
            Err(ConfigError::Json(_))
        ));
    }
}
