//! Handler configuration.

use serde::{Deserialize, Serialize};

/// Layout constants and defaults of a [`DrawHandler`](crate::DrawHandler).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawConfig {
    /// Initial zoom factor.
    pub zoom_factor: f64,
    /// Initial backend base scale.
    pub scaling_factor: f64,
    /// Vertical gap added between text lines.
    pub distance_between_text_lines: f64,
    /// Padding between an element border and its text.
    pub distance_border_to_text: f64,
    /// Overrides the metrics provider's default font size when set.
    pub default_font_size: Option<f64>,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            zoom_factor: crate::zoom::DEFAULT_ZOOM_FACTOR,
            scaling_factor: 1.0,
            distance_between_text_lines: 3.0,
            distance_border_to_text: 5.0,
            default_font_size: None,
        }
    }
}

impl DrawConfig {
    /// Parse a configuration from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json() {
        let config = DrawConfig::from_json(r#"{ "zoom_factor": 2.0 }"#).unwrap();
        assert!((config.zoom_factor - 2.0).abs() < f64::EPSILON);
        assert!((config.distance_between_text_lines - 3.0).abs() < f64::EPSILON);
        assert_eq!(config.default_font_size, None);
    }
}
