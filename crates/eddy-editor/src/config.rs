//! Editor configuration.

use eddy_core::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─── Config ───────────────────────────────────────────────────────────────

/// Settings shared by every document opened in an editor session.
///
/// Missing fields fall back to their defaults when loading from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of undo steps kept per document. 0 keeps everything.
    pub undo_limit: usize,

    /// How far each keyboard paste lands from the previous one.
    /// Default: **(20, 10)**.
    pub paste_offset: Point,

    /// Grid spacing used by snap-to-grid. Default: **10**.
    pub grid_size: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            undo_limit: 0,
            paste_offset: Point::new(20.0, 10.0),
            grid_size: 10.0,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid editor configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl EditorConfig {
    /// Parse a configuration from JSON text.
    ///
    /// # Errors
    /// Returns [`ConfigError::Json`] if the text is not a valid config object.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config = EditorConfig::from_json(r#"{ "undo_limit": 50 }"#).unwrap();
        assert_eq!(config.undo_limit, 50);
        assert_eq!(config.paste_offset, Point::new(20.0, 10.0));
        assert_eq!(config.grid_size, 10.0);
    }

    #[test]
    fn nested_points_parse() {
        let config =
            EditorConfig::from_json(r#"{ "paste_offset": { "x": 5.0, "y": 5.0 } }"#).unwrap();
        assert_eq!(config.paste_offset, Point::new(5.0, 5.0));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = EditorConfig::from_json("{ undo_limit: }").unwrap_err();
        assert!(err.to_string().starts_with("invalid editor configuration"));
    }
}
