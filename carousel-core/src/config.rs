//! Engine configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::edits::TextStyle;
use crate::element::ElementKind;
use crate::error::{EditorError, EditorResult};
use crate::geometry::DEFAULT_COVER_EPSILON;
use crate::protection::PatternGuard;

/// Tunables for discovery, dragging and styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Added to the cover scale so rounding never exposes a gap.
    pub cover_epsilon: f64,
    /// Frame ticks to wait for layout before giving up.
    pub layout_retry_frames: u32,
    /// Smallest rendered area (px²) a background container needs.
    pub min_background_area: f64,
    /// Smallest width/height a resize may shrink a container to.
    pub min_resize_dimension: f64,
    /// Regular expressions matching protected media sources.
    pub protected_sources: Vec<String>,
    /// Fallback title style.
    pub title_style: TextStyle,
    /// Fallback subtitle style.
    pub subtitle_style: TextStyle,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cover_epsilon: DEFAULT_COVER_EPSILON,
            layout_retry_frames: 30,
            min_background_area: 2_500.0,
            min_resize_dimension: 50.0,
            protected_sources: vec![
                r"(?i)^https?://([a-z0-9-]+\.)*gravatar\.com/".to_string(),
                r"(?i)unavatar\.io/".to_string(),
            ],
            title_style: TextStyle {
                font_size: "64px".to_string(),
                font_weight: "700".to_string(),
                text_align: "left".to_string(),
                color: "#ffffff".to_string(),
            },
            subtitle_style: TextStyle {
                font_size: "32px".to_string(),
                font_weight: "400".to_string(),
                text_align: "left".to_string(),
                color: "#ffffff".to_string(),
            },
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is out of range.
    pub fn from_json_str(json: &str) -> EditorResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid.
    pub fn from_path(path: impl AsRef<Path>) -> EditorResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    /// Check value ranges and pattern syntax.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidConfig`] naming the offending field.
    pub fn validate(&self) -> EditorResult<()> {
        if !self.cover_epsilon.is_finite() || self.cover_epsilon < 0.0 {
            return Err(EditorError::InvalidConfig(format!(
                "cover_epsilon must be a non-negative number, got {}",
                self.cover_epsilon
            )));
        }
        if !self.min_background_area.is_finite() || self.min_background_area < 0.0 {
            return Err(EditorError::InvalidConfig(format!(
                "min_background_area must be a non-negative number, got {}",
                self.min_background_area
            )));
        }
        if !self.min_resize_dimension.is_finite() || self.min_resize_dimension <= 0.0 {
            return Err(EditorError::InvalidConfig(format!(
                "min_resize_dimension must be positive, got {}",
                self.min_resize_dimension
            )));
        }
        self.guard().map(|_| ())
    }

    /// Compile the protected source patterns.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidConfig`] if a pattern does not compile.
    pub fn guard(&self) -> EditorResult<PatternGuard> {
        PatternGuard::new(&self.protected_sources)
            .map_err(|e| EditorError::InvalidConfig(format!("protected_sources: {e}")))
    }

    /// Configured default style for a text kind.
    #[must_use]
    pub fn default_style(&self, kind: ElementKind) -> Option<&TextStyle> {
        match kind {
            ElementKind::Title => Some(&self.title_style),
            ElementKind::Subtitle => Some(&self.subtitle_style),
            _ => None,
        }
    }
}
