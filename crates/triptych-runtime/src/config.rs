#![forbid(unsafe_code)]

//! Assistant panel configuration.
//!
//! Loads from TOML or JSON. Every section and field is optional:
//!
//! ```toml
//! [layout]
//! collapse_below = 720.0
//!
//! [tree]
//! roots = ["src", "tests", "docs"]
//!
//! [timeline]
//! pulse_ms = 500
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use triptych_core::{Easing, TweenInfo};
use triptych_layout::LayoutConfig;

/// Project tree settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Entries always shown as folders, in this order, even when the scan
    /// does not report them.
    pub roots: Vec<String>,
    /// Horizontal indent per path depth, in pixels.
    pub indent: f64,
    pub empty_text: String,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            roots: vec!["src".into(), "tests".into()],
            indent: 12.0,
            empty_text: "No project files".into(),
        }
    }
}

/// Task timeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Half period of the in-progress pulse.
    pub pulse_ms: u64,
    /// Opacity the status dot dims to at the bottom of a pulse.
    pub pulse_floor: f64,
    pub pulse_easing: Easing,
    pub empty_text: String,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            pulse_ms: 600,
            pulse_floor: 0.35,
            pulse_easing: Easing::SineInOut,
            empty_text: "No tasks yet".into(),
        }
    }
}

impl TimelineConfig {
    #[must_use]
    pub fn pulse_tween(&self) -> TweenInfo {
        TweenInfo::pulse(Duration::from_millis(self.pulse_ms), self.pulse_easing)
    }
}

/// Top-level configuration of an [`AssistantPanel`](crate::AssistantPanel).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub layout: LayoutConfig,
    pub tree: TreeConfig,
    pub timeline: TimelineConfig,
}

impl AssistantConfig {
    /// Parse from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Parse from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate all sections. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.layout.validate();

        if !self.tree.indent.is_finite() || self.tree.indent < 0.0 {
            errors.push(format!("tree.indent must be >= 0, got {}", self.tree.indent));
        }
        for (i, root) in self.tree.roots.iter().enumerate() {
            if root.trim_matches('/').is_empty() {
                errors.push(format!("tree.roots[{i}] must not be empty"));
            }
        }

        if self.timeline.pulse_ms == 0 {
            errors.push("timeline.pulse_ms must be > 0".into());
        }
        if !(0.0..=1.0).contains(&self.timeline.pulse_floor) {
            errors.push(format!(
                "timeline.pulse_floor must be in [0, 1], got {}",
                self.timeline.pulse_floor
            ));
        }

        errors
    }

    /// Like [`AssistantConfig::validate`], but as a `Result`.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Errors loading an [`AssistantConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    Toml(toml::de::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
