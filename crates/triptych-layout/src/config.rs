#![forbid(unsafe_code)]

//! Layout tunables.
//!
//! Every field has a default, so a partial TOML or JSON table is enough:
//!
//! ```toml
//! [layout]
//! gap = 6.0
//! collapse_below = 720.0
//!
//! [layout.weights]
//! left = 0.2
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::panel::PanelId;
use triptych_core::{Easing, TweenInfo};

/// Nominal proportional widths of the three panels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelWeights {
    pub left: f64,
    pub center: f64,
    pub right: f64,
}

impl PanelWeights {
    #[must_use]
    pub fn get(&self, id: PanelId) -> f64 {
        match id {
            PanelId::Left => self.left,
            PanelId::Center => self.center,
            PanelId::Right => self.right,
        }
    }
}

impl Default for PanelWeights {
    fn default() -> Self {
        Self {
            left: 0.25,
            center: 0.45,
            right: 0.30,
        }
    }
}

/// Geometry and transition parameters for the panel host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Fixed gap between adjacent panels, in pixels.
    pub gap: f64,
    /// Width of a collapsed panel's indicator strip, in pixels.
    pub collapsed_width: f64,
    /// Container widths strictly below this collapse both side panels.
    pub collapse_below: f64,
    pub weights: PanelWeights,
    /// Content fade-out duration on collapse.
    pub fade_ms: u64,
    /// Delay between collapse and hiding the content mount.
    pub hide_delay_ms: u64,
    /// Duration of panel size/position transitions.
    pub layout_ms: u64,
    pub fade_easing: Easing,
    pub layout_easing: Easing,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            gap: 6.0,
            collapsed_width: 28.0,
            collapse_below: 400.0,
            weights: PanelWeights::default(),
            fade_ms: 150,
            hide_delay_ms: 160,
            layout_ms: 250,
            fade_easing: Easing::Linear,
            layout_easing: Easing::QuadOut,
        }
    }
}

impl LayoutConfig {
    #[must_use]
    pub fn hide_delay(&self) -> Duration {
        Duration::from_millis(self.hide_delay_ms)
    }

    #[must_use]
    pub fn fade_tween(&self) -> TweenInfo {
        TweenInfo::new(Duration::from_millis(self.fade_ms)).easing(self.fade_easing)
    }

    #[must_use]
    pub fn layout_tween(&self) -> TweenInfo {
        TweenInfo::new(Duration::from_millis(self.layout_ms)).easing(self.layout_easing)
    }

    /// Check the configuration. Returns a list of problems; empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.gap.is_finite() || self.gap < 0.0 {
            errors.push(format!("layout.gap must be >= 0, got {}", self.gap));
        }
        if !self.collapsed_width.is_finite() || self.collapsed_width <= 0.0 {
            errors.push(format!(
                "layout.collapsed_width must be > 0, got {}",
                self.collapsed_width
            ));
        }
        if !self.collapse_below.is_finite() || self.collapse_below < 0.0 {
            errors.push(format!(
                "layout.collapse_below must be >= 0, got {}",
                self.collapse_below
            ));
        }
        for id in PanelId::ALL {
            let w = self.weights.get(id);
            if !w.is_finite() || w <= 0.0 {
                errors.push(format!("layout.weights.{id} must be > 0, got {w}"));
            }
        }

        errors
    }
}
