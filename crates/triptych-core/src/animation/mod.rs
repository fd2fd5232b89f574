#![forbid(unsafe_code)]

//! Time-based animation primitives.
//!
//! - [`Animation`]: the dt-driven progress contract.
//! - Easing curves as plain functions plus the serializable [`Easing`] enum.
//! - [`Tween`]: a single eased interpolation with repeat and reversal.
//! - [`Animator`]: applies tweens to scene node properties, last writer wins.
//!
//! Nothing here owns a clock. Callers advance animations with explicit
//! `dt` values, which keeps every transition deterministic under test.

mod animator;
mod tween;

pub use animator::{AnimationHandle, Animator};
pub use tween::{LoopCount, Tween, TweenInfo};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A dt-driven animation producing a progress value.
pub trait Animation {
    /// Advance by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has run to completion. Infinite animations
    /// never complete.
    fn is_complete(&self) -> bool;

    /// Current eased value, nominally in `[0.0, 1.0]`.
    fn value(&self) -> f32;

    /// Return to the initial state.
    fn reset(&mut self);

    /// Time past completion consumed by the last tick.
    fn overshoot(&self) -> Duration {
        Duration::ZERO
    }
}

/// Signature of an easing curve over `t in [0, 1]`.
pub type EasingFn = fn(f32) -> f32;

#[inline]
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

#[inline]
pub fn ease_in(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t
}

#[inline]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

#[inline]
pub fn ease_in_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * t
}

#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

#[inline]
pub fn sine_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    -((std::f32::consts::PI * t).cos() - 1.0) / 2.0
}

/// Named easing curve, usable from configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    QuadIn,
    #[default]
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    SineInOut,
}

impl Easing {
    /// The curve function for this easing.
    #[must_use]
    pub fn curve(self) -> EasingFn {
        match self {
            Self::Linear => linear,
            Self::QuadIn => ease_in,
            Self::QuadOut => ease_out,
            Self::QuadInOut => ease_in_out,
            Self::CubicIn => ease_in_cubic,
            Self::CubicOut => ease_out_cubic,
            Self::SineInOut => sine_in_out,
        }
    }

    #[inline]
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        (self.curve())(t)
    }
}
