#![forbid(unsafe_code)]

//! Relative geometry primitives.
//!
//! Every length in Triptych is a [`Dim`]: a proportional share of the parent
//! extent plus a fixed offset in pixels. A [`Dim2`] pairs one `Dim` per axis.
//!
//! ```
//! use triptych_core::geometry::Dim;
//!
//! // Half the parent, minus a 4px gutter.
//! let width = Dim::new(0.5, -4.0);
//! assert_eq!(width.resolve(200.0), 96.0);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A `{scale, offset}` length along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dim {
    /// Proportional share of the parent extent.
    pub scale: f64,
    /// Fixed offset in pixels.
    pub offset: f64,
}

impl Dim {
    /// Zero length.
    pub const ZERO: Self = Self::new(0.0, 0.0);
    /// The full parent extent.
    pub const FULL: Self = Self::new(1.0, 0.0);

    #[inline]
    pub const fn new(scale: f64, offset: f64) -> Self {
        Self { scale, offset }
    }

    /// A purely proportional length.
    #[inline]
    pub const fn from_scale(scale: f64) -> Self {
        Self::new(scale, 0.0)
    }

    /// A purely fixed length.
    #[inline]
    pub const fn from_offset(offset: f64) -> Self {
        Self::new(0.0, offset)
    }

    /// Absolute length for a given parent extent.
    #[inline]
    #[must_use]
    pub fn resolve(self, extent: f64) -> f64 {
        self.scale * extent + self.offset
    }

    /// Component-wise linear interpolation.
    #[inline]
    #[must_use]
    pub fn lerp(self, to: Self, t: f64) -> Self {
        Self {
            scale: self.scale + (to.scale - self.scale) * t,
            offset: self.offset + (to.offset - self.offset) * t,
        }
    }
}

impl Add for Dim {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.scale + rhs.scale, self.offset + rhs.offset)
    }
}

impl Sub for Dim {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.scale - rhs.scale, self.offset - rhs.offset)
    }
}

/// A two-axis relative vector (position or size).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dim2 {
    pub x: Dim,
    pub y: Dim,
}

impl Dim2 {
    pub const ZERO: Self = Self::new(Dim::ZERO, Dim::ZERO);
    /// Fills the parent on both axes.
    pub const FULL: Self = Self::new(Dim::FULL, Dim::FULL);

    #[inline]
    pub const fn new(x: Dim, y: Dim) -> Self {
        Self { x, y }
    }

    /// Build from raw `(x_scale, x_offset, y_scale, y_offset)` components.
    #[inline]
    pub const fn from_parts(x_scale: f64, x_offset: f64, y_scale: f64, y_offset: f64) -> Self {
        Self::new(Dim::new(x_scale, x_offset), Dim::new(y_scale, y_offset))
    }

    /// Replace the horizontal component.
    #[inline]
    #[must_use]
    pub const fn with_x(self, x: Dim) -> Self {
        Self::new(x, self.y)
    }

    /// Replace the vertical component.
    #[inline]
    #[must_use]
    pub const fn with_y(self, y: Dim) -> Self {
        Self::new(self.x, y)
    }

    /// Absolute `(x, y)` for a parent of `width` x `height`.
    #[inline]
    #[must_use]
    pub fn resolve(self, width: f64, height: f64) -> (f64, f64) {
        (self.x.resolve(width), self.y.resolve(height))
    }

    #[inline]
    #[must_use]
    pub fn lerp(self, to: Self, t: f64) -> Self {
        Self::new(self.x.lerp(to.x, t), self.y.lerp(to.y, t))
    }
}

/// An absolute horizontal span produced by resolving a layout.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Span {
    /// Left edge in pixels.
    pub x: f64,
    /// Width in pixels.
    pub width: f64,
}

impl Span {
    #[inline]
    pub const fn new(x: f64, width: f64) -> Self {
        Self { x, width }
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}
