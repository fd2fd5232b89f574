#![forbid(unsafe_code)]

//! Geometry solver for collapsible side-by-side panels.
//!
//! Maps panel weights and collapse flags to a `{scale, offset}` position and
//! size per panel. The result is relative to the container width, so one
//! solution is valid for every width and can be animated directly.
//!
//! # Algorithm
//!
//! With `n` panels, gap `g`, collapsed width `c`, and `k` collapsed panels:
//!
//! - a collapsed panel is `(0, c)`;
//! - an expanded panel with weight `w` is `(s, -s * (k*c + (n-1)*g))` where
//!   `s = w / Σ(expanded weights)`.
//!
//! Expanded panels therefore absorb the space vacated by collapsed siblings in
//! proportion to their own weight. Positions are running sums of previous
//! sizes plus one gap per boundary.
//!
//! # Invariants
//!
//! 1. With at least one expanded panel, scales sum to 1 and offsets sum to
//!    `-(n-1)*g`, so resolved widths plus gaps tile the container exactly.
//! 2. A collapsed panel always has scale 0 and offset `c`.
//! 3. All panels collapsed: every panel is `(0, c)`; no division happens.
//!
//! # Failure Modes
//!
//! - Non-finite or non-positive weights count as 0. If every expanded weight
//!   is 0, the expanded panels split the space equally.

use triptych_core::{Dim, Span};

use crate::panel::PanelId;

/// Input row for [`solve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelSpec {
    pub id: PanelId,
    /// Nominal proportional width.
    pub weight: f64,
}

impl PanelSpec {
    #[must_use]
    pub const fn new(id: PanelId, weight: f64) -> Self {
        Self { id, weight }
    }
}

/// Relative horizontal placement of one panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub id: PanelId,
    pub position: Dim,
    pub size: Dim,
}

/// Ordered placements produced by [`solve`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutSolution {
    placements: Vec<Placement>,
}

impl LayoutSolution {
    /// Placements in input order.
    #[must_use]
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    #[must_use]
    pub fn get(&self, id: PanelId) -> Option<&Placement> {
        self.placements.iter().find(|p| p.id == id)
    }

    /// Sum of size scales across all panels.
    #[must_use]
    pub fn scale_sum(&self) -> f64 {
        self.placements.iter().map(|p| p.size.scale).sum()
    }

    /// Sum of size offsets across all panels.
    #[must_use]
    pub fn offset_sum(&self) -> f64 {
        self.placements.iter().map(|p| p.size.offset).sum()
    }

    /// Absolute spans for a container `width` pixels wide.
    #[must_use]
    pub fn resolve(&self, width: f64) -> Vec<Span> {
        self.placements
            .iter()
            .map(|p| Span::new(p.position.resolve(width), p.size.resolve(width)))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

fn usable_weight(w: f64) -> f64 {
    if w.is_finite() && w > 0.0 { w } else { 0.0 }
}

/// Solve panel geometry.
///
/// `collapsed` lists the panels currently collapsed; ids not present in
/// `panels` are ignored.
#[must_use]
pub fn solve(
    panels: &[PanelSpec],
    collapsed: &[PanelId],
    gap: f64,
    collapsed_width: f64,
) -> LayoutSolution {
    let n = panels.len();
    if n == 0 {
        return LayoutSolution::default();
    }

    let is_collapsed = |p: &PanelSpec| collapsed.contains(&p.id);
    let collapsed_count = panels.iter().filter(|p| is_collapsed(p)).count();
    let expanded_count = n - collapsed_count;
    let fixed = Dim::from_offset(collapsed_width);

    let sizes: Vec<Dim> = if expanded_count == 0 {
        vec![fixed; n]
    } else {
        let reserved = collapsed_count as f64 * collapsed_width + (n - 1) as f64 * gap;
        let expanded_weight: f64 = panels
            .iter()
            .filter(|p| !is_collapsed(p))
            .map(|p| usable_weight(p.weight))
            .sum();

        panels
            .iter()
            .map(|p| {
                if is_collapsed(p) {
                    return fixed;
                }
                let share = if expanded_weight > 0.0 {
                    usable_weight(p.weight) / expanded_weight
                } else {
                    1.0 / expanded_count as f64
                };
                Dim::new(share, -share * reserved)
            })
            .collect()
    };

    let step = Dim::from_offset(gap);
    let mut cursor = Dim::ZERO;
    let placements = panels
        .iter()
        .zip(sizes)
        .map(|(p, size)| {
            let position = cursor;
            cursor = cursor + size + step;
            Placement {
                id: p.id,
                position,
                size,
            }
        })
        .collect();

    LayoutSolution { placements }
}
