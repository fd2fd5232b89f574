#![forbid(unsafe_code)]

//! Collapse/expand state machine for the three panels.
//!
//! The machine owns the collapsed-state table and the weight table. Every
//! transition that flips a panel's flag performs exactly one relayout: solve
//! the geometry, then animate every panel frame toward its new placement.
//! Requests that would not change anything return
//! [`Transition::Ignored`] and touch nothing.
//!
//! # Deferred hide
//!
//! Collapsing fades the content mount out and schedules a hide for after the
//! fade. The scheduled payload records the panel's transition generation; if
//! the panel has moved on (expanded, or collapsed again) by the time the task
//! fires, the stale hide is skipped. Expanding also cancels the pending task.

use std::fmt;
use std::time::Duration;

use tracing::{debug, trace, warn};
use triptych_core::{
    AnimationHandle, Dim, Dim2, NodeId, Property, PropertyValue, Scheduler, Stage, TaskId,
};

use crate::config::LayoutConfig;
use crate::panel::PanelId;
use crate::solver::{LayoutSolution, PanelSpec, solve};

/// Collapse state of one panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelState {
    #[default]
    Expanded,
    Collapsed,
}

/// Why a transition request did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    AlreadyCollapsed,
    AlreadyExpanded,
    Protected,
}

/// Result of a transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Ignored(IgnoreReason),
}

impl Transition {
    #[inline]
    #[must_use]
    pub fn is_applied(self) -> bool {
        self == Self::Applied
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied => f.write_str("applied"),
            Self::Ignored(IgnoreReason::AlreadyCollapsed) => f.write_str("already collapsed"),
            Self::Ignored(IgnoreReason::AlreadyExpanded) => f.write_str("already expanded"),
            Self::Ignored(IgnoreReason::Protected) => f.write_str("protected panel"),
        }
    }
}

/// Scene nodes belonging to one panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelNodes {
    /// Outer frame positioned by the layout.
    pub frame: NodeId,
    /// Mount point handed to the content populator.
    pub content: NodeId,
    /// Strip shown while collapsed.
    pub indicator: NodeId,
    /// Control that collapses the panel; absent on protected panels.
    pub collapse_button: Option<NodeId>,
}

#[derive(Debug)]
struct PanelSlot {
    id: PanelId,
    weight: f64,
    state: PanelState,
    generation: u64,
    nodes: PanelNodes,
    pending_hide: Option<TaskId>,
    fade: Option<AnimationHandle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DeferredHide {
    panel: PanelId,
    generation: u64,
}

/// Owner of panel collapse state and the only writer of panel geometry.
#[derive(Debug)]
pub struct CollapseMachine {
    config: LayoutConfig,
    panels: Vec<PanelSlot>,
    deferred: Scheduler<DeferredHide>,
    solution: LayoutSolution,
    layout_passes: u64,
    last_width: Option<f64>,
}

impl CollapseMachine {
    /// Build the machine over already-created panel nodes. All panels start
    /// expanded; call [`CollapseMachine::apply_initial_layout`] to place them.
    #[must_use]
    pub fn new(config: LayoutConfig, nodes: [(PanelId, PanelNodes); 3]) -> Self {
        let panels = nodes
            .into_iter()
            .map(|(id, nodes)| PanelSlot {
                id,
                weight: config.weights.get(id),
                state: PanelState::Expanded,
                generation: 0,
                nodes,
                pending_hide: None,
                fade: None,
            })
            .collect();
        Self {
            config,
            panels,
            deferred: Scheduler::new(),
            solution: LayoutSolution::default(),
            layout_passes: 0,
            last_width: None,
        }
    }

    /// Place every panel without animating.
    pub fn apply_initial_layout(&mut self, stage: &mut Stage) {
        self.relayout(stage, false);
    }

    #[must_use]
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Collapse state of `id`.
    #[must_use]
    pub fn state(&self, id: PanelId) -> PanelState {
        self.slot(id).map_or(PanelState::Expanded, |s| s.state)
    }

    #[must_use]
    pub fn is_collapsed(&self, id: PanelId) -> bool {
        self.state(id) == PanelState::Collapsed
    }

    #[must_use]
    pub fn nodes(&self, id: PanelId) -> Option<&PanelNodes> {
        self.slot(id).map(|s| &s.nodes)
    }

    /// The most recent geometry solution.
    #[must_use]
    pub fn solution(&self) -> &LayoutSolution {
        &self.solution
    }

    /// Number of geometry recomputations performed so far.
    #[must_use]
    pub fn layout_passes(&self) -> u64 {
        self.layout_passes
    }

    /// Last width passed to [`CollapseMachine::handle_resize`].
    #[must_use]
    pub fn last_width(&self) -> Option<f64> {
        self.last_width
    }

    /// Number of deferred hides still waiting.
    #[must_use]
    pub fn pending_hides(&self) -> usize {
        self.deferred.pending_count()
    }

    /// Collapse `id`: fade its content, schedule the hide, relayout.
    pub fn collapse(&mut self, stage: &mut Stage, id: PanelId) -> Transition {
        if id.is_protected() {
            trace!(panel = %id, "collapse ignored: protected");
            return Transition::Ignored(IgnoreReason::Protected);
        }
        let fade_tween = self.config.fade_tween();
        let hide_delay = self.config.hide_delay();
        let Some(slot) = self.slot_mut(id) else {
            return Transition::Ignored(IgnoreReason::AlreadyExpanded);
        };
        if slot.state == PanelState::Collapsed {
            trace!(panel = %id, "collapse ignored: already collapsed");
            return Transition::Ignored(IgnoreReason::AlreadyCollapsed);
        }

        slot.state = PanelState::Collapsed;
        slot.generation += 1;
        let generation = slot.generation;
        let content = slot.nodes.content;
        let previous = slot.pending_hide.take();

        let fade = stage.animate(
            content,
            &[(Property::Opacity, PropertyValue::Scalar(0.0))],
            fade_tween,
        );
        if let Some(task) = previous {
            self.deferred.cancel(task);
        }
        let task = self.deferred.schedule(
            hide_delay,
            DeferredHide {
                panel: id,
                generation,
            },
        );
        if let Some(slot) = self.slot_mut(id) {
            slot.fade = Some(fade);
            slot.pending_hide = Some(task);
        }

        debug!(panel = %id, generation, "panel collapsed");
        self.relayout(stage, true);
        Transition::Applied
    }

    /// Expand `id`: reveal its content immediately, relayout.
    pub fn expand(&mut self, stage: &mut Stage, id: PanelId) -> Transition {
        let Some(slot) = self.slot_mut(id) else {
            return Transition::Ignored(IgnoreReason::AlreadyExpanded);
        };
        if slot.state == PanelState::Expanded {
            trace!(panel = %id, "expand ignored: already expanded");
            return Transition::Ignored(IgnoreReason::AlreadyExpanded);
        }

        slot.state = PanelState::Expanded;
        slot.generation += 1;
        let generation = slot.generation;
        let nodes = slot.nodes;
        let pending = slot.pending_hide.take();
        let fade = slot.fade.take();

        if let Some(task) = pending {
            self.deferred.cancel(task);
        }
        if let Some(fade) = fade {
            stage.animator.cancel(fade);
        }
        let scene = &mut stage.scene;
        scene.set_property(
            nodes.content,
            Property::Opacity,
            PropertyValue::Scalar(1.0),
        );
        scene.set_visible(nodes.content, true);
        scene.set_visible(nodes.indicator, false);
        if let Some(button) = nodes.collapse_button {
            scene.set_visible(button, true);
        }

        debug!(panel = %id, generation, "panel expanded");
        self.relayout(stage, true);
        Transition::Applied
    }

    /// Collapse if expanded, expand if collapsed.
    pub fn toggle(&mut self, stage: &mut Stage, id: PanelId) -> Transition {
        match self.state(id) {
            PanelState::Expanded => self.collapse(stage, id),
            PanelState::Collapsed => self.expand(stage, id),
        }
    }

    /// Route a click on `node`. Collapse buttons collapse their panel and
    /// collapsed indicators expand it. Returns `None` for unrelated nodes.
    pub fn activate(&mut self, stage: &mut Stage, node: NodeId) -> Option<(PanelId, Transition)> {
        let (id, collapse) = self.panels.iter().find_map(|s| {
            if s.nodes.collapse_button == Some(node) {
                Some((s.id, true))
            } else if s.nodes.indicator == node {
                Some((s.id, false))
            } else {
                None
            }
        })?;
        let transition = if collapse {
            self.collapse(stage, id)
        } else {
            self.expand(stage, id)
        };
        Some((id, transition))
    }

    /// React to a container width change.
    ///
    /// Below the threshold both side panels collapse, otherwise both expand.
    /// Returns how many transitions were applied.
    pub fn handle_resize(&mut self, stage: &mut Stage, width: f64) -> usize {
        if !width.is_finite() {
            warn!(width, "ignoring non-finite container width");
            return 0;
        }
        self.last_width = Some(width);
        let narrow = width < self.config.collapse_below;
        let mut applied = 0;
        for id in PanelId::ALL.into_iter().filter(|id| !id.is_protected()) {
            let transition = if narrow {
                self.collapse(stage, id)
            } else {
                self.expand(stage, id)
            };
            if transition.is_applied() {
                applied += 1;
            }
        }
        debug!(width, narrow, applied, "container resized");
        applied
    }

    /// Advance deferred work by `dt`. Returns the number of hides applied.
    pub fn advance(&mut self, stage: &mut Stage, dt: Duration) -> usize {
        let mut applied = 0;
        for hide in self.deferred.advance(dt) {
            let Some(slot) = self.slot_mut(hide.panel) else {
                continue;
            };
            if slot.generation != hide.generation || slot.state != PanelState::Collapsed {
                debug!(panel = %hide.panel, "skipping stale deferred hide");
                continue;
            }
            slot.pending_hide = None;
            let fade = slot.fade.take();
            let nodes = slot.nodes;
            // A fade longer than the hide delay must not outlive the hide.
            if let Some(fade) = fade {
                stage.animator.cancel(fade);
            }
            stage.scene.set_visible(nodes.content, false);
            stage.scene.set_visible(nodes.indicator, true);
            if let Some(button) = nodes.collapse_button {
                stage.scene.set_visible(button, false);
            }
            applied += 1;
        }
        applied
    }

    /// Drop pending deferred work. Used at teardown.
    pub fn cancel_pending(&mut self, stage: &mut Stage) {
        self.deferred.clear();
        for slot in &mut self.panels {
            slot.pending_hide = None;
            if let Some(fade) = slot.fade.take() {
                stage.animator.cancel(fade);
            }
        }
    }

    fn slot(&self, id: PanelId) -> Option<&PanelSlot> {
        self.panels.iter().find(|s| s.id == id)
    }

    fn slot_mut(&mut self, id: PanelId) -> Option<&mut PanelSlot> {
        self.panels.iter_mut().find(|s| s.id == id)
    }

    fn relayout(&mut self, stage: &mut Stage, animate: bool) {
        let specs: Vec<PanelSpec> = self
            .panels
            .iter()
            .map(|s| PanelSpec::new(s.id, s.weight))
            .collect();
        let collapsed: Vec<PanelId> = self
            .panels
            .iter()
            .filter(|s| s.state == PanelState::Collapsed)
            .map(|s| s.id)
            .collect();
        let solution = solve(
            &specs,
            &collapsed,
            self.config.gap,
            self.config.collapsed_width,
        );

        let tween = self.config.layout_tween();
        for placement in solution.placements() {
            let Some(slot) = self.slot(placement.id) else {
                continue;
            };
            let frame = slot.nodes.frame;
            let position = PropertyValue::Dim2(Dim2::new(placement.position, Dim::ZERO));
            let size = PropertyValue::Dim2(Dim2::new(placement.size, Dim::FULL));
            if animate {
                stage.animate(
                    frame,
                    &[(Property::Position, position), (Property::Size, size)],
                    tween,
                );
            } else {
                stage.animator.cancel_node(frame);
                stage.scene.set_property(frame, Property::Position, position);
                stage.scene.set_property(frame, Property::Size, size);
            }
        }

        self.layout_passes += 1;
        trace!(
            passes = self.layout_passes,
            collapsed = collapsed.len(),
            animate,
            "layout recomputed"
        );
        self.solution = solution;
    }
}
