#![forbid(unsafe_code)]

//! Task timeline populator.
//!
//! Renders the task plan as a column of ticket cards joined by a spine. Each
//! card carries a status dot, the ticket text, and an optional output line.
//! The list is rebuilt only when the ordered sequence of statuses changes.

use std::fmt;

use serde::{Deserialize, Serialize};
use triptych_core::{
    CleanupKey, Dim, Dim2, Janitor, NodeId, NodeKind, NodeSpec, SceneError, Stage, Tone,
};

use crate::config::TimelineConfig;
use crate::provider::ProviderError;
use crate::reconciler::{
    ItemPresenter, ListReconciler, Presented, ReconcileOutcome, ReconcilerOptions,
};

/// Progress of one ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Pending,
    Running,
    Done,
    Failed,
    Retrying,
}

impl TicketStatus {
    /// Signature tag.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Done => "done",
            Self::Failed => "failed",
            Self::Retrying => "retrying",
        }
    }

    #[must_use]
    pub const fn tone(self) -> Tone {
        match self {
            Self::Pending => Tone::Muted,
            Self::Running => Tone::Accent,
            Self::Done => Tone::Success,
            Self::Failed => Tone::Danger,
            Self::Retrying => Tone::Warning,
        }
    }

    /// Running and retrying tickets pulse.
    #[must_use]
    pub const fn is_in_progress(self) -> bool {
        matches!(self, Self::Running | Self::Retrying)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One entry of the task plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub text: String,
    pub status: TicketStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl Ticket {
    pub fn new(id: impl Into<String>, text: impl Into<String>, status: TicketStatus) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            status,
            output: None,
        }
    }

    #[must_use]
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Parse a JSON array of tickets.
    pub fn parse_list(json: &str) -> Result<Vec<Ticket>, ProviderError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Source of the current task plan.
pub trait TaskPlanProvider {
    fn tickets(&self) -> Result<Vec<Ticket>, ProviderError>;
}

impl<F> TaskPlanProvider for F
where
    F: Fn() -> Result<Vec<Ticket>, ProviderError>,
{
    fn tickets(&self) -> Result<Vec<Ticket>, ProviderError> {
        self()
    }
}

/// Builds ticket cards.
#[derive(Debug, Clone, Default)]
pub struct TicketPresenter;

impl ItemPresenter for TicketPresenter {
    type Item = Ticket;

    fn key(&self, ticket: &Ticket) -> String {
        ticket.id.clone()
    }

    fn tag(&self, ticket: &Ticket) -> String {
        ticket.status.tag().to_string()
    }

    fn present(
        &self,
        stage: &mut Stage,
        parent: NodeId,
        ticket: &Ticket,
        order: i32,
    ) -> Result<Presented, SceneError> {
        let tone = ticket.status.tone();
        let card = stage.spawn(
            Some(parent),
            NodeSpec::frame(format!("Ticket:{}", ticket.id))
                .layout_order(order)
                .tone(tone),
        )?;
        let dot = stage.spawn(
            Some(card),
            NodeSpec::new(NodeKind::Dot, "StatusDot")
                .size(Dim2::new(Dim::from_offset(10.0), Dim::from_offset(10.0)))
                .layout_order(0)
                .tone(tone),
        )?;
        stage.spawn(
            Some(card),
            NodeSpec::text("Title", ticket.text.clone()).layout_order(1),
        )?;
        if let Some(output) = &ticket.output {
            stage.spawn(
                Some(card),
                NodeSpec::text("Output", output.clone())
                    .layout_order(2)
                    .tone(Tone::Muted),
            )?;
        }
        Ok(Presented {
            root: card,
            pulse: ticket.status.is_in_progress().then_some(dot),
        })
    }
}

/// The right-panel timeline.
#[derive(Debug)]
pub struct TimelineView {
    reconciler: ListReconciler<TicketPresenter>,
}

impl TimelineView {
    pub fn new(stage: &mut Stage, mount: NodeId, config: &TimelineConfig) -> Result<Self, SceneError> {
        let options = ReconcilerOptions {
            name: "timeline".into(),
            empty_text: config.empty_text.clone(),
            spine: true,
            pulse: config.pulse_tween(),
            pulse_floor: config.pulse_floor,
        };
        Ok(Self {
            reconciler: ListReconciler::new(stage, mount, TicketPresenter, options)?,
        })
    }

    /// Poll `provider` once and reconcile.
    pub fn tick(&mut self, stage: &mut Stage, provider: &dyn TaskPlanProvider) -> ReconcileOutcome {
        self.reconciler.tick(stage, || provider.tickets())
    }

    #[must_use]
    pub fn reconciler(&self) -> &ListReconciler<TicketPresenter> {
        &self.reconciler
    }

    /// Card node of ticket `id`.
    #[must_use]
    pub fn card(&self, id: &str) -> Option<NodeId> {
        self.reconciler.node_for(id)
    }

    /// Nest this timeline's cleanup under `parent`.
    pub fn register_cleanup(&mut self, parent: &mut Janitor<Stage>) -> CleanupKey {
        self.reconciler.register_cleanup(parent)
    }

    pub fn teardown(&mut self, stage: &mut Stage) -> triptych_core::ReleaseReport {
        self.reconciler.teardown(stage)
    }
}
