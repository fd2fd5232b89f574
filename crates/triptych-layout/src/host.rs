#![forbid(unsafe_code)]

//! Three-region panel host.
//!
//! [`PanelHost`] builds the panel frames inside a container node, hands out
//! per-panel content mounts, and funnels every collapse/expand through its
//! [`CollapseMachine`]. All nodes it creates are registered with its janitor;
//! content populators mounted into the host can register their own janitors
//! as children via [`PanelHost::janitor_mut`].

use std::fmt;
use std::time::Duration;

use tracing::{debug, info_span};
use triptych_core::{
    Janitor, NodeId, NodeKind, NodeSpec, ReleaseReport, SceneError, Stage, Tone,
};

use crate::collapse::{CollapseMachine, PanelNodes, PanelState, Transition};
use crate::config::LayoutConfig;
use crate::panel::PanelId;
use crate::solver::LayoutSolution;

/// Errors while creating a [`PanelHost`].
#[derive(Debug, Clone, PartialEq)]
pub enum HostError {
    /// The container node does not exist in the scene.
    MissingContainer { container: NodeId },
    /// The layout configuration failed validation.
    InvalidConfig(Vec<String>),
    /// A scene operation failed while building panels.
    Scene(SceneError),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingContainer { container } => {
                write!(f, "container node {container} does not exist")
            }
            Self::InvalidConfig(errors) => {
                write!(f, "invalid layout config: {}", errors.join("; "))
            }
            Self::Scene(err) => write!(f, "scene error: {err}"),
        }
    }
}

impl std::error::Error for HostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Scene(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SceneError> for HostError {
    fn from(err: SceneError) -> Self {
        Self::Scene(err)
    }
}

/// The three-panel container.
#[derive(Debug)]
pub struct PanelHost {
    container: NodeId,
    machine: CollapseMachine,
    janitor: Janitor<Stage>,
}

impl PanelHost {
    /// Build panels under `container` and place them.
    pub fn create(
        stage: &mut Stage,
        container: NodeId,
        config: LayoutConfig,
    ) -> Result<Self, HostError> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(HostError::InvalidConfig(errors));
        }
        if !stage.scene.contains(container) {
            return Err(HostError::MissingContainer { container });
        }

        let _span = info_span!("panel_host.create", container = container.get()).entered();
        let mut janitor = Janitor::new("panel-host");
        let mut built = Vec::with_capacity(PanelId::ALL.len());
        for id in PanelId::ALL {
            match build_panel(stage, container, id) {
                Ok(nodes) => {
                    janitor.add_node(nodes.frame);
                    built.push((id, nodes));
                }
                Err(err) => {
                    janitor.release_all(stage);
                    return Err(err.into());
                }
            }
        }

        let Ok(nodes) = <[(PanelId, PanelNodes); 3]>::try_from(built) else {
            unreachable!("one entry per PanelId");
        };
        let mut machine = CollapseMachine::new(config, nodes);
        machine.apply_initial_layout(stage);
        debug!(container = container.get(), "panel host created");

        Ok(Self {
            container,
            machine,
            janitor,
        })
    }

    #[must_use]
    pub fn container(&self) -> NodeId {
        self.container
    }

    /// Mount point for a content populator.
    #[must_use]
    pub fn content_mount(&self, id: PanelId) -> NodeId {
        self.nodes(id).content
    }

    /// All scene nodes of a panel.
    #[must_use]
    pub fn nodes(&self, id: PanelId) -> PanelNodes {
        match self.machine.nodes(id) {
            Some(nodes) => *nodes,
            None => unreachable!("host builds every PanelId"),
        }
    }

    #[must_use]
    pub fn is_collapsed(&self, id: PanelId) -> bool {
        self.machine.is_collapsed(id)
    }

    #[must_use]
    pub fn state(&self, id: PanelId) -> PanelState {
        self.machine.state(id)
    }

    pub fn collapse(&mut self, stage: &mut Stage, id: PanelId) -> Transition {
        self.machine.collapse(stage, id)
    }

    pub fn expand(&mut self, stage: &mut Stage, id: PanelId) -> Transition {
        self.machine.expand(stage, id)
    }

    pub fn toggle(&mut self, stage: &mut Stage, id: PanelId) -> Transition {
        self.machine.toggle(stage, id)
    }

    /// Route a click. See [`CollapseMachine::activate`].
    pub fn activate(&mut self, stage: &mut Stage, node: NodeId) -> Option<(PanelId, Transition)> {
        self.machine.activate(stage, node)
    }

    /// Returns how many transitions the resize applied.
    pub fn handle_resize(&mut self, stage: &mut Stage, width: f64) -> usize {
        self.machine.handle_resize(stage, width)
    }

    /// Run due deferred work. Animations are advanced by the stage owner.
    pub fn advance(&mut self, stage: &mut Stage, dt: Duration) -> usize {
        self.machine.advance(stage, dt)
    }

    #[must_use]
    pub fn solution(&self) -> &LayoutSolution {
        self.machine.solution()
    }

    #[must_use]
    pub fn layout_passes(&self) -> u64 {
        self.machine.layout_passes()
    }

    #[must_use]
    pub fn config(&self) -> &LayoutConfig {
        self.machine.config()
    }

    /// The host's janitor, for nesting content cleanup under the host.
    pub fn janitor_mut(&mut self) -> &mut Janitor<Stage> {
        &mut self.janitor
    }

    /// Cancel deferred work and release every registered resource.
    ///
    /// Safe to call more than once.
    pub fn teardown(&mut self, stage: &mut Stage) -> ReleaseReport {
        self.machine.cancel_pending(stage);
        self.janitor.release_all(stage)
    }
}

fn build_panel(stage: &mut Stage, container: NodeId, id: PanelId) -> Result<PanelNodes, SceneError> {
    let frame = stage.spawn(
        Some(container),
        NodeSpec::frame(format!("Panel:{id}")).layout_order(id.index() as i32),
    )?;
    build_panel_children(stage, frame, id).inspect_err(|_| {
        stage.destroy(frame);
    })
}

fn build_panel_children(
    stage: &mut Stage,
    frame: NodeId,
    id: PanelId,
) -> Result<PanelNodes, SceneError> {
    let content = stage.spawn(Some(frame), NodeSpec::frame("Content"))?;
    let indicator = stage.spawn(
        Some(frame),
        NodeSpec::new(NodeKind::Button, "CollapsedIndicator")
            .visible(false)
            .with_text(id.name())
            .tone(Tone::Muted),
    )?;
    let collapse_button = if id.is_protected() {
        None
    } else {
        Some(stage.spawn(
            Some(frame),
            NodeSpec::new(NodeKind::Button, "CollapseButton").with_text(match id {
                PanelId::Right => "»",
                _ => "«",
            }),
        )?)
    };
    Ok(PanelNodes {
        frame,
        content,
        indicator,
        collapse_button,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage_with_container() -> (Stage, NodeId) {
        let mut stage = Stage::new();
        let container = stage.spawn(None, NodeSpec::frame("Container")).unwrap();
        (stage, container)
    }

    #[test]
    fn create_builds_three_panels_under_container() {
        let (mut stage, container) = stage_with_container();
        let host = PanelHost::create(&mut stage, container, LayoutConfig::default()).unwrap();
        assert_eq!(stage.scene.children(container).len(), 3);
        for id in PanelId::ALL {
            let mount = host.content_mount(id);
            let frame = stage.scene.get(mount).unwrap().parent().unwrap();
            assert_eq!(stage.scene.get(frame).unwrap().parent(), Some(container));
            assert!(!host.is_collapsed(id));
        }
        assert!(host.nodes(PanelId::Center).collapse_button.is_none());
    }

    #[test]
    fn create_rejects_missing_container() {
        let (mut stage, container) = stage_with_container();
        stage.destroy(container);
        let err = PanelHost::create(&mut stage, container, LayoutConfig::default()).unwrap_err();
        assert_eq!(err, HostError::MissingContainer { container });
    }

    #[test]
    fn create_rejects_invalid_config() {
        let (mut stage, container) = stage_with_container();
        let config = LayoutConfig {
            collapsed_width: -3.0,
            ..LayoutConfig::default()
        };
        let err = PanelHost::create(&mut stage, container, config).unwrap_err();
        assert!(matches!(err, HostError::InvalidConfig(ref e) if e.len() == 1));
        assert!(err.to_string().contains("collapsed_width"));
        assert_eq!(stage.scene.len(), 1);
    }

    #[test]
    fn teardown_removes_panels_and_is_repeatable() {
        let (mut stage, container) = stage_with_container();
        let mut host = PanelHost::create(&mut stage, container, LayoutConfig::default()).unwrap();
        host.collapse(&mut stage, PanelId::Left);
        let report = host.teardown(&mut stage);
        assert!(report.is_clean());
        assert_eq!(report.released, 3);
        assert!(stage.scene.children(container).is_empty());
        assert_eq!(stage.animator.active_count(), 0);
        assert_eq!(host.teardown(&mut stage).attempted(), 0);
    }
}
