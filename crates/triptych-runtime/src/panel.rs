#![forbid(unsafe_code)]

//! The assistant panel: project tree, chat mount and task timeline composed
//! on a [`PanelHost`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, info_span};
use triptych_core::{CleanupKey, Janitor, NodeId, ReleaseReport, Stage};
use triptych_layout::{HostError, PanelHost, PanelId, Transition};

use crate::config::AssistantConfig;
use crate::reconciler::ReconcileOutcome;
use crate::ticker::TickSource;
use crate::timeline::{TaskPlanProvider, TimelineView};
use crate::tree::{FlagRegistry, ProjectScanner, TreeTick, TreeView};

/// External data sources the panel polls.
pub struct Providers {
    pub scanner: Box<dyn ProjectScanner>,
    pub flags: Box<dyn FlagRegistry>,
    pub tasks: Box<dyn TaskPlanProvider>,
}

impl fmt::Debug for Providers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Providers").finish_non_exhaustive()
    }
}

/// What one panel tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelTick {
    pub tree: TreeTick,
    pub timeline: ReconcileOutcome,
}

/// Three-panel assistant view.
#[derive(Debug)]
pub struct AssistantPanel {
    host: PanelHost,
    tree: TreeView,
    timeline: TimelineView,
    providers: Providers,
    janitor: Janitor<Stage>,
    torn_down: bool,
}

impl AssistantPanel {
    /// Build the host under `container` and mount the populators.
    pub fn new(
        stage: &mut Stage,
        container: NodeId,
        config: AssistantConfig,
        providers: Providers,
    ) -> Result<Self, HostError> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(HostError::InvalidConfig(errors));
        }
        let _span = info_span!("assistant_panel.new", container = container.get()).entered();

        let mut host = PanelHost::create(stage, container, config.layout)?;
        let mut tree = match TreeView::new(stage, host.content_mount(PanelId::Left), &config.tree) {
            Ok(tree) => tree,
            Err(err) => {
                host.teardown(stage);
                return Err(err.into());
            }
        };
        tree.register_cleanup(host.janitor_mut());
        let mut timeline = match TimelineView::new(
            stage,
            host.content_mount(PanelId::Right),
            &config.timeline,
        ) {
            Ok(timeline) => timeline,
            Err(err) => {
                host.teardown(stage);
                return Err(err.into());
            }
        };
        timeline.register_cleanup(host.janitor_mut());

        debug!("assistant panel mounted");
        Ok(Self {
            host,
            tree,
            timeline,
            providers,
            janitor: Janitor::new("assistant-panel"),
            torn_down: false,
        })
    }

    /// Subscribe a shared panel to `source`.
    ///
    /// Each tick polls the providers and reconciles both lists. A tick that
    /// arrives while the panel or stage is already borrowed is skipped. The
    /// subscription is released by [`AssistantPanel::teardown`].
    pub fn attach(
        panel: &Rc<RefCell<Self>>,
        stage: &Rc<RefCell<Stage>>,
        source: &dyn TickSource,
    ) -> CleanupKey {
        let weak_panel = Rc::downgrade(panel);
        let weak_stage = Rc::downgrade(stage);
        let subscription = source.subscribe(Box::new(move || {
            let (Some(panel_rc), Some(stage_rc)) = (weak_panel.upgrade(), weak_stage.upgrade())
            else {
                return;
            };
            let (Ok(mut panel), Ok(mut stage)) = (panel_rc.try_borrow_mut(), stage_rc.try_borrow_mut())
            else {
                debug!("assistant panel busy; tick skipped");
                return;
            };
            panel.tick(&mut stage);
        }));
        panel
            .borrow_mut()
            .janitor
            .add("tick subscription", move |_: &mut Stage| {
                subscription.unsubscribe();
                Ok(())
            })
    }

    /// Poll every provider once and reconcile. `None` after teardown.
    pub fn tick(&mut self, stage: &mut Stage) -> Option<PanelTick> {
        if self.torn_down {
            return None;
        }
        let tree = self.tree.tick(
            stage,
            self.providers.scanner.as_ref(),
            self.providers.flags.as_ref(),
        );
        let timeline = self.timeline.tick(stage, self.providers.tasks.as_ref());
        Some(PanelTick { tree, timeline })
    }

    /// Forward a container width change to the host.
    pub fn resize(&mut self, stage: &mut Stage, width: f64) -> usize {
        self.host.handle_resize(stage, width)
    }

    /// Route a click to the host.
    pub fn activate(&mut self, stage: &mut Stage, node: NodeId) -> Option<(PanelId, Transition)> {
        self.host.activate(stage, node)
    }

    /// Advance animations and deferred panel work by `dt`.
    pub fn advance(&mut self, stage: &mut Stage, dt: Duration) -> usize {
        stage.advance(dt);
        self.host.advance(stage, dt)
    }

    /// Where the chat stream mounts its content.
    #[must_use]
    pub fn chat_mount(&self) -> NodeId {
        self.host.content_mount(PanelId::Center)
    }

    #[must_use]
    pub fn host(&self) -> &PanelHost {
        &self.host
    }

    #[must_use]
    pub fn tree(&self) -> &TreeView {
        &self.tree
    }

    #[must_use]
    pub fn timeline(&self) -> &TimelineView {
        &self.timeline
    }

    /// Registry for resources owned alongside the panel, such as the chat
    /// content.
    pub fn janitor_mut(&mut self) -> &mut Janitor<Stage> {
        &mut self.janitor
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Release subscriptions, then the host together with both lists nested
    /// under it. Safe to call twice.
    pub fn teardown(&mut self, stage: &mut Stage) -> ReleaseReport {
        self.torn_down = true;
        let mut report = self.janitor.release_all(stage);
        report.merge(self.host.teardown(stage));
        debug!(
            released = report.released,
            failed = report.failures.len(),
            "assistant panel torn down"
        );
        report
    }
}
