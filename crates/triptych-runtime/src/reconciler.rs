#![forbid(unsafe_code)]

//! Signature-gated list reconciliation.
//!
//! A [`ListReconciler`] turns a pulled list of items into scene nodes under a
//! list frame. Every tick it recomputes the [`ContentSignature`] of the list;
//! if it matches the previous one nothing happens. Otherwise every node and
//! pulse from the previous build is released and the list is rebuilt from
//! scratch.
//!
//! # Invariants
//!
//! 1. Identical consecutive content performs zero node operations.
//! 2. Item nodes get strictly increasing display order matching list order.
//! 3. Every pulse started for an in-progress item is registered with the
//!    reconciler's janitor and cancelled before the next rebuild.
//! 4. An empty list shows the empty-state node, shrinks the spine, and starts
//!    no animations.
//!
//! # Failure Modes
//!
//! - A provider error is logged at `warn` and reconciled as an empty list.
//! - A presenter that fails to create a node stops the build; the nodes
//!   created so far stay registered and are released on the next rebuild.
//!   The signature is not stored, so the next tick retries the full list.
//!
//! # Cleanup
//!
//! The reconciler keeps two janitors: one for item nodes and pulses, cleared
//! on every rebuild, and one for the list structure whose first entry
//! releases the items. [`ListReconciler::register_cleanup`] moves the
//! structural janitor under an enclosing one, so releasing the enclosing
//! janitor removes the whole list.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, debug_span, warn};
use triptych_core::{
    CleanupKey, Dim, Dim2, Janitor, NodeId, NodeKind, NodeSpec, Property, PropertyValue,
    ReleaseReport, SceneError, Stage, Tone, TweenInfo,
};

use crate::provider::ProviderError;
use crate::signature::ContentSignature;

/// Nodes created for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presented {
    /// Root node of the item; destroying it removes the whole item.
    pub root: NodeId,
    /// Node whose opacity pulses while the item is in progress.
    pub pulse: Option<NodeId>,
}

/// Maps items of one kind to scene nodes.
pub trait ItemPresenter {
    type Item;

    /// Stable identity of an item.
    fn key(&self, item: &Self::Item) -> String;

    /// Signature tag; a change here forces a rebuild.
    fn tag(&self, item: &Self::Item) -> String;

    /// Create the nodes for `item` under `parent`.
    fn present(
        &self,
        stage: &mut Stage,
        parent: NodeId,
        item: &Self::Item,
        order: i32,
    ) -> Result<Presented, SceneError>;
}

/// Construction options for a [`ListReconciler`].
#[derive(Debug, Clone)]
pub struct ReconcilerOptions {
    /// Used in logs and node names.
    pub name: String,
    /// Text of the empty-state node.
    pub empty_text: String,
    /// Draw a vertical connecting line behind the items.
    pub spine: bool,
    /// Pulse animation applied to in-progress items.
    pub pulse: TweenInfo,
    /// Opacity the pulse swings down to.
    pub pulse_floor: f64,
}

impl ReconcilerOptions {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for ReconcilerOptions {
    fn default() -> Self {
        Self {
            name: "list".into(),
            empty_text: "Nothing here yet".into(),
            spine: false,
            pulse: TweenInfo::pulse(
                std::time::Duration::from_millis(600),
                triptych_core::Easing::SineInOut,
            ),
            pulse_floor: 0.35,
        }
    }
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Signature matched; nothing touched.
    Unchanged,
    /// Items were rebuilt.
    Rebuilt { created: usize, destroyed: usize },
    /// The list became empty; the empty state is showing.
    Empty { destroyed: usize },
}

impl ReconcileOutcome {
    #[must_use]
    pub fn is_unchanged(self) -> bool {
        self == Self::Unchanged
    }
}

impl fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unchanged => f.write_str("unchanged"),
            Self::Rebuilt { created, destroyed } => {
                write!(f, "rebuilt (+{created} -{destroyed})")
            }
            Self::Empty { destroyed } => write!(f, "empty (-{destroyed})"),
        }
    }
}

/// Running counters for a reconciler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub ticks: u64,
    pub rebuilds: u64,
    pub nodes_created: u64,
    pub nodes_destroyed: u64,
    pub provider_failures: u64,
}

/// A rendered item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedItem {
    pub key: String,
    pub node: NodeId,
    pub order: i32,
}

/// Collapsed height of the spine while the list is empty.
const SPINE_MIN: Dim2 = Dim2::new(Dim::from_offset(2.0), Dim::from_offset(0.0));
const SPINE_FULL: Dim2 = Dim2::new(Dim::from_offset(2.0), Dim::FULL);

/// Rebuilds a node list whenever its content signature changes.
pub struct ListReconciler<P: ItemPresenter> {
    presenter: P,
    options: ReconcilerOptions,
    list: NodeId,
    empty_state: NodeId,
    spine: Option<NodeId>,
    rendered: Vec<RenderedItem>,
    signature: Option<ContentSignature>,
    items: Rc<RefCell<Janitor<Stage>>>,
    structure: Janitor<Stage>,
    stats: ReconcileStats,
}

impl<P: ItemPresenter> fmt::Debug for ListReconciler<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListReconciler")
            .field("name", &self.options.name)
            .field("list", &self.list)
            .field("rendered", &self.rendered.len())
            .field("stats", &self.stats)
            .finish()
    }
}

impl<P: ItemPresenter> ListReconciler<P> {
    /// Create the list frame, empty-state node and optional spine under
    /// `mount`. Nothing is shown until the first tick.
    pub fn new(
        stage: &mut Stage,
        mount: NodeId,
        presenter: P,
        options: ReconcilerOptions,
    ) -> Result<Self, SceneError> {
        let items = Rc::new(RefCell::new(Janitor::new(format!("{}-items", options.name))));
        let mut structure = Janitor::new(format!("{}-structure", options.name));
        let shared = Rc::clone(&items);
        structure.add(format!("{}-items", options.name), move |stage: &mut Stage| {
            shared.borrow_mut().release_all(stage);
            Ok(())
        });
        let list = stage.spawn(Some(mount), NodeSpec::frame(format!("List:{}", options.name)))?;
        structure.add_node(list);

        let spine = if options.spine {
            Some(stage.spawn(
                Some(list),
                NodeSpec::new(NodeKind::Line, "Spine")
                    .size(SPINE_MIN)
                    .layout_order(0)
                    .tone(Tone::Muted),
            )?)
        } else {
            None
        };
        let empty_state = stage.spawn(
            Some(list),
            NodeSpec::text("EmptyState", options.empty_text.clone())
                .visible(false)
                .layout_order(0)
                .tone(Tone::Muted),
        )?;

        Ok(Self {
            presenter,
            items,
            options,
            list,
            empty_state,
            spine,
            rendered: Vec::new(),
            signature: None,
            structure,
            stats: ReconcileStats::default(),
        })
    }

    /// Pull content from `fetch` and reconcile it.
    pub fn tick<F>(&mut self, stage: &mut Stage, fetch: F) -> ReconcileOutcome
    where
        F: FnOnce() -> Result<Vec<P::Item>, ProviderError>,
    {
        let items = match fetch() {
            Ok(items) => items,
            Err(err) => {
                self.stats.provider_failures += 1;
                warn!(
                    reconciler = %self.options.name,
                    error = %err,
                    "content provider failed; showing empty state"
                );
                Vec::new()
            }
        };
        self.reconcile(stage, &items)
    }

    /// Reconcile an already-fetched list.
    pub fn reconcile(&mut self, stage: &mut Stage, items: &[P::Item]) -> ReconcileOutcome {
        let _span = debug_span!(
            "reconcile",
            reconciler = %self.options.name,
            items = items.len()
        )
        .entered();
        self.stats.ticks += 1;

        let signature = ContentSignature::from_tags(items.iter().map(|i| self.presenter.tag(i)));
        if self.signature.as_ref() == Some(&signature) {
            return ReconcileOutcome::Unchanged;
        }

        let destroyed = self.clear(stage);
        self.stats.rebuilds += 1;
        self.stats.nodes_destroyed += destroyed as u64;

        let mut complete = true;
        let outcome = if items.is_empty() {
            stage.scene.set_visible(self.empty_state, true);
            if let Some(spine) = self.spine {
                stage
                    .scene
                    .set_property(spine, Property::Size, PropertyValue::Dim2(SPINE_MIN));
            }
            ReconcileOutcome::Empty { destroyed }
        } else {
            stage.scene.set_visible(self.empty_state, false);
            if let Some(spine) = self.spine {
                stage
                    .scene
                    .set_property(spine, Property::Size, PropertyValue::Dim2(SPINE_FULL));
            }
            let created = self.build(stage, items);
            self.stats.nodes_created += created as u64;
            complete = created == items.len();
            ReconcileOutcome::Rebuilt { created, destroyed }
        };

        debug!(reconciler = %self.options.name, %outcome, "list reconciled");
        self.signature = complete.then_some(signature);
        outcome
    }

    fn build(&mut self, stage: &mut Stage, items: &[P::Item]) -> usize {
        for (index, item) in items.iter().enumerate() {
            let order = index as i32 + 1;
            let presented = match self.presenter.present(stage, self.list, item, order) {
                Ok(presented) => presented,
                Err(err) => {
                    warn!(
                        reconciler = %self.options.name,
                        error = %err,
                        "item creation failed; list truncated"
                    );
                    break;
                }
            };
            if let Some(target) = presented.pulse {
                let handle = stage.animate(
                    target,
                    &[(
                        Property::Opacity,
                        PropertyValue::Scalar(self.options.pulse_floor),
                    )],
                    self.options.pulse,
                );
                self.items.borrow_mut().add_animation(handle);
            }
            self.items.borrow_mut().add_node(presented.root);
            self.rendered.push(RenderedItem {
                key: self.presenter.key(item),
                node: presented.root,
                order,
            });
        }
        self.rendered.len()
    }

    fn clear(&mut self, stage: &mut Stage) -> usize {
        let destroyed = self.rendered.len();
        self.items.borrow_mut().release_all(stage);
        self.rendered.clear();
        destroyed
    }

    /// Release every item and structural node. Safe to call more than once.
    pub fn teardown(&mut self, stage: &mut Stage) -> ReleaseReport {
        self.rendered.clear();
        self.signature = None;
        let mut report = self.items.borrow_mut().release_all(stage);
        report.merge(self.structure.release_all(stage));
        report
    }

    /// Hand the list's cleanup to `parent`. Releasing `parent` then removes
    /// every item, pulse and structural node of this list.
    pub fn register_cleanup(&mut self, parent: &mut Janitor<Stage>) -> CleanupKey {
        let name = format!("{}-structure", self.options.name);
        let structure = std::mem::replace(&mut self.structure, Janitor::new(name));
        parent.add_child(structure)
    }

    /// Rendered items in display order.
    #[must_use]
    pub fn rendered(&self) -> &[RenderedItem] {
        &self.rendered
    }

    /// Root node of the item with `key`.
    #[must_use]
    pub fn node_for(&self, key: &str) -> Option<NodeId> {
        self.rendered.iter().find(|r| r.key == key).map(|r| r.node)
    }

    #[must_use]
    pub fn list_node(&self) -> NodeId {
        self.list
    }

    #[must_use]
    pub fn empty_state(&self) -> NodeId {
        self.empty_state
    }

    #[must_use]
    pub fn spine(&self) -> Option<NodeId> {
        self.spine
    }

    #[must_use]
    pub fn signature(&self) -> Option<&ContentSignature> {
        self.signature.as_ref()
    }

    #[must_use]
    pub fn stats(&self) -> ReconcileStats {
        self.stats
    }

    #[must_use]
    pub fn presenter(&self) -> &P {
        &self.presenter
    }
}
