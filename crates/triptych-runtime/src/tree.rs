#![forbid(unsafe_code)]

//! Project tree populator.
//!
//! Renders scanned project entries as indented rows. Configured roots are
//! always present: any root the scan does not report is prepended as a
//! folder, in configured order. Once the first build has happened the view
//! is ready, and from then on every tick consults the flag registry once to
//! recolor rows.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use triptych_core::{
    CleanupKey, Dim, Dim2, Janitor, NodeId, NodeSpec, ReleaseReport, SceneError, Stage, Tone,
};

use crate::config::TreeConfig;
use crate::provider::ProviderError;
use crate::reconciler::{
    ItemPresenter, ListReconciler, Presented, ReconcileOutcome, ReconcilerOptions,
};

/// One scanned path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    /// Slash-separated path relative to the project root.
    pub path: String,
    #[serde(default)]
    pub is_folder: bool,
}

impl TreeEntry {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_folder: false,
        }
    }

    pub fn folder(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_folder: true,
        }
    }

    /// Path without leading or trailing slashes.
    #[must_use]
    pub fn normalized(&self) -> &str {
        self.path.trim_matches('/')
    }

    /// Number of ancestors between this entry and the project root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.normalized()
            .split('/')
            .filter(|s| !s.is_empty())
            .count()
            .saturating_sub(1)
    }

    /// Last path segment.
    #[must_use]
    pub fn name(&self) -> &str {
        self.normalized().rsplit('/').next().unwrap_or("")
    }
}

/// A flagged item, as reported by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
    /// Full path; matches exactly that entry.
    Path(String),
    /// Bare name; matches every entry whose last segment equals it.
    Id(String),
}

/// Scans the project for tree entries.
pub trait ProjectScanner {
    fn entries(&self) -> Result<Vec<TreeEntry>, ProviderError>;
}

impl<F> ProjectScanner for F
where
    F: Fn() -> Result<Vec<TreeEntry>, ProviderError>,
{
    fn entries(&self) -> Result<Vec<TreeEntry>, ProviderError> {
        self()
    }
}

/// Reports which items are currently flagged.
pub trait FlagRegistry {
    fn flagged(&self) -> Result<Vec<Flag>, ProviderError>;
}

impl<F> FlagRegistry for F
where
    F: Fn() -> Result<Vec<Flag>, ProviderError>,
{
    fn flagged(&self) -> Result<Vec<Flag>, ProviderError> {
        self()
    }
}

/// Prepend every root missing from `entries`, as a folder, in root order.
///
/// Entries repeating an earlier normalized path are dropped; the first one
/// wins.
#[must_use]
pub fn with_roots(roots: &[String], entries: Vec<TreeEntry>) -> Vec<TreeEntry> {
    let mut seen: HashSet<String> = HashSet::with_capacity(entries.len() + roots.len());
    let entries: Vec<TreeEntry> = entries
        .into_iter()
        .filter(|e| seen.insert(e.normalized().to_owned()))
        .collect();
    let mut out: Vec<TreeEntry> = roots
        .iter()
        .map(|r| r.trim_matches('/'))
        .filter(|r| seen.insert((*r).to_owned()))
        .map(TreeEntry::folder)
        .collect();
    out.extend(entries);
    out
}

/// Builds indented tree rows.
#[derive(Debug, Clone)]
pub struct RowPresenter {
    indent: f64,
}

impl RowPresenter {
    #[must_use]
    pub fn new(indent: f64) -> Self {
        Self { indent }
    }

    /// Tone of a row when nothing flags it.
    #[must_use]
    pub fn base_tone(entry: &TreeEntry) -> Tone {
        if entry.is_folder {
            Tone::Accent
        } else {
            Tone::Neutral
        }
    }
}

impl ItemPresenter for RowPresenter {
    type Item = TreeEntry;

    fn key(&self, entry: &TreeEntry) -> String {
        entry.normalized().to_string()
    }

    fn tag(&self, entry: &TreeEntry) -> String {
        let kind = if entry.is_folder { 'd' } else { 'f' };
        format!("{kind}{}", entry.normalized())
    }

    fn present(
        &self,
        stage: &mut Stage,
        parent: NodeId,
        entry: &TreeEntry,
        order: i32,
    ) -> Result<Presented, SceneError> {
        let label = if entry.is_folder {
            format!("{}/", entry.name())
        } else {
            entry.name().to_string()
        };
        let indent = entry.depth() as f64 * self.indent;
        let root = stage.spawn(
            Some(parent),
            NodeSpec::text(format!("Row:{}", entry.normalized()), label)
                .position(Dim2::new(Dim::from_offset(indent), Dim::ZERO))
                .layout_order(order)
                .tone(Self::base_tone(entry)),
        )?;
        Ok(Presented { root, pulse: None })
    }
}

/// Result of a [`TreeView::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeTick {
    pub outcome: ReconcileOutcome,
    /// Rows currently flagged; `None` when the registry was not consulted.
    pub flagged: Option<usize>,
}

/// The left-panel project tree.
#[derive(Debug)]
pub struct TreeView {
    reconciler: ListReconciler<RowPresenter>,
    roots: Vec<String>,
    entries: Vec<TreeEntry>,
    ready: bool,
}

impl TreeView {
    pub fn new(stage: &mut Stage, mount: NodeId, config: &TreeConfig) -> Result<Self, SceneError> {
        let options = ReconcilerOptions {
            empty_text: config.empty_text.clone(),
            ..ReconcilerOptions::new("tree")
        };
        Ok(Self {
            reconciler: ListReconciler::new(
                stage,
                mount,
                RowPresenter::new(config.indent),
                options,
            )?,
            roots: config.roots.clone(),
            entries: Vec::new(),
            ready: false,
        })
    }

    /// Whether the initial build has completed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Scan, reconcile, then recolor from `flags` if ready.
    pub fn tick(
        &mut self,
        stage: &mut Stage,
        scanner: &dyn ProjectScanner,
        flags: &dyn FlagRegistry,
    ) -> TreeTick {
        let scanned = scanner.entries().unwrap_or_else(|err| {
            warn!(error = %err, "project scan failed; showing roots only");
            Vec::new()
        });
        let entries = with_roots(&self.roots, scanned);
        let outcome = self.reconciler.reconcile(stage, &entries);
        if !outcome.is_unchanged() {
            self.entries = entries;
        }
        if !self.ready {
            self.ready = true;
            debug!(rows = self.entries.len(), "project tree ready");
        }
        TreeTick {
            outcome,
            flagged: self.refresh_flags(stage, flags),
        }
    }

    /// Consult `registry` once and recolor rows. Returns the number of
    /// flagged rows, or `None` without touching the registry when the
    /// initial build has not happened yet.
    pub fn refresh_flags(&mut self, stage: &mut Stage, registry: &dyn FlagRegistry) -> Option<usize> {
        if !self.ready {
            return None;
        }
        Some(self.recolor(stage, registry))
    }

    fn recolor(&mut self, stage: &mut Stage, registry: &dyn FlagRegistry) -> usize {
        let flags = registry.flagged().unwrap_or_else(|err| {
            warn!(error = %err, "flag registry failed; treating nothing as flagged");
            Vec::new()
        });
        let mut paths = HashSet::new();
        let mut names = HashSet::new();
        for flag in &flags {
            match flag {
                Flag::Path(p) => paths.insert(p.trim_matches('/')),
                Flag::Id(n) => names.insert(n.as_str()),
            };
        }

        let mut count = 0;
        for entry in &self.entries {
            let Some(node) = self.reconciler.node_for(entry.normalized()) else {
                continue;
            };
            let flagged = paths.contains(entry.normalized()) || names.contains(entry.name());
            let tone = if flagged {
                count += 1;
                Tone::Flagged
            } else {
                RowPresenter::base_tone(entry)
            };
            stage.scene.set_tone(node, tone);
        }
        count
    }

    /// Row node for `path`.
    #[must_use]
    pub fn row(&self, path: &str) -> Option<NodeId> {
        self.reconciler.node_for(path.trim_matches('/'))
    }

    #[must_use]
    pub fn reconciler(&self) -> &ListReconciler<RowPresenter> {
        &self.reconciler
    }

    /// Nest this tree's cleanup under `parent`.
    pub fn register_cleanup(&mut self, parent: &mut Janitor<Stage>) -> CleanupKey {
        self.reconciler.register_cleanup(parent)
    }

    pub fn teardown(&mut self, stage: &mut Stage) -> ReleaseReport {
        self.ready = false;
        self.entries.clear();
        self.reconciler.teardown(stage)
    }
}
