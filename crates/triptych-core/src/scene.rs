#![forbid(unsafe_code)]

//! Retained scene graph.
//!
//! [`Scene`] is an arena of [`Node`]s linked into a tree. It stands in for the
//! host engine's widget hierarchy: layout writes positions and sizes into it,
//! the animator interpolates its properties, and list reconcilers create and
//! destroy item nodes under a parent.
//!
//! # Invariants
//!
//! 1. Node ids are never reused. A destroyed id stays invalid forever, so a
//!    stale handle can never alias a newer node.
//! 2. Destroying a node destroys its whole subtree.
//! 3. Destroying a missing node is a no-op that returns an empty list.
//! 4. `created_count()` / `destroyed_count()` only ever grow.

use crate::geometry::Dim2;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a scene node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Raw numeric value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Structural role of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Plain container.
    Frame,
    /// Text label.
    Text,
    /// Clickable control.
    Button,
    /// Small status marker.
    Dot,
    /// Decorative line (timeline spine).
    Line,
}

/// Semantic color slot. Resolving tones to colors belongs to the theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[default]
    Neutral,
    Muted,
    Accent,
    Success,
    Warning,
    Danger,
    Flagged,
}

/// An animatable node property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Position,
    Size,
    /// 1.0 is fully visible, 0.0 fully transparent.
    Opacity,
}

/// The value of a [`Property`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue {
    Dim2(Dim2),
    Scalar(f64),
}

impl PropertyValue {
    /// Interpolate toward `to`. Returns `None` when the variants differ.
    #[must_use]
    pub fn lerp(self, to: Self, t: f64) -> Option<Self> {
        match (self, to) {
            (Self::Dim2(a), Self::Dim2(b)) => Some(Self::Dim2(a.lerp(b, t))),
            (Self::Scalar(a), Self::Scalar(b)) => Some(Self::Scalar(a + (b - a) * t)),
            _ => None,
        }
    }
}

/// Construction parameters for a node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    pub kind: NodeKind,
    pub name: String,
    pub visible: bool,
    pub position: Dim2,
    pub size: Dim2,
    pub opacity: f64,
    pub layout_order: i32,
    pub text: Option<String>,
    pub tone: Tone,
}

impl NodeSpec {
    /// A visible, full-size node of the given kind.
    #[must_use]
    pub fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            visible: true,
            position: Dim2::ZERO,
            size: Dim2::FULL,
            opacity: 1.0,
            layout_order: 0,
            text: None,
            tone: Tone::Neutral,
        }
    }

    #[must_use]
    pub fn frame(name: impl Into<String>) -> Self {
        Self::new(NodeKind::Frame, name)
    }

    #[must_use]
    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(NodeKind::Text, name).with_text(text)
    }

    #[must_use]
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    #[must_use]
    pub fn position(mut self, position: Dim2) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn size(mut self, size: Dim2) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn layout_order(mut self, order: i32) -> Self {
        self.layout_order = order;
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }
}

/// A live node in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub name: String,
    pub visible: bool,
    pub position: Dim2,
    pub size: Dim2,
    pub opacity: f64,
    pub layout_order: i32,
    pub text: Option<String>,
    pub tone: Tone,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    /// Parent node, `None` for roots.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in creation order.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Read an animatable property.
    #[must_use]
    pub fn property(&self, property: Property) -> PropertyValue {
        match property {
            Property::Position => PropertyValue::Dim2(self.position),
            Property::Size => PropertyValue::Dim2(self.size),
            Property::Opacity => PropertyValue::Scalar(self.opacity),
        }
    }

    /// Write an animatable property. Returns `false` on a type mismatch.
    pub fn set_property(&mut self, property: Property, value: PropertyValue) -> bool {
        match (property, value) {
            (Property::Position, PropertyValue::Dim2(v)) => self.position = v,
            (Property::Size, PropertyValue::Dim2(v)) => self.size = v,
            (Property::Opacity, PropertyValue::Scalar(v)) => self.opacity = v.clamp(0.0, 1.0),
            _ => return false,
        }
        true
    }
}

/// Errors from scene mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The requested parent does not exist (never created or destroyed).
    MissingParent { parent: NodeId },
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingParent { parent } => write!(f, "parent node {parent} does not exist"),
        }
    }
}

impl std::error::Error for SceneError {}

/// Arena of nodes.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: FxHashMap<NodeId, Node>,
    next_id: u64,
    created: u64,
    destroyed: u64,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node under `parent` (or as a root).
    pub fn create(&mut self, parent: Option<NodeId>, spec: NodeSpec) -> Result<NodeId, SceneError> {
        if let Some(parent) = parent
            && !self.nodes.contains_key(&parent)
        {
            return Err(SceneError::MissingParent { parent });
        }

        self.next_id += 1;
        let id = NodeId(self.next_id);
        let node = Node {
            kind: spec.kind,
            name: spec.name,
            visible: spec.visible,
            position: spec.position,
            size: spec.size,
            opacity: spec.opacity.clamp(0.0, 1.0),
            layout_order: spec.layout_order,
            text: spec.text,
            tone: spec.tone,
            parent,
            children: Vec::new(),
        };
        self.nodes.insert(id, node);
        if let Some(parent) = parent
            && let Some(p) = self.nodes.get_mut(&parent)
        {
            p.children.push(id);
        }
        self.created += 1;
        Ok(id)
    }

    /// Destroy `id` and its subtree. Returns every removed id (root first).
    ///
    /// Destroying a node that no longer exists returns an empty list.
    pub fn destroy(&mut self, id: NodeId) -> Vec<NodeId> {
        let Some(parent) = self.nodes.get(&id).map(|n| n.parent) else {
            return Vec::new();
        };
        if let Some(parent) = parent
            && let Some(p) = self.nodes.get_mut(&parent)
        {
            p.children.retain(|&c| c != id);
        }

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                stack.extend(node.children.iter().rev().copied());
                removed.push(next);
            }
        }
        self.destroyed += removed.len() as u64;
        removed
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Children of `id`, empty when the node is missing.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map_or(&[], |n| n.children())
    }

    /// Set visibility. Returns `false` if the node is missing.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> bool {
        self.nodes.get_mut(&id).map(|n| n.visible = visible).is_some()
    }

    /// Set tone. Returns `false` if the node is missing.
    pub fn set_tone(&mut self, id: NodeId, tone: Tone) -> bool {
        self.nodes.get_mut(&id).map(|n| n.tone = tone).is_some()
    }

    #[must_use]
    pub fn property(&self, id: NodeId, property: Property) -> Option<PropertyValue> {
        self.nodes.get(&id).map(|n| n.property(property))
    }

    /// Write a property. Returns `false` if the node is missing or the value
    /// has the wrong type.
    pub fn set_property(&mut self, id: NodeId, property: Property, value: PropertyValue) -> bool {
        self.nodes
            .get_mut(&id)
            .is_some_and(|n| n.set_property(property, value))
    }

    /// Number of live nodes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total nodes ever created.
    #[inline]
    #[must_use]
    pub fn created_count(&self) -> u64 {
        self.created
    }

    /// Total nodes ever destroyed.
    #[inline]
    #[must_use]
    pub fn destroyed_count(&self) -> u64 {
        self.destroyed
    }
}
