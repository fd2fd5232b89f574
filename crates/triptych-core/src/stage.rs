#![forbid(unsafe_code)]

//! The stage: a scene plus the animator that writes into it.
//!
//! Components receive `&mut Stage` for every mutation. A [`Janitor<Stage>`]
//! gains helpers to register scene nodes and animations for cleanup.

use std::time::Duration;

use crate::animation::{AnimationHandle, Animator, TweenInfo};
use crate::janitor::{CleanupKey, Janitor};
use crate::scene::{NodeId, NodeSpec, Property, PropertyValue, Scene, SceneError};

/// Scene and animator, advanced together.
#[derive(Debug, Default)]
pub struct Stage {
    pub scene: Scene,
    pub animator: Animator,
}

impl Stage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node.
    pub fn spawn(&mut self, parent: Option<NodeId>, spec: NodeSpec) -> Result<NodeId, SceneError> {
        self.scene.create(parent, spec)
    }

    /// Destroy a node subtree and cancel every animation driving it.
    ///
    /// Returns the number of nodes removed; zero if `id` was already gone.
    pub fn destroy(&mut self, id: NodeId) -> usize {
        let removed = self.scene.destroy(id);
        for node in &removed {
            self.animator.cancel_node(*node);
        }
        removed.len()
    }

    /// Start an animation on `node`. See [`Animator::animate`].
    pub fn animate(
        &mut self,
        node: NodeId,
        targets: &[(Property, PropertyValue)],
        info: TweenInfo,
    ) -> AnimationHandle {
        self.animator.animate(&self.scene, node, targets, info)
    }

    /// Advance animations by `dt`. Returns the number that finished.
    pub fn advance(&mut self, dt: Duration) -> usize {
        self.animator.advance(dt, &mut self.scene)
    }
}

impl Janitor<Stage> {
    /// Destroy `node` on release. Already-destroyed nodes are fine.
    pub fn add_node(&mut self, node: NodeId) -> CleanupKey {
        self.add(format!("node {node}"), move |stage: &mut Stage| {
            stage.destroy(node);
            Ok(())
        })
    }

    /// Cancel `handle` on release. Finished animations are fine.
    pub fn add_animation(&mut self, handle: AnimationHandle) -> CleanupKey {
        self.add(
            format!("animation {}", handle.get()),
            move |stage: &mut Stage| {
                stage.animator.cancel(handle);
                Ok(())
            },
        )
    }
}
