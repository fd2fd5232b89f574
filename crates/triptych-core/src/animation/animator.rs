#![forbid(unsafe_code)]

//! Property animator: tweens scene node properties toward targets.
//!
//! # Invariants
//!
//! 1. Each `(node, property)` pair is driven by at most one track. Starting a
//!    new animation on a pair removes that pair from any in-flight animation
//!    (last writer wins, no queuing).
//! 2. Interpolation starts from the property's value at the moment
//!    [`Animator::animate`] is called.
//! 3. [`Animator::cancel`] on a finished, cancelled, or orphaned handle is a
//!    no-op returning `false`.
//! 4. Tracks whose node has been destroyed are dropped on the next advance.

use std::time::Duration;

use tracing::trace;

use super::{Animation, Tween, TweenInfo};
use crate::scene::{NodeId, Property, PropertyValue, Scene};

/// Handle to a started animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationHandle(u64);

impl AnimationHandle {
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Track {
    property: Property,
    from: PropertyValue,
    to: PropertyValue,
}

#[derive(Debug)]
struct ActiveAnimation {
    handle: AnimationHandle,
    node: NodeId,
    tracks: Vec<Track>,
    tween: Tween,
}

/// Owns every in-flight animation and writes interpolated values on advance.
#[derive(Debug, Default)]
pub struct Animator {
    active: Vec<ActiveAnimation>,
    next_handle: u64,
}

impl Animator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start animating `targets` on `node`.
    ///
    /// Fire-and-forget: the returned handle is only needed for cancellation.
    /// Targets whose current value cannot be read (missing node) or whose
    /// type does not match the property are skipped; if nothing remains the
    /// handle is returned already finished.
    pub fn animate(
        &mut self,
        scene: &Scene,
        node: NodeId,
        targets: &[(Property, PropertyValue)],
        info: TweenInfo,
    ) -> AnimationHandle {
        self.next_handle += 1;
        let handle = AnimationHandle(self.next_handle);

        let mut tracks = Vec::with_capacity(targets.len());
        for &(property, to) in targets {
            let Some(from) = scene.property(node, property) else {
                continue;
            };
            if from.lerp(to, 0.0).is_none() {
                continue;
            }
            self.interrupt(node, property);
            tracks.retain(|t: &Track| t.property != property);
            tracks.push(Track { property, from, to });
        }

        if tracks.is_empty() {
            trace!(node = node.get(), "animate: nothing to drive");
            return handle;
        }

        self.active.push(ActiveAnimation {
            handle,
            node,
            tracks,
            tween: Tween::new(info),
        });
        handle
    }

    /// Stop an animation where it is. Returns `true` if it was running.
    pub fn cancel(&mut self, handle: AnimationHandle) -> bool {
        let before = self.active.len();
        self.active.retain(|a| a.handle != handle);
        self.active.len() != before
    }

    /// Stop every animation on `node`. Returns how many were stopped.
    pub fn cancel_node(&mut self, node: NodeId) -> usize {
        let before = self.active.len();
        self.active.retain(|a| a.node != node);
        before - self.active.len()
    }

    /// Whether `handle` is still running.
    #[must_use]
    pub fn is_active(&self, handle: AnimationHandle) -> bool {
        self.active.iter().any(|a| a.handle == handle)
    }

    /// Number of running animations.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of running animations driving `node`.
    #[must_use]
    pub fn active_on(&self, node: NodeId) -> usize {
        self.active.iter().filter(|a| a.node == node).count()
    }

    /// Advance every animation by `dt` and write the results into `scene`.
    ///
    /// Returns the number of animations that finished during this call.
    pub fn advance(&mut self, dt: Duration, scene: &mut Scene) -> usize {
        let mut finished = 0;
        self.active.retain_mut(|anim| {
            if !scene.contains(anim.node) {
                trace!(handle = anim.handle.get(), "animation target destroyed");
                return false;
            }
            anim.tween.tick(dt);
            let t = f64::from(anim.tween.value());
            for track in &anim.tracks {
                if let Some(value) = track.from.lerp(track.to, t) {
                    scene.set_property(anim.node, track.property, value);
                }
            }
            if anim.tween.is_complete() {
                finished += 1;
                false
            } else {
                true
            }
        });
        finished
    }

    /// Remove `property` on `node` from whichever animation drives it.
    fn interrupt(&mut self, node: NodeId, property: Property) {
        for anim in self.active.iter_mut().filter(|a| a.node == node) {
            anim.tracks.retain(|t| t.property != property);
        }
        self.active.retain(|a| !a.tracks.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Easing, LoopCount};
    use crate::geometry::{Dim, Dim2};
    use crate::scene::NodeSpec;

    const MS_100: Duration = Duration::from_millis(100);

    fn setup() -> (Scene, NodeId) {
        let mut scene = Scene::new();
        let node = scene.create(None, NodeSpec::frame("n")).unwrap();
        (scene, node)
    }

    fn opacity(scene: &Scene, node: NodeId) -> f64 {
        scene.get(node).unwrap().opacity
    }

    fn linear(d: Duration) -> TweenInfo {
        TweenInfo::new(d).easing(Easing::Linear)
    }

    #[test]
    fn interpolates_from_current_value() {
        let (mut scene, node) = setup();
        let mut animator = Animator::new();
        let h = animator.animate(
            &scene,
            node,
            &[(Property::Opacity, PropertyValue::Scalar(0.0))],
            linear(MS_100),
        );
        animator.advance(Duration::from_millis(50), &mut scene);
        assert!((opacity(&scene, node) - 0.5).abs() < 1e-3);
        assert_eq!(animator.advance(Duration::from_millis(50), &mut scene), 1);
        assert_eq!(opacity(&scene, node), 0.0);
        assert!(!animator.is_active(h));
    }

    #[test]
    fn last_writer_wins_per_property() {
        let (mut scene, node) = setup();
        let mut animator = Animator::new();
        let first = animator.animate(
            &scene,
            node,
            &[(Property::Opacity, PropertyValue::Scalar(0.0))],
            linear(MS_100),
        );
        animator.advance(Duration::from_millis(50), &mut scene);
        let second = animator.animate(
            &scene,
            node,
            &[(Property::Opacity, PropertyValue::Scalar(1.0))],
            linear(MS_100),
        );
        assert!(!animator.is_active(first));
        assert!(animator.is_active(second));
        assert_eq!(animator.active_on(node), 1);

        animator.advance(MS_100, &mut scene);
        assert_eq!(opacity(&scene, node), 1.0);
    }

    #[test]
    fn interrupt_keeps_other_tracks_running() {
        let (mut scene, node) = setup();
        let mut animator = Animator::new();
        let size = Dim2::new(Dim::from_offset(40.0), Dim::FULL);
        let both = animator.animate(
            &scene,
            node,
            &[
                (Property::Opacity, PropertyValue::Scalar(0.0)),
                (Property::Size, PropertyValue::Dim2(size)),
            ],
            linear(MS_100),
        );
        animator.animate(
            &scene,
            node,
            &[(Property::Opacity, PropertyValue::Scalar(0.5))],
            linear(MS_100),
        );
        assert!(animator.is_active(both));
        animator.advance(MS_100, &mut scene);
        assert_eq!(scene.get(node).unwrap().size, size);
        assert_eq!(opacity(&scene, node), 0.5);
    }

    #[test]
    fn cancel_is_safe_after_completion_and_destruction() {
        let (mut scene, node) = setup();
        let mut animator = Animator::new();
        let h = animator.animate(
            &scene,
            node,
            &[(Property::Opacity, PropertyValue::Scalar(0.0))],
            linear(MS_100),
        );
        animator.advance(Duration::from_secs(1), &mut scene);
        assert!(!animator.cancel(h));

        let looping = animator.animate(
            &scene,
            node,
            &[(Property::Opacity, PropertyValue::Scalar(1.0))],
            linear(MS_100).loop_count(LoopCount::Infinite),
        );
        scene.destroy(node);
        animator.advance(MS_100, &mut scene);
        assert_eq!(animator.active_count(), 0);
        assert!(!animator.cancel(looping));
    }

    #[test]
    fn animate_missing_node_returns_finished_handle() {
        let (mut scene, node) = setup();
        scene.destroy(node);
        let mut animator = Animator::new();
        let h = animator.animate(
            &scene,
            node,
            &[(Property::Opacity, PropertyValue::Scalar(0.0))],
            linear(MS_100),
        );
        assert!(!animator.is_active(h));
        assert!(!animator.cancel(h));
    }

    #[test]
    fn mismatched_value_type_is_skipped() {
        let (scene, node) = setup();
        let mut animator = Animator::new();
        let h = animator.animate(
            &scene,
            node,
            &[(Property::Size, PropertyValue::Scalar(0.0))],
            linear(MS_100),
        );
        assert!(!animator.is_active(h));
    }

    #[test]
    fn cancel_node_stops_everything_on_that_node() {
        let (scene, node) = setup();
        let mut animator = Animator::new();
        animator.animate(
            &scene,
            node,
            &[(Property::Opacity, PropertyValue::Scalar(0.0))],
            linear(MS_100),
        );
        animator.animate(
            &scene,
            node,
            &[(Property::Size, PropertyValue::Dim2(Dim2::ZERO))],
            linear(MS_100),
        );
        assert_eq!(animator.cancel_node(node), 2);
        assert_eq!(animator.active_count(), 0);
    }
}
