#![forbid(unsafe_code)]

//! Core: relative geometry, the retained scene, animation, deferred tasks, and
//! scoped cleanup.
//!
//! # Role in Triptych
//! `triptych-core` holds the leaf primitives every other crate builds on. It
//! knows nothing about panels or lists.
//!
//! # Primary responsibilities
//! - **Dim / Dim2**: `{scale, offset}` lengths, the unit of every layout.
//! - **Scene**: retained node tree standing in for the host widget hierarchy.
//! - **Animator**: dt-driven, interruptible property tweens.
//! - **Scheduler**: cancellable deferred payloads.
//! - **Janitor**: ordered, failure-isolated release of owned resources.
//!
//! # How it fits in the system
//! `triptych-layout` solves panel geometry into `Dim2` values and animates
//! them on a [`Stage`]; `triptych-runtime` reconciles content lists into scene
//! nodes and tears them down through janitors.

pub mod animation;
pub mod geometry;
pub mod janitor;
pub mod scene;
pub mod schedule;
pub mod stage;

pub use animation::{AnimationHandle, Animator, Easing, LoopCount, TweenInfo};
pub use geometry::{Dim, Dim2, Span};
pub use janitor::{CleanupKey, Janitor, ReleaseError, ReleaseFailure, ReleaseReport};
pub use scene::{
    Node, NodeId, NodeKind, NodeSpec, Property, PropertyValue, Scene, SceneError, Tone,
};
pub use schedule::{Scheduler, TaskId};
pub use stage::Stage;
