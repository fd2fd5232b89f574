#![forbid(unsafe_code)]

//! Collapsible three-panel layout.
//!
//! # Role in Triptych
//! `triptych-layout` owns panel geometry. [`solve`] is a pure function from
//! weights and collapse flags to `{scale, offset}` placements;
//! [`CollapseMachine`] drives it from collapse/expand requests and container
//! resizes; [`PanelHost`] builds the panel nodes and exposes content mounts.
//!
//! # How it fits in the system
//! Content populators in `triptych-runtime` mount into
//! [`PanelHost::content_mount`] and never touch panel geometry. Panel
//! visibility and size change only through the machine.

pub mod collapse;
pub mod config;
pub mod host;
pub mod panel;
pub mod solver;

pub use collapse::{CollapseMachine, IgnoreReason, PanelNodes, PanelState, Transition};
pub use config::{LayoutConfig, PanelWeights};
pub use host::{HostError, PanelHost};
pub use panel::PanelId;
pub use solver::{LayoutSolution, PanelSpec, Placement, solve};
