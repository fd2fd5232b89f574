#![forbid(unsafe_code)]

//! Runtime: reactive list rendering and the assistant panel.
//!
//! # Role in Triptych
//! `triptych-runtime` turns polled external data into scene content. A
//! [`ListReconciler`] rebuilds a node list only when the list's
//! [`ContentSignature`] changes; [`TimelineView`] and [`TreeView`] are its two
//! populators. [`AssistantPanel`] mounts both on a
//! [`PanelHost`](triptych_layout::PanelHost) and drives them from a
//! [`TickSource`].
//!
//! # Ambient pieces
//! - [`config`]: [`AssistantConfig`] loaded from TOML or JSON.
//! - [`logging`]: global subscriber setup from `TRIPTYCH_LOG`.

pub mod config;
pub mod logging;
pub mod panel;
pub mod provider;
pub mod reconciler;
pub mod signature;
pub mod ticker;
pub mod timeline;
pub mod tree;

pub use config::{AssistantConfig, ConfigError, TimelineConfig, TreeConfig};
pub use panel::{AssistantPanel, PanelTick, Providers};
pub use provider::ProviderError;
pub use reconciler::{
    ItemPresenter, ListReconciler, Presented, ReconcileOutcome, ReconcileStats, ReconcilerOptions,
    RenderedItem,
};
pub use signature::{ContentSignature, SignatureBuilder};
pub use ticker::{TickSource, TickSubscription, Ticker};
pub use timeline::{TaskPlanProvider, Ticket, TicketPresenter, TicketStatus, TimelineView};
pub use tree::{
    Flag, FlagRegistry, ProjectScanner, RowPresenter, TreeEntry, TreeTick, TreeView, with_roots,
};
