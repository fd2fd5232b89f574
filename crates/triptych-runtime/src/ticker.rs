#![forbid(unsafe_code)]

//! Tick delivery.
//!
//! # Design
//!
//! [`Ticker`] keeps its listeners as `Weak` references; the strong `Rc` lives
//! in the [`TickSubscription`] guard handed back by
//! [`TickSource::subscribe`]. Dropping or calling
//! [`TickSubscription::unsubscribe`] makes the listener unreachable, and dead
//! entries are pruned on the next tick.
//!
//! # Failure Modes
//!
//! - **Re-entrant tick**: a listener that calls [`Ticker::tick`] on the same
//!   ticker gets nothing delivered; the nested tick is logged and dropped so
//!   listeners never run concurrently with themselves.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{trace, warn};

type ListenerRc = Rc<RefCell<dyn FnMut()>>;
type ListenerWeak = Weak<RefCell<dyn FnMut()>>;

/// Something that delivers zero-argument ticks.
pub trait TickSource {
    /// Register `listener`. It runs on every tick until the returned guard is
    /// dropped.
    fn subscribe(&self, listener: Box<dyn FnMut()>) -> TickSubscription;
}

/// RAII guard for a tick listener.
pub struct TickSubscription {
    listener: Option<ListenerRc>,
}

impl TickSubscription {
    /// Stop receiving ticks.
    pub fn unsubscribe(mut self) {
        self.listener = None;
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.listener.is_some()
    }
}

impl fmt::Debug for TickSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickSubscription")
            .field("active", &self.is_active())
            .finish()
    }
}

#[derive(Default)]
struct TickerInner {
    listeners: RefCell<Vec<ListenerWeak>>,
    ticking: Cell<bool>,
    ticks: Cell<u64>,
    dropped: Cell<u64>,
}

/// In-process [`TickSource`]. Cloning shares the same listener list.
#[derive(Clone, Default)]
pub struct Ticker {
    inner: Rc<TickerInner>,
}

impl fmt::Debug for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ticker")
            .field("listeners", &self.inner.listeners.borrow().len())
            .field("ticks", &self.inner.ticks.get())
            .finish()
    }
}

struct TickingGuard<'a>(&'a Cell<bool>);

impl Drop for TickingGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl Ticker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one tick to every live listener, in subscription order.
    ///
    /// Returns the number of listeners called; zero for a re-entrant call.
    pub fn tick(&self) -> usize {
        if self.inner.ticking.get() {
            self.inner.dropped.set(self.inner.dropped.get() + 1);
            warn!("re-entrant tick dropped");
            return 0;
        }
        self.inner.ticking.set(true);
        let _guard = TickingGuard(&self.inner.ticking);

        let listeners: Vec<ListenerRc> = {
            let mut list = self.inner.listeners.borrow_mut();
            list.retain(|w| w.strong_count() > 0);
            list.iter().filter_map(Weak::upgrade).collect()
        };
        for listener in &listeners {
            (&mut *listener.borrow_mut())();
        }
        self.inner.ticks.set(self.inner.ticks.get() + 1);
        trace!(listeners = listeners.len(), "tick delivered");
        listeners.len()
    }

    /// Live listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .borrow()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Ticks delivered so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.inner.ticks.get()
    }

    /// Re-entrant ticks refused so far.
    #[must_use]
    pub fn dropped_ticks(&self) -> u64 {
        self.inner.dropped.get()
    }
}

impl TickSource for Ticker {
    fn subscribe(&self, listener: Box<dyn FnMut()>) -> TickSubscription {
        let strong: ListenerRc = Rc::new(RefCell::new(listener));
        self.inner
            .listeners
            .borrow_mut()
            .push(Rc::downgrade(&strong));
        TickSubscription {
            listener: Some(strong),
        }
    }
}
