#![forbid(unsafe_code)]

//! Deferred, cancellable tasks on a dt-driven clock.
//!
//! A [`Scheduler`] holds payloads that become due after a delay. Payloads are
//! plain data, not closures: the owner decides what a due payload means when
//! it drains them, which lets it re-check current state before acting.
//!
//! # Invariants
//!
//! 1. Due payloads are returned in due-time order; ties keep scheduling order.
//! 2. A cancelled task is never returned.
//! 3. Cancelling an unknown or already-fired task returns `false`.

use std::time::Duration;

/// Identifier of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

#[derive(Debug)]
struct Pending<T> {
    id: TaskId,
    due: Duration,
    payload: T,
}

/// A timer queue keyed by elapsed time since creation.
#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    pending: Vec<Pending<T>>,
    next_id: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            pending: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T> Scheduler<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `payload` to become due after `delay`.
    pub fn schedule(&mut self, delay: Duration, payload: T) -> TaskId {
        self.next_id += 1;
        let id = TaskId(self.next_id);
        let due = self.now.saturating_add(delay);
        // Keep sorted by due time; equal due times stay in insertion order.
        let pos = self.pending.partition_point(|p| p.due <= due);
        self.pending.insert(pos, Pending { id, due, payload });
        id
    }

    /// Cancel a pending task. Returns `true` if it was still pending.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    /// Advance the clock and drain every payload now due.
    pub fn advance(&mut self, dt: Duration) -> Vec<T> {
        self.now = self.now.saturating_add(dt);
        let split = self.pending.partition_point(|p| p.due <= self.now);
        self.pending.drain(..split).map(|p| p.payload).collect()
    }

    /// Whether `id` is still waiting.
    #[must_use]
    pub fn is_pending(&self, id: TaskId) -> bool {
        self.pending.iter().any(|p| p.id == id)
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Elapsed scheduler time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Drop every pending task.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
