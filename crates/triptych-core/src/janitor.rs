#![forbid(unsafe_code)]

//! Scoped cleanup registry.
//!
//! A [`Janitor`] collects release actions for resources a component allocates
//! (scene nodes, animations, subscriptions, child janitors) and runs them all
//! at teardown. Actions receive the context explicitly (`&mut C`), so nothing
//! is captured behind the caller's back.
//!
//! # Invariants
//!
//! 1. Each registered action runs at most once.
//! 2. [`Janitor::release_all`] runs actions in registration order.
//! 3. A failing action (error or panic) is recorded and logged; the remaining
//!    actions still run.
//! 4. A second `release_all` finds nothing to do and reports zero work.
//!
//! # Failure Modes
//!
//! - Dropping a janitor that still holds actions logs a warning. The actions
//!   are discarded, since there is no context to run them against.

use std::borrow::Cow;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{debug, warn};

/// Failure reported by a release action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseError {
    message: String,
}

impl ReleaseError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ReleaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ReleaseError {}

type ReleaseAction<C> = Box<dyn FnOnce(&mut C) -> Result<(), ReleaseError>>;

/// Key of a registered action, for releasing or forgetting it early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CleanupKey(u64);

struct Entry<C> {
    key: CleanupKey,
    label: Cow<'static, str>,
    action: ReleaseAction<C>,
}

/// A failed release, as recorded in a [`ReleaseReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseFailure {
    pub label: String,
    pub reason: String,
}

/// Outcome of [`Janitor::release_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseReport {
    /// Actions that completed without error.
    pub released: usize,
    /// Actions that returned an error or panicked.
    pub failures: Vec<ReleaseFailure>,
}

impl ReleaseReport {
    /// Total actions attempted.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.released + self.failures.len()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: ReleaseReport) {
        self.released += other.released;
        self.failures.extend(other.failures);
    }
}

/// Ordered registry of release actions over a context `C`.
pub struct Janitor<C> {
    name: Cow<'static, str>,
    entries: Vec<Entry<C>>,
    next_key: u64,
}

impl<C> fmt::Debug for Janitor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Janitor")
            .field("name", &self.name)
            .field("pending", &self.entries.len())
            .finish()
    }
}

impl<C> Janitor<C> {
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            next_key: 0,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a release action.
    pub fn add(
        &mut self,
        label: impl Into<Cow<'static, str>>,
        action: impl FnOnce(&mut C) -> Result<(), ReleaseError> + 'static,
    ) -> CleanupKey {
        self.next_key += 1;
        let key = CleanupKey(self.next_key);
        self.entries.push(Entry {
            key,
            label: label.into(),
            action: Box::new(action),
        });
        key
    }

    /// Run one action now and unregister it.
    ///
    /// Returns `None` when the key is unknown or already released.
    pub fn release(&mut self, key: CleanupKey, ctx: &mut C) -> Option<Result<(), ReleaseFailure>> {
        let pos = self.entries.iter().position(|e| e.key == key)?;
        let entry = self.entries.remove(pos);
        Some(run_entry(&self.name, entry, ctx))
    }

    /// Unregister an action without running it.
    pub fn forget(&mut self, key: CleanupKey) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.key != key);
        self.entries.len() != before
    }

    /// Run every registered action in registration order.
    pub fn release_all(&mut self, ctx: &mut C) -> ReleaseReport {
        let entries = std::mem::take(&mut self.entries);
        let mut report = ReleaseReport::default();
        if entries.is_empty() {
            return report;
        }
        for entry in entries {
            match run_entry(&self.name, entry, ctx) {
                Ok(()) => report.released += 1,
                Err(failure) => report.failures.push(failure),
            }
        }
        debug!(
            janitor = %self.name,
            released = report.released,
            failed = report.failures.len(),
            "janitor released"
        );
        report
    }

    /// Number of pending actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<C: 'static> Janitor<C> {
    /// Nest `child` so that releasing `self` releases it too, at this
    /// registration position.
    pub fn add_child(&mut self, mut child: Janitor<C>) -> CleanupKey {
        let label = format!("janitor:{}", child.name);
        self.add(label, move |ctx| {
            let report = child.release_all(ctx);
            if report.is_clean() {
                Ok(())
            } else {
                Err(ReleaseError::new(format!(
                    "{} of {} child releases failed",
                    report.failures.len(),
                    report.attempted()
                )))
            }
        })
    }
}

impl<C> Drop for Janitor<C> {
    fn drop(&mut self) {
        if !self.entries.is_empty() {
            warn!(
                janitor = %self.name,
                pending = self.entries.len(),
                "janitor dropped with unreleased resources"
            );
        }
    }
}

fn run_entry<C>(janitor: &str, entry: Entry<C>, ctx: &mut C) -> Result<(), ReleaseFailure> {
    let Entry { label, action, .. } = entry;
    let outcome = catch_unwind(AssertUnwindSafe(|| action(ctx)));
    let reason = match outcome {
        Ok(Ok(())) => return Ok(()),
        Ok(Err(err)) => err.to_string(),
        Err(payload) => {
            if let Some(msg) = payload.downcast_ref::<&str>() {
                format!("panicked: {msg}")
            } else if let Some(msg) = payload.downcast_ref::<String>() {
                format!("panicked: {msg}")
            } else {
                "panicked".to_string()
            }
        }
    };
    warn!(janitor, resource = %label, %reason, "release action failed");
    Err(ReleaseFailure {
        label: label.into_owned(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn releases_in_registration_order() {
        let mut janitor: Janitor<Vec<&'static str>> = Janitor::new("order");
        janitor.add("a", |log| {
            log.push("a");
            Ok(())
        });
        janitor.add("b", |log| {
            log.push("b");
            Ok(())
        });
        janitor.add("c", |log| {
            log.push("c");
            Ok(())
        });
        let mut log = Vec::new();
        let report = janitor.release_all(&mut log);
        assert_eq!(log, vec!["a", "b", "c"]);
        assert_eq!(report.released, 3);
        assert!(report.is_clean());
    }

    #[test]
    fn second_release_all_is_a_no_op() {
        let mut janitor: Janitor<u32> = Janitor::new("twice");
        janitor.add("inc", |n| {
            *n += 1;
            Ok(())
        });
        let mut n = 0;
        janitor.release_all(&mut n);
        let second = janitor.release_all(&mut n);
        assert_eq!(n, 1);
        assert_eq!(second.attempted(), 0);
    }

    #[test]
    fn failure_does_not_stop_later_actions() {
        let mut janitor: Janitor<Vec<u8>> = Janitor::new("failing");
        janitor.add("first", |log| {
            log.push(1);
            Ok(())
        });
        janitor.add("broken", |_| Err(ReleaseError::new("already gone")));
        janitor.add("panicky", |_| panic!("boom"));
        janitor.add("last", |log| {
            log.push(4);
            Ok(())
        });
        let mut log = Vec::new();
        let report = janitor.release_all(&mut log);
        assert_eq!(log, vec![1, 4]);
        assert_eq!(report.released, 2);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].label, "broken");
        assert_eq!(report.failures[0].reason, "already gone");
        assert_eq!(report.failures[1].reason, "panicked: boom");
    }

    #[test]
    fn release_single_key_and_forget() {
        let mut janitor: Janitor<Vec<&'static str>> = Janitor::new("keys");
        let a = janitor.add("a", |log| {
            log.push("a");
            Ok(())
        });
        let b = janitor.add("b", |log| {
            log.push("b");
            Ok(())
        });
        let mut log = Vec::new();
        assert_eq!(janitor.release(a, &mut log), Some(Ok(())));
        assert_eq!(janitor.release(a, &mut log), None);
        assert!(janitor.forget(b));
        assert!(janitor.is_empty());
        janitor.release_all(&mut log);
        assert_eq!(log, vec!["a"]);
    }

    #[test]
    fn child_janitor_releases_at_its_position() {
        let mut parent: Janitor<Vec<&'static str>> = Janitor::new("parent");
        let mut child = Janitor::new("child");
        child.add("child-1", |log: &mut Vec<&'static str>| {
            log.push("child-1");
            Ok(())
        });
        parent.add("before", |log| {
            log.push("before");
            Ok(())
        });
        parent.add_child(child);
        parent.add("after", |log| {
            log.push("after");
            Ok(())
        });
        let mut log = Vec::new();
        let report = parent.release_all(&mut log);
        assert_eq!(log, vec!["before", "child-1", "after"]);
        assert_eq!(report.released, 3);
    }

    #[test]
    fn child_failures_surface_in_parent_report() {
        let mut parent: Janitor<()> = Janitor::new("parent");
        let mut child = Janitor::new("child");
        child.add("bad", |_: &mut ()| Err(ReleaseError::new("nope")));
        parent.add_child(child);
        let report = parent.release_all(&mut ());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].label, "janitor:child");
    }
}
