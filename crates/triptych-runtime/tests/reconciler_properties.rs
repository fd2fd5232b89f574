//! Reconciler behavior driven through the timeline populator.

use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use tracing::Subscriber;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};
use triptych_core::{NodeSpec, Stage, Tone};
use triptych_runtime::{
    ProviderError, ReconcileOutcome, Ticket, TicketStatus, TimelineConfig, TimelineView,
};

struct WarnCapture {
    warnings: Arc<Mutex<Vec<String>>>,
}

impl<S: Subscriber> Layer<S> for WarnCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != tracing::Level::WARN {
            return;
        }

        struct MessageVisitor(String);

        impl tracing::field::Visit for MessageVisitor {
            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                if field.name() == "message" {
                    self.0 = format!("{value:?}");
                }
            }
        }

        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.warnings.lock().expect("capture lock").push(visitor.0);
    }
}

fn timeline() -> (Stage, TimelineView) {
    let mut stage = Stage::new();
    let mount = stage.spawn(None, NodeSpec::frame("Timeline")).unwrap();
    let view = TimelineView::new(&mut stage, mount, &TimelineConfig::default()).unwrap();
    (stage, view)
}

fn plan(tickets: Vec<Ticket>) -> impl Fn() -> Result<Vec<Ticket>, ProviderError> {
    move || Ok(tickets.clone())
}

fn status_strategy() -> impl Strategy<Value = TicketStatus> {
    prop_oneof![
        Just(TicketStatus::Pending),
        Just(TicketStatus::Running),
        Just(TicketStatus::Done),
        Just(TicketStatus::Failed),
        Just(TicketStatus::Retrying),
    ]
}

fn tickets(statuses: &[TicketStatus]) -> Vec<Ticket> {
    statuses
        .iter()
        .enumerate()
        .map(|(i, &s)| Ticket::new(i.to_string(), format!("step {i}"), s))
        .collect()
}

#[test]
fn identical_ticks_touch_nothing() {
    let (mut stage, mut view) = timeline();
    let provider = plan(tickets(&[TicketStatus::Pending, TicketStatus::Running]));
    view.tick(&mut stage, &provider);

    let created = stage.scene.created_count();
    let destroyed = stage.scene.destroyed_count();
    assert_eq!(view.tick(&mut stage, &provider), ReconcileOutcome::Unchanged);
    assert_eq!(stage.scene.created_count(), created);
    assert_eq!(stage.scene.destroyed_count(), destroyed);
}

#[test]
fn pending_to_done_replaces_the_card() {
    let (mut stage, mut view) = timeline();
    view.tick(
        &mut stage,
        &plan(vec![Ticket::new("1", "Index", TicketStatus::Pending)]),
    );
    let old = view.card("1").unwrap();

    let outcome = view.tick(
        &mut stage,
        &plan(vec![Ticket::new("1", "Index", TicketStatus::Done)]),
    );
    assert_eq!(
        outcome,
        ReconcileOutcome::Rebuilt {
            created: 1,
            destroyed: 1
        }
    );
    assert!(!stage.scene.contains(old));
    let new = view.card("1").unwrap();
    assert_ne!(new, old);
    assert_eq!(stage.scene.get(new).unwrap().tone, Tone::Success);
}

#[test]
fn empty_plan_shows_empty_state_without_animations() {
    let (mut stage, mut view) = timeline();
    view.tick(
        &mut stage,
        &plan(vec![Ticket::new("1", "Build", TicketStatus::Running)]),
    );
    assert_eq!(stage.animator.active_count(), 1);

    let outcome = view.tick(&mut stage, &plan(Vec::new()));
    assert_eq!(outcome, ReconcileOutcome::Empty { destroyed: 1 });
    let empty = view.reconciler().empty_state();
    assert!(stage.scene.get(empty).unwrap().visible);
    assert_eq!(stage.animator.active_count(), 0);
}

#[test]
fn provider_failure_is_logged_and_shows_empty_state() {
    let warnings = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(WarnCapture {
        warnings: Arc::clone(&warnings),
    });
    let _guard = tracing::subscriber::set_default(subscriber);
    tracing::callsite::rebuild_interest_cache();

    let (mut stage, mut view) = timeline();
    view.tick(
        &mut stage,
        &plan(vec![Ticket::new("1", "Build", TicketStatus::Done)]),
    );
    let failing = || -> Result<Vec<Ticket>, ProviderError> {
        Err(ProviderError::unavailable("plan service down"))
    };
    let outcome = view.tick(&mut stage, &failing);

    assert_eq!(outcome, ReconcileOutcome::Empty { destroyed: 1 });
    assert!(
        stage
            .scene
            .get(view.reconciler().empty_state())
            .unwrap()
            .visible
    );
    assert_eq!(view.reconciler().stats().provider_failures, 1);
    let warnings = warnings.lock().expect("capture lock");
    assert!(
        warnings.iter().any(|w| w.contains("content provider failed")),
        "warnings: {warnings:?}"
    );
}

#[test]
fn malformed_json_is_treated_as_empty() {
    let (mut stage, mut view) = timeline();
    let provider = || Ticket::parse_list("{ not json");
    let outcome = view.tick(&mut stage, &provider);
    assert_eq!(outcome, ReconcileOutcome::Empty { destroyed: 0 });
}

proptest! {
    #[test]
    fn rebuild_matches_content(
        first in prop::collection::vec(status_strategy(), 0..8),
        second in prop::collection::vec(status_strategy(), 0..8),
    ) {
        let (mut stage, mut view) = timeline();
        view.tick(&mut stage, &plan(tickets(&first)));
        view.tick(&mut stage, &plan(tickets(&second)));

        let rendered = view.reconciler().rendered();
        prop_assert_eq!(rendered.len(), second.len());
        prop_assert!(rendered.windows(2).all(|w| w[0].order < w[1].order));
        let pulsing = second.iter().filter(|s| s.is_in_progress()).count();
        prop_assert_eq!(stage.animator.active_count(), pulsing);

        let again = view.tick(&mut stage, &plan(tickets(&second)));
        prop_assert_eq!(again, ReconcileOutcome::Unchanged);
    }

    #[test]
    fn card_tone_follows_status(status in status_strategy()) {
        let (mut stage, mut view) = timeline();
        view.tick(&mut stage, &plan(tickets(&[status])));
        let card = view.card("0").unwrap();
        prop_assert_eq!(stage.scene.get(card).unwrap().tone, status.tone());
    }
}
