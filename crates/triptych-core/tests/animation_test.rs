//! Integration tests for tweens and the animator.

use proptest::prelude::*;
use std::time::Duration;
use triptych_core::animation::{Animation, Tween};
use triptych_core::{
    Dim, Dim2, Easing, LoopCount, NodeSpec, Property, PropertyValue, Stage, TweenInfo,
};

const MS_100: Duration = Duration::from_millis(100);

#[test]
fn many_small_ticks_complete_a_tween() {
    let mut tween = Tween::new(TweenInfo::new(Duration::from_secs(1)));
    for _ in 0..1000 {
        tween.tick(Duration::from_millis(1));
    }
    assert!(tween.is_complete(), "1000x1ms should complete a 1s tween");
}

#[test]
fn size_animation_lands_exactly_on_target() {
    let mut stage = Stage::new();
    let node = stage.spawn(None, NodeSpec::frame("panel")).unwrap();
    let target = Dim2::new(Dim::new(0.5, -6.0), Dim::FULL);
    stage.animate(
        node,
        &[(Property::Size, PropertyValue::Dim2(target))],
        TweenInfo::new(MS_100).easing(Easing::QuadOut),
    );
    for _ in 0..7 {
        stage.advance(Duration::from_millis(16));
    }
    assert_eq!(stage.scene.get(node).unwrap().size, target);
    assert_eq!(stage.animator.active_count(), 0);
}

#[test]
fn pulse_keeps_running_until_cancelled() {
    let mut stage = Stage::new();
    let dot = stage.spawn(None, NodeSpec::frame("dot")).unwrap();
    let pulse = stage.animate(
        dot,
        &[(Property::Opacity, PropertyValue::Scalar(0.3))],
        TweenInfo::pulse(Duration::from_millis(600), Easing::SineInOut),
    );
    for _ in 0..100 {
        stage.advance(Duration::from_millis(50));
    }
    assert!(stage.animator.is_active(pulse));
    assert!(stage.animator.cancel(pulse));
    assert!(!stage.animator.cancel(pulse));
}

proptest! {
    #[test]
    fn tween_value_stays_in_unit_range(
        duration_ms in 0u64..2_000,
        ticks in proptest::collection::vec(0u64..500, 0..40),
        reverses in any::<bool>(),
        repeats in 0u32..4,
    ) {
        let info = TweenInfo::new(Duration::from_millis(duration_ms))
            .easing(Easing::QuadInOut)
            .loop_count(LoopCount::Times(repeats))
            .reverses(reverses);
        let mut tween = Tween::new(info);
        for dt in ticks {
            tween.tick(Duration::from_millis(dt));
            let v = tween.value();
            prop_assert!((0.0..=1.0).contains(&v), "value {v} out of range");
        }
    }

    #[test]
    fn opacity_animation_never_leaves_bounds(
        target in 0.0f64..=1.0,
        ticks in proptest::collection::vec(1u64..200, 1..30),
    ) {
        let mut stage = Stage::new();
        let node = stage.spawn(None, NodeSpec::frame("n")).unwrap();
        stage.animate(
            node,
            &[(Property::Opacity, PropertyValue::Scalar(target))],
            TweenInfo::new(Duration::from_millis(300)).easing(Easing::CubicOut),
        );
        for dt in ticks {
            stage.advance(Duration::from_millis(dt));
            let opacity = stage.scene.get(node).unwrap().opacity;
            prop_assert!((0.0..=1.0).contains(&opacity));
        }
    }
}
