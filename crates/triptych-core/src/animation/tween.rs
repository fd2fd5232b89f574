#![forbid(unsafe_code)]

//! Single eased interpolation with repeat and ping-pong reversal.
//!
//! # Invariants
//!
//! 1. `value()` is the eased position inside the current cycle; with
//!    `reverses` the second half of each cycle plays backwards.
//! 2. A finished tween rests on its final value: 1.0, or 0.0 when reversing.
//! 3. `LoopCount::Infinite` never completes.
//! 4. A zero duration is clamped to 1ns so progress is always defined.

use std::time::Duration;

use super::{Animation, Easing};

/// How many times a tween plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopCount {
    /// Play once.
    #[default]
    Once,
    /// Repeat a fixed number of times (total plays = times + 1).
    Times(u32),
    /// Loop forever.
    Infinite,
}

impl LoopCount {
    fn repeats(self) -> u32 {
        match self {
            Self::Once => 0,
            Self::Times(n) => n,
            Self::Infinite => u32::MAX,
        }
    }
}

/// Timing description for a tween.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenInfo {
    pub duration: Duration,
    pub easing: Easing,
    pub loop_count: LoopCount,
    /// Play back to the start after reaching the target, within each cycle.
    pub reverses: bool,
}

impl TweenInfo {
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            easing: Easing::default(),
            loop_count: LoopCount::Once,
            reverses: false,
        }
    }

    #[must_use]
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    #[must_use]
    pub fn loop_count(mut self, loop_count: LoopCount) -> Self {
        self.loop_count = loop_count;
        self
    }

    #[must_use]
    pub fn reverses(mut self, reverses: bool) -> Self {
        self.reverses = reverses;
        self
    }

    /// Infinite ping-pong, the shape of an attention pulse.
    #[must_use]
    pub fn pulse(half_period: Duration, easing: Easing) -> Self {
        Self::new(half_period)
            .easing(easing)
            .loop_count(LoopCount::Infinite)
            .reverses(true)
    }
}

impl Default for TweenInfo {
    fn default() -> Self {
        Self::new(Duration::from_millis(250))
    }
}

/// An eased 0→1 progress curve.
#[derive(Debug, Clone)]
pub struct Tween {
    info: TweenInfo,
    duration: Duration,
    elapsed: Duration,
    repeats_left: u32,
    complete: bool,
    overshoot: Duration,
}

impl Tween {
    #[must_use]
    pub fn new(info: TweenInfo) -> Self {
        let duration = if info.duration.is_zero() {
            Duration::from_nanos(1)
        } else {
            info.duration
        };
        Self {
            info,
            duration,
            elapsed: Duration::ZERO,
            repeats_left: info.loop_count.repeats(),
            complete: false,
            overshoot: Duration::ZERO,
        }
    }

    #[inline]
    #[must_use]
    pub fn info(&self) -> &TweenInfo {
        &self.info
    }

    fn cycle(&self) -> Duration {
        if self.info.reverses {
            self.duration.saturating_mul(2)
        } else {
            self.duration
        }
    }

    /// Linear position within the current cycle, before easing.
    fn raw_progress(&self) -> f32 {
        let t = (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()) as f32;
        if self.info.reverses && t > 1.0 {
            (2.0 - t).max(0.0)
        } else {
            t.min(1.0)
        }
    }
}

impl Animation for Tween {
    fn tick(&mut self, dt: Duration) {
        if self.complete {
            return;
        }
        let cycle = self.cycle();
        self.elapsed = self.elapsed.saturating_add(dt);

        if self.elapsed < cycle {
            return;
        }
        let elapsed = self.elapsed.as_nanos();
        let cycle_nanos = cycle.as_nanos();
        if self.info.loop_count == LoopCount::Infinite {
            self.elapsed = nanos(elapsed % cycle_nanos);
            return;
        }

        let whole = elapsed / cycle_nanos;
        if whole <= u128::from(self.repeats_left) {
            // `whole` fits in u32 here.
            self.repeats_left -= whole as u32;
            self.elapsed = nanos(elapsed % cycle_nanos);
        } else {
            let played = cycle_nanos * (u128::from(self.repeats_left) + 1);
            self.repeats_left = 0;
            self.overshoot = nanos(elapsed - played);
            self.elapsed = cycle;
            self.complete = true;
        }
    }

    fn is_complete(&self) -> bool {
        self.complete
    }

    fn value(&self) -> f32 {
        self.info.easing.apply(self.raw_progress())
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.repeats_left = self.info.loop_count.repeats();
        self.complete = false;
        self.overshoot = Duration::ZERO;
    }

    fn overshoot(&self) -> Duration {
        self.overshoot
    }
}

fn nanos(n: u128) -> Duration {
    Duration::from_nanos(u64::try_from(n).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_100: Duration = Duration::from_millis(100);
    const MS_50: Duration = Duration::from_millis(50);

    fn linear(d: Duration) -> TweenInfo {
        TweenInfo::new(d).easing(Easing::Linear)
    }

    #[test]
    fn once_completes_on_target() {
        let mut tween = Tween::new(linear(MS_100));
        tween.tick(MS_50);
        assert!((tween.value() - 0.5).abs() < 1e-3);
        assert!(!tween.is_complete());
        tween.tick(Duration::from_millis(80));
        assert!(tween.is_complete());
        assert_eq!(tween.value(), 1.0);
        assert_eq!(tween.overshoot(), Duration::from_millis(30));
    }

    #[test]
    fn reversing_tween_returns_to_start() {
        let mut tween = Tween::new(linear(MS_100).reverses(true));
        tween.tick(MS_100);
        assert!((tween.value() - 1.0).abs() < 1e-3);
        tween.tick(MS_50);
        assert!((tween.value() - 0.5).abs() < 1e-3);
        tween.tick(MS_50);
        assert!(tween.is_complete());
        assert_eq!(tween.value(), 0.0);
    }

    #[test]
    fn finite_repeats_play_extra_cycles() {
        let mut tween = Tween::new(linear(MS_100).loop_count(LoopCount::Times(2)));
        tween.tick(Duration::from_millis(250));
        assert!(!tween.is_complete());
        assert!((tween.value() - 0.5).abs() < 1e-3);
        tween.tick(MS_50);
        assert!(tween.is_complete());
    }

    #[test]
    fn infinite_never_completes_and_wraps() {
        let mut tween = Tween::new(TweenInfo::pulse(MS_100, Easing::Linear));
        tween.tick(Duration::from_secs(3600));
        assert!(!tween.is_complete());
        tween.tick(Duration::from_millis(150));
        assert!((tween.value() - 0.5).abs() < 1e-3);
    }

    #[test]
    fn huge_step_over_many_repeats_settles_at_once() {
        let info = linear(Duration::from_nanos(1)).loop_count(LoopCount::Times(u32::MAX));
        let mut tween = Tween::new(info);
        tween.tick(Duration::from_secs(60));
        assert!(tween.is_complete());
        let played = u64::from(u32::MAX) + 1;
        assert_eq!(
            tween.overshoot(),
            Duration::from_secs(60) - Duration::from_nanos(played)
        );

        let mut partial = Tween::new(linear(MS_100).loop_count(LoopCount::Times(1_000)));
        partial.tick(Duration::from_millis(50_050));
        assert!(!partial.is_complete());
        assert!((partial.value() - 0.5).abs() < 1e-3);
    }

    #[test]
    fn zero_duration_completes_on_first_tick() {
        let mut tween = Tween::new(linear(Duration::ZERO));
        tween.tick(Duration::from_nanos(1));
        assert!(tween.is_complete());
        assert_eq!(tween.value(), 1.0);
    }

    #[test]
    fn reset_restarts_progress() {
        let mut tween = Tween::new(linear(MS_100).loop_count(LoopCount::Times(1)));
        tween.tick(Duration::from_millis(500));
        assert!(tween.is_complete());
        tween.reset();
        assert!(!tween.is_complete());
        assert_eq!(tween.value(), 0.0);
    }
}
