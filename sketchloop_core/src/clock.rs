// Copyright 2026 the Sketchloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animation clock for sketches.
//!
//! [`AnimationClock`] advances a scalar time value as an unbounded chain of
//! fixed-duration transitions. Each transition adds `speed` to the value,
//! waits [`TransitionSpec::delay`], then interpolates over
//! [`TransitionSpec::duration`] through an [`Easing`] curve:
//!
//! ```text
//! value
//!   3s ┤                                          ╭──
//!   2s ┤                          ╭───────────────╯
//!   1s ┤          ╭───────────────╯
//!    0 ┼──────────╯
//!      └─delay─┴──duration──┴─delay─┴──duration──┴──► host time
//! ```
//!
//! The clock is driven by frame ticks rather than by accumulating
//! `speed * delta` every frame, so the value's rate is independent of frame
//! jitter. It is only linear in wall-clock time within one transition.
//! Consecutive transitions are chained back to back: when a tick lands past
//! the end of a transition, the overshoot is carried into the next one, so no
//! time is lost however irregular the ticks are.

use crate::easing::Easing;
use crate::error::SketchError;
use crate::time::{Duration, HostTime};

/// Shape of a single clock transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionSpec {
    duration: Duration,
    delay: Duration,
    easing: Easing,
}

impl TransitionSpec {
    /// Default interpolation time of one transition.
    pub const DEFAULT_DURATION: Duration = Duration::from_millis(5000);
    /// Default hold time before a transition starts interpolating.
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(50);

    /// Creates a transition spec.
    ///
    /// # Panics
    ///
    /// Panics if `duration` is zero.
    #[must_use]
    pub const fn tween(duration: Duration, delay: Duration, easing: Easing) -> Self {
        assert!(!duration.is_zero(), "transition duration must not be zero");
        Self {
            duration,
            delay,
            easing,
        }
    }

    /// Creates a linear transition of `duration_ms` milliseconds with no
    /// delay.
    ///
    /// # Panics
    ///
    /// Panics if `duration_ms` is zero.
    #[must_use]
    pub const fn linear_millis(duration_ms: u64) -> Self {
        Self::tween(
            Duration::from_millis(duration_ms),
            Duration::ZERO,
            Easing::Linear,
        )
    }

    /// Interpolation time of one transition; never zero.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Hold time before a transition starts interpolating.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Curve applied over [`duration`](Self::duration).
    #[must_use]
    pub const fn easing(&self) -> Easing {
        self.easing
    }

    /// Total host time taken by one transition, delay included.
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.delay.saturating_add(self.duration)
    }
}

impl Default for TransitionSpec {
    fn default() -> Self {
        Self::tween(
            Self::DEFAULT_DURATION,
            Self::DEFAULT_DELAY,
            Easing::Linear,
        )
    }
}

/// The transition currently in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Transition {
    from: f64,
    to: f64,
    /// Fixed by the first tick after the transition is scheduled.
    started: Option<HostTime>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum ClockState {
    Idle,
    Running(Transition),
    Cancelled,
}

/// A monotonically advancing animation time value.
///
/// Owned by exactly one sketch. Created idle at zero; [`start`](Self::start)
/// schedules the transition chain, each [`tick`](Self::tick) advances it to
/// the tick's host time, and [`cancel`](Self::cancel) freezes the value for
/// good.
///
/// ```
/// use sketchloop_core::clock::{AnimationClock, TransitionSpec};
/// use sketchloop_core::time::HostTime;
///
/// let mut clock = AnimationClock::new(TransitionSpec::linear_millis(1000));
/// clock.start(2.0).unwrap();
/// clock.tick(HostTime::from_millis(0));
/// clock.tick(HostTime::from_millis(500));
/// assert_eq!(clock.current_time(), 1.0);
/// ```
#[derive(Clone, Debug)]
pub struct AnimationClock {
    value: f64,
    speed: f64,
    spec: TransitionSpec,
    state: ClockState,
    completed: u64,
}

impl AnimationClock {
    /// Creates an idle clock at zero.
    #[must_use]
    pub const fn new(spec: TransitionSpec) -> Self {
        Self {
            value: 0.0,
            speed: 0.0,
            spec,
            state: ClockState::Idle,
            completed: 0,
        }
    }

    /// Starts (or restarts) the transition chain, adding `speed` per
    /// transition.
    ///
    /// The chain's origin is fixed by the next [`tick`](Self::tick). The
    /// current value is kept, so restarting never makes the clock jump.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::InvalidSpeed`] if `speed` is negative or not
    /// finite.
    pub fn start(&mut self, speed: f64) -> Result<(), SketchError> {
        if !speed.is_finite() || speed < 0.0 {
            return Err(SketchError::InvalidSpeed(speed));
        }
        self.speed = speed;
        self.state = ClockState::Running(Transition {
            from: self.value,
            to: self.value + speed,
            started: None,
        });
        Ok(())
    }

    /// Advances the clock to `now` and returns how many transitions completed
    /// during this tick.
    ///
    /// Does nothing unless the clock is running. Ticks earlier than the
    /// in-flight transition's start are treated as being at its start.
    pub fn tick(&mut self, now: HostTime) -> u64 {
        let ClockState::Running(mut transition) = self.state else {
            return 0;
        };
        let mut start = *transition.started.get_or_insert(now);
        let period = self.spec.period();

        let whole = now.saturating_duration_since(start).nanos() / period.nanos();
        if whole > 0 {
            let base = transition.from + self.speed * whole as f64;
            start += Duration(whole.saturating_mul(period.nanos()));
            transition = Transition {
                from: base,
                to: base + self.speed,
                started: Some(start),
            };
            self.completed = self.completed.saturating_add(whole);
        }

        let elapsed = now.saturating_duration_since(start);
        let spec = &self.spec;
        self.value = if elapsed <= spec.delay {
            transition.from
        } else {
            let fraction = (elapsed - spec.delay).nanos() as f64 / spec.duration.nanos() as f64;
            let eased = spec.easing.transform(fraction);
            transition.from + (transition.to - transition.from) * eased
        };
        self.state = ClockState::Running(transition);
        whole
    }

    /// Stops the transition chain. The value is kept and frozen; further
    /// ticks are ignored.
    pub fn cancel(&mut self) {
        self.state = ClockState::Cancelled;
    }

    /// The latest interpolated value.
    #[inline]
    #[must_use]
    pub fn current_time(&self) -> f64 {
        self.value
    }

    /// The value added per transition.
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Returns `true` between [`start`](Self::start) and
    /// [`cancel`](Self::cancel).
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self.state, ClockState::Running(_))
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self.state, ClockState::Cancelled)
    }

    /// Number of transitions completed since the clock was created.
    #[must_use]
    pub fn completed_transitions(&self) -> u64 {
        self.completed
    }

    /// The transition spec.
    #[must_use]
    pub fn spec(&self) -> &TransitionSpec {
        &self.spec
    }
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new(TransitionSpec::default())
    }
}
