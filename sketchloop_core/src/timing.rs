// Copyright 2026 the Sketchloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-timing signal.
//!
//! The host delivers one [`FrameTick`] per display refresh. How ticks are
//! produced differs fundamentally across hosts (a `requestAnimationFrame`
//! callback, a Choreographer callback, a headless loop), so push-based hosts
//! simply call [`Sketch::on_frame`](crate::sketch::Sketch::on_frame) from
//! their callback. Hosts that *pull* frames (headless renderers, tests)
//! implement [`FrameSource`]; [`FixedRateSource`] is the synthetic one.

use crate::time::{Duration, HostTime};

/// A frame opportunity delivered by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameTick {
    /// Host time when the tick was generated.
    pub now: HostTime,
    /// Monotonically increasing frame counter.
    pub frame_index: u64,
}

impl FrameTick {
    /// Creates a tick.
    #[inline]
    #[must_use]
    pub const fn new(now: HostTime, frame_index: u64) -> Self {
        Self { now, frame_index }
    }
}

/// A pull-based source of frame ticks.
pub trait FrameSource {
    /// Returns the next tick. Timestamps never decrease between calls.
    fn next_tick(&mut self) -> FrameTick;
}

/// Emits ticks at a fixed interval starting from a given time.
///
/// Useful for headless rendering and for driving sketches deterministically
/// in tests.
#[derive(Clone, Debug)]
pub struct FixedRateSource {
    next: HostTime,
    interval: Duration,
    frame_index: u64,
}

impl FixedRateSource {
    /// Creates a source whose first tick is at `start`.
    #[must_use]
    pub const fn new(start: HostTime, interval: Duration) -> Self {
        Self {
            next: start,
            interval,
            frame_index: 0,
        }
    }

    /// Creates a source ticking at `hz` from time zero.
    ///
    /// # Panics
    ///
    /// Panics if `hz` is zero.
    #[must_use]
    pub const fn from_hz(hz: u32) -> Self {
        Self::new(HostTime::ZERO, Duration::from_hz(hz))
    }

    /// Returns the interval between ticks.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Skips ahead by `gap` without emitting ticks, as when the host stops
    /// delivering frames for a while.
    pub fn stall(&mut self, gap: Duration) {
        self.next += gap;
    }
}

impl FrameSource for FixedRateSource {
    fn next_tick(&mut self) -> FrameTick {
        let tick = FrameTick::new(self.next, self.frame_index);
        self.next += self.interval;
        self.frame_index += 1;
        tick
    }
}

impl Iterator for FixedRateSource {
    type Item = FrameTick;

    fn next(&mut self) -> Option<FrameTick> {
        Some(self.next_tick())
    }
}
