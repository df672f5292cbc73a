// Copyright 2026 the Sketchloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Windowed frames-per-second counter.
//!
//! [`FrameRateMonitor`] counts frame ticks in fixed, back-to-back windows
//! (one second by default) and publishes the count of the last *completed*
//! window. It never reports a partial count: until the first window closes
//! the published rate is `0`.
//!
//! Windows are aligned to the first tick the monitor sees. A tick that
//! arrives after several windows have elapsed closes all of them at once:
//! the first publishes the frames it counted, and every later one was empty,
//! so the published rate ends up `0`.

use crate::time::{Duration, HostTime};

/// Default sampling window.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(1000);

/// Counts frames per sampling window.
#[derive(Clone, Debug)]
pub struct FrameRateMonitor {
    window: Duration,
    window_start: Option<HostTime>,
    frames_in_window: u64,
    current_fps: u64,
}

impl Default for FrameRateMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameRateMonitor {
    /// Creates a monitor with a one-second window.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_window(DEFAULT_WINDOW)
    }

    /// Creates a monitor with a custom window.
    ///
    /// # Panics
    ///
    /// Panics if `window` is zero.
    #[must_use]
    pub const fn with_window(window: Duration) -> Self {
        assert!(!window.is_zero(), "sampling window must not be zero");
        Self {
            window,
            window_start: None,
            frames_in_window: 0,
            current_fps: 0,
        }
    }

    /// Records a frame tick at `now`.
    ///
    /// Returns the published rate when this tick closed at least one window.
    pub fn on_frame(&mut self, now: HostTime) -> Option<u64> {
        let Some(start) = self.window_start else {
            self.window_start = Some(now);
            self.frames_in_window = 1;
            return None;
        };

        let elapsed = now.saturating_duration_since(start).nanos();
        let window = self.window.nanos();
        let mut published = None;
        if elapsed >= window {
            let closed = elapsed / window;
            self.current_fps = if closed == 1 {
                self.frames_in_window
            } else {
                0
            };
            self.window_start = Some(start + Duration(closed.saturating_mul(window)));
            self.frames_in_window = 0;
            published = Some(self.current_fps);
        }

        self.frames_in_window += 1;
        published
    }

    /// Frames counted in the last completed window; `0` before any completes.
    #[must_use]
    pub fn current_fps(&self) -> u64 {
        self.current_fps
    }

    /// Frames counted so far in the open window.
    #[must_use]
    pub fn frames_in_window(&self) -> u64 {
        self.frames_in_window
    }

    /// Sampling window length.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Start of the open window, once the first tick has been seen.
    #[must_use]
    pub fn window_start(&self) -> Option<HostTime> {
        self.window_start
    }
}
