// Copyright 2026 the Sketchloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use crate::surface::{Color, DrawSurface};

use super::{FrameOutcome, RunnerKind, SketchRunner};

/// Re-runs the draw callback from scratch every frame.
///
/// Each frame the surface is cleared to the background color and the callback
/// is invoked once with the clock time. Nothing is retained between frames.
pub struct StatelessSketchRunner<F> {
    draw: F,
    background: Color,
    disposed: bool,
}

impl<F> StatelessSketchRunner<F>
where
    F: FnMut(f64, &mut dyn DrawSurface),
{
    /// Creates a runner with a transparent background.
    #[must_use]
    pub fn new(draw: F) -> Self {
        Self {
            draw,
            background: Color::TRANSPARENT,
            disposed: false,
        }
    }

    /// Sets the color the surface is cleared to before each frame.
    #[must_use]
    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }
}

impl<F> SketchRunner for StatelessSketchRunner<F>
where
    F: FnMut(f64, &mut dyn DrawSurface),
{
    fn render(&mut self, time: f64, surface: &mut dyn DrawSurface) -> FrameOutcome {
        if self.disposed {
            return FrameOutcome::Disposed;
        }
        if surface.size().is_empty() {
            return FrameOutcome::NotReady;
        }
        surface.clear(self.background);
        (self.draw)(time, surface);
        FrameOutcome::Drawn
    }

    fn dispose(&mut self) {
        self.disposed = true;
    }

    fn kind(&self) -> RunnerKind {
        RunnerKind::Stateless
    }
}

impl<F> fmt::Debug for StatelessSketchRunner<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatelessSketchRunner")
            .field("background", &self.background)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use kurbo::Rect;

    use super::*;
    use crate::clock::AnimationClock;
    use crate::runner::test_support::{Op, RecordingSurface};
    use crate::time::{Duration, HostTime};
    use crate::timing::{FixedRateSource, FrameSource};

    #[test]
    fn clears_then_draws_every_frame() {
        let mut runner = StatelessSketchRunner::new(|_, s: &mut dyn DrawSurface| {
            s.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::BLACK);
        })
        .with_background(Color::WHITE);
        let mut surface = RecordingSurface::new(10, 10);

        assert_eq!(runner.render(0.0, &mut surface), FrameOutcome::Drawn);
        assert_eq!(runner.render(0.1, &mut surface), FrameOutcome::Drawn);
        assert_eq!(
            surface.ops,
            [
                Op::Clear(Color::WHITE),
                Op::Rect(Color::BLACK),
                Op::Clear(Color::WHITE),
                Op::Rect(Color::BLACK),
            ]
        );
    }

    #[test]
    fn recorded_times_rise_to_three_after_three_transitions() {
        let mut times = Vec::new();
        {
            let mut clock = AnimationClock::default();
            clock.start(1.0).unwrap();
            let mut runner = StatelessSketchRunner::new(|t, _: &mut dyn DrawSurface| times.push(t));
            let mut surface = RecordingSurface::new(100, 100);
            let mut source = FixedRateSource::new(HostTime::ZERO, Duration::from_millis(10));
            while clock.completed_transitions() < 3 {
                clock.tick(source.next_tick().now);
                runner.render(clock.current_time(), &mut surface);
            }
        }
        assert!(
            times.windows(2).all(|w| w[0] <= w[1]),
            "times must be non-decreasing"
        );
        let last = *times.last().unwrap();
        assert!((last - 3.0).abs() < 1e-4, "expected 3.0, got {last}");
    }

    #[test]
    fn empty_surface_is_not_ready() {
        let mut calls = 0;
        let mut runner = StatelessSketchRunner::new(|_, _: &mut dyn DrawSurface| calls += 1);
        let mut surface = RecordingSurface::new(0, 0);
        assert_eq!(runner.render(0.0, &mut surface), FrameOutcome::NotReady);
        assert!(surface.ops.is_empty());
        drop(runner);
        assert_eq!(calls, 0);
    }

    #[test]
    fn panicking_callback_propagates_and_runner_survives() {
        let mut frame = 0;
        let mut runner = StatelessSketchRunner::new(|_, _: &mut dyn DrawSurface| {
            frame += 1;
            assert!(frame != 2, "sketch bug on frame 2");
        });
        let mut surface = RecordingSurface::new(4, 4);

        assert_eq!(runner.render(0.0, &mut surface), FrameOutcome::Drawn);
        let result = catch_unwind(AssertUnwindSafe(|| runner.render(0.0, &mut surface)));
        assert!(result.is_err(), "panic must reach the caller");
        assert_eq!(runner.render(0.0, &mut surface), FrameOutcome::Drawn);
    }

    #[test]
    fn disposed_runner_draws_nothing() {
        let mut runner = StatelessSketchRunner::new(|_, _: &mut dyn DrawSurface| {});
        runner.dispose();
        let mut surface = RecordingSurface::new(4, 4);
        assert_eq!(runner.render(0.0, &mut surface), FrameOutcome::Disposed);
        assert!(surface.ops.is_empty());
        assert_eq!(runner.kind(), RunnerKind::Stateless);
    }
}
