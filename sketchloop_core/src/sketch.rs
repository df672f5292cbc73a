// Copyright 2026 the Sketchloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-sketch session.
//!
//! A [`Sketch`] is what a host creates when a sketch becomes visible and
//! disposes when the user navigates away. It owns one [`AnimationClock`], one
//! [`SketchRunner`], a [`FrameRateMonitor`] when controls are shown, and the
//! sketch's last reported layout bounds.
//!
//! Each frame the host calls [`on_frame`](Sketch::on_frame). Hosts that time
//! the frame phases separately call [`advance`](Sketch::advance) and
//! [`draw`](Sketch::draw) instead, which together do the same thing.

use kurbo::Rect;

use crate::capture::{CaptureBridge, CaptureCallback, CaptureError, CaptureRequest};
use crate::clock::{AnimationClock, TransitionSpec};
use crate::error::SketchError;
use crate::fps::FrameRateMonitor;
use crate::runner::{FrameOutcome, SketchRunner};
use crate::surface::{DrawSurface, SurfaceSize};
use crate::timing::FrameTick;
use crate::trace::{
    CaptureEvent, DrawEvent, FpsWindowEvent, FrameTickEvent, RegenerateEvent, Tracer,
    TransitionEvent,
};

/// Per-sketch invocation parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SketchParams {
    /// Clock units added per transition.
    pub speed: f64,
    /// Whether the frame-rate readout and capture control are shown.
    pub show_controls: bool,
    /// Shape of each clock transition.
    pub transition: TransitionSpec,
}

impl Default for SketchParams {
    fn default() -> Self {
        Self {
            speed: 1.0,
            show_controls: false,
            transition: TransitionSpec::default(),
        }
    }
}

impl SketchParams {
    /// Sets the clock speed.
    #[must_use]
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// Shows or hides the controls.
    #[must_use]
    pub fn with_controls(mut self, show_controls: bool) -> Self {
        self.show_controls = show_controls;
        self
    }

    /// Sets the transition shape.
    #[must_use]
    pub fn with_transition(mut self, transition: TransitionSpec) -> Self {
        self.transition = transition;
        self
    }
}

/// A running sketch: clock, runner, and optional controls.
#[derive(Debug)]
pub struct Sketch<R> {
    params: SketchParams,
    clock: AnimationClock,
    runner: R,
    fps: Option<FrameRateMonitor>,
    bounds: Option<Rect>,
    frame_index: u64,
    frames_rendered: u64,
    disposed: bool,
}

impl<R: SketchRunner> Sketch<R> {
    /// Creates a session and starts its clock.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::InvalidSpeed`] if `params.speed` is negative or
    /// not finite.
    pub fn new(params: SketchParams, runner: R) -> Result<Self, SketchError> {
        let mut clock = AnimationClock::new(params.transition);
        clock.start(params.speed)?;
        Ok(Self {
            params,
            clock,
            runner,
            fps: params.show_controls.then(FrameRateMonitor::new),
            bounds: None,
            frame_index: 0,
            frames_rendered: 0,
            disposed: false,
        })
    }

    /// Records the sketch's bounds in window coordinates.
    pub fn on_layout(&mut self, bounds: Rect) {
        if !self.disposed {
            self.bounds = Some(bounds);
        }
    }

    /// Advances the clock and renders one frame.
    pub fn on_frame(&mut self, tick: &FrameTick, surface: &mut dyn DrawSurface) -> FrameOutcome {
        self.on_frame_traced(tick, surface, &mut Tracer::none())
    }

    /// Like [`on_frame`](Self::on_frame), reporting events to `tracer`.
    pub fn on_frame_traced(
        &mut self,
        tick: &FrameTick,
        surface: &mut dyn DrawSurface,
        tracer: &mut Tracer<'_>,
    ) -> FrameOutcome {
        if self.disposed {
            return FrameOutcome::Disposed;
        }
        self.advance(tick, tracer);
        self.draw(surface, tracer)
    }

    /// Advances the clock and the frame-rate monitor to `tick`, returning the
    /// new clock time.
    pub fn advance(&mut self, tick: &FrameTick, tracer: &mut Tracer<'_>) -> f64 {
        if self.disposed {
            return self.clock.current_time();
        }
        self.frame_index = tick.frame_index;
        tracer.frame_tick(&FrameTickEvent::from(tick));

        let completed = self.clock.tick(tick.now);
        if completed > 0 {
            tracer.transition(&TransitionEvent {
                frame_index: tick.frame_index,
                completed,
                total: self.clock.completed_transitions(),
                time: self.clock.current_time(),
            });
        }

        if let Some(fps) = self.fps.as_mut().and_then(|m| m.on_frame(tick.now)) {
            tracer.fps_window(&FpsWindowEvent {
                frame_index: tick.frame_index,
                fps,
                now: tick.now,
            });
        }
        self.clock.current_time()
    }

    /// Renders the current clock time through the runner.
    pub fn draw(&mut self, surface: &mut dyn DrawSurface, tracer: &mut Tracer<'_>) -> FrameOutcome {
        if self.disposed {
            return FrameOutcome::Disposed;
        }
        let time = self.clock.current_time();
        let outcome = self.runner.render(time, surface);
        if outcome.presented() {
            self.frames_rendered += 1;
        }

        let size = surface.size();
        if let FrameOutcome::Regenerated(reason) = outcome {
            tracer.regenerate(&RegenerateEvent {
                frame_index: self.frame_index,
                reason,
                size,
            });
        }
        tracer.draw(&DrawEvent {
            frame_index: self.frame_index,
            runner: self.runner.kind(),
            outcome,
            time,
            size,
        });
        outcome
    }

    /// Asks `bridge` for the pixels inside the last reported bounds.
    ///
    /// Without a non-empty layout, `on_result` receives
    /// [`CaptureError::EmptyRegion`] before this returns.
    pub fn capture(&self, bridge: &mut dyn CaptureBridge, on_result: CaptureCallback) {
        self.capture_traced(bridge, on_result, &mut Tracer::none());
    }

    /// Like [`capture`](Self::capture), reporting the request to `tracer`.
    pub fn capture_traced(
        &self,
        bridge: &mut dyn CaptureBridge,
        on_result: CaptureCallback,
        tracer: &mut Tracer<'_>,
    ) {
        let request = self
            .capture_request()
            .filter(|request| !request.is_empty());
        tracer.capture(&CaptureEvent {
            frame_index: self.frame_index,
            request,
        });
        match request {
            Some(request) => bridge.request_capture(request, on_result),
            None => on_result(Err(CaptureError::EmptyRegion)),
        }
    }

    /// The request [`capture`](Self::capture) would make, if laid out.
    #[must_use]
    pub fn capture_request(&self) -> Option<CaptureRequest> {
        self.bounds
            .map(|bounds| CaptureRequest::new(bounds, SurfaceSize::from_kurbo(bounds.size())))
    }

    /// Cancels the clock and disposes the runner. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.clock.cancel();
        self.runner.dispose();
        self.bounds = None;
        self.disposed = true;
    }

    /// Frames per second of the last completed window, when controls are
    /// shown.
    #[must_use]
    pub fn fps(&self) -> Option<u64> {
        self.fps.as_ref().map(FrameRateMonitor::current_fps)
    }

    /// Current clock time.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.clock.current_time()
    }

    /// The session's clock.
    #[must_use]
    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    /// The session's runner.
    #[must_use]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Mutable access to the runner, e.g. to invalidate a cache.
    pub fn runner_mut(&mut self) -> &mut R {
        &mut self.runner
    }

    /// The parameters the session was created with.
    #[must_use]
    pub fn params(&self) -> &SketchParams {
        &self.params
    }

    /// Last reported layout bounds.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// Frames that reached the surface.
    #[must_use]
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Returns `true` once [`dispose`](Self::dispose) has been called.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use super::*;
    use crate::runner::test_support::{FloodRasterizer, RecordingSurface};
    use crate::runner::{CacheScope, CachedSketchRunner, RegenReason, StatelessSketchRunner};
    use crate::surface::{Color, PixelBuffer};
    use crate::time::{Duration, HostTime};
    use crate::timing::{FixedRateSource, FrameSource};

    type Slot = Rc<RefCell<Option<Result<PixelBuffer, CaptureError>>>>;

    fn result_slot() -> (Slot, CaptureCallback) {
        let slot: Slot = Rc::default();
        let sink = Rc::clone(&slot);
        (slot, Box::new(move |result| *sink.borrow_mut() = Some(result)))
    }

    /// Records requests and answers with a blank image of the source size.
    #[derive(Default)]
    struct FakeBridge {
        requests: Vec<CaptureRequest>,
    }

    impl CaptureBridge for FakeBridge {
        fn request_capture(&mut self, request: CaptureRequest, on_result: CaptureCallback) {
            self.requests.push(request);
            on_result(Ok(PixelBuffer::new(request.source_size)));
        }
    }

    fn blank(_: f64, _: &mut dyn DrawSurface) {}

    #[test]
    fn rejects_invalid_speed() {
        for speed in [-1.0, f64::NAN, f64::INFINITY] {
            let params = SketchParams::default().with_speed(speed);
            assert!(
                matches!(
                    Sketch::new(params, StatelessSketchRunner::new(blank)),
                    Err(SketchError::InvalidSpeed(_))
                ),
                "speed {speed} must be rejected"
            );
        }
    }

    #[test]
    fn default_params() {
        let params = SketchParams::default();
        assert_eq!(params.speed, 1.0);
        assert!(!params.show_controls);
        assert_eq!(params.transition, TransitionSpec::default());
    }

    #[test]
    fn time_advances_by_speed_per_transition() {
        let params = SketchParams::default().with_speed(2.0);
        let mut sketch = Sketch::new(params, StatelessSketchRunner::new(blank)).unwrap();
        let mut surface = RecordingSurface::new(10, 10);
        let mut source = FixedRateSource::new(HostTime::ZERO, Duration::from_millis(10));
        while sketch.clock().completed_transitions() < 2 {
            let outcome = sketch.on_frame(&source.next_tick(), &mut surface);
            assert_eq!(outcome, FrameOutcome::Drawn);
        }
        assert!((sketch.time() - 4.0).abs() < 1e-4, "got {}", sketch.time());
        assert_eq!(sketch.frames_rendered(), 1011, "two 5050ms periods at 10ms");
    }

    #[test]
    fn not_ready_surface_still_advances_clock() {
        let params = SketchParams::default().with_transition(TransitionSpec::linear_millis(100));
        let mut sketch = Sketch::new(params, StatelessSketchRunner::new(blank)).unwrap();
        let mut surface = RecordingSurface::new(0, 0);
        sketch.on_frame(&FrameTick::new(HostTime::ZERO, 0), &mut surface);
        let outcome = sketch.on_frame(&FrameTick::new(HostTime::from_millis(50), 1), &mut surface);
        assert_eq!(outcome, FrameOutcome::NotReady);
        assert_eq!(sketch.time(), 0.5);
        assert_eq!(sketch.frames_rendered(), 0);
    }

    #[test]
    fn fps_only_with_controls() {
        let sketch =
            Sketch::new(SketchParams::default(), StatelessSketchRunner::new(blank)).unwrap();
        assert_eq!(sketch.fps(), None);

        let params = SketchParams::default().with_controls(true);
        let mut sketch = Sketch::new(params, StatelessSketchRunner::new(blank)).unwrap();
        assert_eq!(sketch.fps(), Some(0));
        let mut surface = RecordingSurface::new(10, 10);
        let mut source = FixedRateSource::new(HostTime::ZERO, Duration::from_micros(16_667));
        for _ in 0..60 {
            sketch.on_frame(&source.next_tick(), &mut surface);
        }
        assert_eq!(sketch.fps(), Some(0), "window still open");
        sketch.on_frame(&source.next_tick(), &mut surface);
        assert_eq!(sketch.fps(), Some(60));
    }

    #[test]
    fn cached_sketch_regenerates_after_layout_change() {
        let runner = CachedSketchRunner::new(
            FloodRasterizer::default(),
            |_, s: &mut CacheScope<'_>| {
                s.surface().clear(Color::BLACK);
            },
        );
        let mut sketch = Sketch::new(SketchParams::default(), runner).unwrap();
        let mut surface = RecordingSurface::new(100, 100);
        let mut source = FixedRateSource::from_hz(60);

        let outcomes: Vec<_> = (0..3)
            .map(|_| sketch.on_frame(&source.next_tick(), &mut surface))
            .collect();
        assert_eq!(
            outcomes,
            [
                FrameOutcome::Regenerated(RegenReason::Initial),
                FrameOutcome::Blitted,
                FrameOutcome::Blitted,
            ]
        );

        sketch.runner_mut().invalidate();
        assert_eq!(
            sketch.on_frame(&source.next_tick(), &mut surface),
            FrameOutcome::Regenerated(RegenReason::Invalidated)
        );
        assert_eq!(sketch.runner().regenerations(), 2);
    }

    #[test]
    fn capture_without_layout_fails_immediately() {
        let sketch =
            Sketch::new(SketchParams::default(), StatelessSketchRunner::new(blank)).unwrap();
        let mut bridge = FakeBridge::default();
        let (slot, on_result) = result_slot();
        sketch.capture(&mut bridge, on_result);
        assert!(bridge.requests.is_empty());
        assert_eq!(*slot.borrow(), Some(Err(CaptureError::EmptyRegion)));
    }

    #[test]
    fn capture_uses_last_layout() {
        let mut sketch =
            Sketch::new(SketchParams::default(), StatelessSketchRunner::new(blank)).unwrap();
        sketch.on_layout(Rect::new(0.0, 0.0, 10.0, 10.0));
        sketch.on_layout(Rect::new(20.0, 40.0, 219.6, 340.2));

        let mut bridge = FakeBridge::default();
        let (slot, on_result) = result_slot();
        sketch.capture(&mut bridge, on_result);

        assert_eq!(
            bridge.requests,
            [CaptureRequest::new(
                Rect::new(20.0, 40.0, 219.6, 340.2),
                SurfaceSize::new(200, 300)
            )]
        );
        let delivered = slot.borrow_mut().take().unwrap().unwrap();
        assert_eq!(delivered.size(), SurfaceSize::new(200, 300));
    }

    #[test]
    fn zero_area_layout_is_empty_region() {
        let mut sketch =
            Sketch::new(SketchParams::default(), StatelessSketchRunner::new(blank)).unwrap();
        sketch.on_layout(Rect::new(5.0, 5.0, 5.0, 50.0));
        let mut bridge = FakeBridge::default();
        let (slot, on_result) = result_slot();
        sketch.capture(&mut bridge, on_result);
        assert!(bridge.requests.is_empty());
        assert_eq!(*slot.borrow(), Some(Err(CaptureError::EmptyRegion)));
    }

    #[test]
    fn dispose_is_idempotent_and_final() {
        let mut sketch =
            Sketch::new(SketchParams::default(), StatelessSketchRunner::new(blank)).unwrap();
        let mut surface = RecordingSurface::new(10, 10);
        sketch.on_frame(&FrameTick::new(HostTime::ZERO, 0), &mut surface);
        sketch.on_frame(&FrameTick::new(HostTime::from_millis(1000), 1), &mut surface);
        let frozen = sketch.time();
        let drawn = surface.ops.len();

        sketch.dispose();
        sketch.dispose();
        assert!(sketch.is_disposed());
        assert!(sketch.clock().is_cancelled());

        let outcome =
            sketch.on_frame(&FrameTick::new(HostTime::from_millis(4000), 2), &mut surface);
        assert_eq!(outcome, FrameOutcome::Disposed);
        assert_eq!(sketch.time(), frozen);
        assert_eq!(surface.ops.len(), drawn);

        sketch.on_layout(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(sketch.capture_request(), None);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn traced_frame_reports_events() {
        use crate::trace::TraceSink;

        #[derive(Default)]
        struct Counts {
            ticks: u64,
            transitions: u64,
            regenerations: Vec<RegenReason>,
            draws: Vec<FrameOutcome>,
            windows: Vec<u64>,
        }

        impl TraceSink for Counts {
            fn on_frame_tick(&mut self, _: &FrameTickEvent) {
                self.ticks += 1;
            }
            fn on_transition(&mut self, e: &TransitionEvent) {
                self.transitions += e.completed;
            }
            fn on_regenerate(&mut self, e: &RegenerateEvent) {
                self.regenerations.push(e.reason);
            }
            fn on_draw(&mut self, e: &DrawEvent) {
                self.draws.push(e.outcome);
            }
            fn on_fps_window(&mut self, e: &FpsWindowEvent) {
                self.windows.push(e.fps);
            }
        }

        let runner =
            CachedSketchRunner::new(FloodRasterizer::default(), |_, _: &mut CacheScope<'_>| {});
        let params = SketchParams::default()
            .with_controls(true)
            .with_transition(TransitionSpec::linear_millis(500));
        let mut sketch = Sketch::new(params, runner).unwrap();
        let mut surface = RecordingSurface::new(4, 4);
        let mut source = FixedRateSource::new(HostTime::ZERO, Duration::from_millis(100));
        let mut counts = Counts::default();
        {
            let mut tracer = Tracer::new(&mut counts);
            for _ in 0..11 {
                sketch.on_frame_traced(&source.next_tick(), &mut surface, &mut tracer);
            }
        }
        assert_eq!(counts.ticks, 11);
        assert_eq!(counts.transitions, 2);
        assert_eq!(counts.regenerations, [RegenReason::Initial]);
        assert_eq!(counts.draws.len(), 11);
        assert_eq!(counts.windows, [10]);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn capture_event_carries_the_tick_index() {
        use crate::trace::TraceSink;

        #[derive(Default)]
        struct Captures(Vec<u64>);

        impl TraceSink for Captures {
            fn on_capture(&mut self, e: &CaptureEvent) {
                self.0.push(e.frame_index);
            }
        }

        let mut sketch =
            Sketch::new(SketchParams::default(), StatelessSketchRunner::new(blank)).unwrap();
        let mut surface = RecordingSurface::new(0, 0);
        sketch.on_frame(&FrameTick::new(HostTime::from_millis(120), 7), &mut surface);
        assert_eq!(sketch.frames_rendered(), 0);

        sketch.on_layout(Rect::new(0.0, 0.0, 8.0, 8.0));
        let mut bridge = FakeBridge::default();
        let mut captures = Captures::default();
        let (_slot, on_result) = result_slot();
        sketch.capture_traced(&mut bridge, on_result, &mut Tracer::new(&mut captures));
        assert_eq!(captures.0, [7]);
    }
}
