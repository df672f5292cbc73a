// Copyright 2026 the Sketchloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the sketch loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! [`Sketch`](crate::sketch::Sketch) and hosts call at each stage of a frame.
//! All method bodies default to no-ops, so implementing only the events you
//! care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! Phase timing needs a clock the core does not have, so hosts emit
//! [`PhaseBeginEvent`]/[`PhaseEndEvent`] around the calls they time and
//! collect them with [`FrameSummaryBuilder`].

use crate::capture::CaptureRequest;
use crate::runner::{FrameOutcome, RegenReason, RunnerKind};
use crate::surface::SurfaceSize;
use crate::time::HostTime;
use crate::timing::FrameTick;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which phase of a sketch frame is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Advancing the animation clock and the frame-rate monitor.
    Clock,
    /// Running the sketch runner (callback, rasterization, blit).
    Draw,
    /// Handing the finished frame to the display or an encoder.
    Present,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a sketch receives a frame tick.
#[derive(Clone, Copy, Debug)]
pub struct FrameTickEvent {
    /// Monotonic frame counter.
    pub frame_index: u64,
    /// Host time of the tick.
    pub now: HostTime,
}

impl From<&FrameTick> for FrameTickEvent {
    fn from(tick: &FrameTick) -> Self {
        Self {
            frame_index: tick.frame_index,
            now: tick.now,
        }
    }
}

/// Emitted when one or more clock transitions complete during a tick.
#[derive(Clone, Copy, Debug)]
pub struct TransitionEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Transitions completed by this tick.
    pub completed: u64,
    /// Transitions completed since the clock started.
    pub total: u64,
    /// Clock time after the tick.
    pub time: f64,
}

/// Emitted when a cached runner regenerates its bitmap.
#[derive(Clone, Copy, Debug)]
pub struct RegenerateEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Why the bitmap was regenerated.
    pub reason: RegenReason,
    /// Size of the new bitmap.
    pub size: SurfaceSize,
}

/// Emitted after the runner handled a frame.
#[derive(Clone, Copy, Debug)]
pub struct DrawEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which runner drew.
    pub runner: RunnerKind,
    /// What the runner did.
    pub outcome: FrameOutcome,
    /// Clock time handed to the callback.
    pub time: f64,
    /// Surface size for the frame.
    pub size: SurfaceSize,
}

/// Emitted when the frame-rate monitor closes a sampling window.
#[derive(Clone, Copy, Debug)]
pub struct FpsWindowEvent {
    /// Frame counter of the tick that closed the window.
    pub frame_index: u64,
    /// Frames counted in the window.
    pub fps: u64,
    /// Host time of the closing tick.
    pub now: HostTime,
}

/// Marks the beginning of a frame phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
    /// Host time at the start of the phase.
    pub timestamp: HostTime,
}

/// Marks the end of a frame phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
    /// Host time at the end of the phase.
    pub timestamp: HostTime,
}

/// Emitted when a capture is handed to the bridge.
#[derive(Clone, Copy, Debug)]
pub struct CaptureEvent {
    /// Index of the last frame tick the sketch received.
    pub frame_index: u64,
    /// The request passed to the bridge, or `None` if there was no layout.
    pub request: Option<CaptureRequest>,
}

/// Per-frame timing summary produced by [`FrameSummaryBuilder`].
#[derive(Clone, Copy, Debug)]
pub struct FrameSummary {
    /// Frame counter.
    pub frame_index: u64,
    /// Host time of the tick.
    pub now: HostTime,
    /// Clock time handed to the callback.
    pub time: f64,
    /// What the runner did, if it ran.
    pub outcome: Option<FrameOutcome>,
    /// Clock phase duration in nanoseconds (0 if not measured).
    pub clock_nanos: u64,
    /// Draw phase duration in nanoseconds (0 if not measured).
    pub draw_nanos: u64,
    /// Present phase duration in nanoseconds (0 if not measured).
    pub present_nanos: u64,
}

impl FrameSummary {
    /// Sum of all measured phases.
    #[must_use]
    pub fn total_nanos(&self) -> u64 {
        self.clock_nanos
            .saturating_add(self.draw_nanos)
            .saturating_add(self.present_nanos)
    }
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the sketch loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a sketch receives a frame tick.
    fn on_frame_tick(&mut self, e: &FrameTickEvent) {
        _ = e;
    }

    /// Called when clock transitions complete.
    fn on_transition(&mut self, e: &TransitionEvent) {
        _ = e;
    }

    /// Called when a cached runner regenerates.
    fn on_regenerate(&mut self, e: &RegenerateEvent) {
        _ = e;
    }

    /// Called after the runner handled a frame.
    fn on_draw(&mut self, e: &DrawEvent) {
        _ = e;
    }

    /// Called when a sampling window closes.
    fn on_fps_window(&mut self, e: &FpsWindowEvent) {
        _ = e;
    }

    /// Called at the beginning of a frame phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a frame phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called when a capture is requested.
    fn on_capture(&mut self, e: &CaptureEvent) {
        _ = e;
    }

    /// Called with a per-frame timing summary.
    fn on_frame_summary(&mut self, s: &FrameSummary) {
        _ = s;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

/// Generates a `Tracer` method forwarding one event to the sink.
macro_rules! forward {
    ($(#[$attr:meta])* $name:ident, $sink_method:ident, $event:ty) => {
        $(#[$attr])*
        #[inline]
        pub fn $name(&mut self, e: &$event) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$sink_method(e);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = e;
            }
        }
    };
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    forward!(
        /// Emits a [`FrameTickEvent`].
        frame_tick, on_frame_tick, FrameTickEvent
    );
    forward!(
        /// Emits a [`TransitionEvent`].
        transition, on_transition, TransitionEvent
    );
    forward!(
        /// Emits a [`RegenerateEvent`].
        regenerate, on_regenerate, RegenerateEvent
    );
    forward!(
        /// Emits a [`DrawEvent`].
        draw, on_draw, DrawEvent
    );
    forward!(
        /// Emits a [`FpsWindowEvent`].
        fps_window, on_fps_window, FpsWindowEvent
    );
    forward!(
        /// Emits a [`PhaseBeginEvent`].
        phase_begin, on_phase_begin, PhaseBeginEvent
    );
    forward!(
        /// Emits a [`PhaseEndEvent`].
        phase_end, on_phase_end, PhaseEndEvent
    );
    forward!(
        /// Emits a [`CaptureEvent`].
        capture, on_capture, CaptureEvent
    );
    forward!(
        /// Emits a [`FrameSummary`].
        frame_summary, on_frame_summary, FrameSummary
    );
}

// ---------------------------------------------------------------------------
// FrameSummaryBuilder
// ---------------------------------------------------------------------------

/// Collects phase timestamps during a frame and produces a [`FrameSummary`].
#[derive(Debug)]
pub struct FrameSummaryBuilder {
    tick: FrameTickEvent,
    time: f64,
    outcome: Option<FrameOutcome>,
    phase_starts: [Option<HostTime>; 3],
    phase_ends: [Option<HostTime>; 3],
}

impl FrameSummaryBuilder {
    /// Starts building a summary for the given tick.
    #[must_use]
    pub fn new(tick: &FrameTickEvent) -> Self {
        Self {
            tick: *tick,
            time: 0.0,
            outcome: None,
            phase_starts: [None; 3],
            phase_ends: [None; 3],
        }
    }

    /// Records the start of a phase.
    pub fn phase_begin(&mut self, phase: PhaseKind, t: HostTime) {
        self.phase_starts[phase_index(phase)] = Some(t);
    }

    /// Records the end of a phase.
    pub fn phase_end(&mut self, phase: PhaseKind, t: HostTime) {
        self.phase_ends[phase_index(phase)] = Some(t);
    }

    /// Records what the runner drew.
    pub fn set_draw(&mut self, time: f64, outcome: FrameOutcome) {
        self.time = time;
        self.outcome = Some(outcome);
    }

    /// Consumes the builder and produces the final [`FrameSummary`].
    #[must_use]
    pub fn finish(self) -> FrameSummary {
        FrameSummary {
            frame_index: self.tick.frame_index,
            now: self.tick.now,
            time: self.time,
            outcome: self.outcome,
            clock_nanos: self.phase_duration(PhaseKind::Clock),
            draw_nanos: self.phase_duration(PhaseKind::Draw),
            present_nanos: self.phase_duration(PhaseKind::Present),
        }
    }

    fn phase_duration(&self, phase: PhaseKind) -> u64 {
        let idx = phase_index(phase);
        match (self.phase_starts[idx], self.phase_ends[idx]) {
            (Some(start), Some(end)) => end.saturating_duration_since(start).nanos(),
            _ => 0,
        }
    }
}

/// Maps a [`PhaseKind`] to an array index.
const fn phase_index(phase: PhaseKind) -> usize {
    match phase {
        PhaseKind::Clock => 0,
        PhaseKind::Draw => 1,
        PhaseKind::Present => 2,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tick() -> FrameTickEvent {
        FrameTickEvent {
            frame_index: 42,
            now: HostTime(1_000_000),
        }
    }

    #[test]
    fn frame_tick_event_from_frame_tick() {
        let tick = FrameTick::new(HostTime(100), 7);
        let evt = FrameTickEvent::from(&tick);
        assert_eq!(evt.frame_index, 7);
        assert_eq!(evt.now, HostTime(100));
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_frame_tick(&sample_tick());
        sink.on_draw(&DrawEvent {
            frame_index: 0,
            runner: RunnerKind::Stateless,
            outcome: FrameOutcome::Drawn,
            time: 0.0,
            size: SurfaceSize::new(1, 1),
        });
        sink.on_frame_summary(&FrameSummaryBuilder::new(&sample_tick()).finish());
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.frame_tick(&sample_tick());
        tracer.fps_window(&FpsWindowEvent {
            frame_index: 1,
            fps: 60,
            now: HostTime::ZERO,
        });
    }

    #[test]
    fn summary_builder_computes_durations() {
        let mut builder = FrameSummaryBuilder::new(&sample_tick());

        builder.phase_begin(PhaseKind::Clock, HostTime(1_000_000));
        builder.phase_end(PhaseKind::Clock, HostTime(1_000_100));
        builder.phase_begin(PhaseKind::Draw, HostTime(1_000_100));
        builder.phase_end(PhaseKind::Draw, HostTime(1_002_100));
        builder.phase_begin(PhaseKind::Present, HostTime(1_002_100));
        builder.phase_end(PhaseKind::Present, HostTime(1_002_150));
        builder.set_draw(1.5, FrameOutcome::Blitted);

        let summary = builder.finish();
        assert_eq!(summary.clock_nanos, 100);
        assert_eq!(summary.draw_nanos, 2000);
        assert_eq!(summary.present_nanos, 50);
        assert_eq!(summary.total_nanos(), 2150);
        assert_eq!(summary.outcome, Some(FrameOutcome::Blitted));
        assert_eq!(summary.frame_index, 42);
    }

    #[test]
    fn summary_builder_missing_phases_are_zero() {
        let summary = FrameSummaryBuilder::new(&sample_tick()).finish();
        assert_eq!(summary.clock_nanos, 0);
        assert_eq!(summary.draw_nanos, 0);
        assert_eq!(summary.present_nanos, 0);
        assert_eq!(summary.outcome, None);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            ticks: Vec<u64>,
        }
        impl TraceSink for RecordingSink {
            fn on_frame_tick(&mut self, e: &FrameTickEvent) {
                self.ticks.push(e.frame_index);
            }
        }

        let mut sink = RecordingSink { ticks: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        tracer.frame_tick(&sample_tick());
        drop(tracer);
        assert_eq!(sink.ticks, &[42]);
    }
}
