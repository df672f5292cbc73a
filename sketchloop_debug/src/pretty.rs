// Copyright 2026 the Sketchloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are printed in milliseconds of host time.

use std::io::Write;

use sketchloop_core::runner::FrameOutcome;
use sketchloop_core::time::HostTime;
use sketchloop_core::trace::{
    CaptureEvent, DrawEvent, FpsWindowEvent, FrameSummary, FrameTickEvent, PhaseBeginEvent,
    PhaseEndEvent, PhaseKind, RegenerateEvent, TraceSink, TransitionEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the destination, e.g. to inspect a `Vec<u8>` buffer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn ms(t: HostTime) -> f64 {
    t.as_millis_f64()
}

fn nanos_to_us(nanos: u64) -> f64 {
    nanos as f64 / 1000.0
}

fn phase_name(phase: PhaseKind) -> &'static str {
    match phase {
        PhaseKind::Clock => "clock",
        PhaseKind::Draw => "draw",
        PhaseKind::Present => "present",
    }
}

fn outcome_name(outcome: FrameOutcome) -> &'static str {
    match outcome {
        FrameOutcome::NotReady => "not-ready",
        FrameOutcome::Drawn => "drawn",
        FrameOutcome::Regenerated(_) => "regenerated",
        FrameOutcome::Blitted => "blitted",
        FrameOutcome::Accumulated => "accumulated",
        FrameOutcome::Disposed => "disposed",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_tick(&mut self, e: &FrameTickEvent) {
        let _ = writeln!(
            self.writer,
            "[tick] frame={} now={:.3}ms",
            e.frame_index,
            ms(e.now),
        );
    }

    fn on_transition(&mut self, e: &TransitionEvent) {
        let _ = writeln!(
            self.writer,
            "[clock] frame={} completed={} total={} time={:.4}",
            e.frame_index, e.completed, e.total, e.time,
        );
    }

    fn on_regenerate(&mut self, e: &RegenerateEvent) {
        let _ = writeln!(
            self.writer,
            "[cache] frame={} regenerated {} reason={:?}",
            e.frame_index, e.size, e.reason,
        );
    }

    fn on_draw(&mut self, e: &DrawEvent) {
        let _ = writeln!(
            self.writer,
            "[draw] frame={} {:?} {} time={:.4} size={}",
            e.frame_index,
            e.runner,
            outcome_name(e.outcome),
            e.time,
            e.size,
        );
    }

    fn on_fps_window(&mut self, e: &FpsWindowEvent) {
        let _ = writeln!(
            self.writer,
            "[fps] frame={} fps={} at {:.3}ms",
            e.frame_index,
            e.fps,
            ms(e.now),
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] frame={} {} at {:.3}ms",
            e.frame_index,
            phase_name(e.phase),
            ms(e.timestamp),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] frame={} {} at {:.3}ms",
            e.frame_index,
            phase_name(e.phase),
            ms(e.timestamp),
        );
    }

    fn on_capture(&mut self, e: &CaptureEvent) {
        let _ = match &e.request {
            Some(request) => writeln!(
                self.writer,
                "[capture] after {} frames region=({:.1}, {:.1})-({:.1}, {:.1}) size={}",
                e.frame_index,
                request.region.x0,
                request.region.y0,
                request.region.x1,
                request.region.y1,
                request.source_size,
            ),
            None => writeln!(
                self.writer,
                "[capture] after {} frames: no layout",
                e.frame_index
            ),
        };
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        let outcome = s.outcome.map_or("-", outcome_name);
        let _ = writeln!(
            self.writer,
            "[summary] frame={} time={:.4} {outcome} clock={:.1}µs draw={:.1}µs \
             present={:.1}µs",
            s.frame_index,
            s.time,
            nanos_to_us(s.clock_nanos),
            nanos_to_us(s.draw_nanos),
            nanos_to_us(s.present_nanos),
        );
    }
}
