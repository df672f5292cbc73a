// Copyright 2026 the Sketchloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format export.
//!
//! [`ChromeTraceSink`] turns trace events into [Chrome Trace Event
//! Format][format] objects as they arrive and writes them out as one JSON
//! array, suitable for loading into `chrome://tracing` or
//! [Perfetto](https://ui.perfetto.dev/).
//!
//! Phases become duration (`B`/`E`) events. Everything else is an instant
//! event; events that carry no timestamp of their own are stamped with the
//! most recent frame tick.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use sketchloop_core::time::HostTime;
use sketchloop_core::trace::{
    CaptureEvent, DrawEvent, FpsWindowEvent, FrameSummary, FrameTickEvent, PhaseBeginEvent,
    PhaseEndEvent, RegenerateEvent, TraceSink, TransitionEvent,
};

/// Collects trace events as Chrome Trace Event JSON objects.
#[derive(Clone, Debug, Default)]
pub struct ChromeTraceSink {
    events: Vec<Value>,
    last_now: HostTime,
}

impl ChromeTraceSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The collected events.
    #[must_use]
    pub fn events(&self) -> &[Value] {
        &self.events
    }

    /// Writes the collected events as a pretty-printed JSON array.
    ///
    /// # Errors
    ///
    /// Returns any error from `writer`.
    pub fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(writer, &self.events)?;
        Ok(())
    }

    fn instant(&mut self, name: &str, cat: &str, ts: HostTime, args: Value) {
        self.events.push(json!({
            "ph": "i",
            "name": name,
            "cat": cat,
            "ts": to_us(ts),
            "pid": 0,
            "tid": 0,
            "s": "t",
            "args": args,
        }));
    }
}

fn to_us(t: HostTime) -> f64 {
    t.nanos() as f64 / 1000.0
}

impl TraceSink for ChromeTraceSink {
    fn on_frame_tick(&mut self, e: &FrameTickEvent) {
        self.last_now = e.now;
        self.instant(
            "FrameTick",
            "Clock",
            e.now,
            json!({ "frame_index": e.frame_index }),
        );
    }

    fn on_transition(&mut self, e: &TransitionEvent) {
        self.instant(
            "TransitionCompleted",
            "Clock",
            self.last_now,
            json!({
                "frame_index": e.frame_index,
                "completed": e.completed,
                "total": e.total,
                "time": e.time,
            }),
        );
    }

    fn on_regenerate(&mut self, e: &RegenerateEvent) {
        self.instant(
            "CacheRegenerated",
            "Runner",
            self.last_now,
            json!({
                "frame_index": e.frame_index,
                "reason": format!("{:?}", e.reason),
                "width": e.size.width,
                "height": e.size.height,
            }),
        );
    }

    fn on_draw(&mut self, e: &DrawEvent) {
        self.instant(
            "Draw",
            "Runner",
            self.last_now,
            json!({
                "frame_index": e.frame_index,
                "runner": format!("{:?}", e.runner),
                "outcome": format!("{:?}", e.outcome),
                "time": e.time,
            }),
        );
    }

    fn on_fps_window(&mut self, e: &FpsWindowEvent) {
        self.events.push(json!({
            "ph": "C",
            "name": "fps",
            "cat": "Controls",
            "ts": to_us(e.now),
            "pid": 0,
            "tid": 0,
            "args": { "fps": e.fps },
        }));
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.events.push(json!({
            "ph": "B",
            "name": format!("{:?}", e.phase),
            "cat": "Frame",
            "ts": to_us(e.timestamp),
            "pid": 0,
            "tid": 0,
            "args": { "frame_index": e.frame_index },
        }));
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.events.push(json!({
            "ph": "E",
            "name": format!("{:?}", e.phase),
            "cat": "Frame",
            "ts": to_us(e.timestamp),
            "pid": 0,
            "tid": 0,
            "args": { "frame_index": e.frame_index },
        }));
    }

    fn on_capture(&mut self, e: &CaptureEvent) {
        let args = match &e.request {
            Some(request) => json!({
                "frame_index": e.frame_index,
                "region": [
                    request.region.x0,
                    request.region.y0,
                    request.region.x1,
                    request.region.y1,
                ],
                "width": request.source_size.width,
                "height": request.source_size.height,
            }),
            None => json!({ "frame_index": e.frame_index, "region": null }),
        };
        self.instant("Capture", "Controls", self.last_now, args);
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.events.push(json!({
            "ph": "i",
            "name": "FrameSummary",
            "cat": "Summary",
            "ts": to_us(s.now),
            "pid": 0,
            "tid": 0,
            "s": "g",
            "args": {
                "frame_index": s.frame_index,
                "time": s.time,
                "outcome": s.outcome.map(|o| format!("{o:?}")),
                "clock_us": s.clock_nanos as f64 / 1000.0,
                "draw_us": s.draw_nanos as f64 / 1000.0,
                "present_us": s.present_nanos as f64 / 1000.0,
            }
        }));
    }
}
