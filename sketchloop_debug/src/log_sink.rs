// Copyright 2026 the Sketchloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trace events as [`log`] records.
//!
//! [`LogSink`] maps the sketch loop onto log levels so a host that already
//! initializes a logger (e.g. `env_logger`) gets diagnostics without extra
//! plumbing:
//!
//! | Level   | Events                                         |
//! |---------|------------------------------------------------|
//! | `info`  | fps windows, capture requests                  |
//! | `debug` | completed transitions, cache regenerations     |
//! | `trace` | ticks, draws, phases, frame summaries          |

use log::{debug, info, trace};

use sketchloop_core::trace::{
    CaptureEvent, DrawEvent, FpsWindowEvent, FrameSummary, FrameTickEvent, PhaseBeginEvent,
    PhaseEndEvent, RegenerateEvent, TraceSink, TransitionEvent,
};

/// Log target used for every record.
pub const TARGET: &str = "sketchloop";

/// Forwards trace events to the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl TraceSink for LogSink {
    fn on_frame_tick(&mut self, e: &FrameTickEvent) {
        trace!(target: TARGET, "tick frame={} now={:?}", e.frame_index, e.now);
    }

    fn on_transition(&mut self, e: &TransitionEvent) {
        debug!(
            target: TARGET,
            "frame {}: {} transition(s) completed, {} total, time={:.4}",
            e.frame_index, e.completed, e.total, e.time
        );
    }

    fn on_regenerate(&mut self, e: &RegenerateEvent) {
        debug!(
            target: TARGET,
            "frame {}: cache regenerated at {} ({:?})",
            e.frame_index, e.size, e.reason
        );
    }

    fn on_draw(&mut self, e: &DrawEvent) {
        trace!(
            target: TARGET,
            "draw frame={} runner={:?} outcome={:?} time={:.4}",
            e.frame_index, e.runner, e.outcome, e.time
        );
    }

    fn on_fps_window(&mut self, e: &FpsWindowEvent) {
        info!(target: TARGET, "fps = {}", e.fps);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        trace!(target: TARGET, "frame {} {:?} begin {:?}", e.frame_index, e.phase, e.timestamp);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        trace!(target: TARGET, "frame {} {:?} end {:?}", e.frame_index, e.phase, e.timestamp);
    }

    fn on_capture(&mut self, e: &CaptureEvent) {
        match &e.request {
            Some(request) => info!(
                target: TARGET,
                "capture requested: {} pixels from {:?}",
                request.source_size, request.region
            ),
            None => info!(target: TARGET, "capture requested before layout"),
        }
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        trace!(
            target: TARGET,
            "summary frame={} clock={}ns draw={}ns present={}ns",
            s.frame_index, s.clock_nanos, s.draw_nanos, s.present_nanos
        );
    }
}
