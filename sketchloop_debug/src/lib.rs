// Copyright 2026 the Sketchloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing, log forwarding, and Chrome trace export for sketchloop
//! diagnostics.
//!
//! This crate provides [`TraceSink`](sketchloop_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`] writes one human-readable line per event.
//! - [`log_sink::LogSink`] forwards events to the [`log`] facade.
//! - [`chrome::ChromeTraceSink`] collects events as Chrome Trace Event
//!   Format JSON.
//!
//! [`Fanout`] feeds several sinks from a single
//! [`Tracer`](sketchloop_core::trace::Tracer).

pub mod chrome;
pub mod log_sink;
pub mod pretty;

use sketchloop_core::trace::{
    CaptureEvent, DrawEvent, FpsWindowEvent, FrameSummary, FrameTickEvent, PhaseBeginEvent,
    PhaseEndEvent, RegenerateEvent, TraceSink, TransitionEvent,
};

/// Forwards every event to each of its sinks in order.
pub struct Fanout<'a> {
    sinks: Vec<&'a mut dyn TraceSink>,
}

impl std::fmt::Debug for Fanout<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fanout")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl<'a> Fanout<'a> {
    /// Creates a fan-out over `sinks`.
    #[must_use]
    pub fn new(sinks: Vec<&'a mut dyn TraceSink>) -> Self {
        Self { sinks }
    }
}

macro_rules! fan_out {
    ($($method:ident($event:ty);)*) => {
        $(
            fn $method(&mut self, e: &$event) {
                for sink in &mut self.sinks {
                    sink.$method(e);
                }
            }
        )*
    };
}

impl TraceSink for Fanout<'_> {
    fan_out! {
        on_frame_tick(FrameTickEvent);
        on_transition(TransitionEvent);
        on_regenerate(RegenerateEvent);
        on_draw(DrawEvent);
        on_fps_window(FpsWindowEvent);
        on_phase_begin(PhaseBeginEvent);
        on_phase_end(PhaseEndEvent);
        on_capture(CaptureEvent);
        on_frame_summary(FrameSummary);
    }
}

#[cfg(test)]
mod tests {
    use sketchloop_core::time::HostTime;

    use super::*;
    use crate::chrome::ChromeTraceSink;
    use crate::pretty::PrettyPrintSink;

    #[test]
    fn fanout_reaches_every_sink() {
        let mut chrome = ChromeTraceSink::new();
        let mut pretty = PrettyPrintSink::with_writer(Vec::<u8>::new());
        {
            let mut fanout = Fanout::new(vec![&mut chrome, &mut pretty]);
            fanout.on_frame_tick(&FrameTickEvent {
                frame_index: 3,
                now: HostTime::from_millis(50),
            });
        }
        assert_eq!(chrome.len(), 1);
        let text = String::from_utf8(pretty.into_inner()).unwrap();
        assert!(text.contains("frame=3"), "got: {text}");
    }
}
