// Copyright 2026 the Sketchloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser frame timing for sketchloop.
//!
//! - [`RafLoop`]: `requestAnimationFrame` tick source.
//! - [`now`]: the current host time from `performance.now()`.
//!
//! A typical host owns the [`Sketch`](sketchloop_core::sketch::Sketch) in an
//! `Rc<RefCell<_>>`, calls `on_frame` from the loop's callback, and stops the
//! loop when the sketch is disposed.

#![no_std]

extern crate alloc;

mod raf;

pub use raf::RafLoop;

use sketchloop_core::time::HostTime;
use sketchloop_core::timing::FrameTick;

/// Returns the current host time from `performance.now()`.
#[must_use]
pub fn now() -> HostTime {
    HostTime::from_millis_f64(raf::performance_now())
}

/// Builds the tick for a `DOMHighResTimeStamp` in milliseconds.
///
/// Sub-millisecond precision is kept; negative or non-finite timestamps map
/// to [`HostTime::ZERO`].
#[must_use]
pub fn tick_at(timestamp_ms: f64, frame_index: u64) -> FrameTick {
    FrameTick::new(HostTime::from_millis_f64(timestamp_ms), frame_index)
}
