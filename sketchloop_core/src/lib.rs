// Copyright 2026 the Sketchloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animation clock, sketch runners, and frame-rate instrumentation for
//! procedural drawing loops.
//!
//! `sketchloop_core` is the runtime underneath a gallery of generative-art
//! sketches. A sketch is a draw callback invoked with a continuously advancing
//! time value; everything the callback draws is arbitrary user code. This
//! crate owns the parts around it: the clock, how and when the callback runs,
//! what gets cached between frames, and how fast frames arrive. It is `no_std`
//! compatible (with `alloc`).
//!
//! # Architecture
//!
//! ```text
//!   Host (frame source)
//!       │
//!       ▼
//!   FrameTick ──► Sketch::on_frame()
//!                    │
//!                    ├──► AnimationClock::tick() ──► time
//!                    ├──► FrameRateMonitor::on_frame()
//!                    │
//!                    ▼
//!   SketchRunner::render(time, surface) ──► draw callback ──► DrawSurface
//! ```
//!
//! **[`time`]**: Nanosecond [`HostTime`](time::HostTime) and
//! [`Duration`](time::Duration) newtypes.
//!
//! **[`timing`]**: [`FrameTick`](timing::FrameTick) plus the pull-based
//! [`FrameSource`](timing::FrameSource) used by headless hosts and tests.
//!
//! **[`clock`]**: [`AnimationClock`](clock::AnimationClock), which chains
//! fixed-duration eased transitions of a scalar time value.
//!
//! **[`easing`]**: Easing curves for clock transitions.
//!
//! **[`surface`]**: The [`DrawSurface`](surface::DrawSurface) and
//! [`Rasterize`](surface::Rasterize) capabilities the host supplies, plus the
//! [`PixelBuffer`](surface::PixelBuffer) used for off-screen bitmaps.
//!
//! **[`runner`]**: Stateless, cached, and accumulating sketch runners.
//!
//! **[`fps`]**: Windowed frames-per-second counter.
//!
//! **[`capture`]**: Capture requests and the
//! [`CaptureBridge`](capture::CaptureBridge) capability.
//!
//! **[`sketch`]**: [`Sketch`](sketch::Sketch), the per-sketch session that
//! wires a clock, a runner, and the optional controls together.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! frame-loop instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod capture;
pub mod clock;
pub mod easing;
pub mod error;
pub mod fps;
pub mod runner;
pub mod sketch;
pub mod surface;
pub mod time;
pub mod timing;
pub mod trace;

pub use error::SketchError;
