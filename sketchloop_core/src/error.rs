// Copyright 2026 the Sketchloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by the sketch runtime.
//!
//! Draw callbacks are infallible closures; a failing callback panics and the
//! panic unwinds through the runner to the host untouched. Capture failures
//! travel through [`CaptureError`](crate::capture::CaptureError). An empty
//! surface size is not an error at all, see
//! [`FrameOutcome::NotReady`](crate::runner::FrameOutcome::NotReady).

use thiserror::Error;

/// Errors from configuring a sketch.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum SketchError {
    /// The clock speed is negative, infinite, or NaN.
    #[error("invalid animation speed {0}: must be finite and non-negative")]
    InvalidSpeed(f64),
}
