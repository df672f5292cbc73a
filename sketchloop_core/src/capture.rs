// Copyright 2026 the Sketchloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capture requests and the host capability that fulfils them.
//!
//! The core only knows *where* a sketch is on screen. Pulling pixels out of
//! a window is the host's job, expressed through [`CaptureBridge`]. Results
//! come back through a one-shot callback so bridges backed by asynchronous
//! platform APIs can answer later; the core never retries a failed capture.

use alloc::boxed::Box;
use alloc::string::String;

use kurbo::Rect;
use thiserror::Error;

use crate::surface::{PixelBuffer, SurfaceSize};

/// A request for the pixels of one sketch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptureRequest {
    /// The sketch's bounds in window coordinates.
    pub region: Rect,
    /// Size of the sketch surface, which is also the size of the image the
    /// bridge should deliver.
    pub source_size: SurfaceSize,
}

impl CaptureRequest {
    /// Creates a request for `region`, delivering a `source_size` image.
    #[must_use]
    pub const fn new(region: Rect, source_size: SurfaceSize) -> Self {
        Self {
            region,
            source_size,
        }
    }

    /// Returns `true` if there is nothing to capture.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.region.is_nan()
            || self.region.width() <= 0.0
            || self.region.height() <= 0.0
            || self.source_size.is_empty()
    }
}

/// Why a capture failed.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum CaptureError {
    /// The region or the source has no area.
    #[error("capture region is empty")]
    EmptyRegion,
    /// The region reaches outside the captured window.
    #[error("capture region {region:?} lies outside the {bounds} window")]
    OutOfBounds {
        /// The requested region.
        region: Rect,
        /// Size of the window the bridge captures from.
        bounds: SurfaceSize,
    },
    /// The host cannot capture at all.
    #[error("capture unsupported: {0}")]
    Unsupported(&'static str),
    /// The host's capture mechanism reported an error.
    #[error("host capture failed: {0}")]
    Host(String),
}

/// One-shot receiver of a capture result.
pub type CaptureCallback = Box<dyn FnOnce(Result<PixelBuffer, CaptureError>)>;

/// Host capability that extracts the pixels of a window region.
pub trait CaptureBridge {
    /// Starts a capture. `on_result` is called exactly once, either before
    /// this returns or later from the host's event loop.
    fn request_capture(&mut self, request: CaptureRequest, on_result: CaptureCallback);
}
