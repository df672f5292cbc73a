// Copyright 2026 the Sketchloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capturing sketches out of a software window framebuffer.

use image::imageops::{self, FilterType};
use kurbo::Rect;

use sketchloop_core::capture::{CaptureBridge, CaptureCallback, CaptureError, CaptureRequest};
use sketchloop_core::surface::{PixelBuffer, SurfaceSize};

use crate::pixels;

/// A [`CaptureBridge`] that reads from an in-memory window framebuffer.
///
/// The region is rounded to whole pixels and must lie inside the window.
/// When the rounded region differs in size from the request's source size
/// (e.g. at a display density other than one), the region is resampled to
/// the source size with nearest-neighbor sampling.
///
/// Results are delivered synchronously, before `request_capture` returns.
#[derive(Clone, Debug)]
pub struct FramebufferCapture {
    window: PixelBuffer,
    captures: u64,
}

impl FramebufferCapture {
    /// Creates a bridge over `window`.
    #[must_use]
    pub fn new(window: PixelBuffer) -> Self {
        Self {
            window,
            captures: 0,
        }
    }

    /// The window contents.
    #[must_use]
    pub fn window(&self) -> &PixelBuffer {
        &self.window
    }

    /// Mutable window contents, for hosts that composite into it.
    pub fn window_mut(&mut self) -> &mut PixelBuffer {
        &mut self.window
    }

    /// Number of successful captures.
    #[must_use]
    pub fn captures(&self) -> u64 {
        self.captures
    }

    /// Extracts the pixels for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::EmptyRegion`] for empty requests and
    /// [`CaptureError::OutOfBounds`] when the rounded region reaches outside
    /// the window.
    pub fn extract(&self, request: &CaptureRequest) -> Result<PixelBuffer, CaptureError> {
        if request.is_empty() {
            return Err(CaptureError::EmptyRegion);
        }
        let bounds = self.window.size();
        let region = request.region.abs().round();
        if region.x0 < 0.0
            || region.y0 < 0.0
            || region.x1 > f64::from(bounds.width)
            || region.y1 > f64::from(bounds.height)
        {
            return Err(CaptureError::OutOfBounds {
                region: request.region,
                bounds,
            });
        }
        let Some(crop) = PixelRegion::from_rect(region) else {
            return Err(CaptureError::EmptyRegion);
        };
        let window = pixels::to_image(&self.window);
        let cropped =
            imageops::crop_imm(&window, crop.x, crop.y, crop.width, crop.height).to_image();
        let out = request.source_size;
        let image = if cropped.dimensions() == (out.width, out.height) {
            cropped
        } else {
            imageops::resize(&cropped, out.width, out.height, FilterType::Nearest)
        };
        Ok(pixels::to_buffer(&image))
    }
}

impl CaptureBridge for FramebufferCapture {
    fn request_capture(&mut self, request: CaptureRequest, on_result: CaptureCallback) {
        let result = self.extract(&request);
        match &result {
            Ok(image) => {
                self.captures += 1;
                log::debug!("captured {} pixels from {:?}", image.size(), request.region);
            }
            Err(err) => log::warn!("capture failed: {err}"),
        }
        on_result(result);
    }
}

/// A whole-pixel rectangle inside the window.
#[derive(Clone, Copy, Debug)]
struct PixelRegion {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl PixelRegion {
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "the region is rounded and checked against the window bounds"
    )]
    fn from_rect(rect: Rect) -> Option<Self> {
        let size = SurfaceSize::new(rect.width() as u32, rect.height() as u32);
        (!size.is_empty()).then_some(Self {
            x: rect.x0 as u32,
            y: rect.y0 as u32,
            width: size.width,
            height: size.height,
        })
    }
}
