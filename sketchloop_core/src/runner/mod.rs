// Copyright 2026 the Sketchloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sketch runners.
//!
//! A runner decides how a draw callback turns into pixels on the host's
//! surface each frame:
//!
//! - [`StatelessSketchRunner`]: clears the surface and re-runs the callback
//!   every frame. Nothing survives between frames.
//! - [`CachedSketchRunner`]: runs the callback into a persisted bitmap only
//!   when the size changes or the caller invalidates the cache, and otherwise
//!   just blits the bitmap.
//! - [`AccumulatingSketchRunner`]: runs the callback every frame into a
//!   persisted bitmap that is never cleared, so each frame draws on top of
//!   all previous ones.
//!
//! All three implement [`SketchRunner`], which is what
//! [`Sketch`](crate::sketch::Sketch) drives.
//!
//! Callbacks are infallible closures. A panicking callback unwinds through
//! `render` unchanged; runners only commit state after the callback returns,
//! so the next frame simply tries again.

mod accumulating;
mod cached;
mod stateless;

pub use accumulating::AccumulatingSketchRunner;
pub use cached::{CacheScope, CachedSketchRunner};
pub use stateless::StatelessSketchRunner;

use crate::surface::DrawSurface;

/// Why a cached runner regenerated its bitmap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegenReason {
    /// There was no cached bitmap yet.
    Initial,
    /// The surface size differs from the cached bitmap's.
    Resized,
    /// The cache epoch was bumped by [`CachedSketchRunner::invalidate`].
    Invalidated,
}

/// What a runner did for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameOutcome {
    /// The surface is empty; nothing was drawn or allocated.
    NotReady,
    /// The callback ran directly against the surface.
    Drawn,
    /// The callback ran into the persisted bitmap, which was then blitted.
    Regenerated(RegenReason),
    /// The persisted bitmap was blitted without running the callback.
    Blitted,
    /// The callback drew on top of the accumulated bitmap, which was then
    /// blitted.
    Accumulated,
    /// The runner has been disposed; nothing was drawn.
    Disposed,
}

impl FrameOutcome {
    /// Returns `true` if the draw callback ran this frame.
    #[must_use]
    pub const fn invoked_callback(self) -> bool {
        matches!(self, Self::Drawn | Self::Regenerated(_) | Self::Accumulated)
    }

    /// Returns `true` if anything reached the surface this frame.
    #[must_use]
    pub const fn presented(self) -> bool {
        matches!(
            self,
            Self::Drawn | Self::Regenerated(_) | Self::Blitted | Self::Accumulated
        )
    }
}

/// Which runner a sketch uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunnerKind {
    /// [`StatelessSketchRunner`].
    Stateless,
    /// [`CachedSketchRunner`].
    Cached,
    /// [`AccumulatingSketchRunner`].
    Accumulating,
}

/// Turns the current clock time into drawing on the host surface.
pub trait SketchRunner {
    /// Renders one frame at clock time `time`.
    fn render(&mut self, time: f64, surface: &mut dyn DrawSurface) -> FrameOutcome;

    /// Releases any retained resources. Subsequent frames return
    /// [`FrameOutcome::Disposed`].
    fn dispose(&mut self);

    /// The runner's kind, for diagnostics.
    fn kind(&self) -> RunnerKind;
}

#[cfg(test)]
pub(crate) mod test_support {
    //! A recording surface and a trivial rasterizer for runner tests.

    use alloc::vec::Vec;

    use kurbo::{BezPath, Circle, Line, Point, Rect, Stroke};

    use crate::surface::{Color, DrawSurface, PixelBuffer, Rasterize, SurfaceSize};

    /// One recorded drawing command.
    #[derive(Clone, Debug, PartialEq)]
    pub(crate) enum Op {
        Clear(Color),
        Rect(Color),
        Circle(Color),
        Line,
        Path,
        Image(SurfaceSize),
    }

    /// Records commands; images are snapshotted so blits can be compared.
    #[derive(Debug)]
    pub(crate) struct RecordingSurface {
        pub(crate) size: SurfaceSize,
        pub(crate) ops: Vec<Op>,
        pub(crate) images: Vec<PixelBuffer>,
    }

    impl RecordingSurface {
        pub(crate) fn new(width: u32, height: u32) -> Self {
            Self {
                size: SurfaceSize::new(width, height),
                ops: Vec::new(),
                images: Vec::new(),
            }
        }
    }

    impl DrawSurface for RecordingSurface {
        fn size(&self) -> SurfaceSize {
            self.size
        }

        fn clear(&mut self, color: Color) {
            self.ops.push(Op::Clear(color));
        }

        fn fill_rect(&mut self, _rect: Rect, color: Color) {
            self.ops.push(Op::Rect(color));
        }

        fn fill_circle(&mut self, _circle: Circle, color: Color) {
            self.ops.push(Op::Circle(color));
        }

        fn stroke_line(&mut self, _line: Line, _width: f64, _color: Color) {
            self.ops.push(Op::Line);
        }

        fn fill_path(&mut self, _path: &BezPath, _color: Color) {
            self.ops.push(Op::Path);
        }

        fn stroke_path(&mut self, _path: &BezPath, _style: &Stroke, _color: Color) {
            self.ops.push(Op::Path);
        }

        fn draw_image(&mut self, image: &PixelBuffer, _origin: Point) {
            self.ops.push(Op::Image(image.size()));
            self.images.push(image.clone());
        }
    }

    /// Writes the color of every `fill_rect` into the whole target, which is
    /// enough to tell frames apart.
    #[derive(Debug, Default)]
    pub(crate) struct FloodRasterizer {
        pub(crate) calls: u32,
    }

    struct Flood<'a>(&'a mut PixelBuffer);

    impl DrawSurface for Flood<'_> {
        fn size(&self) -> SurfaceSize {
            self.0.size()
        }

        fn clear(&mut self, color: Color) {
            self.0.fill(color);
        }

        fn fill_rect(&mut self, _rect: Rect, color: Color) {
            self.0.fill(color);
        }

        fn fill_circle(&mut self, _circle: Circle, _color: Color) {}

        fn stroke_line(&mut self, _line: Line, _width: f64, _color: Color) {}

        fn fill_path(&mut self, _path: &BezPath, _color: Color) {}

        fn stroke_path(&mut self, _path: &BezPath, _style: &Stroke, _color: Color) {}

        fn draw_image(&mut self, _image: &PixelBuffer, _origin: Point) {}
    }

    impl Rasterize for FloodRasterizer {
        fn rasterize(
            &mut self,
            target: &mut PixelBuffer,
            draw: &mut dyn FnMut(&mut dyn DrawSurface),
        ) {
            self.calls += 1;
            draw(&mut Flood(target));
        }
    }
}
