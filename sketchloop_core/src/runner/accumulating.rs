// Copyright 2026 the Sketchloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use kurbo::Point;

use crate::surface::{Color, DrawSurface, PixelBuffer, Rasterize};

use super::{FrameOutcome, RunnerKind, SketchRunner};

/// Draws every frame on top of everything drawn before.
///
/// The callback renders into a persistent bitmap that is never cleared
/// between frames, so trails and sediment build up over time. The bitmap is
/// created on the first non-empty frame, filled with the background color,
/// and blitted once per frame after the callback returns.
///
/// A size change discards the accumulated content and starts over with a
/// fresh bitmap of the new size.
pub struct AccumulatingSketchRunner<F, R> {
    draw: F,
    rasterizer: R,
    background: Color,
    bitmap: Option<PixelBuffer>,
    pending_clear: bool,
    frames: u64,
    disposed: bool,
}

impl<F, R> AccumulatingSketchRunner<F, R>
where
    F: FnMut(f64, &mut dyn DrawSurface),
    R: Rasterize,
{
    /// Creates a runner that accumulates `draw` through `rasterizer`.
    #[must_use]
    pub fn new(rasterizer: R, draw: F) -> Self {
        Self {
            draw,
            rasterizer,
            background: Color::TRANSPARENT,
            bitmap: None,
            pending_clear: false,
            frames: 0,
            disposed: false,
        }
    }

    /// Sets the color fresh and cleared bitmaps start from.
    #[must_use]
    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    /// Wipes the accumulated content before the next frame draws.
    pub fn clear(&mut self) {
        self.pending_clear = true;
    }

    /// Frames accumulated into the current bitmap.
    #[must_use]
    pub fn accumulated_frames(&self) -> u64 {
        self.frames
    }

    /// The accumulated bitmap, if one exists.
    #[must_use]
    pub fn bitmap(&self) -> Option<&PixelBuffer> {
        self.bitmap.as_ref()
    }
}

impl<F, R> SketchRunner for AccumulatingSketchRunner<F, R>
where
    F: FnMut(f64, &mut dyn DrawSurface),
    R: Rasterize,
{
    fn render(&mut self, time: f64, surface: &mut dyn DrawSurface) -> FrameOutcome {
        if self.disposed {
            return FrameOutcome::Disposed;
        }
        let size = surface.size();
        if size.is_empty() {
            return FrameOutcome::NotReady;
        }

        let bitmap = match &mut self.bitmap {
            Some(bitmap) if bitmap.size() == size => {
                if self.pending_clear {
                    bitmap.fill(self.background);
                    self.frames = 0;
                }
                bitmap
            }
            slot => {
                self.frames = 0;
                slot.insert(PixelBuffer::filled(size, self.background))
            }
        };
        self.pending_clear = false;

        let draw = &mut self.draw;
        self.rasterizer
            .rasterize(bitmap, &mut |target: &mut dyn DrawSurface| draw(time, target));
        self.frames += 1;

        surface.draw_image(bitmap, Point::ZERO);
        FrameOutcome::Accumulated
    }

    fn dispose(&mut self) {
        self.bitmap = None;
        self.disposed = true;
    }

    fn kind(&self) -> RunnerKind {
        RunnerKind::Accumulating
    }
}

impl<F, R: fmt::Debug> fmt::Debug for AccumulatingSketchRunner<F, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccumulatingSketchRunner")
            .field("rasterizer", &self.rasterizer)
            .field("background", &self.background)
            .field("bitmap", &self.bitmap.as_ref().map(PixelBuffer::size))
            .field("frames", &self.frames)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Circle, Rect};

    use super::*;
    use crate::runner::test_support::{FloodRasterizer, Op, RecordingSurface};
    use crate::surface::SurfaceSize;

    /// Writes one pixel per frame, marching along the top row.
    struct Marching<'a>(&'a mut PixelBuffer);

    impl DrawSurface for Marching<'_> {
        fn size(&self) -> SurfaceSize {
            self.0.size()
        }

        fn clear(&mut self, color: Color) {
            self.0.fill(color);
        }

        fn fill_rect(&mut self, rect: Rect, color: Color) {
            #[expect(clippy::cast_possible_truncation, reason = "test coordinates")]
            let x = rect.x0 as usize;
            self.0.pixels_mut()[x] = color;
        }

        fn fill_circle(&mut self, _circle: Circle, _color: Color) {}

        fn stroke_line(&mut self, _line: kurbo::Line, _width: f64, _color: Color) {}

        fn fill_path(&mut self, _path: &kurbo::BezPath, _color: Color) {}

        fn stroke_path(&mut self, _path: &kurbo::BezPath, _style: &kurbo::Stroke, _color: Color) {}

        fn draw_image(&mut self, _image: &PixelBuffer, _origin: Point) {}
    }

    #[derive(Debug)]
    struct MarchingRasterizer;

    impl Rasterize for MarchingRasterizer {
        fn rasterize(
            &mut self,
            target: &mut PixelBuffer,
            draw: &mut dyn FnMut(&mut dyn DrawSurface),
        ) {
            draw(&mut Marching(target));
        }
    }

    fn mark(time: f64, surface: &mut dyn DrawSurface) {
        surface.fill_rect(Rect::new(time, 0.0, time + 1.0, 1.0), Color::WHITE);
    }

    #[test]
    fn retains_previous_frames() {
        let mut runner =
            AccumulatingSketchRunner::new(MarchingRasterizer, mark).with_background(Color::BLACK);
        let mut surface = RecordingSurface::new(4, 1);
        for frame in 0..3 {
            assert_eq!(
                runner.render(f64::from(frame), &mut surface),
                FrameOutcome::Accumulated
            );
        }
        assert_eq!(runner.accumulated_frames(), 3);
        let last = surface.images.last().unwrap();
        assert_eq!(last.get(0, 0), Some(Color::WHITE));
        assert_eq!(last.get(1, 0), Some(Color::WHITE));
        assert_eq!(last.get(2, 0), Some(Color::WHITE));
        assert_eq!(last.get(3, 0), Some(Color::BLACK));
        assert_eq!(surface.ops.len(), 3, "one blit per frame");
    }

    #[test]
    fn clear_wipes_accumulated_content() {
        let mut runner =
            AccumulatingSketchRunner::new(MarchingRasterizer, mark).with_background(Color::BLACK);
        let mut surface = RecordingSurface::new(4, 1);
        runner.render(0.0, &mut surface);
        runner.render(1.0, &mut surface);
        runner.clear();
        runner.render(2.0, &mut surface);
        let last = surface.images.last().unwrap();
        assert_eq!(last.get(0, 0), Some(Color::BLACK));
        assert_eq!(last.get(2, 0), Some(Color::WHITE));
        assert_eq!(runner.accumulated_frames(), 1);
    }

    #[test]
    fn resize_starts_a_fresh_bitmap() {
        let mut runner = AccumulatingSketchRunner::new(MarchingRasterizer, mark);
        let mut surface = RecordingSurface::new(4, 1);
        runner.render(0.0, &mut surface);
        surface.size = SurfaceSize::new(6, 1);
        runner.render(5.0, &mut surface);
        let bitmap = runner.bitmap().unwrap();
        assert_eq!(bitmap.size(), SurfaceSize::new(6, 1));
        assert_eq!(bitmap.get(0, 0), Some(Color::TRANSPARENT));
        assert_eq!(bitmap.get(5, 0), Some(Color::WHITE));
        assert_eq!(runner.accumulated_frames(), 1);
    }

    #[test]
    fn empty_surface_allocates_nothing() {
        let mut calls = 0;
        let mut runner = AccumulatingSketchRunner::new(
            FloodRasterizer::default(),
            |_, _: &mut dyn DrawSurface| {
                calls += 1;
            },
        );
        let mut surface = RecordingSurface::new(0, 3);
        assert_eq!(runner.render(0.0, &mut surface), FrameOutcome::NotReady);
        assert!(runner.bitmap().is_none());
        assert!(surface.ops.is_empty());
        drop(runner);
        assert_eq!(calls, 0);
    }

    #[test]
    fn dispose_releases_bitmap() {
        let mut runner = AccumulatingSketchRunner::new(
            FloodRasterizer::default(),
            |_, _: &mut dyn DrawSurface| {},
        );
        let mut surface = RecordingSurface::new(2, 2);
        runner.render(0.0, &mut surface);
        assert_eq!(surface.ops, [Op::Image(SurfaceSize::new(2, 2))]);
        runner.dispose();
        assert!(runner.bitmap().is_none());
        assert_eq!(runner.render(0.0, &mut surface), FrameOutcome::Disposed);
        assert_eq!(runner.kind(), RunnerKind::Accumulating);
    }
}
