// Copyright 2026 the Sketchloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A [`DrawSurface`] that renders into a [`PixelBuffer`] with `vello_cpu`.
//!
//! Vector commands are recorded into a [`RenderContext`] and rendered as one
//! anti-aliased layer, which is composited source-over onto the target when
//! the canvas flushes: before [`clear`](DrawSurface::clear) and
//! [`draw_image`](DrawSurface::draw_image), in [`PixelCanvas::finish`], and on
//! drop. Every command therefore lands in the order it was issued.
//!
//! `vello_cpu` brings its own `kurbo`, so geometry is rebuilt in its types at
//! the boundary.

use image::imageops;
use image::{GenericImageView, Rgba, RgbaImage};
use kurbo::{BezPath, Cap, Circle, Line, Point, Rect, Shape, Stroke};
use vello_cpu::{Pixmap, RenderContext, RenderMode};

use sketchloop_core::surface::{Color, DrawSurface, PixelBuffer, Rasterize, SurfaceSize};

use crate::pixels;

/// Maximum distance between a circle and its path approximation, in pixels.
const TOLERANCE: f64 = 0.1;

/// Software implementation of [`DrawSurface`] over a borrowed bitmap.
pub struct PixelCanvas<'a> {
    target: &'a mut PixelBuffer,
    density: f64,
    /// Commands not yet composited onto `target`.
    pending: Option<RenderContext>,
}

impl core::fmt::Debug for PixelCanvas<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PixelCanvas")
            .field("size", &self.target.size())
            .field("density", &self.density)
            .field("pending", &self.pending.is_some())
            .finish()
    }
}

impl<'a> PixelCanvas<'a> {
    /// Creates a canvas with one physical pixel per logical pixel.
    #[must_use]
    pub fn new(target: &'a mut PixelBuffer) -> Self {
        Self::with_density(target, 1.0)
    }

    /// Creates a canvas that scales logical geometry by `density`.
    ///
    /// Non-positive or non-finite densities fall back to `1.0`.
    #[must_use]
    pub fn with_density(target: &'a mut PixelBuffer, density: f64) -> Self {
        let density = if density.is_finite() && density > 0.0 {
            density
        } else {
            1.0
        };
        Self {
            target,
            density,
            pending: None,
        }
    }

    /// Composites everything drawn so far and releases the target.
    ///
    /// Dropping the canvas does the same.
    pub fn finish(mut self) {
        self.flush();
    }

    /// The render context with `color` as its paint, or `None` when the
    /// command would not change any pixel.
    fn paint(&mut self, color: Color) -> Option<&mut RenderContext> {
        let size = self.target.size();
        if color.a == 0 || size.is_empty() {
            return None;
        }
        let density = self.density;
        let ctx = self.pending.get_or_insert_with(|| {
            let (width, height) = renderer_size(size);
            let mut ctx = RenderContext::new(width, height);
            ctx.set_transform(vello_cpu::kurbo::Affine::scale(density));
            ctx
        });
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
        Some(ctx)
    }

    fn flush(&mut self) {
        let Some(ctx) = self.pending.take() else {
            return;
        };
        let (width, height) = renderer_size(self.target.size());
        let mut layer = Pixmap::new(width, height);
        ctx.render_to_pixmap(&mut layer, RenderMode::default());
        let bytes = layer
            .take_unpremultiplied()
            .into_iter()
            .flat_map(|p| [p.r, p.g, p.b, p.a])
            .collect();
        if let Some(layer) = RgbaImage::from_raw(u32::from(width), u32::from(height), bytes) {
            self.composite(&layer, 0, 0);
        }
    }

    fn composite<I>(&mut self, top: &I, x: i64, y: i64)
    where
        I: GenericImageView<Pixel = Rgba<u8>>,
    {
        if let Some(mut bottom) = pixels::view_mut(self.target) {
            imageops::overlay(&mut bottom, top, x, y);
        }
    }
}

impl Drop for PixelCanvas<'_> {
    fn drop(&mut self) {
        self.flush();
    }
}

impl DrawSurface for PixelCanvas<'_> {
    fn size(&self) -> SurfaceSize {
        self.target.size()
    }

    fn density(&self) -> f64 {
        self.density
    }

    fn clear(&mut self, color: Color) {
        self.pending = None;
        self.target.fill(color);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        if let Some(ctx) = self.paint(color) {
            ctx.fill_rect(&to_vello::rect(rect.abs()));
        }
    }

    fn fill_circle(&mut self, circle: Circle, color: Color) {
        let circle = Circle::new(circle.center, circle.radius.abs());
        self.fill_path(&circle.to_path(TOLERANCE), color);
    }

    fn stroke_line(&mut self, line: Line, width: f64, color: Color) {
        let style = Stroke::new(width).with_caps(Cap::Round);
        self.stroke_path(&line.to_path(TOLERANCE), &style, color);
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        if let Some(ctx) = self.paint(color) {
            ctx.fill_path(&to_vello::path(path));
        }
    }

    fn stroke_path(&mut self, path: &BezPath, style: &Stroke, color: Color) {
        if style.width.is_nan() || style.width <= 0.0 {
            return;
        }
        if let Some(ctx) = self.paint(color) {
            ctx.set_stroke(to_vello::stroke(style));
            ctx.stroke_path(&to_vello::path(path));
        }
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "origin is rounded; far off-canvas origins saturate and are clipped"
    )]
    fn draw_image(&mut self, image: &PixelBuffer, origin: Point) {
        self.flush();
        let origin = Point::new(origin.x * self.density, origin.y * self.density).round();
        if let Some(top) = pixels::view(image) {
            self.composite(&top, origin.x as i64, origin.y as i64);
        }
    }
}

/// `size` in the renderer's 16-bit dimensions. Larger targets are only drawn
/// up to that limit.
fn renderer_size(size: SurfaceSize) -> (u16, u16) {
    let clamp = |v: u32| u16::try_from(v).unwrap_or(u16::MAX);
    (clamp(size.width), clamp(size.height))
}

mod to_vello {
    use vello_cpu::kurbo as vk;

    pub(super) fn point(p: kurbo::Point) -> vk::Point {
        vk::Point::new(p.x, p.y)
    }

    pub(super) fn rect(r: kurbo::Rect) -> vk::Rect {
        vk::Rect::new(r.x0, r.y0, r.x1, r.y1)
    }

    pub(super) fn path(path: &kurbo::BezPath) -> vk::BezPath {
        path.iter()
            .map(|el| match el {
                kurbo::PathEl::MoveTo(p) => vk::PathEl::MoveTo(point(p)),
                kurbo::PathEl::LineTo(p) => vk::PathEl::LineTo(point(p)),
                kurbo::PathEl::QuadTo(p1, p2) => vk::PathEl::QuadTo(point(p1), point(p2)),
                kurbo::PathEl::CurveTo(p1, p2, p3) => {
                    vk::PathEl::CurveTo(point(p1), point(p2), point(p3))
                }
                kurbo::PathEl::ClosePath => vk::PathEl::ClosePath,
            })
            .collect()
    }

    pub(super) fn stroke(style: &kurbo::Stroke) -> vk::Stroke {
        vk::Stroke::new(style.width)
            .with_join(join(style.join))
            .with_miter_limit(style.miter_limit)
            .with_start_cap(cap(style.start_cap))
            .with_end_cap(cap(style.end_cap))
            .with_dashes(style.dash_offset, style.dash_pattern.iter().copied())
    }

    fn join(join: kurbo::Join) -> vk::Join {
        match join {
            kurbo::Join::Bevel => vk::Join::Bevel,
            kurbo::Join::Miter => vk::Join::Miter,
            kurbo::Join::Round => vk::Join::Round,
        }
    }

    fn cap(cap: kurbo::Cap) -> vk::Cap {
        match cap {
            kurbo::Cap::Butt => vk::Cap::Butt,
            kurbo::Cap::Square => vk::Cap::Square,
            kurbo::Cap::Round => vk::Cap::Round,
        }
    }
}

/// Rasterizes off-screen bitmaps with [`PixelCanvas`].
#[derive(Clone, Debug)]
pub struct SoftwareRasterizer {
    density: f64,
    passes: u64,
}

impl Default for SoftwareRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftwareRasterizer {
    /// Creates a rasterizer with density `1.0`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_density(1.0)
    }

    /// Creates a rasterizer whose canvases scale geometry by `density`.
    #[must_use]
    pub fn with_density(density: f64) -> Self {
        Self { density, passes: 0 }
    }

    /// Number of bitmaps rasterized so far.
    #[must_use]
    pub fn passes(&self) -> u64 {
        self.passes
    }
}

impl Rasterize for SoftwareRasterizer {
    fn rasterize(&mut self, target: &mut PixelBuffer, draw: &mut dyn FnMut(&mut dyn DrawSurface)) {
        self.passes += 1;
        log::trace!("rasterizing {} bitmap (pass {})", target.size(), self.passes);
        let mut canvas = PixelCanvas::with_density(target, self.density);
        draw(&mut canvas);
        canvas.finish();
    }
}
