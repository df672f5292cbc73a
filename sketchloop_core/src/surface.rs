// Copyright 2026 the Sketchloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing capabilities supplied by the host.
//!
//! The core never rasterizes anything itself. Draw callbacks issue commands
//! against a [`DrawSurface`], an immediate-mode 2D canvas owned by the host
//! toolkit. Runners that keep content between frames additionally need to
//! draw *off-screen*: the host provides that through [`Rasterize`], which runs
//! a drawing closure against a surface backed by a [`PixelBuffer`].
//!
//! Geometry uses [`kurbo`] types in logical pixel coordinates with the origin
//! at the top-left corner of the surface.

use core::fmt;

use alloc::vec;
use alloc::vec::Vec;

use bytemuck::{Pod, Zeroable};
use kurbo::{BezPath, Circle, Line, Point, Rect, Stroke};

/// A straight-alpha RGBA color, 8 bits per channel.
///
/// The layout matches one pixel of a [`PixelBuffer`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha; 0 is fully transparent.
    pub a: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba8(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb8(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb8(255, 255, 255);
    /// Opaque dark gray, the default ink of most sketches.
    pub const DARK_GRAY: Self = Self::rgb8(0x44, 0x44, 0x44);

    /// Creates a color from its four channels.
    #[must_use]
    pub const fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color.
    #[must_use]
    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba8(r, g, b, 255)
    }

    /// Returns this color with its alpha replaced by `alpha` in `[0, 1]`.
    #[must_use]
    pub fn with_alpha(self, alpha: f64) -> Self {
        Self {
            a: unit_to_u8(alpha),
            ..self
        }
    }

    /// Creates an opaque color from hue (degrees), saturation, and value,
    /// the latter two in `[0, 1]`.
    #[must_use]
    pub fn from_hsv(hue: f64, saturation: f64, value: f64) -> Self {
        let mut h = hue % 360.0;
        if h < 0.0 {
            h += 360.0;
        }
        let h = h / 60.0;
        let s = unit(saturation);
        let v = unit(value);
        let c = v * s;
        let ramp = h % 2.0 - 1.0;
        let x = c * (1.0 - if ramp < 0.0 { -ramp } else { ramp });
        let (r, g, b) = match h {
            h if h < 1.0 => (c, x, 0.0),
            h if h < 2.0 => (x, c, 0.0),
            h if h < 3.0 => (0.0, c, x),
            h if h < 4.0 => (0.0, x, c),
            h if h < 5.0 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = v - c;
        Self::rgb8(unit_to_u8(r + m), unit_to_u8(g + m), unit_to_u8(b + m))
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is clamped to [0, 255] before the cast"
)]
fn unit_to_u8(v: f64) -> u8 {
    (unit(v) * 255.0 + 0.5) as u8
}

fn unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Size of a drawing surface in physical pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SurfaceSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl SurfaceSize {
    /// The empty size, reported by hosts before layout.
    pub const ZERO: Self = Self::new(0, 0);

    /// Creates a size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns `true` if either dimension is zero.
    ///
    /// An empty surface is "not ready": runners neither draw nor allocate.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels covered.
    #[must_use]
    pub const fn area(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Rounds a logical size to whole pixels; negative or NaN extents become
    /// zero.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "extents are clamped to be non-negative; saturating cast is intended"
    )]
    pub fn from_kurbo(size: kurbo::Size) -> Self {
        let round = |v: f64| {
            if v.is_nan() || v <= 0.0 {
                0
            } else {
                (v + 0.5) as u32
            }
        };
        Self::new(round(size.width), round(size.height))
    }

    /// The surface bounds as a rectangle at the origin.
    #[must_use]
    pub fn to_rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

impl fmt::Display for SurfaceSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// An owned RGBA8 bitmap.
///
/// Used for the persisted frames of the cached and accumulating runners and
/// for captured images.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    size: SurfaceSize,
    pixels: Vec<Color>,
}

impl PixelBuffer {
    /// Creates a fully transparent buffer.
    #[must_use]
    pub fn new(size: SurfaceSize) -> Self {
        Self::filled(size, Color::TRANSPARENT)
    }

    /// Creates a buffer with every pixel set to `color`.
    #[must_use]
    pub fn filled(size: SurfaceSize, color: Color) -> Self {
        Self {
            size,
            pixels: vec![color; size.area()],
        }
    }

    /// Creates a buffer from row-major pixels.
    ///
    /// Returns `None` if `pixels` does not hold exactly `size.area()` entries.
    #[must_use]
    pub fn from_pixels(size: SurfaceSize, pixels: Vec<Color>) -> Option<Self> {
        (pixels.len() == size.area()).then_some(Self { size, pixels })
    }

    /// The buffer dimensions.
    #[must_use]
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Row-major pixels.
    #[must_use]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Mutable row-major pixels.
    pub fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    /// The pixels as tightly packed RGBA8 bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// The pixels as mutable RGBA8 bytes.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        bytemuck::cast_slice_mut(&mut self.pixels)
    }

    /// Returns the pixel at `(x, y)`, if inside the buffer.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.size.width as usize + x as usize)
            .copied()
    }

    /// Sets every pixel to `color`, keeping the allocation.
    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Resizes to `size`, reusing the allocation when possible. Content is
    /// reset to transparent.
    pub fn reset(&mut self, size: SurfaceSize) {
        self.size = size;
        self.pixels.clear();
        self.pixels.resize(size.area(), Color::TRANSPARENT);
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// An immediate-mode 2D drawing surface.
///
/// Implemented by the host toolkit (or by `sketchloop_raster` for software
/// rendering). Colors are composited source-over; alpha is straight.
pub trait DrawSurface {
    /// Surface size in physical pixels.
    fn size(&self) -> SurfaceSize;

    /// Physical pixels per logical pixel.
    fn density(&self) -> f64 {
        1.0
    }

    /// Replaces every pixel with `color`.
    fn clear(&mut self, color: Color);

    /// Fills an axis-aligned rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Fills a circle.
    fn fill_circle(&mut self, circle: Circle, color: Color);

    /// Strokes a line segment with round caps.
    fn stroke_line(&mut self, line: Line, width: f64, color: Color);

    /// Fills a path using the non-zero winding rule.
    fn fill_path(&mut self, path: &BezPath, color: Color);

    /// Strokes a path with the joins, caps, and dashes of `style`.
    fn stroke_path(&mut self, path: &BezPath, style: &Stroke, color: Color);

    /// Draws each point as a filled dot of `radius`.
    fn draw_points(&mut self, points: &[Point], radius: f64, color: Color) {
        for &p in points {
            self.fill_circle(Circle::new(p, radius), color);
        }
    }

    /// Composites `image` with its top-left corner at `origin`.
    fn draw_image(&mut self, image: &PixelBuffer, origin: Point);
}

/// Off-screen drawing into a [`PixelBuffer`].
///
/// The cached and accumulating runners call this to regenerate their
/// persisted bitmap. Implementations run `draw` exactly once against a surface
/// whose size is `target.size()` and whose pixels are `target`'s, without
/// clearing it first.
pub trait Rasterize {
    /// Runs `draw` against a surface that writes into `target`.
    fn rasterize(&mut self, target: &mut PixelBuffer, draw: &mut dyn FnMut(&mut dyn DrawSurface));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sizes() {
        assert!(SurfaceSize::ZERO.is_empty());
        assert!(SurfaceSize::new(0, 200).is_empty());
        assert!(SurfaceSize::new(200, 0).is_empty());
        assert!(!SurfaceSize::new(1, 1).is_empty());
    }

    #[test]
    fn size_from_logical_rounds_and_clamps() {
        assert_eq!(
            SurfaceSize::from_kurbo(kurbo::Size::new(99.6, 100.2)),
            SurfaceSize::new(100, 100)
        );
        assert_eq!(
            SurfaceSize::from_kurbo(kurbo::Size::new(-5.0, f64::NAN)),
            SurfaceSize::ZERO
        );
    }

    #[test]
    fn pixel_buffer_bytes_are_rgba() {
        let mut buf = PixelBuffer::new(SurfaceSize::new(2, 1));
        buf.pixels_mut()[1] = Color::rgba8(1, 2, 3, 4);
        assert_eq!(buf.as_bytes(), &[0, 0, 0, 0, 1, 2, 3, 4]);
        assert_eq!(buf.get(1, 0), Some(Color::rgba8(1, 2, 3, 4)));
        assert_eq!(buf.get(2, 0), None);

        buf.as_bytes_mut()[0] = 9;
        assert_eq!(buf.get(0, 0), Some(Color::rgba8(9, 0, 0, 0)));
    }

    #[test]
    fn reset_resizes_and_clears() {
        let mut buf = PixelBuffer::filled(SurfaceSize::new(4, 4), Color::WHITE);
        buf.reset(SurfaceSize::new(2, 3));
        assert_eq!(buf.pixels().len(), 6);
        assert!(buf.pixels().iter().all(|&c| c == Color::TRANSPARENT));
    }

    #[test]
    fn from_pixels_checks_length() {
        let size = SurfaceSize::new(2, 2);
        assert!(PixelBuffer::from_pixels(size, alloc::vec![Color::BLACK; 3]).is_none());
        assert!(PixelBuffer::from_pixels(size, alloc::vec![Color::BLACK; 4]).is_some());
    }

    #[test]
    fn hsv_primaries() {
        assert_eq!(Color::from_hsv(0.0, 1.0, 1.0), Color::rgb8(255, 0, 0));
        assert_eq!(Color::from_hsv(120.0, 1.0, 1.0), Color::rgb8(0, 255, 0));
        assert_eq!(Color::from_hsv(240.0, 1.0, 1.0), Color::rgb8(0, 0, 255));
        assert_eq!(Color::from_hsv(0.0, 0.0, 1.0), Color::WHITE);
    }
}
