// Copyright 2026 the Sketchloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`PixelBuffer`]s seen as `image` buffers.

use image::{ImageBuffer, Rgba, RgbaImage};

use sketchloop_core::surface::{Color, PixelBuffer, SurfaceSize};

/// A borrowed RGBA8 image.
pub(crate) type View<'a> = ImageBuffer<Rgba<u8>, &'a [u8]>;

/// A mutably borrowed RGBA8 image.
pub(crate) type ViewMut<'a> = ImageBuffer<Rgba<u8>, &'a mut [u8]>;

pub(crate) fn view(buf: &PixelBuffer) -> Option<View<'_>> {
    let size = buf.size();
    ImageBuffer::from_raw(size.width, size.height, buf.as_bytes())
}

pub(crate) fn view_mut(buf: &mut PixelBuffer) -> Option<ViewMut<'_>> {
    let size = buf.size();
    ImageBuffer::from_raw(size.width, size.height, buf.as_bytes_mut())
}

/// Copies a buffer into an owned image.
pub(crate) fn to_image(buf: &PixelBuffer) -> RgbaImage {
    let size = buf.size();
    RgbaImage::from_fn(size.width, size.height, |x, y| {
        let Color { r, g, b, a } = buf.get(x, y).unwrap_or_default();
        Rgba([r, g, b, a])
    })
}

/// Copies an owned image into a new buffer.
pub(crate) fn to_buffer(image: &RgbaImage) -> PixelBuffer {
    let mut buf = PixelBuffer::new(SurfaceSize::new(image.width(), image.height()));
    for (dst, src) in buf.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = Color::rgba8(r, g, b, a);
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn views_share_the_buffer_layout() {
        let mut buf = PixelBuffer::new(SurfaceSize::new(3, 2));
        view_mut(&mut buf)
            .unwrap()
            .put_pixel(2, 1, Rgba([1, 2, 3, 4]));
        assert_eq!(buf.get(2, 1), Some(Color::rgba8(1, 2, 3, 4)));

        assert_eq!(view(&buf).unwrap().dimensions(), (3, 2));
        assert_eq!(to_buffer(&to_image(&buf)), buf);
    }
}
