// Copyright 2026 the Sketchloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The sketches shown in the gallery.

use core::f64::consts::TAU;

use kurbo::{BezPath, Circle, Line, Point, Stroke, Vec2};
use sketchloop_core::runner::CacheScope;
use sketchloop_core::surface::{Color, DrawSurface};

/// Dots per mesh row and column.
const MESH_CELLS: u32 = 24;

/// Maps `value` from `[in_min, in_max]` onto `[out_min, out_max]`.
fn map_range(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    out_min + (value - in_min) / (in_max - in_min) * (out_max - out_min)
}

/// A ring that swells and bobs with `sin(t)`.
pub(crate) fn harmonic(t: f64, surface: &mut dyn DrawSurface) {
    let size = surface.size().to_rect();
    let wave = t.sin();
    let center = Point::new(size.width() / 2.0, map_range(wave, -1.0, 1.0, 0.0, size.height()));
    let radius = map_range(wave, -1.0, 1.0, 20.0, 200.0);

    let mut ring = BezPath::new();
    for degree in 0..360 {
        let p = center + Vec2::from_angle(f64::from(degree).to_radians()) * radius;
        if degree == 0 {
            ring.move_to(p);
        } else {
            ring.line_to(p);
        }
    }
    ring.close_path();
    surface.stroke_path(&ring, &Stroke::new(2.0), Color::DARK_GRAY.with_alpha(0.5));
}

/// One dot per frame on a Lissajous-like orbit; meant to be accumulated.
pub(crate) fn parametric_harmonic(t: f64, surface: &mut dyn DrawSurface) {
    let center = surface.size().to_rect().center();
    let offset = Vec2::new(
        (t * 40.0).sin() * 100.0 + (t * 60.0).sin() * 150.0,
        (t * 40.0).cos() * 100.0,
    );
    surface.fill_circle(
        Circle::new(center + offset, 5.0),
        Color::DARK_GRAY.with_alpha(0.4),
    );
}

/// A jittered grid of dots joined to their right and lower neighbors.
///
/// The layout depends only on the cache epoch, so invalidating the cache
/// reshuffles it.
pub(crate) fn dot_mesh(_t: f64, scope: &mut CacheScope<'_>) {
    let bounds = scope.size().to_rect();
    let seed = scope.epoch() as f64;
    let cell = Vec2::new(
        bounds.width() / f64::from(MESH_CELLS),
        bounds.height() / f64::from(MESH_CELLS),
    );

    let points: Vec<Point> = (0..MESH_CELLS * MESH_CELLS)
        .map(|i| {
            let (col, row) = (f64::from(i % MESH_CELLS), f64::from(i / MESH_CELLS));
            let angle = hash(col, row, seed) * TAU;
            let jitter = Vec2::from_angle(angle) * 0.35 * cell.x.min(cell.y);
            Point::new((col + 0.5) * cell.x, (row + 0.5) * cell.y) + jitter
        })
        .collect();

    let surface = scope.surface();
    let ink = Color::DARK_GRAY.with_alpha(0.3);
    let stride = MESH_CELLS as usize;
    for (i, &p) in points.iter().enumerate() {
        if (i + 1) % stride != 0 {
            surface.stroke_line(Line::new(p, points[i + 1]), 1.0, ink);
        }
        if let Some(&below) = points.get(i + stride) {
            surface.stroke_line(Line::new(p, below), 1.0, ink);
        }
    }
    for (i, &p) in points.iter().enumerate() {
        let hue = map_range(p.y, 0.0, bounds.height(), 180.0, 300.0);
        let radius = 2.0 + 3.0 * hash(i as f64, seed, 1.0);
        surface.fill_circle(Circle::new(p, radius), Color::from_hsv(hue, 0.6, 0.8));
    }
}

/// Deterministic pseudo-random value in `[0, 1)`.
fn hash(x: f64, y: f64, seed: f64) -> f64 {
    let v = (x * 12.9898 + y * 78.233 + seed * 37.719).sin() * 43_758.545_3;
    v - v.floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_range_is_linear() {
        assert_eq!(map_range(0.0, -1.0, 1.0, 20.0, 200.0), 110.0);
        assert_eq!(map_range(1.0, -1.0, 1.0, 0.0, 400.0), 400.0);
    }

    #[test]
    fn hash_stays_in_unit_range() {
        for i in 0..100 {
            let v = hash(f64::from(i), 3.0, 7.0);
            assert!((0.0..1.0).contains(&v), "hash({i}) = {v}");
        }
    }
}
