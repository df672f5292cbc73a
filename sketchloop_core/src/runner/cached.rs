// Copyright 2026 the Sketchloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;
use core::mem;

use kurbo::Point;

use crate::surface::{DrawSurface, PixelBuffer, Rasterize, SurfaceSize};

use super::{FrameOutcome, RegenReason, RunnerKind, SketchRunner};

/// What the cached draw callback sees while its bitmap is regenerated.
pub struct CacheScope<'a> {
    surface: &'a mut dyn DrawSurface,
    size: SurfaceSize,
    epoch: u64,
}

impl CacheScope<'_> {
    /// The off-screen surface backing the cached bitmap.
    pub fn surface(&mut self) -> &mut dyn DrawSurface {
        &mut *self.surface
    }

    /// Size of the bitmap being generated.
    #[must_use]
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// The cache epoch this bitmap is generated for.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

impl fmt::Debug for CacheScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheScope")
            .field("size", &self.size)
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

/// The persisted bitmap and the inputs it was generated from.
#[derive(Debug)]
struct CachedFrame {
    bitmap: PixelBuffer,
    size: SurfaceSize,
    epoch: u64,
}

#[derive(Debug)]
enum CacheState {
    Uninitialized,
    Cached(CachedFrame),
    Disposed,
}

/// Draws into a persisted bitmap only when its inputs change.
///
/// Expensive sketches whose structure does not depend on every clock tick
/// render once into an off-screen bitmap through the runner's [`Rasterize`]
/// implementation. Every later frame blits that bitmap, without invoking the
/// callback, until either the surface size changes or the caller bumps the
/// cache epoch with [`invalidate`](Self::invalidate).
///
/// # States
///
/// ```text
///   Uninitialized ──► Regenerating ──► Cached ──┐
///                          ▲                    │ size or epoch changed
///                          └────────────────────┘
///   (any) ──dispose()──► Disposed
/// ```
///
/// Regeneration happens at most once per distinct `(size, epoch)` pair; the
/// bitmap is blitted exactly once per presented frame. An empty surface size
/// means "not ready": nothing is allocated or drawn and the state is left
/// alone.
pub struct CachedSketchRunner<F, R> {
    draw: F,
    rasterizer: R,
    state: CacheState,
    epoch: u64,
    regenerations: u64,
}

impl<F, R> CachedSketchRunner<F, R>
where
    F: FnMut(f64, &mut CacheScope<'_>),
    R: Rasterize,
{
    /// Creates a runner that rasterizes `draw` through `rasterizer`.
    #[must_use]
    pub fn new(rasterizer: R, draw: F) -> Self {
        Self {
            draw,
            rasterizer,
            state: CacheState::Uninitialized,
            epoch: 0,
            regenerations: 0,
        }
    }

    /// Bumps the cache epoch so the next non-empty frame regenerates.
    ///
    /// Any number of invalidations between two frames cause a single
    /// regeneration.
    pub fn invalidate(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// The current cache epoch.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Number of times the callback has run to completion.
    #[must_use]
    pub fn regenerations(&self) -> u64 {
        self.regenerations
    }

    /// Size of the cached bitmap, if one exists.
    #[must_use]
    pub fn cached_size(&self) -> Option<SurfaceSize> {
        match &self.state {
            CacheState::Cached(frame) => Some(frame.size),
            _ => None,
        }
    }

    /// The cached bitmap, if one exists.
    #[must_use]
    pub fn cached_bitmap(&self) -> Option<&PixelBuffer> {
        match &self.state {
            CacheState::Cached(frame) => Some(&frame.bitmap),
            _ => None,
        }
    }

    /// Returns `true` once [`dispose`](SketchRunner::dispose) has been called.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        matches!(self.state, CacheState::Disposed)
    }

    /// Runs the callback into the bitmap, blits it, then commits it.
    fn regenerate(&mut self, time: f64, surface: &mut dyn DrawSurface) {
        let size = surface.size();
        // Reuse the previous allocation; it is overwritten in place.
        let mut bitmap = match mem::replace(&mut self.state, CacheState::Uninitialized) {
            CacheState::Cached(frame) => frame.bitmap,
            _ => PixelBuffer::new(SurfaceSize::ZERO),
        };
        bitmap.reset(size);

        let epoch = self.epoch;
        let draw = &mut self.draw;
        self.rasterizer
            .rasterize(&mut bitmap, &mut |target: &mut dyn DrawSurface| {
                let mut scope = CacheScope {
                    surface: target,
                    size,
                    epoch,
                };
                draw(time, &mut scope);
            });

        surface.draw_image(&bitmap, Point::ZERO);
        self.regenerations += 1;
        self.state = CacheState::Cached(CachedFrame {
            bitmap,
            size,
            epoch,
        });
    }
}

impl<F, R> SketchRunner for CachedSketchRunner<F, R>
where
    F: FnMut(f64, &mut CacheScope<'_>),
    R: Rasterize,
{
    fn render(&mut self, time: f64, surface: &mut dyn DrawSurface) -> FrameOutcome {
        if self.is_disposed() {
            return FrameOutcome::Disposed;
        }
        let size = surface.size();
        if size.is_empty() {
            return FrameOutcome::NotReady;
        }

        let reason = match &self.state {
            CacheState::Cached(frame) if frame.size != size => RegenReason::Resized,
            CacheState::Cached(frame) if frame.epoch != self.epoch => RegenReason::Invalidated,
            CacheState::Cached(frame) => {
                surface.draw_image(&frame.bitmap, Point::ZERO);
                return FrameOutcome::Blitted;
            }
            CacheState::Uninitialized | CacheState::Disposed => RegenReason::Initial,
        };

        self.regenerate(time, surface);
        FrameOutcome::Regenerated(reason)
    }

    fn dispose(&mut self) {
        self.state = CacheState::Disposed;
    }

    fn kind(&self) -> RunnerKind {
        RunnerKind::Cached
    }
}

impl<F, R: fmt::Debug> fmt::Debug for CachedSketchRunner<F, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedSketchRunner")
            .field("rasterizer", &self.rasterizer)
            .field("state", &self.state)
            .field("epoch", &self.epoch)
            .field("regenerations", &self.regenerations)
            .finish_non_exhaustive()
    }
}
