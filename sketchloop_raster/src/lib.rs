// Copyright 2026 the Sketchloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Software rendering for sketchloop.
//!
//! `sketchloop_core` describes drawing through the
//! [`DrawSurface`](sketchloop_core::surface::DrawSurface) trait and leaves
//! pixels to the host. This crate is the host side for anything that does
//! not have a GPU canvas at hand (tests, headless export, the gallery demo):
//!
//! - [`PixelCanvas`] draws into a [`PixelBuffer`](sketchloop_core::surface::PixelBuffer)
//!   through `vello_cpu`.
//! - [`SoftwareRasterizer`] implements
//!   [`Rasterize`](sketchloop_core::surface::Rasterize), so the cached and
//!   accumulating runners can render their off-screen bitmaps with it.
//! - [`FramebufferCapture`] answers capture requests from a window
//!   framebuffer.

pub mod canvas;
pub mod capture;
mod pixels;

pub use canvas::{PixelCanvas, SoftwareRasterizer};
pub use capture::FramebufferCapture;
