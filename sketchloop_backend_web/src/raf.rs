// Copyright 2026 the Sketchloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `requestAnimationFrame` frame source.
//!
//! [`RafLoop`] pushes one [`FrameTick`] per display refresh using the
//! browser's `requestAnimationFrame` API. Each callback receives a
//! [`DOMHighResTimeStamp`][mdn] (milliseconds since the time origin), which
//! [`tick_at`](crate::tick_at) turns into nanosecond [`HostTime`].
//!
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/API/DOMHighResTimeStamp
//! [`FrameTick`]: sketchloop_core::timing::FrameTick
//! [`HostTime`]: sketchloop_core::time::HostTime

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use sketchloop_core::timing::FrameTick;

// Bound as globals so no Window object is looked up per frame.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(id: i32);
}

/// A `requestAnimationFrame` loop that delivers [`FrameTick`]s.
///
/// Create with [`RafLoop::new`], then call [`start`](Self::start). The loop
/// re-registers itself each frame until [`stop`](Self::stop) is called or the
/// `RafLoop` is dropped. A sketch host stops the loop when it disposes the
/// sketch, so no tick is delivered after teardown.
///
/// [`FrameTick`]: sketchloop_core::timing::FrameTick
pub struct RafLoop {
    inner: Rc<RafInner>,
}

type RafClosure = Closure<dyn FnMut(f64)>;

struct RafInner {
    /// The JS closure registered with `requestAnimationFrame`.
    ///
    /// Lives in its own `RefCell` so it can re-register itself while
    /// `callback` is borrowed.
    closure: RefCell<Option<RafClosure>>,

    /// Receives one tick per animation frame.
    callback: RefCell<Box<dyn FnMut(FrameTick)>>,

    /// Becomes `FrameTick::frame_index`. Not reset by `stop`.
    frame_counter: Cell<u64>,

    running: Cell<bool>,

    /// ID of the pending `requestAnimationFrame` request.
    raf_id: Cell<i32>,
}

impl RafLoop {
    /// Creates a loop that is **not yet running**.
    pub fn new(callback: impl FnMut(FrameTick) + 'static) -> Self {
        Self {
            inner: Rc::new(RafInner {
                closure: RefCell::new(None),
                callback: RefCell::new(Box::new(callback)),
                frame_counter: Cell::new(0),
                running: Cell::new(false),
                raf_id: Cell::new(0),
            }),
        }
    }

    /// Starts the loop. No-op if already running.
    pub fn start(&self) {
        if self.inner.running.get() {
            return;
        }
        self.inner.running.set(true);

        if let Some(closure) = &*self.inner.closure.borrow() {
            // Restarting after `stop`: the closure is still alive.
            let id = request_animation_frame(closure.as_ref().unchecked_ref());
            self.inner.raf_id.set(id);
            return;
        }

        let inner = Rc::clone(&self.inner);
        let closure = Closure::wrap(Box::new(move |timestamp_ms: f64| {
            if !inner.running.get() {
                return;
            }

            let frame_index = inner.frame_counter.get();
            inner.frame_counter.set(frame_index + 1);

            inner.callback.borrow_mut()(crate::tick_at(timestamp_ms, frame_index));

            // The callback may have stopped the loop.
            if inner.running.get()
                && let Some(closure) = &*inner.closure.borrow()
            {
                let id = request_animation_frame(closure.as_ref().unchecked_ref());
                inner.raf_id.set(id);
            }
        }) as Box<dyn FnMut(f64)>);

        let id = request_animation_frame(closure.as_ref().unchecked_ref());
        self.inner.raf_id.set(id);
        *self.inner.closure.borrow_mut() = Some(closure);
    }

    /// Stops the loop and cancels the pending frame request.
    ///
    /// [`start`](Self::start) resumes it; frame indices keep counting.
    pub fn stop(&self) {
        if !self.inner.running.get() {
            return;
        }
        self.inner.running.set(false);
        cancel_animation_frame(self.inner.raf_id.get());
    }

    /// Returns `true` while the loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }

    /// Number of ticks delivered so far.
    #[must_use]
    pub fn frames_delivered(&self) -> u64 {
        self.inner.frame_counter.get()
    }
}

impl Drop for RafLoop {
    fn drop(&mut self) {
        self.stop();
        // Breaks the Rc cycle between the closure and `inner`.
        self.inner.closure.borrow_mut().take();
    }
}

impl core::fmt::Debug for RafLoop {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RafLoop")
            .field("running", &self.inner.running.get())
            .field("frame_counter", &self.inner.frame_counter.get())
            .finish_non_exhaustive()
    }
}
