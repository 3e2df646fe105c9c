// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `requestAnimationFrame` tick source.
//!
//! [`RafLoop`] calls back once per browser animation frame with a
//! [`FrameTick`] carrying the callback's [`DOMHighResTimeStamp`][mdn]
//! (milliseconds on the `performance.now()` clock).
//! [`RafLoop::for_engine`] builds a loop that steps an [`Engine`] directly
//! and keeps its contexts sized to their containers.
//!
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/API/DOMHighResTimeStamp

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use core::cell::{Cell, RefCell};

use veneer_core::backend::Presenter;
use veneer_core::engine::Engine;
use veneer_core::timing::FrameTick;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use crate::resize::ResizeWatch;

// Global bindings, so no Window or Performance object is fetched per frame.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(id: i32);
}

type FrameClosure = Closure<dyn FnMut(f64)>;

/// A `requestAnimationFrame` loop emitting [`FrameTick`]s.
///
/// Frame indices start at zero and keep counting across
/// [`stop`](Self::stop) and [`start`](Self::start). Dropping the loop
/// cancels any pending frame.
pub struct RafLoop {
    shared: Rc<Shared>,
    /// Present for loops built by [`for_engine`](Self::for_engine).
    resize: Option<ResizeWatch>,
}

struct Shared {
    /// Holds only a weak reference back, so dropping the loop frees it.
    frame: FrameClosure,
    on_tick: RefCell<Box<dyn FnMut(FrameTick)>>,
    next_index: Cell<u64>,
    running: Cell<bool>,
    request: Cell<Option<i32>>,
}

impl Shared {
    fn request_frame(&self) {
        let id = request_animation_frame(self.frame.as_ref().unchecked_ref());
        self.request.set(Some(id));
    }

    fn run_frame(&self, timestamp_ms: f64) {
        self.request.set(None);
        if !self.running.get() {
            return;
        }
        let index = self.next_index.get();
        self.next_index.set(index + 1);
        // `on_tick` may call `stop`, which only touches the cells.
        self.on_tick.borrow_mut()(FrameTick::new(index, timestamp_ms));
        if self.running.get() && self.request.get().is_none() {
            self.request_frame();
        }
    }
}

impl RafLoop {
    /// Creates a stopped loop calling `on_tick` once per frame.
    pub fn new(on_tick: impl FnMut(FrameTick) + 'static) -> Self {
        let shared = Rc::new_cyclic(|weak: &Weak<Shared>| {
            let weak = weak.clone();
            Shared {
                frame: Closure::wrap(Box::new(move |timestamp_ms: f64| {
                    if let Some(shared) = weak.upgrade() {
                        shared.run_frame(timestamp_ms);
                    }
                }) as Box<dyn FnMut(f64)>),
                on_tick: RefCell::new(Box::new(on_tick)),
                next_index: Cell::new(0),
                running: Cell::new(false),
                request: Cell::new(None),
            }
        });
        Self {
            shared,
            resize: None,
        }
    }

    /// Creates a stopped loop that steps `engine` once per frame.
    ///
    /// Window resizes are collected between frames; the next frame
    /// re-measures every context before stepping. A frame that finds the
    /// engine already borrowed is skipped.
    pub fn for_engine<P: Presenter + 'static>(engine: Rc<RefCell<Engine<P>>>) -> Self {
        let resize = ResizeWatch::new();
        let resized = resize.flag();
        let mut raf = Self::new(move |tick| {
            drive_engine(&engine, resized.replace(false), &tick);
        });
        raf.resize = Some(resize);
        raf
    }

    /// Starts requesting frames. No-op if already running.
    pub fn start(&self) {
        if self.shared.running.replace(true) {
            return;
        }
        if self.shared.request.get().is_none() {
            self.shared.request_frame();
        }
    }

    /// Stops the loop and cancels the pending frame. It can be restarted.
    pub fn stop(&self) {
        self.shared.running.set(false);
        if let Some(id) = self.shared.request.take() {
            cancel_animation_frame(id);
        }
    }

    /// Returns whether frames are being requested.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.running.get()
    }

    /// Returns whether this loop follows window resizes.
    #[must_use]
    pub fn tracks_resize(&self) -> bool {
        self.resize.is_some()
    }
}

impl Drop for RafLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

impl core::fmt::Debug for RafLoop {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RafLoop")
            .field("running", &self.shared.running.get())
            .field("next_index", &self.shared.next_index.get())
            .field("tracks_resize", &self.resize.is_some())
            .finish_non_exhaustive()
    }
}

/// Runs one engine frame, re-measuring first if the window was resized.
fn drive_engine<P: Presenter>(engine: &RefCell<Engine<P>>, resized: bool, tick: &FrameTick) {
    let Ok(mut engine) = engine.try_borrow_mut() else {
        tracing::warn!(frame = tick.frame_index, "engine borrowed elsewhere, frame skipped");
        return;
    };
    if resized {
        engine.remeasure_all();
    }
    engine.step(tick);
}
