// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Window resize notifications.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::Cell;

use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use web_sys::Window;

const RESIZE: &str = "resize";

/// Raises a flag on every window `resize` event until dropped.
///
/// The flag is polled, and cleared, once per frame, so any number of
/// resize events between two frames costs one re-measure.
pub(crate) struct ResizeWatch {
    window: Option<Window>,
    flag: Rc<Cell<bool>>,
    closure: Closure<dyn FnMut()>,
}

impl ResizeWatch {
    pub(crate) fn new() -> Self {
        let flag = Rc::new(Cell::new(false));
        let raised = Rc::clone(&flag);
        let closure = Closure::wrap(Box::new(move || raised.set(true)) as Box<dyn FnMut()>);
        let window = web_sys::window();
        match &window {
            Some(window) => {
                if window
                    .add_event_listener_with_callback(RESIZE, closure.as_ref().unchecked_ref())
                    .is_err()
                {
                    tracing::warn!("failed to attach resize listener");
                }
            }
            None => tracing::warn!("no window, container resizes are not tracked"),
        }
        Self {
            window,
            flag,
            closure,
        }
    }

    /// Returns the shared flag; `true` means a resize since it was cleared.
    pub(crate) fn flag(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.flag)
    }
}

impl Drop for ResizeWatch {
    fn drop(&mut self) {
        if let Some(window) = &self.window {
            let _ = window
                .remove_event_listener_with_callback(RESIZE, self.closure.as_ref().unchecked_ref());
        }
    }
}
