// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM touch events as [`TouchInput`].

use alloc::boxed::Box;
use alloc::vec::Vec;

use veneer_core::event::EventHandler;
use veneer_core::input::{TouchInput, TouchPoint, touch};
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use web_sys::{EventTarget, TouchEvent, TouchList};

const EVENT_NAMES: [&str; 4] = [touch::START, touch::MOVE, touch::END, touch::CANCEL];

type TouchClosure = Closure<dyn FnMut(TouchEvent)>;

/// Listens for touch events on a DOM element and triggers them, converted to
/// [`TouchInput`], on an [`EventHandler`].
///
/// Listeners are attached by [`start`](Self::start) and removed by
/// [`stop`](Self::stop) or when the adapter is dropped. Gesture syncs are
/// piped from [`output`](Self::output).
pub struct TouchAdapter {
    target: EventTarget,
    output: EventHandler<TouchInput>,
    closure: Option<TouchClosure>,
}

impl core::fmt::Debug for TouchAdapter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TouchAdapter")
            .field("output", &self.output)
            .field("listening", &self.closure.is_some())
            .finish_non_exhaustive()
    }
}

impl TouchAdapter {
    /// Creates a stopped adapter for `target` with a fresh output handler.
    #[must_use]
    pub fn new(target: EventTarget) -> Self {
        Self::with_output(target, EventHandler::new())
    }

    /// Creates a stopped adapter that triggers on `output`.
    #[must_use]
    pub fn with_output(target: EventTarget, output: EventHandler<TouchInput>) -> Self {
        Self {
            target,
            output,
            closure: None,
        }
    }

    /// Returns the handler touch events are triggered on.
    #[must_use]
    pub fn output(&self) -> &EventHandler<TouchInput> {
        &self.output
    }

    /// Returns whether listeners are attached.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.closure.is_some()
    }

    /// Attaches the touch listeners. No-op if already listening.
    pub fn start(&mut self) {
        if self.closure.is_some() {
            return;
        }
        let output = self.output.clone();
        let closure = Closure::wrap(Box::new(move |event: TouchEvent| {
            let input = TouchInput {
                changed: touch_points(&event.changed_touches()),
                active: event.touches().length() as usize,
                timestamp_ms: event.time_stamp(),
            };
            output.trigger(&event.type_(), &input);
        }) as Box<dyn FnMut(TouchEvent)>);
        for name in EVENT_NAMES {
            if self
                .target
                .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
                .is_err()
            {
                tracing::warn!(event = name, "failed to attach touch listener");
            }
        }
        self.closure = Some(closure);
    }

    /// Removes the touch listeners. No-op if not listening.
    pub fn stop(&mut self) {
        let Some(closure) = self.closure.take() else {
            return;
        };
        for name in EVENT_NAMES {
            let _ = self
                .target
                .remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        }
    }
}

impl Drop for TouchAdapter {
    fn drop(&mut self) {
        self.stop();
    }
}

fn touch_points(list: &TouchList) -> Vec<TouchPoint> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .map(|t| TouchPoint::new(t.identifier(), f64::from(t.page_x()), f64::from(t.page_y())))
        .collect()
}
