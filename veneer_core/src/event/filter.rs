// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Predicate-gated forwarding.

use alloc::rc::Rc;

use super::{Control, EventHandler, EventTarget, Subscription, TargetKey};

/// An [`EventHandler`] that drops events failing a predicate.
///
/// Dropped events are gone: no listener runs, nothing is forwarded
/// downstream, and nothing is buffered for later.
pub struct EventFilter<T: 'static> {
    handler: EventHandler<T>,
    condition: Rc<dyn Fn(&str, &T) -> bool>,
}

impl<T: 'static> Clone for EventFilter<T> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
            condition: Rc::clone(&self.condition),
        }
    }
}

impl<T: 'static> core::fmt::Debug for EventFilter<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventFilter")
            .field("handler", &self.handler)
            .finish_non_exhaustive()
    }
}

impl<T: 'static> EventFilter<T> {
    /// Creates a filter that forwards events for which `condition` holds.
    pub fn new(condition: impl Fn(&str, &T) -> bool + 'static) -> Self {
        Self {
            handler: EventHandler::new(),
            condition: Rc::new(condition),
        }
    }

    /// Returns the wrapped handler, for listeners and piping.
    #[must_use]
    pub fn handler(&self) -> &EventHandler<T> {
        &self.handler
    }

    /// Registers a listener on the wrapped handler.
    pub fn on(&self, event_type: &str, listener: impl Fn(&T) + 'static) -> Subscription {
        self.handler.on(event_type, listener)
    }

    /// Pipes accepted events on to `target`.
    pub fn pipe<S>(&self, target: &S)
    where
        S: EventTarget<T> + Clone + 'static,
    {
        self.handler.pipe(target);
    }

    /// Stops piping accepted events to `target`.
    pub fn unpipe<S>(&self, target: &S) -> bool
    where
        S: EventTarget<T> + ?Sized,
    {
        self.handler.unpipe(target)
    }

    /// Forwards the event if the condition holds; drops it otherwise.
    pub fn trigger(&self, event_type: &str, data: &T) -> bool {
        if !(self.condition)(event_type, data) {
            return false;
        }
        self.handler.trigger(event_type, data)
    }

    /// Alias for [`trigger`](Self::trigger).
    pub fn emit(&self, event_type: &str, data: &T) -> bool {
        self.trigger(event_type, data)
    }
}

impl<T: 'static> EventTarget<T> for EventFilter<T> {
    fn trigger(&self, event_type: &str, data: &T) -> bool {
        Self::trigger(self, event_type, data)
    }

    fn control(&self, signal: Control) {
        self.handler.control(signal);
    }

    fn target_key(&self) -> TargetKey {
        self.handler.target_key()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Message {
        msg: String,
    }

    #[test]
    fn forwards_only_matching_events() {
        let source = EventHandler::<Message>::new();
        let filter = EventFilter::new(|_: &str, data: &Message| data.msg == "ALERT!");
        let downstream = EventHandler::<Message>::new();
        let received = Rc::new(RefCell::new(Vec::new()));
        let r = Rc::clone(&received);
        let _ = downstream.on("message", move |m: &Message| r.borrow_mut().push(m.msg.clone()));

        source.pipe(&filter);
        filter.pipe(&downstream);

        assert!(source.trigger(
            "message",
            &Message {
                msg: "ALERT!".into()
            }
        ));
        assert!(!source.trigger("message", &Message { msg: "x".into() }));
        assert_eq!(*received.borrow(), vec![String::from("ALERT!")]);
    }

    #[test]
    fn condition_sees_event_type() {
        let filter = EventFilter::new(|event_type: &str, _: &i32| event_type == "keep");
        let hits = Rc::new(RefCell::new(0));
        let h = Rc::clone(&hits);
        let _ = filter.on("keep", move |_| *h.borrow_mut() += 1);
        let h = Rc::clone(&hits);
        let _ = filter.on("drop", move |_| *h.borrow_mut() += 100);
        filter.emit("keep", &0);
        filter.emit("drop", &0);
        assert_eq!(*hits.borrow(), 1);
    }
}
