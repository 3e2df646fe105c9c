// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mutually exclusive routing between per-mode handlers.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use core::cell::RefCell;

use super::{Control, EventHandler, EventTarget, Subscription, TargetKey};

/// Payload of the arbiter's `change` event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModeChange<M> {
    /// The mode that was live before the switch, if any.
    pub from: Option<M>,
    /// The mode that is live now.
    pub to: M,
}

/// Routes events to exactly one of several per-mode handlers.
///
/// Handlers are created lazily by [`for_mode`](Self::for_mode). Only the
/// handler of the current mode sees events; switching modes sends
/// [`Control::Unpipe`] to the old handler and [`Control::Pipe`] to the new one
/// before announcing the switch through [`on_change`](Self::on_change).
pub struct EventArbiter<M: 'static, T: 'static> {
    inner: Rc<ArbiterInner<M, T>>,
}

struct ArbiterInner<M: 'static, T: 'static> {
    dispatchers: RefCell<BTreeMap<M, EventHandler<T>>>,
    current: RefCell<Option<M>>,
    changes: EventHandler<ModeChange<M>>,
}

impl<M: 'static, T: 'static> Clone for EventArbiter<M, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<M: Ord + Clone + core::fmt::Debug + 'static, T: 'static> core::fmt::Debug
    for EventArbiter<M, T>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventArbiter")
            .field("current", &*self.inner.current.borrow())
            .field("modes", &self.inner.dispatchers.borrow().len())
            .finish_non_exhaustive()
    }
}

impl<M: Ord + Clone + core::fmt::Debug + 'static, T: 'static> Default for EventArbiter<M, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Ord + Clone + core::fmt::Debug + 'static, T: 'static> EventArbiter<M, T> {
    /// Creates an arbiter with no mode set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ArbiterInner {
                dispatchers: RefCell::new(BTreeMap::new()),
                current: RefCell::new(None),
                changes: EventHandler::new(),
            }),
        }
    }

    /// Creates an arbiter that starts in `mode`.
    ///
    /// No `change` event is emitted for the initial mode.
    #[must_use]
    pub fn with_mode(mode: M) -> Self {
        let arbiter = Self::new();
        *arbiter.inner.current.borrow_mut() = Some(mode);
        arbiter
    }

    /// Returns the handler for `mode`, creating it on first use.
    pub fn for_mode(&self, mode: M) -> EventHandler<T> {
        self.inner
            .dispatchers
            .borrow_mut()
            .entry(mode)
            .or_default()
            .clone()
    }

    /// Returns the current mode.
    #[must_use]
    pub fn mode(&self) -> Option<M> {
        self.inner.current.borrow().clone()
    }

    /// Switches the live mode.
    ///
    /// Does nothing if `mode` is already current. Modes that never had a
    /// handler created are valid; they simply receive no control signal.
    pub fn set_mode(&self, mode: M) {
        let previous = {
            let current = self.inner.current.borrow();
            if current.as_ref() == Some(&mode) {
                return;
            }
            current.clone()
        };

        if let Some(old) = previous.as_ref() {
            let old_handler = self.inner.dispatchers.borrow().get(old).cloned();
            if let Some(handler) = old_handler {
                handler.control(Control::Unpipe);
            }
        }

        *self.inner.current.borrow_mut() = Some(mode.clone());

        let new_handler = self.inner.dispatchers.borrow().get(&mode).cloned();
        if let Some(handler) = new_handler {
            handler.control(Control::Pipe);
        }

        tracing::debug!(from = ?previous, to = ?mode, "arbiter mode changed");
        self.inner.changes.trigger(
            "change",
            &ModeChange {
                from: previous,
                to: mode,
            },
        );
    }

    /// Registers a listener for mode switches.
    pub fn on_change(&self, listener: impl Fn(&ModeChange<M>) + 'static) -> Subscription {
        self.inner.changes.on("change", listener)
    }

    /// Forwards an event to the current mode's handler only.
    ///
    /// Returns `false` without doing anything if no mode is set.
    pub fn trigger(&self, event_type: &str, data: &T) -> bool {
        let Some(mode) = self.mode() else {
            return false;
        };
        self.for_mode(mode).trigger(event_type, data)
    }

    /// Alias for [`trigger`](Self::trigger).
    pub fn emit(&self, event_type: &str, data: &T) -> bool {
        self.trigger(event_type, data)
    }
}

impl<M: Ord + Clone + core::fmt::Debug + 'static, T: 'static> EventTarget<T>
    for EventArbiter<M, T>
{
    fn trigger(&self, event_type: &str, data: &T) -> bool {
        Self::trigger(self, event_type, data)
    }

    fn target_key(&self) -> TargetKey {
        TargetKey::of(&self.inner)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn emit_without_mode_is_unhandled() {
        let arbiter = EventArbiter::<&str, i32>::new();
        let _ = arbiter.for_mode("A").on("x", |_| panic!("no mode is live"));
        assert!(!arbiter.emit("x", &1));
    }

    #[test]
    fn only_the_live_mode_sees_events() {
        let arbiter = EventArbiter::<&str, i32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let s = Rc::clone(&seen);
        let _ = arbiter.for_mode("A").on("x", move |v| s.borrow_mut().push(("A", *v)));
        let s = Rc::clone(&seen);
        let _ = arbiter.for_mode("B").on("x", move |v| s.borrow_mut().push(("B", *v)));

        let changes = Rc::new(RefCell::new(Vec::new()));
        let c = Rc::clone(&changes);
        let _ = arbiter.on_change(move |change| c.borrow_mut().push(change.clone()));

        arbiter.set_mode("A");
        assert!(arbiter.emit("x", &1));
        changes.borrow_mut().clear();

        arbiter.set_mode("B");
        assert!(arbiter.emit("x", &2));

        assert_eq!(*seen.borrow(), vec![("A", 1), ("B", 2)]);
        assert_eq!(
            *changes.borrow(),
            vec![ModeChange {
                from: Some("A"),
                to: "B"
            }]
        );
    }

    #[test]
    fn setting_same_mode_is_silent() {
        let arbiter = EventArbiter::<u8, ()>::with_mode(1);
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        let _ = arbiter.on_change(move |_| *c.borrow_mut() += 1);
        arbiter.set_mode(1);
        assert_eq!(*count.borrow(), 0);
        arbiter.set_mode(2);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn mode_switch_sends_unpipe_then_pipe() {
        let arbiter = EventArbiter::<u8, ()>::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for mode in [0_u8, 1] {
            let l = Rc::clone(&log);
            let _ = arbiter
                .for_mode(mode)
                .on_control(move |signal| l.borrow_mut().push((mode, signal)));
        }
        arbiter.set_mode(0);
        arbiter.set_mode(1);
        // Unknown mode: old handler is unpiped, nothing is piped.
        arbiter.set_mode(7);
        assert_eq!(
            *log.borrow(),
            vec![
                (0, Control::Pipe),
                (0, Control::Unpipe),
                (1, Control::Pipe),
                (1, Control::Unpipe),
            ]
        );
    }

    #[test]
    fn arbiter_can_be_piped_into() {
        let source = EventHandler::<i32>::new();
        let arbiter = EventArbiter::<&str, i32>::with_mode("A");
        let hits = Rc::new(RefCell::new(0));
        let h = Rc::clone(&hits);
        let _ = arbiter.for_mode("A").on("x", move |_| *h.borrow_mut() += 1);
        source.pipe(&arbiter);
        assert!(source.trigger("x", &0));
        assert_eq!(*hits.borrow(), 1);
    }
}
