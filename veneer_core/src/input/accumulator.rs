// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integrating deltas into state.

use alloc::rc::Rc;
use alloc::string::String;
use core::cell::RefCell;
use core::fmt;

use super::{SyncEvent, sync};
use crate::event::{EventTarget, TargetKey};
use crate::transition::{Interpolate, Transition, Transitionable};

/// Events that carry a delta of type `V`.
pub trait DeltaEvent<V> {
    /// Returns the delta, or `None` if this event carries none.
    fn delta(&self) -> Option<V>;
}

impl DeltaEvent<f64> for SyncEvent {
    fn delta(&self) -> Option<f64> {
        Some(self.delta)
    }
}

impl<V: Interpolate> DeltaEvent<V> for V {
    fn delta(&self) -> Option<V> {
        Some(*self)
    }
}

struct AccumulatorInner<V> {
    state: RefCell<Transitionable<V>>,
    event_type: String,
}

/// Sums the deltas of piped-in events into a [`Transitionable`] value.
///
/// Only events named `update` (or the name given to
/// [`with_event_type`](Self::with_event_type)) are integrated. Each delta
/// lands on the current value and cancels any running transition.
/// `Accumulator` is a cheap handle; clones share state.
pub struct Accumulator<V: 'static> {
    inner: Rc<AccumulatorInner<V>>,
}

impl<V: 'static> Clone for Accumulator<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<V: fmt::Debug + 'static> fmt::Debug for Accumulator<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accumulator")
            .field("state", &*self.inner.state.borrow())
            .field("event_type", &self.inner.event_type)
            .finish()
    }
}

impl<V: Interpolate + 'static> Accumulator<V> {
    /// Creates an accumulator starting at `initial`, integrating `update`
    /// events.
    #[must_use]
    pub fn new(initial: V) -> Self {
        Self::with_event_type(initial, sync::UPDATE)
    }

    /// Creates an accumulator integrating events named `event_type`.
    #[must_use]
    pub fn with_event_type(initial: V, event_type: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(AccumulatorInner {
                state: RefCell::new(Transitionable::new(initial)),
                event_type: event_type.into(),
            }),
        }
    }

    /// Returns the current value.
    #[must_use]
    pub fn get(&self) -> V {
        self.inner.state.borrow().get()
    }

    /// Jumps to `value`.
    pub fn set(&self, value: V) {
        self.inner.state.borrow_mut().set(value);
    }

    /// Moves to `value` over `transition`, starting at `now_ms`.
    pub fn set_with(&self, value: V, transition: Transition, now_ms: f64) {
        self.inner.state.borrow_mut().set_with(value, transition, now_ms);
    }

    /// Advances a running transition.
    pub fn tick(&self, now_ms: f64) {
        self.inner.state.borrow_mut().tick(now_ms);
    }

    /// Returns whether a transition is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.inner.state.borrow().is_active()
    }

    /// Stops a running transition at the current value.
    pub fn halt(&self) {
        self.inner.state.borrow_mut().halt();
    }
}

impl<V, E> EventTarget<E> for Accumulator<V>
where
    V: Interpolate + 'static,
    E: DeltaEvent<V>,
{
    fn trigger(&self, event_type: &str, data: &E) -> bool {
        if event_type != self.inner.event_type {
            return false;
        }
        let Some(delta) = data.delta() else {
            return false;
        };
        let mut state = self.inner.state.borrow_mut();
        let next = state.get().offset(delta);
        state.set(next);
        true
    }

    fn target_key(&self) -> TargetKey {
        TargetKey::of(&self.inner)
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Vec2};

    use super::*;
    use crate::event::EventHandler;
    use crate::input::{Measure, PinchSync, TouchInput, TouchPoint, touch};

    fn sync_event(delta: f64) -> SyncEvent {
        SyncEvent {
            touches: [0, 1],
            count: 2,
            delta,
            velocity: 0.0,
            position: 0.0,
            measure: Measure::Distance(0.0),
            center: Point::ORIGIN,
        }
    }

    #[test]
    fn integrates_update_deltas_only() {
        let acc = Accumulator::new(1.0);
        let source = EventHandler::<SyncEvent>::new();
        source.pipe(&acc);
        source.trigger(sync::START, &sync_event(100.0));
        source.trigger(sync::UPDATE, &sync_event(0.5));
        source.trigger(sync::UPDATE, &sync_event(0.25));
        source.trigger(sync::END, &sync_event(100.0));
        assert_eq!(acc.get(), 1.75);
    }

    #[test]
    fn delta_cancels_a_running_transition() {
        let acc = Accumulator::new(0.0);
        acc.set_with(10.0, Transition::linear(100.0), 0.0);
        acc.tick(50.0);
        assert!(acc.is_active());
        assert!(EventTarget::<f64>::trigger(&acc, sync::UPDATE, &1.0));
        assert!(!acc.is_active());
        assert_eq!(acc.get(), 6.0);
    }

    #[test]
    fn custom_event_type_and_vector_deltas() {
        let acc = Accumulator::with_event_type(Vec2::ZERO, "drag");
        let source = EventHandler::<Vec2>::new();
        source.pipe(&acc);
        source.trigger("drag", &Vec2::new(1.0, 2.0));
        source.trigger("update", &Vec2::new(100.0, 100.0));
        source.trigger("drag", &Vec2::new(3.0, -1.0));
        assert_eq!(acc.get(), Vec2::new(4.0, 1.0));
    }

    #[test]
    fn pinch_drives_an_accumulator_end_to_end() {
        let touches = EventHandler::<TouchInput>::new();
        let pinch = PinchSync::new();
        let zoom = Accumulator::new(0.0);
        touches.pipe(&pinch);
        pinch.output().pipe(&zoom);

        let start = TouchInput {
            changed: alloc::vec![TouchPoint::new(1, 0.0, 0.0), TouchPoint::new(2, 10.0, 0.0)],
            active: 2,
            timestamp_ms: 0.0,
        };
        touches.trigger(touch::START, &start);
        let spread = TouchInput {
            changed: alloc::vec![TouchPoint::new(2, 25.0, 0.0)],
            active: 2,
            timestamp_ms: 16.0,
        };
        touches.trigger(touch::MOVE, &spread);
        assert_eq!(zoom.get(), 15.0);
    }
}
