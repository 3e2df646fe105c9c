// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two-contact gesture syncs: pinch, rotate, and scale.
//!
//! All three share one state machine:
//!
//! ```text
//!             second touchstart (emit start)
//!   ┌──────┐ ───────────────────────────────► ┌──────────┐
//!   │ Idle │                                   │ Tracking │ ◄── touchmove of a
//!   └──────┘ ◄─────────────────────────────── └──────────┘     tracked contact
//!             either tracked contact ends                      (emit update)
//!             (emit end)
//! ```
//!
//! Only the first two contacts seen are tracked; further contacts are
//! ignored until tracking ends. Each update measures the gesture against the
//! previous update, not against the start.

use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;

use kurbo::Point;

use super::{Measure, SyncEvent, SyncOptions, TouchInput, sync, touch};
use crate::event::{EventHandler, EventTarget, Subscription, TargetKey};

/// The quantity a [`TwoFingerSync`] derives from the two contact positions.
pub trait TwoFingerGesture: Default + 'static {
    /// Name used in logs.
    const NAME: &'static str;

    /// Starts measuring with contacts at `a` and `b`.
    fn begin(&mut self, a: Point, b: Point) -> Measure;

    /// Measures the contacts at their new positions. Returns the unscaled
    /// change since the previous measurement and the new measure.
    fn advance(&mut self, a: Point, b: Point) -> (f64, Measure);
}

/// Distance between the contacts.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pinch {
    previous: f64,
}

impl TwoFingerGesture for Pinch {
    const NAME: &'static str = "pinch";

    fn begin(&mut self, a: Point, b: Point) -> Measure {
        self.previous = a.distance(b);
        Measure::Distance(self.previous)
    }

    fn advance(&mut self, a: Point, b: Point) -> (f64, Measure) {
        let distance = a.distance(b);
        let delta = distance - self.previous;
        self.previous = distance;
        (delta, Measure::Distance(distance))
    }
}

/// Angle of the line from the first contact to the second.
///
/// The angle is not unwrapped: a rotation through the ±π boundary shows up
/// as one update with a delta of nearly ±2π.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rotate {
    previous: f64,
}

impl TwoFingerGesture for Rotate {
    const NAME: &'static str = "rotate";

    fn begin(&mut self, a: Point, b: Point) -> Measure {
        self.previous = (b - a).atan2();
        Measure::Angle(self.previous)
    }

    fn advance(&mut self, a: Point, b: Point) -> (f64, Measure) {
        let angle = (b - a).atan2();
        let delta = angle - self.previous;
        self.previous = angle;
        (delta, Measure::Angle(angle))
    }
}

/// Distance relative to the distance when tracking began.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Scale {
    start: f64,
    previous: f64,
}

impl Scale {
    fn factor(&self, a: Point, b: Point) -> f64 {
        if self.start > 0.0 {
            a.distance(b) / self.start
        } else {
            1.0
        }
    }
}

impl TwoFingerGesture for Scale {
    const NAME: &'static str = "scale";

    fn begin(&mut self, a: Point, b: Point) -> Measure {
        self.start = a.distance(b);
        self.previous = 1.0;
        Measure::Scale(1.0)
    }

    fn advance(&mut self, a: Point, b: Point) -> (f64, Measure) {
        let factor = self.factor(a, b);
        let delta = factor - self.previous;
        self.previous = factor;
        (delta, Measure::Scale(factor))
    }
}

/// Tracks pinch distance.
pub type PinchSync = TwoFingerSync<Pinch>;
/// Tracks rotation angle.
pub type RotateSync = TwoFingerSync<Rotate>;
/// Tracks relative scale.
pub type ScaleSync = TwoFingerSync<Scale>;

#[derive(Clone, Copy, Debug)]
struct Tracked {
    id: i32,
    position: Point,
    timestamp_ms: f64,
}

struct SyncState<G> {
    a: Option<Tracked>,
    b: Option<Tracked>,
    gesture: G,
    measure: Option<Measure>,
    position: f64,
    options: SyncOptions,
}

struct SyncInner<G> {
    state: RefCell<SyncState<G>>,
    output: EventHandler<SyncEvent>,
}

/// A two-contact gesture tracker.
///
/// Pipe a [`TouchInput`] source into it; listen on, or pipe from,
/// [`output`](Self::output) for [`SyncEvent`]s. `TwoFingerSync` is a cheap
/// handle; clones share state.
///
/// ```
/// use veneer_core::event::EventHandler;
/// use veneer_core::input::{Accumulator, PinchSync, TouchInput};
///
/// let touches = EventHandler::<TouchInput>::new();
/// let pinch = PinchSync::new();
/// let zoom = Accumulator::new(1.0);
/// touches.pipe(&pinch);
/// pinch.output().pipe(&zoom);
/// ```
pub struct TwoFingerSync<G: TwoFingerGesture> {
    inner: Rc<SyncInner<G>>,
}

impl<G: TwoFingerGesture> Clone for TwoFingerSync<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<G: TwoFingerGesture> Default for TwoFingerSync<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: TwoFingerGesture> fmt::Debug for TwoFingerSync<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("TwoFingerSync")
            .field("gesture", &G::NAME)
            .field("tracking", &(state.a.is_some() && state.b.is_some()))
            .field("position", &state.position)
            .field("options", &state.options)
            .finish_non_exhaustive()
    }
}

impl<G: TwoFingerGesture> TwoFingerSync<G> {
    /// Creates an idle sync with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(SyncOptions::DEFAULT)
    }

    /// Creates an idle sync.
    #[must_use]
    pub fn with_options(options: SyncOptions) -> Self {
        Self {
            inner: Rc::new(SyncInner {
                state: RefCell::new(SyncState {
                    a: None,
                    b: None,
                    gesture: G::default(),
                    measure: None,
                    position: 0.0,
                    options,
                }),
                output: EventHandler::new(),
            }),
        }
    }

    /// Returns the options.
    #[must_use]
    pub fn options(&self) -> SyncOptions {
        self.inner.state.borrow().options
    }

    /// Replaces the options. Takes effect on the next update.
    pub fn set_options(&self, options: SyncOptions) {
        self.inner.state.borrow_mut().options = options;
    }

    /// Returns the handler that emits `start`, `update`, and `end`.
    #[must_use]
    pub fn output(&self) -> &EventHandler<SyncEvent> {
        &self.inner.output
    }

    /// Registers a listener on the output handler.
    pub fn on(&self, event_type: &str, listener: impl Fn(&SyncEvent) + 'static) -> Subscription {
        self.inner.output.on(event_type, listener)
    }

    /// Returns the accumulated position.
    #[must_use]
    pub fn position(&self) -> f64 {
        self.inner.state.borrow().position
    }

    /// Seeds the accumulated position, e.g. from the state the gesture
    /// drives.
    pub fn set_position(&self, position: f64) {
        self.inner.state.borrow_mut().position = position;
    }

    /// Returns whether two contacts are being tracked.
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        let state = self.inner.state.borrow();
        state.a.is_some() && state.b.is_some()
    }

    /// Handles a touch event. Returns `false` for event types other than the
    /// four touch events.
    pub fn trigger(&self, event_type: &str, input: &TouchInput) -> bool {
        let (name, event) = match event_type {
            touch::START => (sync::START, self.touch_start(input)),
            touch::MOVE => (sync::UPDATE, self.touch_move(input)),
            touch::END | touch::CANCEL => (sync::END, self.touch_end(input)),
            _ => return false,
        };
        if let Some(event) = event {
            if name != sync::UPDATE {
                tracing::debug!(gesture = G::NAME, phase = name, "two-finger gesture");
            }
            self.inner.output.trigger(name, &event);
        }
        true
    }

    fn touch_start(&self, input: &TouchInput) -> Option<SyncEvent> {
        let mut state = self.inner.state.borrow_mut();
        let mut started = None;
        for touch in &input.changed {
            let tracked = Tracked {
                id: touch.id,
                position: touch.position,
                timestamp_ms: input.timestamp_ms,
            };
            match (state.a, state.b) {
                (None, _) => state.a = Some(tracked),
                (Some(a), None) if a.id != touch.id => {
                    state.b = Some(tracked);
                    let measure = state.gesture.begin(a.position, tracked.position);
                    state.measure = Some(measure);
                    started = Some(SyncEvent {
                        touches: [a.id, tracked.id],
                        count: input.active,
                        delta: 0.0,
                        velocity: 0.0,
                        position: state.position,
                        measure,
                        center: a.position.midpoint(tracked.position),
                    });
                }
                _ => {}
            }
        }
        started
    }

    fn touch_move(&self, input: &TouchInput) -> Option<SyncEvent> {
        let mut state = self.inner.state.borrow_mut();
        let (Some(mut a), Some(mut b)) = (state.a, state.b) else {
            return None;
        };

        let mut elapsed = None;
        for touch in &input.changed {
            for tracked in [&mut a, &mut b] {
                if tracked.id == touch.id {
                    elapsed = Some(input.timestamp_ms - tracked.timestamp_ms);
                    tracked.position = touch.position;
                    tracked.timestamp_ms = input.timestamp_ms;
                }
            }
        }
        state.a = Some(a);
        state.b = Some(b);

        // Moves with no elapsed time are folded into the next update.
        let elapsed = elapsed.filter(|ms| *ms > 0.0)?;

        let (raw, measure) = state.gesture.advance(a.position, b.position);
        let delta = raw * state.options.scale;
        state.position += delta;
        state.measure = Some(measure);
        Some(SyncEvent {
            touches: [a.id, b.id],
            count: input.active,
            delta,
            velocity: delta / elapsed,
            position: state.position,
            measure,
            center: a.position.midpoint(b.position),
        })
    }

    fn touch_end(&self, input: &TouchInput) -> Option<SyncEvent> {
        let mut state = self.inner.state.borrow_mut();
        let is_tracked = |t: Option<Tracked>, id: i32| t.is_some_and(|t| t.id == id);
        let ended = input
            .changed
            .iter()
            .any(|touch| is_tracked(state.a, touch.id) || is_tracked(state.b, touch.id));
        if !ended {
            return None;
        }

        let event = match (state.a, state.b, state.measure) {
            (Some(a), Some(b), Some(measure)) => Some(SyncEvent {
                touches: [a.id, b.id],
                count: input.active,
                delta: 0.0,
                velocity: 0.0,
                position: state.position,
                measure,
                center: a.position.midpoint(b.position),
            }),
            _ => None,
        };
        state.a = None;
        state.b = None;
        state.measure = None;
        event
    }
}

impl<G: TwoFingerGesture> EventTarget<TouchInput> for TwoFingerSync<G> {
    fn trigger(&self, event_type: &str, data: &TouchInput) -> bool {
        Self::trigger(self, event_type, data)
    }

    fn target_key(&self) -> TargetKey {
        TargetKey::of(&self.inner)
    }
}
