// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time-driven interpolation between values.
//!
//! A [`Transitionable`] holds a value that can either jump or move towards a
//! target over a duration. It is advanced explicitly with
//! [`tick`](Transitionable::tick), typically from the engine's `prerender`
//! event, and read from a computed modifier attribute:
//!
//! ```
//! use veneer_core::transition::{Transition, Transitionable};
//!
//! let mut x = Transitionable::new(0.0);
//! x.set_with(100.0, Transition::linear(200.0), 0.0);
//! x.tick(50.0);
//! assert_eq!(x.get(), 25.0);
//! x.tick(500.0);
//! assert_eq!(x.get(), 100.0);
//! assert!(!x.is_active());
//! ```

use kurbo::{Point, Vec2};

/// Values that can be interpolated and offset.
pub trait Interpolate: Copy {
    /// Returns the value a fraction `t` of the way from `self` to `to`.
    #[must_use]
    fn lerp(self, to: Self, t: f64) -> Self;

    /// Returns `self` moved by `delta`.
    #[must_use]
    fn offset(self, delta: Self) -> Self;
}

impl Interpolate for f64 {
    fn lerp(self, to: Self, t: f64) -> Self {
        self + (to - self) * t
    }

    fn offset(self, delta: Self) -> Self {
        self + delta
    }
}

impl Interpolate for Vec2 {
    fn lerp(self, to: Self, t: f64) -> Self {
        Self::lerp(self, to, t)
    }

    fn offset(self, delta: Self) -> Self {
        self + delta
    }
}

impl Interpolate for Point {
    fn lerp(self, to: Self, t: f64) -> Self {
        Self::lerp(self, to, t)
    }

    fn offset(self, delta: Self) -> Self {
        self + delta.to_vec2()
    }
}

impl Interpolate for [f64; 2] {
    fn lerp(self, to: Self, t: f64) -> Self {
        [
            self[0] + (to[0] - self[0]) * t,
            self[1] + (to[1] - self[1]) * t,
        ]
    }

    fn offset(self, delta: Self) -> Self {
        [self[0] + delta[0], self[1] + delta[1]]
    }
}

/// How a transition moves: a duration and an easing curve over `[0, 1]`.
#[derive(Clone, Copy, Debug)]
pub struct Transition {
    /// Duration in milliseconds.
    pub duration_ms: f64,
    /// Maps linear progress in `[0, 1]` to eased progress.
    pub curve: fn(f64) -> f64,
}

/// The identity easing curve.
#[must_use]
pub fn linear(t: f64) -> f64 {
    t
}

impl Transition {
    /// A linear transition over `duration_ms`.
    #[must_use]
    pub const fn linear(duration_ms: f64) -> Self {
        Self {
            duration_ms,
            curve: linear,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Active<V> {
    from: V,
    to: V,
    start_ms: f64,
    transition: Transition,
}

/// A value that jumps or transitions over time.
#[derive(Clone, Copy, Debug)]
pub struct Transitionable<V> {
    value: V,
    active: Option<Active<V>>,
}

impl<V: Interpolate + Default> Default for Transitionable<V> {
    fn default() -> Self {
        Self::new(V::default())
    }
}

impl<V: Interpolate> Transitionable<V> {
    /// Creates a settled value.
    #[must_use]
    pub const fn new(value: V) -> Self {
        Self {
            value,
            active: None,
        }
    }

    /// Returns the current value.
    #[must_use]
    pub fn get(&self) -> V {
        self.value
    }

    /// Returns where the value is heading: the target of the running
    /// transition, or the current value when settled.
    #[must_use]
    pub fn target(&self) -> V {
        self.active.map_or(self.value, |a| a.to)
    }

    /// Jumps to `value`, cancelling any running transition.
    pub fn set(&mut self, value: V) {
        self.value = value;
        self.active = None;
    }

    /// Starts moving from the current value to `value` at `now_ms`.
    ///
    /// A non-positive or non-finite duration jumps immediately.
    pub fn set_with(&mut self, value: V, transition: Transition, now_ms: f64) {
        if !(transition.duration_ms.is_finite() && transition.duration_ms > 0.0) {
            self.set(value);
            return;
        }
        self.active = Some(Active {
            from: self.value,
            to: value,
            start_ms: now_ms,
            transition,
        });
    }

    /// Advances a running transition to `now_ms`.
    ///
    /// Time going backwards holds the value at the transition's start.
    pub fn tick(&mut self, now_ms: f64) {
        let Some(active) = self.active else {
            return;
        };
        let t = ((now_ms - active.start_ms) / active.transition.duration_ms).clamp(0.0, 1.0);
        if t >= 1.0 {
            self.value = active.to;
            self.active = None;
        } else {
            self.value = active.from.lerp(active.to, (active.transition.curve)(t));
        }
    }

    /// Returns whether a transition is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Stops a running transition at the current value.
    pub fn halt(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ease_in(t: f64) -> f64 {
        t * t
    }

    #[test]
    fn set_jumps_and_cancels() {
        let mut v = Transitionable::new(1.0);
        v.set_with(5.0, Transition::linear(100.0), 0.0);
        assert!(v.is_active());
        assert_eq!(v.target(), 5.0);
        v.set(2.0);
        assert!(!v.is_active());
        assert_eq!(v.get(), 2.0);
        v.tick(50.0);
        assert_eq!(v.get(), 2.0);
    }

    #[test]
    fn curve_shapes_progress() {
        let mut v = Transitionable::new(0.0);
        v.set_with(
            100.0,
            Transition {
                duration_ms: 100.0,
                curve: ease_in,
            },
            1000.0,
        );
        v.tick(1050.0);
        assert_eq!(v.get(), 25.0);
        v.tick(1100.0);
        assert_eq!(v.get(), 100.0);
        assert!(!v.is_active());
    }

    #[test]
    fn zero_duration_jumps() {
        let mut v = Transitionable::new(0.0);
        v.set_with(3.0, Transition::linear(0.0), 0.0);
        assert!(!v.is_active());
        assert_eq!(v.get(), 3.0);
    }

    #[test]
    fn halt_keeps_the_current_value() {
        let mut v = Transitionable::new([0.0, 0.0]);
        v.set_with([10.0, 20.0], Transition::linear(10.0), 0.0);
        v.tick(5.0);
        v.halt();
        v.tick(10.0);
        assert_eq!(v.get(), [5.0, 10.0]);
    }

    #[test]
    fn retargeting_starts_from_the_current_value() {
        let mut v = Transitionable::new(Vec2::ZERO);
        v.set_with(Vec2::new(10.0, 0.0), Transition::linear(10.0), 0.0);
        v.tick(5.0);
        v.set_with(Vec2::new(5.0, 10.0), Transition::linear(10.0), 5.0);
        v.tick(10.0);
        assert_eq!(v.get(), Vec2::new(5.0, 5.0));
    }

    #[test]
    fn time_going_backwards_holds_the_start() {
        let mut v = Transitionable::new(0.0);
        v.set_with(10.0, Transition::linear(10.0), 100.0);
        v.tick(50.0);
        assert_eq!(v.get(), 0.0);
        assert!(v.is_active());
    }
}
