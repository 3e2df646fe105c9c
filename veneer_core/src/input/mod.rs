// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Touch input, two-finger gesture syncs, and delta accumulation.
//!
//! Backends translate platform touch events into [`TouchInput`] and trigger
//! them on an [`EventHandler`](crate::event::EventHandler) under the names in
//! [`touch`]. Gesture syncs are [`EventTarget`](crate::event::EventTarget)s
//! that can be piped from that handler; they re-emit [`SyncEvent`]s under
//! the names in [`sync`] from their own output handler.

mod accumulator;
mod two_finger;

use alloc::vec::Vec;

use kurbo::Point;

pub use accumulator::{Accumulator, DeltaEvent};
pub use two_finger::{
    Pinch, PinchSync, Rotate, RotateSync, Scale, ScaleSync, TwoFingerGesture, TwoFingerSync,
};

/// Event names carrying [`TouchInput`].
pub mod touch {
    /// A contact began.
    pub const START: &str = "touchstart";
    /// A contact moved.
    pub const MOVE: &str = "touchmove";
    /// A contact was lifted.
    pub const END: &str = "touchend";
    /// A contact was cancelled by the platform.
    pub const CANCEL: &str = "touchcancel";
}

/// Event names carrying [`SyncEvent`].
pub mod sync {
    /// Tracking began.
    pub const START: &str = "start";
    /// A tracked contact moved.
    pub const UPDATE: &str = "update";
    /// Tracking ended.
    pub const END: &str = "end";
}

/// One contact in a touch event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchPoint {
    /// Platform identifier, stable for the contact's lifetime.
    pub id: i32,
    /// Position in page coordinates.
    pub position: Point,
}

impl TouchPoint {
    /// Creates a touch point.
    #[must_use]
    pub const fn new(id: i32, x: f64, y: f64) -> Self {
        Self {
            id,
            position: Point::new(x, y),
        }
    }
}

/// A platform touch event.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TouchInput {
    /// Contacts that changed in this event.
    pub changed: Vec<TouchPoint>,
    /// Number of contacts still on the surface after this event.
    pub active: usize,
    /// Event time in milliseconds.
    pub timestamp_ms: f64,
}

/// Options shared by the gesture syncs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SyncOptions {
    /// Multiplier applied to every per-frame difference.
    pub scale: f64,
}

impl SyncOptions {
    /// The default options: unit scale.
    pub const DEFAULT: Self = Self { scale: 1.0 };
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The gesture quantity a sync tracks, at the time of the event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Measure {
    /// Distance between the two contacts.
    Distance(f64),
    /// Angle of the line from the first to the second contact, in radians,
    /// in `(-π, π]`.
    Angle(f64),
    /// Distance relative to the distance when tracking began.
    Scale(f64),
}

impl Measure {
    /// Returns the raw value, whatever the quantity.
    #[must_use]
    pub const fn value(self) -> f64 {
        match self {
            Self::Distance(v) | Self::Angle(v) | Self::Scale(v) => v,
        }
    }
}

/// Payload of a gesture sync's `start`, `update`, and `end` events.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SyncEvent {
    /// Identifiers of the two tracked contacts, in tracking order.
    pub touches: [i32; 2],
    /// Number of contacts on the surface.
    pub count: usize,
    /// Scaled change since the previous event; zero for `start` and `end`.
    pub delta: f64,
    /// `delta` per millisecond; zero for `start` and `end`.
    pub velocity: f64,
    /// Accumulated position after applying `delta`.
    pub position: f64,
    /// The tracked quantity.
    pub measure: Measure,
    /// Midpoint of the two contacts.
    pub center: Point,
}
