// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed publish/subscribe graph.
//!
//! Every stage of the engine (input adapters, gesture syncs, accumulators,
//! the frame loop) communicates through [`EventHandler`]s. A handler keeps an
//! ordered listener list per event type and a set of downstream
//! [`EventTarget`]s it forwards every event to:
//!
//! ```text
//!   TouchAdapter ──► EventHandler<TouchInput> ──pipe──► PinchSync
//!                                                          │ output()
//!                                                          ▼
//!                              EventHandler<SyncEvent> ──pipe──► Accumulator
//! ```
//!
//! Dispatch is synchronous. For one `trigger` call, direct listeners run in
//! registration order and downstream targets run afterwards, in pipe order.
//! Listener and downstream lists are snapshotted before dispatch, so a
//! listener may register or detach listeners (or pipe and unpipe targets)
//! while an event is in flight; the change takes effect on the next event.
//!
//! The routing decorators share the [`EventTarget`] contract:
//!
//! - [`EventArbiter`]: forwards to exactly one per-mode handler.
//! - [`EventFilter`]: forwards only events that satisfy a predicate.
//! - [`EventMapper`]: picks a downstream target per event.
//!
//! Piping is not cycle-checked: piping `a` into `b` and `b` into `a`
//! recurses until the stack overflows.

mod arbiter;
mod filter;
mod handler;
mod mapper;

use alloc::rc::Rc;

pub use arbiter::{EventArbiter, ModeChange};
pub use filter::EventFilter;
pub use handler::{EventHandler, Subscription};
pub use mapper::EventMapper;

/// Control signals delivered to a target when it is attached to or detached
/// from an upstream source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Control {
    /// The target was piped into a source (or its arbiter mode became live).
    Pipe,
    /// The target was unpiped from a source (or its arbiter mode was left).
    Unpipe,
}

impl Control {
    /// Returns the conventional event name for this signal.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pipe => "pipe",
            Self::Unpipe => "unpipe",
        }
    }
}

/// Identity of a pipe target, used to deduplicate and remove downstream
/// links.
///
/// Handle types that share state behind an `Rc` report the address of that
/// shared state, so every clone of a handle has the same key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetKey(usize);

impl TargetKey {
    /// Returns the key identifying the allocation behind `rc`.
    #[must_use]
    pub fn of<U: ?Sized>(rc: &Rc<U>) -> Self {
        Self(Rc::as_ptr(rc).cast::<()>() as usize)
    }
}

/// Anything that can receive events forwarded by a handler.
pub trait EventTarget<T: ?Sized> {
    /// Delivers an event. Returns `true` if anything handled it.
    fn trigger(&self, event_type: &str, data: &T) -> bool;

    /// Delivers a pipe/unpipe control signal. Ignored by default.
    fn control(&self, _signal: Control) {}

    /// Returns the identity used for pipe bookkeeping.
    fn target_key(&self) -> TargetKey;
}
