// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! [`Context::update`](crate::context::Context::update) diffs each frame's
//! resolved placement against the previous frame and marks the surfaces
//! whose presentable state changed, one channel per property category (via
//! [`understory_dirty`]). All channels are local-only: placement is already
//! fully resolved when it is marked, so nothing propagates to descendants.
//!
//! # Consumption
//!
//! Callers never query dirty state directly. Each update drains every
//! channel in deterministic order into
//! [`FrameChanges`](crate::context::FrameChanges), which presenters
//! [consume](crate::backend::Presenter::apply).

use understory_dirty::Channel;

/// Resolved transform changed.
pub const TRANSFORM: Channel = Channel::new(0);

/// Effective opacity changed.
pub const OPACITY: Channel = Channel::new(1);

/// Resolved size changed.
pub const SIZE: Channel = Channel::new(2);

/// Surface content was replaced.
pub const CONTENT: Channel = Channel::new(3);

/// A surface class was added or removed.
pub const CLASSES: Channel = Channel::new(4);

/// An inline style property was set or removed.
pub const PROPERTIES: Channel = Channel::new(5);
