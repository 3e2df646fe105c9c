// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame timing.

/// A frame opportunity delivered by the backend's tick source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTick {
    /// Current time in milliseconds, on the same clock as input timestamps.
    pub now_ms: f64,
    /// Monotonically increasing frame counter.
    pub frame_index: u64,
}

impl FrameTick {
    /// Creates a tick.
    #[inline]
    #[must_use]
    pub const fn new(frame_index: u64, now_ms: f64) -> Self {
        Self {
            now_ms,
            frame_index,
        }
    }
}
