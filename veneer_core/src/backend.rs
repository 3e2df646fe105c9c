// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for platform integrations.
//!
//! Platform-specific work lives in *backend* crates. Each backend provides:
//!
//! - **Tick source**: produces [`FrameTick`] values from a platform
//!   mechanism (e.g. `requestAnimationFrame`). Not abstracted by a trait;
//!   setup and lifecycle differ too much across platforms.
//!
//! - **Presenter**: implements [`Presenter`] to apply frame changes to a
//!   platform-native tree, typically allocating one element per surface from
//!   an [`ElementAllocator`](crate::pool::ElementAllocator).
//!
//! - **Input adapter**: translates platform input into the typed events
//!   of [`input`](crate::input) and triggers them on an
//!   [`EventHandler`](crate::event::EventHandler).
//!
//! # Crate boundaries
//!
//! `veneer_core` owns the render tree, resolution, diffing, gestures, and
//! this contract module. Backend crates depend on `veneer_core` and provide
//! platform glue. Application code depends on both and wires them together
//! through an [`Engine`](crate::engine::Engine).
//!
//! [`FrameTick`]: crate::timing::FrameTick

use kurbo::Size;

use crate::context::{Context, FrameChanges};

/// Applies a context's frame changes to a platform-native presentation tree.
///
/// # Frame loop pseudocode
///
/// [`Engine::step`](crate::engine::Engine::step) drives presenters like
/// this:
///
/// ```rust,ignore
/// fn on_frame(tick: FrameTick) {
///     // Animate: computed modifier attributes read current values.
///     transitionable.tick(tick.now_ms);
///
///     // Update: render, resolve, and diff the tree.
///     let changes = context.update();
///
///     // Present: apply incremental changes to the native tree.
///     presenter.apply(&context, &changes);
/// }
/// ```
pub trait Presenter {
    /// Applies `changes`, reading current placement from
    /// [`Context::resolved`] as needed.
    fn apply(&mut self, context: &Context, changes: &FrameChanges);

    /// Returns the current pixel size of the presentation container.
    ///
    /// The engine sizes a context from this when no usable size is given,
    /// and again on [`Engine::resize`](crate::engine::Engine::resize).
    /// Presenters with no container to measure return `None`.
    fn measure(&self) -> Option<Size> {
        None
    }
}
