// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for veneer.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`RafLoop`]: `requestAnimationFrame` tick source, optionally stepping an
//!   engine and following window resizes
//! - [`DomPresenter`]: commits frame changes to pooled DOM elements
//! - [`DomContainer`]: the DOM side of the element pool, and its measured size
//! - [`TouchAdapter`]: DOM touch events as core touch input
//!
//! A typical page wires them up like this:
//!
//! ```rust,ignore
//! let engine = Rc::new(RefCell::new(Engine::<DomPresenter>::default()));
//! // `None` sizes the context from the container's client size.
//! let id = engine
//!     .borrow_mut()
//!     .create_context(None, ContextConfig::DEFAULT, DomPresenter::new(root.clone()));
//! let mut touches = TouchAdapter::new(root.into());
//! touches.output().pipe(&pinch);
//! touches.start();
//! let raf = RafLoop::for_engine(Rc::clone(&engine));
//! raf.start();
//! ```
//!
//! Diagnostics go through `tracing`. The crate never installs a subscriber;
//! applications that want the messages in the browser console install one
//! themselves, e.g. `tracing-wasm`.

#![no_std]

extern crate alloc;

mod container;
mod input;
mod presenter;
mod raf;
mod resize;

pub use container::DomContainer;
pub use input::TouchAdapter;
pub use presenter::DomPresenter;
pub use raf::RafLoop;
pub use veneer_core::backend::Presenter;

/// Returns the current time in milliseconds from `performance.now()`.
///
/// This is the clock that [`RafLoop`] ticks and touch timestamps are on, so
/// it is the `now_ms` to pass when starting a transition outside a frame.
#[must_use]
pub fn now_ms() -> f64 {
    raf::performance_now()
}
