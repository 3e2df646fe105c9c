// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Retained render tree, element pooling, and event routing for DOM
//! compositing.
//!
//! `veneer_core` holds everything about a scene that does not touch a
//! platform: the render tree, how it resolves into positioned surfaces,
//! which surfaces changed since the last frame, how native elements are
//! recycled, and how input flows through gesture recognizers into
//! application state. It is `no_std` compatible (with `alloc`).
//!
//! # Architecture
//!
//! ```text
//!   Backend (tick source)
//!       │ FrameTick
//!       ▼
//!   Engine::step ──► prerender ──► tasks ──► Context::update_into
//!                                                 │
//!            RenderNode::render ──► RenderSpec ───┘
//!                                       │ resolve
//!                                       ▼
//!                            ResolvedFrame ──► FrameChanges ──► Presenter::apply
//!                                                                   │
//!                                                 ElementAllocator ◄┘
//! ```
//!
//! **[`render`]**: The retained tree. [`RenderNode`](render::RenderNode)s
//! hold either a [`Modifier`](render::Modifier) (transform, opacity, origin,
//! align, size, any of which may be computed per frame) or a renderable
//! [`Surface`](render::Surface). Rendering yields a
//! [`RenderSpec`](render::RenderSpec), which
//! [`resolve`](render::resolve) flattens into one absolute
//! placement per surface.
//!
//! **[`context`]**: A root node with a size. Each update diffs the resolved
//! frame against the previous one and reports the differences as
//! [`FrameChanges`](context::FrameChanges).
//!
//! **[`dirty`]**: The change channels, tracked with `understory_dirty`.
//!
//! **[`engine`]**: The per-frame driver that runs frame events, queued tasks,
//! and every context's update and present.
//!
//! **[`backend`]**: The [`Presenter`](backend::Presenter) trait that platform
//! backends implement to commit frame changes.
//!
//! **[`pool`]**: [`ElementAllocator`](pool::ElementAllocator), which reuses
//! detached native elements per element kind.
//!
//! **[`event`]**: Typed publish/subscribe handlers with pipes, arbiters,
//! filters, and mappers.
//!
//! **[`input`]**: Touch events, two-finger gesture syncs, and accumulators.
//!
//! **[`transition`]**: Values that move towards a target over time.
//!
//! **[`transform`]**: 3D affine transform type for surface placement.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod context;
pub mod dirty;
pub mod engine;
pub mod error;
pub mod event;
pub mod input;
pub mod pool;
pub mod render;
pub mod timing;
pub mod transform;
pub mod transition;
