// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Retained render tree and render-spec resolution.
//!
//! Each frame the tree of [`RenderNode`]s is rendered into a [`RenderSpec`]:
//! an immutable description of which surfaces are visible and under which
//! nested modifiers. [`resolve`] then folds the modifiers down the spec into
//! one [`ResolvedSurface`] per visible surface.
//!
//! ```text
//!   RenderNode tree ──render()──► RenderSpec ──resolve()──► ResolvedFrame
//!   (retained)                    (per frame)               (per surface)
//! ```
//!
//! Modifier attributes may be [`Attr::Computed`], so anything animated is
//! re-read at render time without the tree knowing about it.

mod attr;
mod chain;
mod modifier;
mod node;
mod resolve;
mod surface;

use alloc::boxed::Box;
use alloc::vec::Vec;

pub use attr::Attr;
pub use chain::ModifierChain;
pub use modifier::{Modifier, Modify};
pub use node::{Child, NodeObject, RenderNode};
pub use resolve::{ParentContext, ResolvedFrame, ResolvedSurface, resolve};
pub use surface::{Surface, SurfaceDirty, SurfaceId};

/// A requested size. `None` components inherit from the enclosing context.
pub type SizeSpec = [Option<f64>; 2];

/// Something that produces a render spec of its own.
pub trait Renderable {
    /// Returns this frame's spec.
    fn render(&self) -> RenderSpec;

    /// Returns the renderable's own size, if it has one.
    fn size(&self) -> Option<SizeSpec> {
        None
    }
}

/// One frame's description of the visible tree.
#[derive(Clone, Debug, Default)]
pub enum RenderSpec {
    /// Nothing to present.
    #[default]
    Empty,
    /// A leaf surface.
    Surface(Surface),
    /// Siblings, in tree order.
    Group(Vec<RenderSpec>),
    /// A subtree wrapped in modifier attributes.
    Modified(Box<ModifiedSpec>),
}

/// Resolved attribute values of one modifier, wrapping its target.
#[derive(Clone, Debug)]
pub struct ModifiedSpec {
    /// Composed onto the parent transform.
    pub transform: Option<crate::transform::Transform3d>,
    /// Multiplied into the parent opacity.
    pub opacity: Option<f64>,
    /// Pivot of the content, as a fraction of its size.
    pub origin: Option<[f64; 2]>,
    /// Anchor in the parent, as a fraction of the parent's size.
    pub align: Option<[f64; 2]>,
    /// Size of the context established for `target`.
    pub size: Option<SizeSpec>,
    /// The wrapped subtree.
    pub target: RenderSpec,
}
