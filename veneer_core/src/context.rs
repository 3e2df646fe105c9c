// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render contexts and per-frame change sets.
//!
//! A [`Context`] owns one render tree and the size it is laid out in. Each
//! [`update`](Context::update) renders the tree, resolves it into
//! per-surface placement, and diffs that against the previous frame:
//!
//! 1. Surfaces present now but not before are **added**; presenters apply
//!    every property for them.
//! 2. Surfaces present before but not now are **removed**.
//! 3. For surfaces present in both frames, changed transforms, opacities,
//!    and sizes are marked on the matching [`dirty`] channel, as are the
//!    surface's own content, class, and property edits.
//! 4. All channels are drained in deterministic (identity) order into
//!    [`FrameChanges`].

use alloc::vec::Vec;

use kurbo::Size;
use understory_dirty::{CycleHandling, DirtyTracker};

use crate::dirty;
use crate::error::RenderError;
use crate::render::{
    Child, ParentContext, RenderNode, ResolvedFrame, ResolvedSurface, SurfaceId, resolve,
};

/// Configuration for a [`Context`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContextConfig {
    /// Size used when neither the requested size nor the presenter's
    /// measurement is usable.
    pub fallback_size: Size,
    /// CSS perspective distance for the context's container, if any.
    pub perspective: Option<f64>,
}

impl ContextConfig {
    /// The default configuration: a 1×1 fallback and no perspective.
    pub const DEFAULT: Self = Self {
        fallback_size: Size::new(1.0, 1.0),
        perspective: None,
    };
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The set of changes produced by a single [`Context::update`] call.
///
/// Each list holds surface identities in ascending order. Presenters read
/// the current values from [`Context::resolved`].
#[derive(Clone, Debug, Default)]
pub struct FrameChanges {
    /// Surfaces that became visible this frame.
    pub added: Vec<SurfaceId>,
    /// Surfaces that stopped being visible this frame.
    pub removed: Vec<SurfaceId>,
    /// Surfaces whose resolved transform changed.
    pub transforms: Vec<SurfaceId>,
    /// Surfaces whose effective opacity changed.
    pub opacities: Vec<SurfaceId>,
    /// Surfaces whose resolved size changed.
    pub sizes: Vec<SurfaceId>,
    /// Surfaces whose content was replaced.
    pub content: Vec<SurfaceId>,
    /// Surfaces whose classes changed.
    pub classes: Vec<SurfaceId>,
    /// Surfaces whose inline style properties changed.
    pub properties: Vec<SurfaceId>,
    /// Attribute errors; each emptied one subtree for this frame.
    pub errors: Vec<RenderError>,
}

impl FrameChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.added.clear();
        self.removed.clear();
        self.transforms.clear();
        self.opacities.clear();
        self.sizes.clear();
        self.content.clear();
        self.classes.clear();
        self.properties.clear();
        self.errors.clear();
    }

    /// Returns whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.transforms.is_empty()
            && self.opacities.is_empty()
            && self.sizes.is_empty()
            && self.content.is_empty()
            && self.classes.is_empty()
            && self.properties.is_empty()
            && self.errors.is_empty()
    }
}

/// A render tree laid out in a sized area.
pub struct Context {
    root: RenderNode,
    size: Size,
    config: ContextConfig,
    previous: ResolvedFrame,
    dirty: DirtyTracker<u32>,
}

impl core::fmt::Debug for Context {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Context")
            .field("size", &self.size)
            .field("config", &self.config)
            .field("visible", &self.previous.len())
            .finish_non_exhaustive()
    }
}

pub(crate) fn usable(size: Size) -> bool {
    size.width.is_finite() && size.height.is_finite() && size.width > 0.0 && size.height > 0.0
}

impl Context {
    /// Creates a context of `size` with the default configuration.
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self::with_config(size, ContextConfig::DEFAULT)
    }

    /// Creates a context of `size` with `config`.
    #[must_use]
    pub fn with_config(size: Size, config: ContextConfig) -> Self {
        let mut context = Self {
            root: RenderNode::new(),
            size: config.fallback_size,
            config,
            previous: ResolvedFrame::new(),
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
        };
        context.set_size(size);
        context
    }

    /// Returns the root node.
    #[must_use]
    pub fn root(&self) -> &RenderNode {
        &self.root
    }

    /// Adds a child to the root node and returns the child's node.
    pub fn add(&self, child: impl Into<Child>) -> RenderNode {
        self.root.add(child)
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Returns the size the tree is laid out in.
    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Sets the size the tree is laid out in.
    ///
    /// Empty or non-finite sizes are replaced by the configured fallback.
    pub fn set_size(&mut self, size: Size) {
        self.size = if usable(size) {
            size
        } else {
            tracing::warn!(
                width = size.width,
                height = size.height,
                "unusable context size, using fallback"
            );
            self.config.fallback_size
        };
    }

    /// Returns the placement of `id` as of the last update.
    #[must_use]
    pub fn resolved(&self, id: SurfaceId) -> Option<&ResolvedSurface> {
        self.previous.get(&id)
    }

    /// Returns every surface visible as of the last update.
    pub fn surfaces(&self) -> impl Iterator<Item = &ResolvedSurface> {
        self.previous.values()
    }

    /// Renders, resolves, and diffs the tree, returning what changed.
    pub fn update(&mut self) -> FrameChanges {
        let mut changes = FrameChanges::default();
        self.update_into(&mut changes);
        changes
    }

    /// Like [`update`](Self::update), but reuses a caller-provided buffer to
    /// avoid allocation.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn update_into(&mut self, changes: &mut FrameChanges) {
        changes.clear();

        let spec = self.root.render_into(&mut changes.errors);
        let current = resolve(&spec, &ParentContext::root(self.size));

        for (id, now) in &current {
            // Pending edits are folded into the full apply of an added surface.
            let edits = now.surface.take_dirty();
            let Some(before) = self.previous.get(id) else {
                changes.added.push(*id);
                continue;
            };
            let key = id.0;
            if before.transform != now.transform {
                self.dirty.mark(key, dirty::TRANSFORM);
            }
            if before.opacity != now.opacity {
                self.dirty.mark(key, dirty::OPACITY);
            }
            if before.size != now.size {
                self.dirty.mark(key, dirty::SIZE);
            }
            if edits.content {
                self.dirty.mark(key, dirty::CONTENT);
            }
            if edits.classes {
                self.dirty.mark(key, dirty::CLASSES);
            }
            if edits.properties {
                self.dirty.mark(key, dirty::PROPERTIES);
            }
        }
        changes.removed.extend(
            self.previous
                .keys()
                .filter(|id| !current.contains_key(id))
                .copied(),
        );

        changes.transforms = self.drain(dirty::TRANSFORM);
        changes.opacities = self.drain(dirty::OPACITY);
        changes.sizes = self.drain(dirty::SIZE);
        changes.content = self.drain(dirty::CONTENT);
        changes.classes = self.drain(dirty::CLASSES);
        changes.properties = self.drain(dirty::PROPERTIES);

        if !changes.added.is_empty() || !changes.removed.is_empty() {
            tracing::debug!(
                added = changes.added.len(),
                removed = changes.removed.len(),
                visible = current.len(),
                "visible set changed"
            );
        }
        self.previous = current;
    }

    fn drain(&mut self, channel: understory_dirty::Channel) -> Vec<SurfaceId> {
        self.dirty
            .drain(channel)
            .deterministic()
            .run()
            .map(SurfaceId)
            .collect()
    }
}
