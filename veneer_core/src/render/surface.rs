// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Leaf renderables backed by one pooled element each.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

use super::{RenderSpec, Renderable, SizeSpec};
use crate::pool::ElementKind;

static NEXT_SURFACE_ID: AtomicU32 = AtomicU32::new(0);

/// Stable identity of a [`Surface`], unique for the lifetime of the process.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u32);

impl fmt::Debug for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SurfaceId({})", self.0)
    }
}

/// Which presentable properties of a surface changed since the last frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SurfaceDirty {
    /// Content was replaced.
    pub content: bool,
    /// A class was added or removed.
    pub classes: bool,
    /// A style property was set or removed.
    pub properties: bool,
}

impl SurfaceDirty {
    const ALL: Self = Self {
        content: true,
        classes: true,
        properties: true,
    };
}

/// A leaf of the render tree: one element's worth of content, classes, and
/// inline style.
///
/// `Surface` is a cheap handle; clones refer to the same surface. A surface
/// placed at several points in the tree is presented once, at the last
/// point reached in traversal order.
#[derive(Clone)]
pub struct Surface {
    inner: Rc<SurfaceInner>,
}

struct SurfaceInner {
    id: SurfaceId,
    kind: ElementKind,
    state: RefCell<SurfaceState>,
}

struct SurfaceState {
    content: String,
    classes: Vec<String>,
    properties: BTreeMap<String, String>,
    size: Option<SizeSpec>,
    dirty: SurfaceDirty,
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Surface")
            .field("id", &self.inner.id)
            .field("kind", &self.inner.kind)
            .field("classes", &state.classes)
            .field("size", &state.size)
            .finish_non_exhaustive()
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(ElementKind::default())
    }
}

impl Surface {
    /// Creates an empty surface presented through an element of `kind`.
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        let id = SurfaceId(NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed));
        Self {
            inner: Rc::new(SurfaceInner {
                id,
                kind,
                state: RefCell::new(SurfaceState {
                    content: String::new(),
                    classes: Vec::new(),
                    properties: BTreeMap::new(),
                    size: None,
                    dirty: SurfaceDirty::ALL,
                }),
            }),
        }
    }

    /// Builder form of [`set_content`](Self::set_content).
    #[must_use]
    pub fn with_content(self, content: impl Into<String>) -> Self {
        self.set_content(content);
        self
    }

    /// Builder form of [`set_size`](Self::set_size).
    #[must_use]
    pub fn with_size(self, size: SizeSpec) -> Self {
        self.set_size(Some(size));
        self
    }

    /// Builder form of [`add_class`](Self::add_class).
    #[must_use]
    pub fn with_class(self, class: impl Into<String>) -> Self {
        self.add_class(class);
        self
    }

    /// Builder form of [`set_property`](Self::set_property).
    #[must_use]
    pub fn with_property(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_property(name, value);
        self
    }

    /// Returns the surface's identity.
    #[must_use]
    pub fn id(&self) -> SurfaceId {
        self.inner.id
    }

    /// Returns the element kind the surface is presented through.
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.inner.kind
    }

    /// Returns the current content (markup).
    #[must_use]
    pub fn content(&self) -> String {
        self.inner.state.borrow().content.clone()
    }

    /// Replaces the content.
    pub fn set_content(&self, content: impl Into<String>) {
        let content = content.into();
        let mut state = self.inner.state.borrow_mut();
        if state.content != content {
            state.content = content;
            state.dirty.content = true;
        }
    }

    /// Returns the classes, in insertion order.
    #[must_use]
    pub fn classes(&self) -> Vec<String> {
        self.inner.state.borrow().classes.clone()
    }

    /// Adds a class. Adding a class twice is a no-op.
    pub fn add_class(&self, class: impl Into<String>) {
        let class = class.into();
        let mut state = self.inner.state.borrow_mut();
        if !state.classes.contains(&class) {
            state.classes.push(class);
            state.dirty.classes = true;
        }
    }

    /// Removes a class. Returns whether it was present.
    pub fn remove_class(&self, class: &str) -> bool {
        let mut state = self.inner.state.borrow_mut();
        let before = state.classes.len();
        state.classes.retain(|c| c != class);
        let removed = state.classes.len() != before;
        if removed {
            state.dirty.classes = true;
        }
        removed
    }

    /// Replaces all classes. Duplicates are dropped, first occurrence kept.
    pub fn set_classes<I, S>(&self, classes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut next: Vec<String> = Vec::new();
        for class in classes {
            let class = class.into();
            if !next.contains(&class) {
                next.push(class);
            }
        }
        let mut state = self.inner.state.borrow_mut();
        if state.classes != next {
            state.classes = next;
            state.dirty.classes = true;
        }
    }

    /// Returns whether the surface carries `class`.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.inner.state.borrow().classes.iter().any(|c| c == class)
    }

    /// Returns the inline style properties.
    #[must_use]
    pub fn properties(&self) -> BTreeMap<String, String> {
        self.inner.state.borrow().properties.clone()
    }

    /// Sets one inline style property.
    pub fn set_property(&self, name: impl Into<String>, value: impl Into<String>) {
        let (name, value) = (name.into(), value.into());
        let mut state = self.inner.state.borrow_mut();
        if state.properties.get(&name) != Some(&value) {
            state.properties.insert(name, value);
            state.dirty.properties = true;
        }
    }

    /// Sets several inline style properties, keeping the others.
    pub fn set_properties<I, K, V>(&self, properties: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in properties {
            self.set_property(name, value);
        }
    }

    /// Removes one inline style property. Returns whether it was set.
    pub fn remove_property(&self, name: &str) -> bool {
        let mut state = self.inner.state.borrow_mut();
        let removed = state.properties.remove(name).is_some();
        if removed {
            state.dirty.properties = true;
        }
        removed
    }

    /// Returns the surface's own size, if any.
    #[must_use]
    pub fn size(&self) -> Option<SizeSpec> {
        self.inner.state.borrow().size
    }

    /// Sets the surface's own size. `None` components, or `None` overall,
    /// take the size of the enclosing context.
    pub fn set_size(&self, size: Option<SizeSpec>) {
        self.inner.state.borrow_mut().size = size;
    }

    /// Returns and clears the changed-property flags.
    pub(crate) fn take_dirty(&self) -> SurfaceDirty {
        core::mem::take(&mut self.inner.state.borrow_mut().dirty)
    }
}

impl Renderable for Surface {
    fn render(&self) -> RenderSpec {
        RenderSpec::Surface(self.clone())
    }

    fn size(&self) -> Option<SizeSpec> {
        Self::size(self)
    }
}
