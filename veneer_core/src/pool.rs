// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element pooling.
//!
//! An [`ElementAllocator`] keeps one free list per [`ElementKind`] for a
//! single container. Deallocated elements stay attached to the container
//! (the presenter hides them) and are handed out again by the next
//! `allocate` of the same kind, so steady-state frames create no DOM nodes.
//!
//! Invariant: every element the allocator ever created is attached under its
//! container and is either in logical use or in exactly one free list.
//! [`node_count`](ElementAllocator::node_count) is the number in logical use.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use crate::error::{PoolError, UnknownTag};

/// The element tags the engine can allocate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    /// `<div>`
    #[default]
    Div,
    /// `<span>`
    Span,
    /// `<img>`
    Img,
    /// `<canvas>`
    Canvas,
    /// `<video>`
    Video,
    /// `<input>`
    Input,
    /// `<textarea>`
    Textarea,
    /// `<button>`
    Button,
    /// `<form>`
    Form,
    /// `<label>`
    Label,
    /// `<iframe>`
    Iframe,
}

impl ElementKind {
    /// Every supported kind.
    pub const ALL: [Self; 11] = [
        Self::Div,
        Self::Span,
        Self::Img,
        Self::Canvas,
        Self::Video,
        Self::Input,
        Self::Textarea,
        Self::Button,
        Self::Form,
        Self::Label,
        Self::Iframe,
    ];

    /// Returns the lowercase tag name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Div => "div",
            Self::Span => "span",
            Self::Img => "img",
            Self::Canvas => "canvas",
            Self::Video => "video",
            Self::Input => "input",
            Self::Textarea => "textarea",
            Self::Button => "button",
            Self::Form => "form",
            Self::Label => "label",
            Self::Iframe => "iframe",
        }
    }

    /// Looks up a kind by tag name, ignoring ASCII case.
    ///
    /// DOM `tagName` is uppercase for HTML documents, so `"DIV"` and `"div"`
    /// both resolve to [`ElementKind::Div`].
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(tag))
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementKind {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or(UnknownTag)
    }
}

/// A node that pooled elements live under.
///
/// Implemented for DOM elements by the web backend and by test doubles.
pub trait Container {
    /// The element type handed out by the pool.
    type Element: Clone + PartialEq;

    /// Creates a new, unattached element of `kind`.
    fn create_element(&self, kind: ElementKind) -> Option<Self::Element>;

    /// Appends `element` as the last child.
    fn append_child(&self, element: &Self::Element);

    /// Detaches `element` from this container. Returns `false` if it was not
    /// a child.
    fn remove_child(&self, element: &Self::Element) -> bool;

    /// Returns the first child element, if any.
    fn first_child(&self) -> Option<Self::Element>;

    /// Returns whether the container has any children.
    fn has_child_nodes(&self) -> bool;

    /// Returns the kind of `element`, or `None` for unsupported tags.
    fn kind_of(element: &Self::Element) -> Option<ElementKind>;
}

/// A per-container free list of elements keyed by kind.
pub struct ElementAllocator<C: Container> {
    container: C,
    detached: BTreeMap<ElementKind, Vec<C::Element>>,
    node_count: usize,
}

impl<C: Container> fmt::Debug for ElementAllocator<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let free: Vec<(ElementKind, usize)> =
            self.detached.iter().map(|(k, v)| (*k, v.len())).collect();
        f.debug_struct("ElementAllocator")
            .field("node_count", &self.node_count)
            .field("free", &free)
            .finish_non_exhaustive()
    }
}

impl<C: Container + PartialEq> ElementAllocator<C> {
    /// Creates an empty pool over `container`.
    #[must_use]
    pub fn new(container: C) -> Self {
        Self {
            container,
            detached: BTreeMap::new(),
            node_count: 0,
        }
    }

    /// Returns the container elements are allocated under.
    #[must_use]
    pub fn container(&self) -> &C {
        &self.container
    }

    /// Hands out an attached element of `kind`.
    ///
    /// Reuses a previously deallocated element if one is available;
    /// otherwise creates one and appends it to the container.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::CreateFailed`] if the container cannot create an
    /// element of this kind. The live count is unchanged in that case.
    pub fn allocate(&mut self, kind: ElementKind) -> Result<C::Element, PoolError> {
        let store = self.detached.entry(kind).or_default();
        let element = if let Some(element) = store.pop() {
            tracing::trace!(%kind, "reusing pooled element");
            element
        } else {
            let element = self
                .container
                .create_element(kind)
                .ok_or(PoolError::CreateFailed(kind))?;
            self.container.append_child(&element);
            tracing::trace!(%kind, "created element");
            element
        };
        self.node_count += 1;
        Ok(element)
    }

    /// Returns `element` to the free list for its kind.
    ///
    /// The element stays attached to the container. Returns `false`, and
    /// changes nothing, if the element's kind is unsupported, if it is
    /// already free, or if the pool has no elements in use.
    pub fn deallocate(&mut self, element: C::Element) -> bool {
        let Some(kind) = C::kind_of(&element) else {
            tracing::warn!("deallocate called with an element of unsupported kind");
            return false;
        };
        if self.node_count == 0 {
            tracing::warn!(%kind, "deallocate called with no elements in use");
            return false;
        }
        let store = self.detached.entry(kind).or_default();
        if store.contains(&element) {
            tracing::warn!(%kind, "element deallocated twice");
            return false;
        }
        store.push(element);
        self.node_count -= 1;
        true
    }

    /// Moves every child of the current container to `container`, in
    /// document order, and makes it the pool's container.
    ///
    /// Free lists and the live count are untouched. Migrating to the same
    /// container is a no-op.
    pub fn migrate(&mut self, container: C) {
        if container == self.container {
            return;
        }
        while self.container.has_child_nodes() {
            let Some(child) = self.container.first_child() else {
                break;
            };
            if !self.container.remove_child(&child) {
                break;
            }
            container.append_child(&child);
        }
        self.container = container;
    }

    /// Returns the number of elements currently in logical use.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Returns the number of free elements of `kind`.
    #[must_use]
    pub fn free_count(&self, kind: ElementKind) -> usize {
        self.detached.get(&kind).map_or(0, Vec::len)
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::{Cell, RefCell};

    use super::{Container, ElementKind};

    /// A fake element: identity is the `Rc` allocation.
    #[derive(Clone, Debug)]
    pub(crate) struct MockElement(pub(crate) Rc<(ElementKind, u32)>);

    impl PartialEq for MockElement {
        fn eq(&self, other: &Self) -> bool {
            Rc::ptr_eq(&self.0, &other.0)
        }
    }

    /// A fake container recording its children in order.
    #[derive(Clone, Debug, Default)]
    pub(crate) struct MockContainer {
        pub(crate) children: Rc<RefCell<Vec<MockElement>>>,
        pub(crate) created: Rc<Cell<u32>>,
        pub(crate) refuse: Cell<Option<ElementKind>>,
    }

    impl PartialEq for MockContainer {
        fn eq(&self, other: &Self) -> bool {
            Rc::ptr_eq(&self.children, &other.children)
        }
    }

    impl Container for MockContainer {
        type Element = MockElement;

        fn create_element(&self, kind: ElementKind) -> Option<MockElement> {
            if self.refuse.get() == Some(kind) {
                return None;
            }
            let serial = self.created.get();
            self.created.set(serial + 1);
            Some(MockElement(Rc::new((kind, serial))))
        }

        fn append_child(&self, element: &MockElement) {
            self.children.borrow_mut().push(element.clone());
        }

        fn remove_child(&self, element: &MockElement) -> bool {
            let mut children = self.children.borrow_mut();
            let before = children.len();
            children.retain(|c| c != element);
            before != children.len()
        }

        fn first_child(&self) -> Option<MockElement> {
            self.children.borrow().first().cloned()
        }

        fn has_child_nodes(&self) -> bool {
            !self.children.borrow().is_empty()
        }

        fn kind_of(element: &MockElement) -> Option<ElementKind> {
            Some(element.0.0)
        }
    }
}
