// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM container for the element pool.

use kurbo::Size;
use veneer_core::pool::{Container, ElementKind};
use web_sys::Element;

/// A DOM element that pooled surface elements are appended under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomContainer(pub Element);

impl DomContainer {
    /// Wraps `element`.
    #[must_use]
    pub fn new(element: Element) -> Self {
        Self(element)
    }

    /// Returns the wrapped element.
    #[must_use]
    pub fn element(&self) -> &Element {
        &self.0
    }

    /// Returns the element's client size in CSS pixels.
    ///
    /// Zero for a detached or `display: none` element.
    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(
            f64::from(self.0.client_width()),
            f64::from(self.0.client_height()),
        )
    }
}

impl Container for DomContainer {
    type Element = Element;

    fn create_element(&self, kind: ElementKind) -> Option<Element> {
        let document = self.0.owner_document()?;
        document.create_element(kind.as_str()).ok()
    }

    fn append_child(&self, element: &Element) {
        if self.0.append_child(element).is_err() {
            tracing::warn!("append_child rejected by the DOM");
        }
    }

    fn remove_child(&self, element: &Element) -> bool {
        self.0.remove_child(element).is_ok()
    }

    fn first_child(&self) -> Option<Element> {
        self.0.first_element_child()
    }

    fn has_child_nodes(&self) -> bool {
        self.0.child_element_count() > 0
    }

    fn kind_of(element: &Element) -> Option<ElementKind> {
        ElementKind::from_tag(&element.tag_name())
    }
}
