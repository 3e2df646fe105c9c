// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Modifiers: the non-leaf layer of the render tree.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;

use super::{Attr, ModifiedSpec, RenderSpec, SizeSpec};
use crate::error::RenderError;
use crate::transform::Transform3d;

/// Something that wraps a child spec in a [`RenderSpec::Modified`].
pub trait Modify {
    /// Wraps `target` with this modifier's current attribute values.
    ///
    /// # Errors
    ///
    /// Returns the first attribute error. The caller drops `target` for the
    /// frame.
    fn modify(&self, target: RenderSpec) -> Result<RenderSpec, RenderError>;

    /// Returns the size this modifier imposes, if any.
    fn size(&self) -> Option<SizeSpec> {
        None
    }
}

#[derive(Clone, Default)]
struct ModifierState {
    transform: Option<Attr<Transform3d>>,
    opacity: Option<Attr<f64>>,
    origin: Option<Attr<[f64; 2]>>,
    align: Option<Attr<[f64; 2]>>,
    size: Option<Attr<SizeSpec>>,
}

/// A set of optional, possibly computed, presentation attributes applied to
/// everything below it.
///
/// `Modifier` is a cheap handle; clones share attributes, so a modifier can
/// be kept by application code and updated after it is placed in the tree.
///
/// ```
/// use veneer_core::render::Modifier;
/// use veneer_core::transform::Transform3d;
///
/// let m = Modifier::new()
///     .with_transform(Transform3d::from_translation(10.0, 0.0, 0.0))
///     .with_opacity(0.5)
///     .with_origin([0.5, 0.5]);
/// m.set_opacity(0.75);
/// ```
#[derive(Clone, Default)]
pub struct Modifier {
    state: Rc<RefCell<ModifierState>>,
}

impl fmt::Debug for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Modifier")
            .field("transform", &state.transform)
            .field("opacity", &state.opacity)
            .field("origin", &state.origin)
            .field("align", &state.align)
            .field("size", &state.size)
            .finish()
    }
}

impl PartialEq for Modifier {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl Modifier {
    /// Creates a modifier with no attributes set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set_transform`](Self::set_transform).
    #[must_use]
    pub fn with_transform(self, transform: impl Into<Attr<Transform3d>>) -> Self {
        self.set_transform(transform);
        self
    }

    /// Builder form of [`set_opacity`](Self::set_opacity).
    #[must_use]
    pub fn with_opacity(self, opacity: impl Into<Attr<f64>>) -> Self {
        self.set_opacity(opacity);
        self
    }

    /// Builder form of [`set_origin`](Self::set_origin).
    #[must_use]
    pub fn with_origin(self, origin: impl Into<Attr<[f64; 2]>>) -> Self {
        self.set_origin(origin);
        self
    }

    /// Builder form of [`set_align`](Self::set_align).
    #[must_use]
    pub fn with_align(self, align: impl Into<Attr<[f64; 2]>>) -> Self {
        self.set_align(align);
        self
    }

    /// Builder form of [`set_size`](Self::set_size).
    #[must_use]
    pub fn with_size(self, size: impl Into<Attr<SizeSpec>>) -> Self {
        self.set_size(size);
        self
    }

    /// Sets the transform composed onto the parent's.
    pub fn set_transform(&self, transform: impl Into<Attr<Transform3d>>) {
        self.state.borrow_mut().transform = Some(transform.into());
    }

    /// Sets the opacity multiplied into the parent's.
    pub fn set_opacity(&self, opacity: impl Into<Attr<f64>>) {
        self.state.borrow_mut().opacity = Some(opacity.into());
    }

    /// Sets the origin: the point of the content, as a fraction of its size,
    /// that the transform pivots around and that align places.
    pub fn set_origin(&self, origin: impl Into<Attr<[f64; 2]>>) {
        self.state.borrow_mut().origin = Some(origin.into());
    }

    /// Sets the align: the point of the parent, as a fraction of its size,
    /// that the content's origin is placed at.
    pub fn set_align(&self, align: impl Into<Attr<[f64; 2]>>) {
        self.state.borrow_mut().align = Some(align.into());
    }

    /// Sets the size of the context established for the subtree.
    pub fn set_size(&self, size: impl Into<Attr<SizeSpec>>) {
        self.state.borrow_mut().size = Some(size.into());
    }

    /// Unsets every attribute.
    pub fn clear(&self) {
        *self.state.borrow_mut() = ModifierState::default();
    }

    /// Returns the size attribute's current value, if set and resolvable.
    #[must_use]
    pub fn size(&self) -> Option<SizeSpec> {
        let size = self.state.borrow().size.clone()?;
        size.resolve("size").ok()
    }
}

fn resolve<T: Clone + 'static>(
    attr: Option<Attr<T>>,
    name: &'static str,
) -> Result<Option<T>, RenderError> {
    attr.map(|a| a.resolve(name)).transpose()
}

impl Modify for Modifier {
    fn modify(&self, target: RenderSpec) -> Result<RenderSpec, RenderError> {
        // Accessors may touch this modifier, so never evaluate under a borrow.
        let state = self.state.borrow().clone();
        Ok(RenderSpec::Modified(Box::new(ModifiedSpec {
            transform: resolve(state.transform, "transform")?,
            opacity: resolve(state.opacity, "opacity")?,
            origin: resolve(state.origin, "origin")?,
            align: resolve(state.align, "align")?,
            size: resolve(state.size, "size")?,
            target,
        })))
    }

    fn size(&self) -> Option<SizeSpec> {
        Self::size(self)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec;

    use super::*;

    fn modified(spec: RenderSpec) -> ModifiedSpec {
        match spec {
            RenderSpec::Modified(m) => *m,
            other => panic!("expected a modified spec, got {other:?}"),
        }
    }

    #[test]
    fn unset_attributes_stay_unset() {
        let m = modified(Modifier::new().modify(RenderSpec::Empty).unwrap());
        assert_eq!(m.transform, None);
        assert_eq!(m.opacity, None);
        assert_eq!(m.origin, None);
        assert_eq!(m.align, None);
        assert_eq!(m.size, None);
        assert!(matches!(m.target, RenderSpec::Empty));
    }

    #[test]
    fn literal_and_computed_attributes() {
        let t = Transform3d::from_translation(1.0, 2.0, 3.0);
        let m = Modifier::new()
            .with_transform(t)
            .with_opacity(Attr::computed(|| 0.25))
            .with_size([Some(10.0), None]);
        let spec = modified(m.modify(RenderSpec::Empty).unwrap());
        assert_eq!(spec.transform, Some(t));
        assert_eq!(spec.opacity, Some(0.25));
        assert_eq!(spec.size, Some([Some(10.0), None]));
        assert_eq!(m.size(), Some([Some(10.0), None]));
    }

    #[test]
    fn clones_share_attributes() {
        let a = Modifier::new();
        let b = a.clone();
        b.set_opacity(0.5);
        let spec = modified(a.modify(RenderSpec::Empty).unwrap());
        assert_eq!(spec.opacity, Some(0.5));
        assert_eq!(a, b);
        assert_ne!(a, Modifier::new());
    }

    #[test]
    fn failing_attribute_is_reported() {
        let m = Modifier::new()
            .with_opacity(1.0)
            .with_align(Attr::try_computed(|| Err::<[f64; 2], _>(String::from("nope"))));
        let err = m.modify(RenderSpec::Group(vec![])).unwrap_err();
        assert_eq!(
            err,
            RenderError::Attribute {
                attribute: "align",
                reason: "nope".into(),
            }
        );
    }

    #[test]
    fn accessor_may_read_its_own_modifier() {
        let m = Modifier::new().with_size([Some(4.0), Some(4.0)]);
        let handle = m.clone();
        m.set_opacity(Attr::computed(move || {
            handle.size().and_then(|s| s[0]).unwrap_or(0.0) / 8.0
        }));
        let spec = modified(m.modify(RenderSpec::Empty).unwrap());
        assert_eq!(spec.opacity, Some(0.5));
    }

    #[test]
    fn clear_unsets_everything() {
        let m = Modifier::new().with_opacity(0.5).with_origin([0.5, 0.5]);
        m.clear();
        let spec = modified(m.modify(RenderSpec::Empty).unwrap());
        assert_eq!(spec.opacity, None);
        assert_eq!(spec.origin, None);
    }
}
