// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Literal-or-computed attribute values.

use alloc::rc::Rc;
use alloc::string::{String, ToString as _};
use core::fmt;

use crate::error::RenderError;

type Accessor<T> = dyn Fn() -> Result<T, String>;

/// A modifier attribute: either a fixed value or a zero-argument accessor
/// evaluated once per frame, at read time.
///
/// Computed attributes are how animation reaches the render tree: the tree
/// never knows about transitions, it just calls the accessor every frame.
pub enum Attr<T> {
    /// A fixed value.
    Literal(T),
    /// A value recomputed on every read.
    Computed(Rc<Accessor<T>>),
}

impl<T: Clone + 'static> Attr<T> {
    /// Wraps an infallible accessor.
    pub fn computed(accessor: impl Fn() -> T + 'static) -> Self {
        Self::Computed(Rc::new(move || Ok(accessor())))
    }

    /// Wraps a fallible accessor. An error empties the subtree of the node
    /// reading the attribute for that frame.
    pub fn try_computed<E: fmt::Display>(accessor: impl Fn() -> Result<T, E> + 'static) -> Self {
        Self::Computed(Rc::new(move || accessor().map_err(|e| e.to_string())))
    }

    /// Returns the current value.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Attribute`] tagged with `attribute` if a
    /// computed accessor fails.
    pub fn resolve(&self, attribute: &'static str) -> Result<T, RenderError> {
        match self {
            Self::Literal(value) => Ok(value.clone()),
            Self::Computed(accessor) => {
                accessor().map_err(|reason| RenderError::Attribute { attribute, reason })
            }
        }
    }

    /// Returns whether the value is recomputed on every read.
    #[must_use]
    pub fn is_computed(&self) -> bool {
        matches!(self, Self::Computed(_))
    }
}

impl<T: Clone> Clone for Attr<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Literal(value) => Self::Literal(value.clone()),
            Self::Computed(accessor) => Self::Computed(Rc::clone(accessor)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Attr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl<T> From<T> for Attr<T> {
    fn from(value: T) -> Self {
        Self::Literal(value)
    }
}
