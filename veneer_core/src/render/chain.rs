// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered composition of modifiers behind one tree node.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use super::{Modifier, Modify, RenderSpec, SizeSpec};
use crate::error::RenderError;

/// An ordered list of [`Modifier`]s that behaves like a single modifier.
///
/// The first modifier in the list wraps the target directly; every later
/// modifier wraps the result of the one before it. So the last modifier ends
/// up outermost, closest to the root:
///
/// ```text
///   chain [m1, m2, m3] over target  ==  m3(m2(m1(target)))
/// ```
///
/// `ModifierChain` is a cheap handle; clones share the list, so modifiers
/// can be added and removed after the chain is placed in the tree.
#[derive(Clone, Debug, Default)]
pub struct ModifierChain {
    modifiers: Rc<RefCell<Vec<Modifier>>>,
}

impl ModifierChain {
    /// Creates an empty chain. An empty chain passes its target through.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `modifier` as the new outermost modifier.
    pub fn add_modifier(&self, modifier: Modifier) {
        self.modifiers.borrow_mut().push(modifier);
    }

    /// Removes `modifier` from the chain.
    ///
    /// Returns `false`, and changes nothing, if it is not in the chain.
    pub fn remove_modifier(&self, modifier: &Modifier) -> bool {
        let mut modifiers = self.modifiers.borrow_mut();
        match modifiers.iter().position(|m| m == modifier) {
            Some(index) => {
                modifiers.remove(index);
                true
            }
            None => false,
        }
    }

    /// Returns the number of modifiers in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modifiers.borrow().len()
    }

    /// Returns whether the chain has no modifiers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modifiers.borrow().is_empty()
    }
}

impl Modify for ModifierChain {
    fn modify(&self, target: RenderSpec) -> Result<RenderSpec, RenderError> {
        let modifiers = self.modifiers.borrow().clone();
        modifiers
            .iter()
            .try_fold(target, |spec, modifier| modifier.modify(spec))
    }

    /// The outermost modifier that sets a size decides.
    fn size(&self) -> Option<SizeSpec> {
        let modifiers = self.modifiers.borrow().clone();
        modifiers.iter().rev().find_map(Modifier::size)
    }
}
