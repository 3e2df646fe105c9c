// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The retained render tree.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use super::{Modifier, ModifierChain, Modify, RenderSpec, Renderable, SizeSpec, Surface};
use crate::error::RenderError;

/// The object a [`RenderNode`] holds.
#[derive(Clone)]
pub enum NodeObject {
    /// A modifier applied to everything below the node.
    Modifier(Rc<dyn Modify>),
    /// A leaf renderable.
    Renderable(Rc<dyn Renderable>),
}

impl fmt::Debug for NodeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Modifier(_) => f.write_str("Modifier(..)"),
            Self::Renderable(_) => f.write_str("Renderable(..)"),
        }
    }
}

impl From<Modifier> for NodeObject {
    fn from(modifier: Modifier) -> Self {
        Self::Modifier(Rc::new(modifier))
    }
}

impl From<ModifierChain> for NodeObject {
    fn from(chain: ModifierChain) -> Self {
        Self::Modifier(Rc::new(chain))
    }
}

impl From<Surface> for NodeObject {
    fn from(surface: Surface) -> Self {
        Self::Renderable(Rc::new(surface))
    }
}

impl From<Rc<dyn Modify>> for NodeObject {
    fn from(modifier: Rc<dyn Modify>) -> Self {
        Self::Modifier(modifier)
    }
}

impl From<Rc<dyn Renderable>> for NodeObject {
    fn from(renderable: Rc<dyn Renderable>) -> Self {
        Self::Renderable(renderable)
    }
}

/// What [`RenderNode::add`] accepts: an existing node, or an object to wrap
/// in a new one.
#[derive(Debug)]
pub enum Child {
    /// An existing node, shared with wherever else it is attached.
    Node(RenderNode),
    /// An object to wrap in a fresh node.
    Object(NodeObject),
}

impl From<RenderNode> for Child {
    fn from(node: RenderNode) -> Self {
        Self::Node(node)
    }
}

impl From<NodeObject> for Child {
    fn from(object: NodeObject) -> Self {
        Self::Object(object)
    }
}

impl From<Modifier> for Child {
    fn from(modifier: Modifier) -> Self {
        Self::Object(modifier.into())
    }
}

impl From<ModifierChain> for Child {
    fn from(chain: ModifierChain) -> Self {
        Self::Object(chain.into())
    }
}

impl From<Surface> for Child {
    fn from(surface: Surface) -> Self {
        Self::Object(surface.into())
    }
}

#[derive(Default)]
struct NodeInner {
    object: Option<NodeObject>,
    children: Vec<RenderNode>,
}

/// A node of the retained render tree.
///
/// A node holds at most one object and an ordered list of children. Nodes
/// holding a modifier wrap the rendering of their children; nodes holding a
/// renderable render it ahead of their children, as siblings.
///
/// `RenderNode` is a cheap handle. Attaching the same node under two parents
/// renders its subtree twice; attaching a node under its own descendant
/// makes rendering recurse without bound.
///
/// ```
/// use veneer_core::render::{Modifier, RenderNode, Surface};
///
/// let root = RenderNode::new();
/// root.add(Modifier::new().with_opacity(0.5))
///     .add(Surface::default().with_content("hello"));
/// ```
#[derive(Clone, Default)]
pub struct RenderNode {
    inner: Rc<RefCell<NodeInner>>,
}

impl fmt::Debug for RenderNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("RenderNode")
            .field("object", &inner.object)
            .field("children", &inner.children.len())
            .finish()
    }
}

impl PartialEq for RenderNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl RenderNode {
    /// Creates an empty node.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a node holding `object`.
    #[must_use]
    pub fn with_object(object: impl Into<NodeObject>) -> Self {
        let node = Self::new();
        node.set(object);
        node
    }

    /// Appends a child and returns the child's node, for chaining.
    pub fn add(&self, child: impl Into<Child>) -> Self {
        let node = match child.into() {
            Child::Node(node) => node,
            Child::Object(object) => Self::with_object(object),
        };
        self.inner.borrow_mut().children.push(node.clone());
        node
    }

    /// Replaces the node's object.
    pub fn set(&self, object: impl Into<NodeObject>) {
        self.inner.borrow_mut().object = Some(object.into());
    }

    /// Removes `child` from this node's direct children. Returns whether it
    /// was found.
    pub fn remove(&self, child: &Self) -> bool {
        let mut inner = self.inner.borrow_mut();
        match inner.children.iter().position(|c| c == child) {
            Some(index) => {
                inner.children.remove(index);
                true
            }
            None => false,
        }
    }

    /// Returns the direct children, in order.
    #[must_use]
    pub fn children(&self) -> Vec<Self> {
        self.inner.borrow().children.clone()
    }

    /// Returns the node's object, if any.
    #[must_use]
    pub fn object(&self) -> Option<NodeObject> {
        self.inner.borrow().object.clone()
    }

    /// Renders the subtree into a spec, discarding attribute errors.
    ///
    /// Subtrees whose modifier failed render as [`RenderSpec::Empty`].
    #[must_use]
    pub fn render(&self) -> RenderSpec {
        let mut errors = Vec::new();
        self.render_into(&mut errors)
    }

    /// Renders the subtree into a spec, collecting attribute errors.
    ///
    /// A failing modifier empties its own subtree for this frame only;
    /// siblings and ancestors render normally.
    pub fn render_into(&self, errors: &mut Vec<RenderError>) -> RenderSpec {
        // Snapshot so accessors and renderables may edit the tree.
        let (object, children) = {
            let inner = self.inner.borrow();
            (inner.object.clone(), inner.children.clone())
        };

        let below = match children.len() {
            0 => RenderSpec::Empty,
            1 => children[0].render_into(errors),
            _ => RenderSpec::Group(children.iter().map(|c| c.render_into(errors)).collect()),
        };

        match object {
            None => below,
            Some(NodeObject::Modifier(modifier)) => match modifier.modify(below) {
                Ok(spec) => spec,
                Err(err) => {
                    tracing::warn!(%err, "render subtree skipped");
                    errors.push(err);
                    RenderSpec::Empty
                }
            },
            Some(NodeObject::Renderable(renderable)) => match below {
                RenderSpec::Empty => renderable.render(),
                RenderSpec::Group(mut specs) => {
                    specs.insert(0, renderable.render());
                    RenderSpec::Group(specs)
                }
                other => RenderSpec::Group(alloc::vec![renderable.render(), other]),
            },
        }
    }

    /// Returns the node's size: its object's size if it has one, otherwise
    /// the size of its first child.
    #[must_use]
    pub fn size(&self) -> Option<SizeSpec> {
        let (object, first_child) = {
            let inner = self.inner.borrow();
            (inner.object.clone(), inner.children.first().cloned())
        };
        let own = match object {
            Some(NodeObject::Modifier(m)) => m.size(),
            Some(NodeObject::Renderable(r)) => r.size(),
            None => None,
        };
        own.or_else(|| first_child.and_then(|c| c.size()))
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::*;
    use crate::render::Attr;

    #[test]
    fn empty_node_renders_empty() {
        assert!(matches!(RenderNode::new().render(), RenderSpec::Empty));
    }

    #[test]
    fn add_returns_the_child_node() {
        let root = RenderNode::new();
        let surface = Surface::default();
        let leaf = root.add(Modifier::new()).add(surface.clone());
        assert!(matches!(leaf.object(), Some(NodeObject::Renderable(_))));
        assert_eq!(root.children().len(), 1);

        match root.render() {
            RenderSpec::Modified(m) => match m.target {
                RenderSpec::Surface(s) => assert_eq!(s.id(), surface.id()),
                other => panic!("unexpected {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn several_children_render_as_group_in_order() {
        let root = RenderNode::new();
        let a = Surface::default();
        let b = Surface::default();
        root.add(a.clone());
        root.add(b.clone());
        let RenderSpec::Group(specs) = root.render() else {
            panic!("expected a group");
        };
        let ids: Vec<_> = specs
            .iter()
            .map(|s| match s {
                RenderSpec::Surface(s) => s.id(),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(ids, [a.id(), b.id()]);
    }

    #[test]
    fn failing_modifier_empties_only_its_subtree() {
        let root = RenderNode::new();
        root.add(
            Modifier::new().with_opacity(Attr::try_computed(|| Err::<f64, _>(String::from("x")))),
        )
        .add(Surface::default());
        let survivor = Surface::default();
        root.add(Modifier::new().with_opacity(0.5)).add(survivor.clone());

        let mut errors = Vec::new();
        let RenderSpec::Group(specs) = root.render_into(&mut errors) else {
            panic!("expected a group");
        };
        assert_eq!(errors.len(), 1);
        assert!(matches!(specs[0], RenderSpec::Empty));
        assert!(matches!(specs[1], RenderSpec::Modified(_)));
    }

    #[test]
    fn size_prefers_object_then_first_child() {
        let root = RenderNode::new();
        assert_eq!(root.size(), None);
        root.add(Surface::default());
        assert_eq!(root.size(), None);

        let other = RenderNode::new();
        other.add(Modifier::new().with_size([Some(3.0), Some(4.0)]));
        other.add(Surface::default().with_size([Some(9.0), Some(9.0)]));
        assert_eq!(other.size(), Some([Some(3.0), Some(4.0)]));

        root.set(Modifier::new().with_size([Some(1.0), None]));
        assert_eq!(root.size(), Some([Some(1.0), None]));
    }

    #[test]
    fn remove_detaches_a_child() {
        let root = RenderNode::new();
        let child = root.add(Surface::default());
        assert!(root.remove(&child));
        assert!(!root.remove(&child));
        assert!(matches!(root.render(), RenderSpec::Empty));
    }

    #[test]
    fn renderable_with_children_renders_both() {
        let root = RenderNode::new();
        let first = Surface::default();
        let second = Surface::default();
        root.add(first.clone()).add(second.clone());
        let RenderSpec::Group(specs) = root.render() else {
            panic!("expected a group");
        };
        assert_eq!(specs.len(), 2);
    }
}
