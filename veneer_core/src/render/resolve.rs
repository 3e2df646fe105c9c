// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Folding a render spec into per-surface placement.
//!
//! Resolution walks the spec top-down with a [`ParentContext`] and a *size
//! context*: the transform in effect where the most recent size was
//! established. Align offsets are expressed in the parent's size, so they
//! are rotated and scaled by that size context rather than by the transform
//! accumulated since.
//!
//! For a [`ModifiedSpec`](super::ModifiedSpec) the steps are:
//!
//! 1. Opacity multiplies into the parent's.
//! 2. Transform composes as `parent * own`.
//! 3. An origin replaces the inherited one; the size context for children
//!    becomes the parent transform.
//! 4. An align replaces the inherited one.
//! 5. A size replaces the inherited size component-wise. If set, the pending
//!    align offset and origin offset are folded into the transform now and
//!    both are cleared for the subtree.
//!
//! At a surface any pending align (falling back to the pending origin) is
//! applied against the context size, and the pending origin is applied
//! against the surface's own size.

use alloc::collections::BTreeMap;

use kurbo::Size;

use super::{RenderSpec, Surface, SurfaceId};
use crate::transform::Transform3d;

/// The inherited state passed down during resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParentContext {
    /// Accumulated transform.
    pub transform: Transform3d,
    /// Accumulated opacity.
    pub opacity: f64,
    /// Pending origin, not yet folded into `transform`.
    pub origin: Option<[f64; 2]>,
    /// Pending align, not yet folded into `transform`.
    pub align: Option<[f64; 2]>,
    /// Size of the enclosing context.
    pub size: Size,
}

impl ParentContext {
    /// The context at the root of a render context of `size`.
    #[must_use]
    pub const fn root(size: Size) -> Self {
        Self {
            transform: Transform3d::IDENTITY,
            opacity: 1.0,
            origin: None,
            align: None,
            size,
        }
    }
}

/// Final placement of one surface for one frame.
#[derive(Clone, Debug)]
pub struct ResolvedSurface {
    /// The surface being placed.
    pub surface: Surface,
    /// Transform from the context's top-left corner to the surface's
    /// top-left corner, origin offset included.
    pub transform: Transform3d,
    /// Effective opacity.
    pub opacity: f64,
    /// Size the surface is laid out at.
    pub size: Size,
    /// Origin the surface was placed by.
    pub origin: [f64; 2],
}

/// Every visible surface of a frame, keyed by identity.
pub type ResolvedFrame = BTreeMap<SurfaceId, ResolvedSurface>;

/// Resolves `spec` under `root`.
///
/// A surface reached more than once keeps the placement of the last
/// occurrence in traversal order.
#[must_use]
pub fn resolve(spec: &RenderSpec, root: &ParentContext) -> ResolvedFrame {
    let mut out = ResolvedFrame::new();
    resolve_into(spec, root, Transform3d::IDENTITY, &mut out);
    out
}

fn is_nonzero(v: [f64; 2]) -> bool {
    v[0] != 0.0 || v[1] != 0.0
}

fn resolve_into(
    spec: &RenderSpec,
    ctx: &ParentContext,
    size_context: Transform3d,
    out: &mut ResolvedFrame,
) {
    match spec {
        RenderSpec::Empty => {}
        RenderSpec::Surface(surface) => {
            let resolved = place_surface(surface, ctx, size_context);
            out.insert(surface.id(), resolved);
        }
        RenderSpec::Group(specs) => {
            for spec in specs {
                resolve_into(spec, ctx, size_context, out);
            }
        }
        RenderSpec::Modified(m) => {
            let mut next = *ctx;
            let mut next_size_context = size_context;

            if let Some(opacity) = m.opacity {
                next.opacity = ctx.opacity * opacity;
            }
            if let Some(transform) = m.transform {
                next.transform = ctx.transform * transform;
            }
            if let Some(origin) = m.origin {
                next.origin = Some(origin);
                next_size_context = ctx.transform;
            }
            if let Some(align) = m.align {
                next.align = Some(align);
            }
            if let Some(size) = m.size {
                let parent = ctx.size;
                next.size = Size::new(
                    size[0].unwrap_or(parent.width),
                    size[1].unwrap_or(parent.height),
                );
                if let Some(align) = next.align.filter(|a| is_nonzero(*a)) {
                    let offset = size_context.transform_vector([
                        align[0] * parent.width,
                        align[1] * parent.height,
                        0.0,
                    ]);
                    next.transform = next.transform.then_move(offset);
                }
                if let Some(origin) = next.origin.filter(|o| is_nonzero(*o)) {
                    next.transform = next.transform.move_then([
                        -origin[0] * next.size.width,
                        -origin[1] * next.size.height,
                        0.0,
                    ]);
                }
                next_size_context = ctx.transform;
                next.origin = None;
                next.align = None;
            }

            resolve_into(&m.target, &next, next_size_context, out);
        }
    }
}

fn place_surface(
    surface: &Surface,
    ctx: &ParentContext,
    size_context: Transform3d,
) -> ResolvedSurface {
    let mut transform = ctx.transform;
    if let Some(align) = ctx.align.or(ctx.origin).filter(|a| is_nonzero(*a)) {
        let offset = size_context.transform_vector([
            align[0] * ctx.size.width,
            align[1] * ctx.size.height,
            0.0,
        ]);
        transform = transform.then_move(offset);
    }

    let own = surface.size().unwrap_or([None, None]);
    let size = Size::new(
        own[0].unwrap_or(ctx.size.width),
        own[1].unwrap_or(ctx.size.height),
    );

    let origin = ctx.origin.unwrap_or([0.0, 0.0]);
    if is_nonzero(origin) {
        transform = transform.move_then([-origin[0] * size.width, -origin[1] * size.height, 0.0]);
    }

    ResolvedSurface {
        surface: surface.clone(),
        transform,
        opacity: ctx.opacity,
        size,
        origin,
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::vec;

    use super::*;
    use crate::render::{Modifier, ModifiedSpec, RenderNode};

    const ROOT: Size = Size::new(800.0, 600.0);

    fn wrap(m: ModifiedSpec) -> RenderSpec {
        RenderSpec::Modified(Box::new(m))
    }

    fn spec(target: RenderSpec) -> ModifiedSpec {
        ModifiedSpec {
            transform: None,
            opacity: None,
            origin: None,
            align: None,
            size: None,
            target,
        }
    }

    fn approx(a: [f64; 3], b: [f64; 3]) {
        for i in 0..3 {
            assert!((a[i] - b[i]).abs() < 1e-9, "{a:?} != {b:?}");
        }
    }

    fn only(frame: &ResolvedFrame) -> &ResolvedSurface {
        assert_eq!(frame.len(), 1);
        frame.values().next().unwrap()
    }

    #[test]
    fn bare_surface_fills_the_root() {
        let s = Surface::default();
        let frame = resolve(&RenderSpec::Surface(s.clone()), &ParentContext::root(ROOT));
        let r = &frame[&s.id()];
        assert_eq!(r.transform, Transform3d::IDENTITY);
        assert_eq!(r.opacity, 1.0);
        assert_eq!(r.size, ROOT);
        assert_eq!(r.origin, [0.0, 0.0]);
    }

    #[test]
    fn opacity_multiplies_down_the_tree() {
        let root = RenderNode::new();
        root.add(Modifier::new().with_opacity(0.5))
            .add(Modifier::new().with_opacity(0.25))
            .add(Surface::default());
        let frame = resolve(&root.render(), &ParentContext::root(ROOT));
        assert_eq!(only(&frame).opacity, 0.125);
    }

    #[test]
    fn zero_opacity_hides_the_whole_subtree() {
        let root = RenderNode::new();
        root.add(Modifier::new().with_opacity(0.0))
            .add(Modifier::new().with_opacity(0.8))
            .add(Surface::default());
        let frame = resolve(&root.render(), &ParentContext::root(ROOT));
        assert_eq!(only(&frame).opacity, 0.0);
    }

    #[test]
    fn size_is_inherited_or_overridden() {
        let root = RenderNode::new();
        root.add(Modifier::new().with_size([Some(200.0), Some(200.0)]))
            .add(Surface::default());
        let frame = resolve(&root.render(), &ParentContext::root(ROOT));
        assert_eq!(only(&frame).size, Size::new(200.0, 200.0));

        let partial = RenderNode::new();
        partial
            .add(Modifier::new().with_size([Some(100.0), None]))
            .add(Surface::default());
        let frame = resolve(&partial.render(), &ParentContext::root(ROOT));
        assert_eq!(only(&frame).size, Size::new(100.0, 600.0));
    }

    #[test]
    fn surface_own_size_wins_per_component() {
        let s = Surface::default().with_size([None, Some(10.0)]);
        let frame = resolve(&RenderSpec::Surface(s), &ParentContext::root(ROOT));
        assert_eq!(only(&frame).size, Size::new(800.0, 10.0));
    }

    #[test]
    fn centered_sized_box() {
        let root = RenderNode::new();
        root.add(
            Modifier::new()
                .with_size([Some(100.0), Some(100.0)])
                .with_origin([0.5, 0.5])
                .with_align([0.5, 0.5]),
        )
        .add(Surface::default());
        let frame = resolve(&root.render(), &ParentContext::root(ROOT));
        let r = only(&frame);
        approx(r.transform.translation(), [350.0, 250.0, 0.0]);
        // Origin and align were consumed by the size.
        assert_eq!(r.origin, [0.0, 0.0]);
    }

    #[test]
    fn origin_alone_centers_a_sized_surface() {
        let root = RenderNode::new();
        root.add(Modifier::new().with_origin([0.5, 0.5]))
            .add(Surface::default().with_size([Some(20.0), Some(10.0)]));
        let frame = resolve(&root.render(), &ParentContext::root(ROOT));
        let r = only(&frame);
        approx(r.transform.translation(), [390.0, 295.0, 0.0]);
        assert_eq!(r.origin, [0.5, 0.5]);
    }

    #[test]
    fn child_transform_applies_before_parent() {
        let root = RenderNode::new();
        root.add(Modifier::new().with_transform(Transform3d::from_translation(10.0, 0.0, 0.0)))
            .add(
                Modifier::new()
                    .with_transform(Transform3d::from_rotation_z(core::f64::consts::FRAC_PI_2)),
            )
            .add(Surface::default());
        let frame = resolve(&root.render(), &ParentContext::root(ROOT));
        let t = only(&frame).transform;
        approx(t.transform_point([0.0, 0.0, 0.0]), [10.0, 0.0, 0.0]);
        approx(t.transform_point([1.0, 0.0, 0.0]), [10.0, 1.0, 0.0]);
    }

    #[test]
    fn align_is_measured_in_the_parent_size_context() {
        // The parent size was established at the root, so the scale below
        // it does not stretch the align offset.
        let inner = spec(RenderSpec::Surface(Surface::default()));
        let sized = ModifiedSpec {
            size: Some([Some(10.0), Some(10.0)]),
            align: Some([1.0, 0.0]),
            ..spec(wrap(inner))
        };
        let scaled = ModifiedSpec {
            transform: Some(Transform3d::from_scale(2.0, 2.0, 1.0)),
            ..spec(wrap(sized))
        };
        let frame = resolve(&wrap(scaled), &ParentContext::root(Size::new(100.0, 100.0)));
        approx(only(&frame).transform.translation(), [100.0, 0.0, 0.0]);
    }

    #[test]
    fn last_occurrence_of_a_surface_wins() {
        let s = Surface::default();
        let group = RenderSpec::Group(vec![
            wrap(ModifiedSpec {
                opacity: Some(0.5),
                ..spec(RenderSpec::Surface(s.clone()))
            }),
            wrap(ModifiedSpec {
                opacity: Some(0.25),
                ..spec(RenderSpec::Surface(s.clone()))
            }),
        ]);
        let frame = resolve(&group, &ParentContext::root(ROOT));
        assert_eq!(frame[&s.id()].opacity, 0.25);
    }

    #[test]
    fn empty_resolves_to_nothing() {
        assert!(resolve(&RenderSpec::Empty, &ParentContext::root(ROOT)).is_empty());
    }
}
