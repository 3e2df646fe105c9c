// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM commit.
//!
//! Translates [`Context`] placement into pooled, absolutely positioned
//! elements by applying incremental updates from [`FrameChanges`].
//!
//! [`Context`]: veneer_core::context::Context
//! [`FrameChanges`]: veneer_core::context::FrameChanges

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Size;
use veneer_core::backend::Presenter;
use veneer_core::context::{Context, FrameChanges};
use veneer_core::error::PoolError;
use veneer_core::pool::ElementAllocator;
use veneer_core::render::{ResolvedSurface, SurfaceId};
use veneer_core::transform::Transform3d;
use wasm_bindgen::JsCast as _;
use web_sys::{Element, HtmlElement};

use crate::container::DomContainer;

struct Mounted {
    element: HtmlElement,
    /// Inline style names written from the surface's properties.
    properties: Vec<String>,
}

/// Commits a [`Context`](veneer_core::context::Context) to pooled DOM
/// elements under one container.
///
/// Each visible surface owns one element, allocated from an
/// [`ElementAllocator`] when the surface is added and returned to it
/// (hidden, still attached) when the surface is removed. Between those
/// points only the fields named in the frame's change lists are written.
///
/// A surface whose element could not be allocated is retried on every
/// following frame until it mounts or is removed.
pub struct DomPresenter {
    pool: ElementAllocator<DomContainer>,
    mounted: BTreeMap<SurfaceId, Mounted>,
    /// Visible surfaces whose allocation failed.
    pending: BTreeSet<SurfaceId>,
    perspective: Option<Option<f64>>,
}

impl core::fmt::Debug for DomPresenter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomPresenter")
            .field("pool", &self.pool)
            .field("mounted", &self.mounted.len())
            .field("pending", &self.pending)
            .field("perspective", &self.perspective)
            .finish()
    }
}

impl DomPresenter {
    /// Creates a presenter that places surface elements under `container`.
    #[must_use]
    pub fn new(container: Element) -> Self {
        Self {
            pool: ElementAllocator::new(DomContainer::new(container)),
            mounted: BTreeMap::new(),
            pending: BTreeSet::new(),
            perspective: None,
        }
    }

    /// Returns the container element.
    #[must_use]
    pub fn container(&self) -> &Element {
        self.pool.container().element()
    }

    /// Moves every element, pooled or in use, under `container`.
    pub fn migrate(&mut self, container: Element) {
        self.pool.migrate(DomContainer::new(container));
        self.perspective = None;
    }

    /// Returns the element presenting `id`, if it is visible.
    #[must_use]
    pub fn element(&self, id: SurfaceId) -> Option<&HtmlElement> {
        self.mounted.get(&id).map(|m| &m.element)
    }

    /// Returns the element pool.
    #[must_use]
    pub fn pool(&self) -> &ElementAllocator<DomContainer> {
        &self.pool
    }

    /// Returns the container's current client size.
    #[must_use]
    pub fn measured_size(&self) -> Size {
        self.pool.container().size()
    }

    fn apply_perspective(&mut self, perspective: Option<f64>) {
        if self.perspective == Some(perspective) {
            return;
        }
        self.perspective = Some(perspective);
        let Some(container) = self.pool.container().element().dyn_ref::<HtmlElement>() else {
            return;
        };
        let style = container.style();
        let _ = match perspective {
            Some(p) => style.set_property("perspective", &format!("{p}px")),
            None => style.remove_property("perspective").map(|_| ()),
        };
    }

    fn mount(&mut self, placed: &ResolvedSurface) -> Result<(), PoolError> {
        let element: HtmlElement = self.pool.allocate(placed.surface.kind())?.unchecked_into();
        // A reused element still carries its previous surface's styles.
        let style = element.style();
        style.set_css_text("position: absolute; left: 0; top: 0; transform-origin: 0 0;");
        let mut mounted = Mounted {
            element,
            properties: Vec::new(),
        };
        write_transform(&mounted.element, &placed.transform);
        write_opacity(&mounted.element, placed.opacity);
        write_size(&mounted.element, placed);
        write_content(&mounted.element, placed);
        write_classes(&mounted.element, placed);
        write_properties(&mut mounted, placed);
        self.mounted.insert(placed.surface.id(), mounted);
        Ok(())
    }

    fn unmount(&mut self, id: SurfaceId) {
        let Some(mounted) = self.mounted.remove(&id) else {
            return;
        };
        let _ = mounted.element.style().set_property("display", "none");
        if !self.pool.deallocate(mounted.element.unchecked_into()) {
            tracing::warn!(surface = id.0, "element was not returned to the pool");
        }
    }
}

impl Presenter for DomPresenter {
    fn apply(&mut self, context: &Context, changes: &FrameChanges) {
        self.apply_perspective(context.config().perspective);

        // 1. Removals first, so their elements can be reused by additions.
        for &id in &changes.removed {
            self.unmount(id);
        }

        // 2. Additions, after any surfaces still waiting for an element.
        for id in mount_queue(&mut self.pending, &changes.added, &changes.removed) {
            let Some(placed) = context.resolved(id) else {
                continue;
            };
            if let Err(err) = self.mount(placed) {
                tracing::warn!(
                    surface = id.0,
                    %err,
                    "surface not presented, retrying next frame"
                );
                self.pending.insert(id);
            }
        }

        // 3. Field updates for surfaces that stayed visible.
        for id in &changes.transforms {
            if let (Some(m), Some(p)) = (self.mounted.get(id), context.resolved(*id)) {
                write_transform(&m.element, &p.transform);
            }
        }
        for id in &changes.opacities {
            if let (Some(m), Some(p)) = (self.mounted.get(id), context.resolved(*id)) {
                write_opacity(&m.element, p.opacity);
            }
        }
        for id in &changes.sizes {
            if let (Some(m), Some(p)) = (self.mounted.get(id), context.resolved(*id)) {
                write_size(&m.element, p);
            }
        }
        for id in &changes.content {
            if let (Some(m), Some(p)) = (self.mounted.get(id), context.resolved(*id)) {
                write_content(&m.element, p);
            }
        }
        for id in &changes.classes {
            if let (Some(m), Some(p)) = (self.mounted.get(id), context.resolved(*id)) {
                write_classes(&m.element, p);
            }
        }
        for id in &changes.properties {
            if let (Some(m), Some(p)) = (self.mounted.get_mut(id), context.resolved(*id)) {
                write_properties(m, p);
            }
        }
    }

    fn measure(&self) -> Option<Size> {
        Some(self.measured_size())
    }
}

fn write_transform(element: &HtmlElement, transform: &Transform3d) {
    let _ = element
        .style()
        .set_property("transform", &css_matrix(transform));
}

fn write_opacity(element: &HtmlElement, opacity: f64) {
    let _ = element
        .style()
        .set_property("opacity", &format!("{opacity}"));
}

fn write_size(element: &HtmlElement, placed: &ResolvedSurface) {
    let style = element.style();
    let _ = style.set_property("width", &format!("{}px", placed.size.width));
    let _ = style.set_property("height", &format!("{}px", placed.size.height));
}

fn write_content(element: &HtmlElement, placed: &ResolvedSurface) {
    element.set_inner_html(&placed.surface.content());
}

fn write_classes(element: &HtmlElement, placed: &ResolvedSurface) {
    element.set_class_name(&placed.surface.classes().join(" "));
}

fn write_properties(mounted: &mut Mounted, placed: &ResolvedSurface) {
    let properties = placed.surface.properties();
    let style = mounted.element.style();
    for name in stale_properties(&mounted.properties, &properties) {
        let _ = style.remove_property(name);
    }
    for (name, value) in &properties {
        let _ = style.set_property(name, value);
    }
    mounted.properties = properties.into_keys().collect();
}

/// Drains `pending` into this frame's mount order: ascending identity over
/// the waiting and newly added surfaces, minus the removed ones.
fn mount_queue(
    pending: &mut BTreeSet<SurfaceId>,
    added: &[SurfaceId],
    removed: &[SurfaceId],
) -> Vec<SurfaceId> {
    let mut queue = core::mem::take(pending);
    queue.extend(added.iter().copied());
    for id in removed {
        queue.remove(id);
    }
    queue.into_iter().collect()
}

/// Returns the names in `previous` that `current` no longer sets.
fn stale_properties<'a>(
    previous: &'a [String],
    current: &'a BTreeMap<String, String>,
) -> impl Iterator<Item = &'a str> {
    previous
        .iter()
        .filter(|name| !current.contains_key(name.as_str()))
        .map(String::as_str)
}

/// Formats a transform as a CSS `matrix3d()` value.
///
/// CSS takes the sixteen entries in column-major order, which is the order
/// [`Transform3d`] stores them in.
fn css_matrix(transform: &Transform3d) -> String {
    let c = transform.cols;
    format!(
        "matrix3d({},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{})",
        c[0][0],
        c[0][1],
        c[0][2],
        c[0][3],
        c[1][0],
        c[1][1],
        c[1][2],
        c[1][3],
        c[2][0],
        c[2][1],
        c[2][2],
        c[2][3],
        c[3][0],
        c[3][1],
        c[3][2],
        c[3][3],
    )
}
