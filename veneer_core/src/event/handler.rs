// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The broadcast node of the event graph.

use alloc::collections::BTreeMap;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use super::{Control, EventTarget, TargetKey};

type Listener<T> = Rc<dyn Fn(&T)>;
type ControlListener = Rc<dyn Fn(Control)>;

/// A typed publish/subscribe node.
///
/// `EventHandler` is a cheap-clone handle: clones share listeners and links,
/// and compare equal as pipe targets. See the [module docs](super) for the
/// dispatch order.
pub struct EventHandler<T: 'static> {
    inner: Rc<Inner<T>>,
}

struct Inner<T: 'static> {
    listeners: RefCell<BTreeMap<String, Vec<(u64, Listener<T>)>>>,
    control_listeners: RefCell<Vec<(u64, ControlListener)>>,
    downstream: RefCell<Vec<(TargetKey, Rc<dyn EventTarget<T>>)>>,
    /// Sources this handler pulls events from via [`EventHandler::subscribe`].
    upstream: RefCell<Vec<EventHandler<T>>>,
    /// Forwarding registrations on upstream sources, per source and type.
    /// A type has links only while it has listeners.
    upstream_links: RefCell<Vec<(TargetKey, String, Subscription)>>,
    next_id: Cell<u64>,
}

impl<T: 'static> Clone for EventHandler<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> Default for EventHandler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> core::fmt::Debug for EventHandler<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let types: Vec<String> = self.inner.listeners.borrow().keys().cloned().collect();
        f.debug_struct("EventHandler")
            .field("types", &types)
            .field("downstream", &self.inner.downstream.borrow().len())
            .field("upstream", &self.inner.upstream.borrow().len())
            .finish_non_exhaustive()
    }
}

impl<T: 'static> EventHandler<T> {
    /// Creates a handler with no listeners and no links.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Inner {
                listeners: RefCell::new(BTreeMap::new()),
                control_listeners: RefCell::new(Vec::new()),
                downstream: RefCell::new(Vec::new()),
                upstream: RefCell::new(Vec::new()),
                upstream_links: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    fn next_id(&self) -> u64 {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        id
    }

    /// Registers `listener` for `event_type`.
    ///
    /// Registrations are independent: registering the same closure twice
    /// invokes it twice. The returned [`Subscription`] detaches exactly this
    /// registration.
    pub fn on(&self, event_type: &str, listener: impl Fn(&T) + 'static) -> Subscription {
        let id = self.next_id();
        let is_new_type = {
            let mut listeners = self.inner.listeners.borrow_mut();
            let list = listeners.entry(String::from(event_type)).or_default();
            let is_new = list.is_empty();
            list.push((id, Rc::new(listener)));
            is_new
        };
        if is_new_type {
            let sources: Vec<Self> = self.inner.upstream.borrow().clone();
            for source in &sources {
                self.link_upstream(source, event_type);
            }
        }
        Subscription {
            owner: Rc::downgrade(&self.inner) as Weak<dyn Detach>,
            kind: SubscriptionKind::Event(String::from(event_type)),
            id,
        }
    }

    /// Registers a listener for pipe/unpipe control signals.
    pub fn on_control(&self, listener: impl Fn(Control) + 'static) -> Subscription {
        let id = self.next_id();
        self.inner
            .control_listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        Subscription {
            owner: Rc::downgrade(&self.inner) as Weak<dyn Detach>,
            kind: SubscriptionKind::Control,
            id,
        }
    }

    /// Removes every listener registered for `event_type`.
    pub fn remove_all_listeners(&self, event_type: &str) {
        let removed = self.inner.listeners.borrow_mut().remove(event_type);
        if removed.is_some() {
            self.inner.unlink_type(event_type);
        }
    }

    /// Returns the number of listeners registered for `event_type`.
    #[must_use]
    pub fn listener_count(&self, event_type: &str) -> usize {
        self.inner
            .listeners
            .borrow()
            .get(event_type)
            .map_or(0, Vec::len)
    }

    /// Broadcasts an event.
    ///
    /// Listeners for `event_type` run first, in registration order; then every
    /// downstream target receives the same `(event_type, data)`. Returns
    /// `false` if neither a listener nor a downstream target handled it.
    pub fn trigger(&self, event_type: &str, data: &T) -> bool {
        let listeners: Vec<Listener<T>> = self
            .inner
            .listeners
            .borrow()
            .get(event_type)
            .map(|list| list.iter().map(|(_, l)| Rc::clone(l)).collect())
            .unwrap_or_default();
        let mut handled = !listeners.is_empty();
        for listener in &listeners {
            listener(data);
        }

        let downstream = self.downstream_snapshot();
        for target in &downstream {
            handled |= target.trigger(event_type, data);
        }
        handled
    }

    /// Alias for [`trigger`](Self::trigger).
    pub fn emit(&self, event_type: &str, data: &T) -> bool {
        self.trigger(event_type, data)
    }

    /// Delivers a control signal to control listeners, then downstream.
    pub fn control(&self, signal: Control) {
        let listeners: Vec<ControlListener> = self
            .inner
            .control_listeners
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in &listeners {
            listener(signal);
        }
        for target in &self.downstream_snapshot() {
            target.control(signal);
        }
    }

    /// Adds `target` to the downstream set and sends it [`Control::Pipe`].
    ///
    /// Piping the same target twice is a no-op.
    pub fn pipe<S>(&self, target: &S)
    where
        S: EventTarget<T> + Clone + 'static,
    {
        let key = target.target_key();
        {
            let mut downstream = self.inner.downstream.borrow_mut();
            if downstream.iter().any(|(k, _)| *k == key) {
                return;
            }
            downstream.push((key, Rc::new(target.clone())));
        }
        target.control(Control::Pipe);
    }

    /// Removes `target` from the downstream set and sends it
    /// [`Control::Unpipe`].
    ///
    /// Returns `false` (and sends nothing) if `target` was never piped.
    pub fn unpipe<S>(&self, target: &S) -> bool
    where
        S: EventTarget<T> + ?Sized,
    {
        let key = target.target_key();
        let removed = {
            let mut downstream = self.inner.downstream.borrow_mut();
            let before = downstream.len();
            downstream.retain(|(k, _)| *k != key);
            before != downstream.len()
        };
        if removed {
            target.control(Control::Unpipe);
        }
        removed
    }

    /// Returns whether `target` is currently piped from this handler.
    #[must_use]
    pub fn is_piped_to<S>(&self, target: &S) -> bool
    where
        S: EventTarget<T> + ?Sized,
    {
        let key = target.target_key();
        self.inner.downstream.borrow().iter().any(|(k, _)| *k == key)
    }

    /// Pulls events from `source`.
    ///
    /// For every event type this handler listens to, now or later, a
    /// forwarding listener is registered on `source`. Subscribing twice is a
    /// no-op.
    pub fn subscribe(&self, source: &Self) {
        let key = source.target_key();
        {
            let mut upstream = self.inner.upstream.borrow_mut();
            if upstream.iter().any(|s| s.target_key() == key) {
                return;
            }
            upstream.push(source.clone());
        }
        let types: Vec<String> = self.inner.listeners.borrow().keys().cloned().collect();
        for event_type in &types {
            self.link_upstream(source, event_type);
        }
    }

    /// Stops pulling events from `source`. No-op if not subscribed.
    pub fn unsubscribe(&self, source: &Self) {
        let key = source.target_key();
        self.inner
            .upstream
            .borrow_mut()
            .retain(|s| s.target_key() != key);
        let links: Vec<Subscription> = {
            let mut all = self.inner.upstream_links.borrow_mut();
            let (matching, rest): (Vec<_>, Vec<_>) =
                all.drain(..).partition(|(k, _, _)| *k == key);
            *all = rest;
            matching.into_iter().map(|(_, _, s)| s).collect()
        };
        for link in links {
            link.detach();
        }
    }

    fn link_upstream(&self, source: &Self, event_type: &str) {
        let weak = Rc::downgrade(&self.inner);
        let forwarded_type = String::from(event_type);
        let sub = source.on(event_type, move |data| {
            if let Some(inner) = weak.upgrade() {
                Self { inner }.trigger(&forwarded_type, data);
            }
        });
        self.inner.upstream_links.borrow_mut().push((
            source.target_key(),
            String::from(event_type),
            sub,
        ));
    }

    fn downstream_snapshot(&self) -> Vec<Rc<dyn EventTarget<T>>> {
        self.inner
            .downstream
            .borrow()
            .iter()
            .map(|(_, t)| Rc::clone(t))
            .collect()
    }
}

impl<T: 'static> EventTarget<T> for EventHandler<T> {
    fn trigger(&self, event_type: &str, data: &T) -> bool {
        Self::trigger(self, event_type, data)
    }

    fn control(&self, signal: Control) {
        Self::control(self, signal);
    }

    fn target_key(&self) -> TargetKey {
        TargetKey::of(&self.inner)
    }
}

trait Detach {
    fn detach_listener(&self, kind: &SubscriptionKind, id: u64);
}

impl<T: 'static> Inner<T> {
    /// Drops the forwarding links for `event_type` on every upstream source.
    fn unlink_type(&self, event_type: &str) {
        let links: Vec<Subscription> = {
            let mut all = self.upstream_links.borrow_mut();
            let (matching, rest): (Vec<_>, Vec<_>) =
                all.drain(..).partition(|(_, t, _)| t == event_type);
            *all = rest;
            matching.into_iter().map(|(_, _, s)| s).collect()
        };
        for link in links {
            link.detach();
        }
    }
}

impl<T: 'static> Detach for Inner<T> {
    fn detach_listener(&self, kind: &SubscriptionKind, id: u64) {
        match kind {
            SubscriptionKind::Event(event_type) => {
                let emptied = {
                    let mut listeners = self.listeners.borrow_mut();
                    let Some(list) = listeners.get_mut(event_type.as_str()) else {
                        return;
                    };
                    list.retain(|(i, _)| *i != id);
                    let emptied = list.is_empty();
                    if emptied {
                        listeners.remove(event_type.as_str());
                    }
                    emptied
                };
                if emptied {
                    self.unlink_type(event_type);
                }
            }
            SubscriptionKind::Control => {
                self.control_listeners.borrow_mut().retain(|(i, _)| *i != id);
            }
        }
    }
}

#[derive(Debug)]
enum SubscriptionKind {
    Event(String),
    Control,
}

/// Detaches one listener registration.
///
/// Dropping a `Subscription` does **not** detach; call
/// [`detach`](Self::detach) explicitly. Detaching after the handler itself is
/// gone is a no-op.
#[must_use = "dropping a Subscription keeps the listener registered; call detach() to remove it"]
pub struct Subscription {
    owner: Weak<dyn Detach>,
    kind: SubscriptionKind,
    id: u64,
}

impl Subscription {
    /// Removes the listener this subscription was returned for.
    pub fn detach(self) {
        if let Some(owner) = self.owner.upgrade() {
            owner.detach_listener(&self.kind, self.id);
        }
    }
}

impl core::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Subscription")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
