// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-event choice of downstream target.

use alloc::rc::Rc;

use super::{EventTarget, TargetKey};

type Mapping<T> = dyn Fn(&str, &T) -> Option<Rc<dyn EventTarget<T>>>;

/// Forwards each event to a target chosen by a mapping function.
///
/// Events for which the mapping returns `None` are dropped.
pub struct EventMapper<T: 'static> {
    mapping: Rc<Mapping<T>>,
}

impl<T: 'static> Clone for EventMapper<T> {
    fn clone(&self) -> Self {
        Self {
            mapping: Rc::clone(&self.mapping),
        }
    }
}

impl<T: 'static> core::fmt::Debug for EventMapper<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventMapper").finish_non_exhaustive()
    }
}

impl<T: 'static> EventMapper<T> {
    /// Creates a mapper from a target-selection function.
    pub fn new(mapping: impl Fn(&str, &T) -> Option<Rc<dyn EventTarget<T>>> + 'static) -> Self {
        Self {
            mapping: Rc::new(mapping),
        }
    }

    /// Forwards the event to the mapped target, if any.
    pub fn trigger(&self, event_type: &str, data: &T) -> bool {
        match (self.mapping)(event_type, data) {
            Some(target) => target.trigger(event_type, data),
            None => false,
        }
    }
}

impl<T: 'static> EventTarget<T> for EventMapper<T> {
    fn trigger(&self, event_type: &str, data: &T) -> bool {
        Self::trigger(self, event_type, data)
    }

    fn target_key(&self) -> TargetKey {
        TargetKey::of(&self.mapping)
    }
}

#[cfg(test)]
mod tests {
    use core::cell::RefCell;

    use super::*;
    use crate::event::EventHandler;

    #[test]
    fn routes_by_payload() {
        let even = EventHandler::<u32>::new();
        let odd = EventHandler::<u32>::new();
        let counts = Rc::new(RefCell::new((0, 0)));

        let c = Rc::clone(&counts);
        let _ = even.on("n", move |_| c.borrow_mut().0 += 1);
        let c = Rc::clone(&counts);
        let _ = odd.on("n", move |_| c.borrow_mut().1 += 1);

        let (e, o) = (even.clone(), odd.clone());
        let mapper = EventMapper::new(move |_: &str, n: &u32| -> Option<Rc<dyn EventTarget<u32>>> {
            if *n == 0 {
                None
            } else if n % 2 == 0 {
                Some(Rc::new(e.clone()))
            } else {
                Some(Rc::new(o.clone()))
            }
        });

        let source = EventHandler::<u32>::new();
        source.pipe(&mapper);
        for n in 1..=5 {
            source.trigger("n", &n);
        }
        assert!(!mapper.trigger("n", &0));
        assert_eq!(*counts.borrow(), (2, 3));
    }
}
