// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-frame driver.
//!
//! An [`Engine`] owns every [`Context`] together with the [`Presenter`] that
//! commits it. The backend's tick source calls [`Engine::step`] once per
//! frame; one step runs, in order:
//!
//! 1. the `prerender` event on the [frame handler](Engine::frame_handler),
//! 2. every task queued with [`TaskQueue::next_tick`] before the step began,
//! 3. up to [`EngineConfig::max_deferred_per_frame`] tasks queued with
//!    [`TaskQueue::defer`],
//! 4. update and present of every context, in creation order,
//! 5. the `postrender` event.
//!
//! The engine never schedules its own next frame; a tick source that stops
//! calling `step` stops the loop.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use kurbo::Size;

use crate::backend::Presenter;
use crate::context::{Context, ContextConfig, FrameChanges, usable};
use crate::event::EventHandler;
use crate::timing::FrameTick;

/// Configuration for an [`Engine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum number of deferred tasks run per frame.
    pub max_deferred_per_frame: usize,
}

impl EngineConfig {
    /// The default configuration: eight deferred tasks per frame.
    pub const DEFAULT: Self = Self {
        max_deferred_per_frame: 8,
    };
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

type Task = Box<dyn FnOnce(&FrameTick)>;

#[derive(Default)]
struct Queues {
    next_tick: Vec<Task>,
    deferred: VecDeque<Task>,
}

/// Handle for queueing work onto future frames.
///
/// Cheap to clone, so listeners and gesture callbacks can hold one.
#[derive(Clone, Default)]
pub struct TaskQueue {
    queues: Rc<RefCell<Queues>>,
}

impl core::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let queues = self.queues.borrow();
        f.debug_struct("TaskQueue")
            .field("next_tick", &queues.next_tick.len())
            .field("deferred", &queues.deferred.len())
            .finish()
    }
}

impl TaskQueue {
    /// Runs `task` at the start of the next frame.
    ///
    /// Tasks queued while a frame's tasks are running wait for the frame
    /// after.
    pub fn next_tick(&self, task: impl FnOnce(&FrameTick) + 'static) {
        self.queues.borrow_mut().next_tick.push(Box::new(task));
    }

    /// Runs `task` on some upcoming frame, in queue order, without exceeding
    /// the per-frame budget.
    pub fn defer(&self, task: impl FnOnce(&FrameTick) + 'static) {
        self.queues.borrow_mut().deferred.push_back(Box::new(task));
    }

    /// Returns the number of tasks waiting, of both kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        let queues = self.queues.borrow();
        queues.next_tick.len() + queues.deferred.len()
    }

    /// Returns whether no tasks are waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn take_next_tick(&self) -> Vec<Task> {
        core::mem::take(&mut self.queues.borrow_mut().next_tick)
    }

    fn pop_deferred(&self) -> Option<Task> {
        self.queues.borrow_mut().deferred.pop_front()
    }
}

/// Index of a context within its [`Engine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(usize);

/// Drives every context through update and present once per frame.
pub struct Engine<P: Presenter> {
    contexts: Vec<(Context, P)>,
    frame: EventHandler<FrameTick>,
    tasks: TaskQueue,
    config: EngineConfig,
    changes: FrameChanges,
}

impl<P: Presenter> core::fmt::Debug for Engine<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Engine")
            .field("contexts", &self.contexts.len())
            .field("tasks", &self.tasks)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<P: Presenter> Default for Engine<P> {
    fn default() -> Self {
        Self::new(EngineConfig::DEFAULT)
    }
}

impl<P: Presenter> Engine<P> {
    /// Creates an engine with no contexts.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            contexts: Vec::new(),
            frame: EventHandler::new(),
            tasks: TaskQueue::default(),
            config,
            changes: FrameChanges::default(),
        }
    }

    /// Creates a context committed by `presenter`.
    ///
    /// The context is laid out in `size` if that is usable, otherwise in
    /// the presenter's [measured](Presenter::measure) size, otherwise in
    /// [`ContextConfig::fallback_size`].
    pub fn create_context(
        &mut self,
        size: Option<Size>,
        config: ContextConfig,
        presenter: P,
    ) -> ContextId {
        let size = size
            .filter(|s| usable(*s))
            .or_else(|| presenter.measure().filter(|s| usable(*s)))
            .unwrap_or(config.fallback_size);
        let id = ContextId(self.contexts.len());
        self.contexts.push((Context::with_config(size, config), presenter));
        tracing::debug!(
            context = id.0,
            width = size.width,
            height = size.height,
            "context created"
        );
        id
    }

    /// Resizes a context.
    ///
    /// `None` or an unusable size re-measures the context's presenter; if
    /// that yields nothing usable the size is left alone. Returns `false` for an
    /// unknown context.
    pub fn resize(&mut self, id: ContextId, size: Option<Size>) -> bool {
        let Some((context, presenter)) = self.contexts.get_mut(id.0) else {
            return false;
        };
        let size = size
            .filter(|s| usable(*s))
            .or_else(|| presenter.measure().filter(|s| usable(*s)));
        if let Some(size) = size {
            context.set_size(size);
        }
        true
    }

    /// Re-measures every presenter and resizes the contexts whose usable
    /// measurement changed.
    ///
    /// Backends call this when the page reports a resize.
    pub fn remeasure_all(&mut self) {
        for (index, (context, presenter)) in self.contexts.iter_mut().enumerate() {
            let Some(size) = presenter.measure().filter(|s| usable(*s)) else {
                continue;
            };
            if size != context.size() {
                tracing::debug!(
                    context = index,
                    width = size.width,
                    height = size.height,
                    "context resized"
                );
                context.set_size(size);
            }
        }
    }

    /// Returns a context.
    #[must_use]
    pub fn context(&self, id: ContextId) -> Option<&Context> {
        self.contexts.get(id.0).map(|(context, _)| context)
    }

    /// Returns a context mutably, e.g. to resize it.
    pub fn context_mut(&mut self, id: ContextId) -> Option<&mut Context> {
        self.contexts.get_mut(id.0).map(|(context, _)| context)
    }

    /// Returns the presenter committing a context.
    pub fn presenter_mut(&mut self, id: ContextId) -> Option<&mut P> {
        self.contexts.get_mut(id.0).map(|(_, presenter)| presenter)
    }

    /// Returns the handler that fires `prerender` and `postrender`.
    #[must_use]
    pub fn frame_handler(&self) -> &EventHandler<FrameTick> {
        &self.frame
    }

    /// Returns the task queue.
    #[must_use]
    pub fn tasks(&self) -> &TaskQueue {
        &self.tasks
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs one frame.
    #[tracing::instrument(level = "trace", skip_all, fields(frame = tick.frame_index))]
    pub fn step(&mut self, tick: &FrameTick) {
        self.frame.trigger("prerender", tick);

        for task in self.tasks.take_next_tick() {
            task(tick);
        }
        for _ in 0..self.config.max_deferred_per_frame {
            let Some(task) = self.tasks.pop_deferred() else {
                break;
            };
            task(tick);
        }

        for (context, presenter) in &mut self.contexts {
            context.update_into(&mut self.changes);
            if !self.changes.errors.is_empty() {
                tracing::debug!(
                    errors = self.changes.errors.len(),
                    "frame rendered with skipped subtrees"
                );
            }
            presenter.apply(context, &self.changes);
        }

        self.frame.trigger("postrender", tick);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::render::{Attr, Modifier, Surface};

    #[derive(Default)]
    struct Recorder {
        frames: Vec<FrameChanges>,
        measured: Option<Size>,
    }

    impl Recorder {
        fn measuring(size: Size) -> Self {
            Self {
                measured: Some(size),
                ..Self::default()
            }
        }
    }

    impl Presenter for Recorder {
        fn apply(&mut self, _context: &Context, changes: &FrameChanges) {
            self.frames.push(changes.clone());
        }

        fn measure(&self) -> Option<Size> {
            self.measured
        }
    }

    const SIZE: Size = Size::new(100.0, 100.0);

    #[test]
    fn step_updates_and_presents_every_context() {
        let mut engine = Engine::<Recorder>::default();
        let a = engine.create_context(Some(SIZE), ContextConfig::DEFAULT, Recorder::default());
        let b = engine.create_context(Some(SIZE), ContextConfig::DEFAULT, Recorder::default());
        let s = Surface::default();
        engine.context(a).unwrap().add(s.clone());

        engine.step(&FrameTick::new(0, 0.0));
        engine.step(&FrameTick::new(1, 16.0));

        let frames_a = &engine.presenter_mut(a).unwrap().frames;
        assert_eq!(frames_a.len(), 2);
        assert_eq!(frames_a[0].added, vec![s.id()]);
        assert!(frames_a[1].is_empty());
        assert_eq!(engine.presenter_mut(b).unwrap().frames.len(), 2);
    }

    #[test]
    fn frame_events_bracket_the_update() {
        let mut engine = Engine::<Recorder>::default();
        let log = Rc::new(RefCell::new(Vec::new()));
        for name in ["prerender", "postrender"] {
            let l = Rc::clone(&log);
            let _ = engine
                .frame_handler()
                .on(name, move |tick: &FrameTick| l.borrow_mut().push((name, tick.frame_index)));
        }
        engine.step(&FrameTick::new(7, 0.0));
        assert_eq!(*log.borrow(), vec![("prerender", 7), ("postrender", 7)]);
    }

    #[test]
    fn animated_attribute_is_read_every_frame() {
        let mut engine = Engine::<Recorder>::default();
        let id = engine.create_context(Some(SIZE), ContextConfig::DEFAULT, Recorder::default());
        let now = Rc::new(RefCell::new(0.0));
        let n = Rc::clone(&now);
        let _ = engine
            .frame_handler()
            .on("prerender", move |tick: &FrameTick| *n.borrow_mut() = tick.now_ms);
        let n = Rc::clone(&now);
        let s = Surface::default();
        engine
            .context(id)
            .unwrap()
            .add(Modifier::new().with_opacity(Attr::computed(move || *n.borrow() / 100.0)))
            .add(s.clone());

        engine.step(&FrameTick::new(0, 50.0));
        engine.step(&FrameTick::new(1, 25.0));
        let frames = &engine.presenter_mut(id).unwrap().frames;
        assert_eq!(frames[1].opacities, vec![s.id()]);
        let context = engine.context(id).unwrap();
        assert_eq!(context.resolved(s.id()).map(|r| r.opacity), Some(0.25));
    }

    #[test]
    fn next_tick_tasks_run_once_on_the_following_frame() {
        let mut engine = Engine::<Recorder>::default();
        let ran = Rc::new(RefCell::new(Vec::new()));
        let r = Rc::clone(&ran);
        let queue = engine.tasks().clone();
        engine.tasks().next_tick(move |tick| {
            r.borrow_mut().push(tick.frame_index);
            // Queued during a frame: waits for the next one.
            let r = Rc::clone(&r);
            queue.next_tick(move |tick| r.borrow_mut().push(tick.frame_index));
        });
        engine.step(&FrameTick::new(0, 0.0));
        assert_eq!(*ran.borrow(), vec![0]);
        engine.step(&FrameTick::new(1, 0.0));
        engine.step(&FrameTick::new(2, 0.0));
        assert_eq!(*ran.borrow(), vec![0, 1]);
        assert!(engine.tasks().is_empty());
    }

    #[test]
    fn deferred_tasks_are_bounded_per_frame() {
        let mut engine = Engine::<Recorder>::new(EngineConfig {
            max_deferred_per_frame: 2,
        });
        let ran = Rc::new(RefCell::new(Vec::new()));
        for i in 0..5 {
            let r = Rc::clone(&ran);
            engine.tasks().defer(move |tick| r.borrow_mut().push((i, tick.frame_index)));
        }
        engine.step(&FrameTick::new(0, 0.0));
        engine.step(&FrameTick::new(1, 0.0));
        engine.step(&FrameTick::new(2, 0.0));
        assert_eq!(
            *ran.borrow(),
            vec![(0, 0), (1, 0), (2, 1), (3, 1), (4, 2)]
        );
    }

    #[test]
    fn unknown_context_is_none() {
        let mut engine = Engine::<Recorder>::default();
        assert!(engine.context(ContextId(3)).is_none());
        assert!(!engine.resize(ContextId(3), Some(SIZE)));
    }

    #[test]
    fn context_size_falls_back_to_the_measured_container() {
        let measured = Size::new(640.0, 480.0);
        let mut engine = Engine::<Recorder>::default();
        let r#unsized =
            engine.create_context(None, ContextConfig::DEFAULT, Recorder::measuring(measured));
        let empty = engine.create_context(
            Some(Size::ZERO),
            ContextConfig::DEFAULT,
            Recorder::measuring(measured),
        );
        let explicit = engine.create_context(
            Some(SIZE),
            ContextConfig::DEFAULT,
            Recorder::measuring(measured),
        );
        let hidden = engine.create_context(
            None,
            ContextConfig::DEFAULT,
            Recorder::measuring(Size::ZERO),
        );
        let unmeasured = engine.create_context(None, ContextConfig::DEFAULT, Recorder::default());

        let size_of = |id| engine.context(id).map(Context::size);
        assert_eq!(size_of(r#unsized), Some(measured));
        assert_eq!(size_of(empty), Some(measured));
        assert_eq!(size_of(explicit), Some(SIZE));
        let fallback = Some(ContextConfig::DEFAULT.fallback_size);
        assert_eq!(size_of(hidden), fallback);
        assert_eq!(size_of(unmeasured), fallback);
    }

    #[test]
    fn resize_follows_the_container() {
        let mut engine = Engine::<Recorder>::default();
        let id = engine.create_context(None, ContextConfig::DEFAULT, Recorder::measuring(SIZE));
        assert_eq!(engine.context(id).unwrap().size(), SIZE);
        let wider = Size::new(300.0, 100.0);

        engine.presenter_mut(id).unwrap().measured = Some(wider);
        engine.remeasure_all();
        assert_eq!(engine.context(id).unwrap().size(), wider);

        assert!(engine.resize(id, Some(Size::new(50.0, 60.0))));
        assert_eq!(engine.context(id).unwrap().size(), Size::new(50.0, 60.0));

        assert!(engine.resize(id, None));
        assert_eq!(engine.context(id).unwrap().size(), wider);

        engine.presenter_mut(id).unwrap().measured = None;
        assert!(engine.resize(id, None));
        assert_eq!(engine.context(id).unwrap().size(), wider);
    }
}
