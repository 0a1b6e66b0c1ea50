//! Hooks - Component-local state backed by per-fiber slots.
//!
//! While a function component renders, a [`HookFrame`] for its fiber sits on
//! a thread-local stack. [`use_state`] reads that frame to find its slot:
//!
//! - **Mount** (the fiber has no alternate): allocate a slot, compute the
//!   initial state, create a queue and a [`Dispatch`] handle.
//! - **Update** (the fiber has an alternate): take the slot at the same
//!   position in the alternate's list, drain its queue, carry it forward.
//!
//! Slots are matched purely by call order, so every render of a component
//! instance must call the same hooks in the same order.
//!
//! # Example
//!
//! ```ignore
//! let counter = Component::new("Counter", |_props| {
//!     let (count, set_count) = use_state(0)?;
//!     Ok(Element::host("span").with_child(count).into())
//! });
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::update_queue::{
    Action, SharedQueue, Update, create_update_queue, enqueue_update, process_update_queue,
};
use crate::engine::FiberId;
use crate::error::{HookError, ReconcileError, RenderError};
use crate::primitives::{Component, Node, Props};

// =============================================================================
// Scheduling seam
// =============================================================================

/// Something that can run a render pass on behalf of a fiber.
///
/// Implemented by the root; dispatch handles hold it weakly.
pub trait ScheduleUpdate {
    fn schedule_update(&self, fiber: FiberId) -> Result<(), ReconcileError>;
}

// =============================================================================
// Hook slot
// =============================================================================

/// One state slot. Cheap to clone: both fields are shared.
#[derive(Clone, Debug)]
pub struct Hook {
    memoized_state: Rc<dyn Any>,
    update_queue: Rc<dyn Any>,
}

impl Hook {
    /// Current state, if it has type `S`.
    pub fn state<S: 'static>(&self) -> Option<&S> {
        self.memoized_state.downcast_ref::<S>()
    }
}

/// Concrete type behind `Hook::update_queue`.
struct HookQueue<S> {
    queue: SharedQueue<S>,
    dispatch: Dispatch<S>,
}

// =============================================================================
// Dispatch
// =============================================================================

struct DispatchInner<S> {
    queue: SharedQueue<S>,
    fiber: FiberId,
    scheduler: Weak<dyn ScheduleUpdate>,
}

/// Handle that requests a state change for one hook slot.
///
/// The same handle is returned on every render of the slot; compare with
/// [`Dispatch::ptr_eq`].
pub struct Dispatch<S> {
    inner: Rc<DispatchInner<S>>,
}

impl<S: 'static> Dispatch<S> {
    fn new(queue: SharedQueue<S>, fiber: FiberId, scheduler: Weak<dyn ScheduleUpdate>) -> Self {
        Self {
            inner: Rc::new(DispatchInner {
                queue,
                fiber,
                scheduler,
            }),
        }
    }

    /// Enqueue `action` and run a render pass for the owning root.
    ///
    /// The new state is only observable after that pass. Called during a
    /// pass, the update is picked up by a follow-up pass instead.
    pub fn dispatch(&self, action: impl Into<Action<S>>) -> Result<(), ReconcileError> {
        enqueue_update(&self.inner.queue, Update::new(action));
        let Some(scheduler) = self.inner.scheduler.upgrade() else {
            log::warn!("[hooks] dispatch after its root was dropped; update ignored");
            return Ok(());
        };
        scheduler.schedule_update(self.inner.fiber)
    }

    /// Replace the state with `value`.
    pub fn set(&self, value: S) -> Result<(), ReconcileError> {
        self.dispatch(Action::Replace(value))
    }

    /// Derive the next state from the previous one.
    pub fn update(&self, f: impl FnOnce(S) -> S + 'static) -> Result<(), ReconcileError> {
        self.dispatch(Action::reduce(f))
    }
}

impl<S> Dispatch<S> {
    /// True if both handles belong to the same hook slot.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Fiber that owned the slot when it was mounted.
    pub fn fiber(&self) -> FiberId {
        self.inner.fiber
    }
}

impl<S> Clone for Dispatch<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S> fmt::Debug for Dispatch<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch")
            .field("fiber", &self.inner.fiber)
            .finish()
    }
}

// =============================================================================
// Render frame stack
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HookPhase {
    Mount,
    Update,
}

/// Hook context of the component currently rendering.
struct HookFrame {
    fiber: FiberId,
    component: Rc<str>,
    phase: HookPhase,
    /// Slots from the previous render (via the alternate). Empty on mount.
    previous: Vec<Hook>,
    /// Slots built by this render, in call order.
    hooks: Vec<Hook>,
    scheduler: Weak<dyn ScheduleUpdate>,
}

thread_local! {
    /// Frames of components being rendered. Nested only when a component
    /// synchronously drives another root.
    static RENDER_STACK: RefCell<Vec<HookFrame>> = const { RefCell::new(Vec::new()) };
}

/// Pops its frame when dropped, so an early return or panic never leaves a
/// stale frame behind.
struct FrameGuard {
    depth: usize,
    finished: bool,
}

impl FrameGuard {
    fn push(frame: HookFrame) -> Self {
        RENDER_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            stack.push(frame);
            Self {
                depth: stack.len(),
                finished: false,
            }
        })
    }

    fn finish(mut self) -> Vec<Hook> {
        self.finished = true;
        RENDER_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            stack.truncate(self.depth);
            stack.pop().map(|frame| frame.hooks).unwrap_or_default()
        })
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let _ = RENDER_STACK.try_with(|stack| {
            if let Ok(mut stack) = stack.try_borrow_mut() {
                stack.truncate(self.depth.saturating_sub(1));
            }
        });
    }
}

/// True while some function component is rendering on this thread.
pub fn is_rendering() -> bool {
    RENDER_STACK.with(|stack| !stack.borrow().is_empty())
}

// =============================================================================
// Component invocation
// =============================================================================

/// Run a component body with hooks bound to `fiber`.
///
/// `previous` is the alternate's hook list: `Some` selects the update path,
/// `None` the mount path. Returns the description and the new hook list.
pub(crate) fn render_with_hooks(
    fiber: FiberId,
    component: &Component,
    props: &Props,
    previous: Option<Vec<Hook>>,
    scheduler: Weak<dyn ScheduleUpdate>,
) -> Result<(Node, Vec<Hook>), RenderError> {
    let phase = match previous {
        Some(_) => HookPhase::Update,
        None => HookPhase::Mount,
    };
    let previous = previous.unwrap_or_default();
    let expected = previous.len();
    let name: Rc<str> = component.name().into();

    log::trace!("[hooks] render `{}` ({:?})", name, phase);

    let guard = FrameGuard::push(HookFrame {
        fiber,
        component: name.clone(),
        phase,
        previous,
        hooks: Vec::new(),
        scheduler,
    });
    let rendered = component.render(props);
    let hooks = guard.finish();
    let node = rendered?;

    if phase == HookPhase::Update && hooks.len() < expected {
        return Err(HookError::TooFewHooks {
            component: name.to_string(),
            rendered: hooks.len(),
            expected,
        }
        .into());
    }
    Ok((node, hooks))
}

// =============================================================================
// use_state
// =============================================================================

/// Declare a piece of component state initialised with `initial`.
///
/// Returns the current state and the slot's dispatch handle. Fails if called
/// outside a component render or out of step with the previous render.
pub fn use_state<S: Clone + 'static>(initial: S) -> Result<(S, Dispatch<S>), HookError> {
    resolve_state(move || initial)
}

/// Like [`use_state`], but the initial state is computed by `init`, which runs
/// only on the first render.
pub fn use_state_with<S: Clone + 'static>(
    init: impl FnOnce() -> S,
) -> Result<(S, Dispatch<S>), HookError> {
    resolve_state(init)
}

enum Slot {
    Mount {
        fiber: FiberId,
        scheduler: Weak<dyn ScheduleUpdate>,
    },
    Update {
        hook: Hook,
        index: usize,
        component: Rc<str>,
    },
}

fn resolve_state<S: Clone + 'static>(
    init: impl FnOnce() -> S,
) -> Result<(S, Dispatch<S>), HookError> {
    // The frame is only borrowed around lookups: initialisers and reducers are
    // user code and may call back into hooks.
    let slot = RENDER_STACK.with(|stack| -> Result<Slot, HookError> {
        let stack = stack.borrow();
        let frame = stack.last().ok_or(HookError::OutsideRender)?;
        match frame.phase {
            HookPhase::Mount => Ok(Slot::Mount {
                fiber: frame.fiber,
                scheduler: frame.scheduler.clone(),
            }),
            HookPhase::Update => {
                let index = frame.hooks.len();
                let hook = frame.previous.get(index).cloned().ok_or_else(|| {
                    HookError::TooManyHooks {
                        component: frame.component.to_string(),
                        expected: frame.previous.len(),
                    }
                })?;
                Ok(Slot::Update {
                    hook,
                    index,
                    component: frame.component.clone(),
                })
            }
        }
    })?;

    let (state, hook, dispatch) = match slot {
        Slot::Mount { fiber, scheduler } => {
            let state = init();
            let queue = create_update_queue();
            let dispatch = Dispatch::new(queue.clone(), fiber, scheduler);
            let hook = Hook {
                memoized_state: Rc::new(state.clone()),
                update_queue: Rc::new(HookQueue {
                    queue,
                    dispatch: dispatch.clone(),
                }),
            };
            (state, hook, dispatch)
        }
        Slot::Update {
            hook,
            index,
            component,
        } => {
            let mismatch = || HookError::StateTypeMismatch {
                component: component.to_string(),
                index,
            };
            let base = hook
                .memoized_state
                .downcast::<S>()
                .map_err(|_| mismatch())?;
            let hook_queue = hook
                .update_queue
                .downcast::<HookQueue<S>>()
                .map_err(|_| mismatch())?;

            let pending = hook_queue.queue.borrow_mut().take_pending();
            let memoized_state = if pending.is_empty() {
                base
            } else {
                log::trace!(
                    "[hooks] `{}` hook #{} draining {} update(s)",
                    component,
                    index,
                    pending.len()
                );
                Rc::new(process_update_queue((*base).clone(), pending))
            };

            let state = (*memoized_state).clone();
            let dispatch = hook_queue.dispatch.clone();
            let hook = Hook {
                memoized_state,
                update_queue: hook_queue,
            };
            (state, hook, dispatch)
        }
    };

    RENDER_STACK.with(|stack| {
        if let Some(frame) = stack.borrow_mut().last_mut() {
            frame.hooks.push(hook);
        }
    });
    Ok((state, dispatch))
}
