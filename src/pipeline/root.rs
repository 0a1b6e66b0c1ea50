//! Root - Entry point that owns a host, a container and a fiber tree.
//!
//! # Example
//!
//! ```ignore
//! use spark_reconciler::{create_root, update_root, Element, MemoryHost};
//!
//! let host = MemoryHost::new();
//! let container = host.container();
//! let root = create_root(host, container);
//!
//! update_root(Element::host("div").with_child("100"), &root)?;
//! assert_eq!(root.with_host(|host| host.to_markup()), "<div>100</div>");
//! ```
//!
//! # Re-entrancy
//!
//! Updates that arrive while a pass is running (a dispatch from a component
//! body, or a host callback during commit) are queued and picked up by a
//! follow-up pass once the current one has committed.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::options::RootOptions;
use super::work_loop::{mark_update_from_fiber_to_root, render_root};
use crate::engine::{FiberId, FiberTree};
use crate::error::ReconcileError;
use crate::host::HostConfig;
use crate::primitives::Node;
use crate::renderer::CommitSummary;
use crate::state::{ScheduleUpdate, SharedQueue, Update, create_update_queue, enqueue_update};

// =============================================================================
// Root state
// =============================================================================

/// Everything a pass mutates. Borrowed for the whole pass.
pub(crate) struct RootState<H: HostConfig> {
    pub(crate) host: H,
    pub(crate) container: H::Instance,
    pub(crate) tree: FiberTree<H::Instance>,
    /// Root fiber of the committed tree.
    pub(crate) current: FiberId,
    pub(crate) finished_work: Option<FiberId>,
    pub(crate) last_commit: CommitSummary,
}

pub(crate) struct RootCell<H: HostConfig> {
    state: RefCell<RootState<H>>,
    /// Top-level description queue, shared by both root fibers.
    queue: SharedQueue<Node>,
    /// First root fiber. Both generations stay alive for the root's lifetime.
    host_root: FiberId,
    rendering: Cell<bool>,
    rerender: Cell<bool>,
    options: RootOptions,
    weak_self: Weak<RootCell<H>>,
}

/// Marks a pass as running; cleared on every exit path.
struct RenderingGuard<'a>(&'a Cell<bool>);

impl<'a> RenderingGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for RenderingGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<H: HostConfig + 'static> RootCell<H> {
    /// Run passes until no update arrived during the last one.
    fn perform_sync_work(&self) -> Result<(), ReconcileError> {
        let _rendering = RenderingGuard::enter(&self.rendering);
        let scheduler: Weak<dyn ScheduleUpdate> = self.weak_self.clone();
        let label = self.options.log_label();
        let mut state = self.state.borrow_mut();
        let mut follow_ups = 0;

        loop {
            self.rerender.set(false);
            render_root(&mut state, &scheduler, &self.options)?;
            if !self.rerender.get() {
                return Ok(());
            }

            follow_ups += 1;
            if follow_ups > self.options.nested_update_limit {
                log::error!(
                    "[work-loop] {}: gave up after {} follow-up passes",
                    label,
                    self.options.nested_update_limit
                );
                return Err(ReconcileError::NestedUpdateLimit {
                    limit: self.options.nested_update_limit,
                });
            }
            log::debug!("[work-loop] {}: follow-up pass #{}", label, follow_ups);
        }
    }
}

impl<H: HostConfig + 'static> ScheduleUpdate for RootCell<H> {
    fn schedule_update(&self, fiber: FiberId) -> Result<(), ReconcileError> {
        if self.rendering.get() {
            log::trace!(
                "[work-loop] {}: update during a pass, deferring",
                self.options.log_label()
            );
            self.rerender.set(true);
            return Ok(());
        }

        let mounted = mark_update_from_fiber_to_root(&self.state.borrow().tree, fiber).is_some();
        if !mounted {
            log::warn!(
                "[work-loop] {}: update on an unmounted component ignored",
                self.options.log_label()
            );
            return Ok(());
        }
        self.perform_sync_work()
    }
}

// =============================================================================
// Public handle
// =============================================================================

/// Handle to a mounted tree. Clones share the same root.
pub struct Root<H: HostConfig> {
    shared: Rc<RootCell<H>>,
}

impl<H: HostConfig> Clone for Root<H> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

/// Create a root rendering into `container` through `host`.
pub fn create_root<H: HostConfig + 'static>(host: H, container: H::Instance) -> Root<H> {
    create_root_with_options(host, container, RootOptions::default())
}

/// [`create_root`] with explicit options.
pub fn create_root_with_options<H: HostConfig + 'static>(
    host: H,
    container: H::Instance,
    options: RootOptions,
) -> Root<H> {
    let queue = create_update_queue();
    let mut tree = FiberTree::new();
    let host_root = tree.create_host_root(container.clone(), queue.clone());
    log::debug!("[root] {}: created", options.log_label());

    let shared = Rc::new_cyclic(|weak_self| RootCell {
        state: RefCell::new(RootState {
            host,
            container,
            tree,
            current: host_root,
            finished_work: None,
            last_commit: CommitSummary::default(),
        }),
        queue,
        host_root,
        rendering: Cell::new(false),
        rerender: Cell::new(false),
        options,
        weak_self: weak_self.clone(),
    });
    Root { shared }
}

/// Replace the root's top-level description and render it synchronously.
///
/// Returns the description. Called while the root is rendering, the update
/// is applied by a follow-up pass instead.
pub fn update_root<H: HostConfig + 'static>(
    description: impl Into<Node>,
    root: &Root<H>,
) -> Result<Node, ReconcileError> {
    let description = description.into();
    enqueue_update(&root.shared.queue, Update::new(description.clone()));
    root.shared.schedule_update(root.shared.host_root)?;
    Ok(description)
}

impl<H: HostConfig + 'static> Root<H> {
    /// Same as [`update_root`].
    pub fn render(&self, description: impl Into<Node>) -> Result<Node, ReconcileError> {
        update_root(description, self)
    }
}

impl<H: HostConfig> Root<H> {
    /// Inspect the fiber arena and the current root fiber.
    ///
    /// Panics if called from inside a render pass of this root.
    pub fn with_fibers<R>(&self, f: impl FnOnce(&FiberTree<H::Instance>, FiberId) -> R) -> R {
        let state = self.shared.state.borrow();
        f(&state.tree, state.current)
    }

    /// Access the host, e.g. to read or clear a recorded log.
    ///
    /// Panics if called from inside a render pass of this root.
    pub fn with_host<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
        let mut state = self.shared.state.borrow_mut();
        f(&mut state.host)
    }

    /// Summary of the most recent commit.
    pub fn last_commit(&self) -> CommitSummary {
        self.shared.state.borrow().last_commit
    }

    /// Root fiber of the committed tree.
    pub fn current(&self) -> FiberId {
        self.shared.state.borrow().current
    }

    pub fn container(&self) -> H::Instance {
        self.shared.state.borrow().container.clone()
    }

    pub fn options(&self) -> &RootOptions {
        &self.shared.options
    }

    /// True while a pass of this root is running.
    pub fn is_rendering(&self) -> bool {
        self.shared.rendering.get()
    }
}
