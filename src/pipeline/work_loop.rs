//! Work Loop - One synchronous render pass, start to commit.
//!
//! ```text
//! prepare_fresh_stack ─► begin_work ─► (child?) ─► begin_work ...
//!                            │ no child
//!                            ▼
//!                        complete_work ─► sibling? begin it : climb & complete
//!                            │ back at root
//!                            ▼
//!                        commit_root
//! ```
//!
//! A pass always runs to the end or aborts. An aborted pass releases every
//! fiber it created and leaves `current` untouched.

use std::rc::Weak;

use super::options::RootOptions;
use super::root::RootState;
use crate::engine::{FiberId, FiberProps, FiberTree};
use crate::error::{ReconcileError, RenderError};
use crate::host::HostConfig;
use crate::reconciler::{begin_work, complete_work};
use crate::renderer::{CommitSummary, commit_mutation_effects};
use crate::state::ScheduleUpdate;
use crate::types::WorkTag;

/// Climb `return` links from `fiber` to its root fiber.
///
/// `None` means the fiber is no longer part of a mounted tree.
pub(crate) fn mark_update_from_fiber_to_root<I: Clone>(
    tree: &FiberTree<I>,
    fiber: FiberId,
) -> Option<FiberId> {
    let mut node = fiber;
    tree.get(node)?;
    while let Some(parent) = tree[node].return_fiber {
        tree.get(parent)?;
        node = parent;
    }
    (tree[node].tag == WorkTag::Root).then_some(node)
}

/// Build a work-in-progress tree from `current` and commit it.
///
/// Component failures abort the pass and return `Ok`; hook misuse is
/// returned to the caller.
pub(crate) fn render_root<H: HostConfig>(
    state: &mut RootState<H>,
    scheduler: &Weak<dyn ScheduleUpdate>,
    options: &RootOptions,
) -> Result<(), ReconcileError> {
    let label = options.log_label();
    let wip_root = prepare_fresh_stack(state);

    match work_loop(state, wip_root, scheduler) {
        Ok(()) => {
            state.finished_work = Some(wip_root);
            commit_root(state, label);
            Ok(())
        }
        Err(err) => {
            let released = state.tree.discard_pass();
            log::error!(
                "[work-loop] {}: render pass aborted, {} fibers discarded: {}",
                label,
                released,
                err
            );
            match err {
                RenderError::Hook(hook_error) => Err(hook_error.into()),
                RenderError::Component(_) => Ok(()),
            }
        }
    }
}

fn prepare_fresh_stack<H: HostConfig>(state: &mut RootState<H>) -> FiberId {
    state.finished_work = None;
    state.tree.begin_pass();
    state
        .tree
        .create_work_in_progress(state.current, FiberProps::Root)
}

fn work_loop<H: HostConfig>(
    state: &mut RootState<H>,
    wip_root: FiberId,
    scheduler: &Weak<dyn ScheduleUpdate>,
) -> Result<(), RenderError> {
    let mut work_in_progress = Some(wip_root);
    while let Some(fiber) = work_in_progress {
        work_in_progress = perform_unit_of_work(state, fiber, wip_root, scheduler)?;
    }
    Ok(())
}

fn perform_unit_of_work<H: HostConfig>(
    state: &mut RootState<H>,
    fiber: FiberId,
    wip_root: FiberId,
    scheduler: &Weak<dyn ScheduleUpdate>,
) -> Result<Option<FiberId>, RenderError> {
    let next = begin_work(&mut state.tree, fiber, scheduler)?;
    let pending_props = state.tree[fiber].pending_props.clone();
    state.tree[fiber].memoized_props = Some(pending_props);

    Ok(match next {
        Some(child) => Some(child),
        None => complete_unit_of_work(state, fiber, wip_root),
    })
}

/// Complete `fiber` and its ancestors until one has an unvisited sibling.
fn complete_unit_of_work<H: HostConfig>(
    state: &mut RootState<H>,
    fiber: FiberId,
    wip_root: FiberId,
) -> Option<FiberId> {
    let mut node = fiber;
    loop {
        complete_work(&mut state.tree, &mut state.host, node);
        if node == wip_root {
            return None;
        }
        if let Some(sibling) = state.tree[node].sibling {
            return Some(sibling);
        }
        node = state.tree[node].return_fiber?;
    }
}

fn commit_root<H: HostConfig>(state: &mut RootState<H>, label: &str) {
    let Some(finished_work) = state.finished_work.take() else {
        return;
    };

    let flags = state.tree[finished_work].aggregate_flags();
    let summary = if flags.has_mutation() {
        log::debug!("[commit] {}: start ({:?})", label, flags);
        commit_mutation_effects(&mut state.tree, &mut state.host, finished_work)
    } else {
        CommitSummary::default()
    };

    state.current = finished_work;
    state.last_commit = summary;
    state.tree.finish_pass();
    log::debug!(
        "[commit] {}: {} placed, {} updated, {} deleted ({} fibers live)",
        label,
        summary.placements,
        summary.updates,
        summary.deletions,
        state.tree.len()
    );
}
