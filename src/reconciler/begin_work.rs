//! Begin Work - Top-down half of the render traversal.
//!
//! For each work-in-progress fiber, compute its next children and reconcile
//! them against the current tree. Returns the first child to descend into.

use std::rc::{Rc, Weak};

use super::child_fibers::ChildReconciler;
use crate::engine::{FiberId, FiberProps, FiberTree, MemoizedState};
use crate::error::RenderError;
use crate::primitives::{ElementType, Node, Props};
use crate::state::{ScheduleUpdate, process_update_queue, render_with_hooks};
use crate::types::WorkTag;

pub(crate) fn begin_work<I: Clone>(
    tree: &mut FiberTree<I>,
    wip: FiberId,
    scheduler: &Weak<dyn ScheduleUpdate>,
) -> Result<Option<FiberId>, RenderError> {
    log::trace!("[begin] {:?} `{}`", wip, tree[wip].display_name());

    match tree[wip].tag {
        WorkTag::Root => Ok(update_host_root(tree, wip)),
        WorkTag::HostElement => Ok(update_host_element(tree, wip)),
        WorkTag::FunctionComponent => update_function_component(tree, wip, scheduler),
        WorkTag::Text => Ok(None),
    }
}

/// Drain the top-level queue into `memoized_state` and reconcile its result.
fn update_host_root<I: Clone>(tree: &mut FiberTree<I>, wip: FiberId) -> Option<FiberId> {
    let fiber = &tree[wip];
    let base_state = fiber.memoized_state.element();
    let pending = fiber
        .update_queue
        .as_ref()
        .map(|queue| queue.borrow_mut().take_pending())
        .unwrap_or_default();

    let next_children = process_update_queue(base_state, pending);
    tree[wip].memoized_state = MemoizedState::Element(next_children.clone());
    reconcile_children(tree, wip, &next_children);
    tree[wip].child
}

fn update_host_element<I: Clone>(tree: &mut FiberTree<I>, wip: FiberId) -> Option<FiberId> {
    let next_children = tree[wip].pending_props.children();
    reconcile_children(tree, wip, &next_children);
    tree[wip].child
}

fn update_function_component<I: Clone>(
    tree: &mut FiberTree<I>,
    wip: FiberId,
    scheduler: &Weak<dyn ScheduleUpdate>,
) -> Result<Option<FiberId>, RenderError> {
    let fiber = &tree[wip];
    let Some(ElementType::Component(component)) = fiber.element_type.clone() else {
        log::warn!("[begin] function component fiber {:?} has no component", wip);
        return Ok(None);
    };
    let props = match &fiber.pending_props {
        FiberProps::Element(props) => props.clone(),
        _ => Rc::new(Props::default()),
    };
    let previous = fiber
        .alternate
        .and_then(|current| tree.get(current))
        .map(|current| current.memoized_state.hooks().to_vec());

    let (next_children, hooks) =
        render_with_hooks(wip, &component, &props, previous, scheduler.clone())?;
    tree[wip].memoized_state = MemoizedState::Hooks(hooks);
    reconcile_children(tree, wip, &next_children);
    Ok(tree[wip].child)
}

/// Diff against the alternate's child if there is one, otherwise mount.
fn reconcile_children<I: Clone>(tree: &mut FiberTree<I>, wip: FiberId, children: &Node) {
    let current_child = tree[wip]
        .alternate
        .and_then(|current| tree.get(current))
        .map(|current| current.child);

    let child = match current_child {
        Some(current_child) => {
            ChildReconciler::UPDATE.reconcile_child_fibers(tree, wip, current_child, children)
        }
        None => ChildReconciler::MOUNT.reconcile_child_fibers(tree, wip, None, children),
    };
    tree[wip].child = child;
}
