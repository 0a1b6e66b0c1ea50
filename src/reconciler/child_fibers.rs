//! Child Fibers - Single-child diff between a description and the current tree.
//!
//! Given a work-in-progress parent, its current first child and the new
//! `children` value, decide whether to reuse, replace or delete.
//!
//! Two modes:
//! - [`ChildReconciler::UPDATE`] tracks effects: staged deletions and
//!   `PLACEMENT` on newly created fibers.
//! - [`ChildReconciler::MOUNT`] builds a fresh subtree. Nothing is flagged;
//!   the subtree is attached as a whole by its placed ancestor.

use std::rc::Rc;

use crate::engine::{FiberId, FiberProps, FiberTree};
use crate::primitives::{Element, Node};
use crate::types::{Flags, WorkTag};

#[derive(Clone, Copy, Debug)]
pub(crate) struct ChildReconciler {
    track_effects: bool,
}

impl ChildReconciler {
    pub(crate) const MOUNT: Self = Self {
        track_effects: false,
    };
    pub(crate) const UPDATE: Self = Self {
        track_effects: true,
    };

    /// Reconcile `new_child` against `current_first_child`, returning the new
    /// first child of `return_fiber` (if any).
    pub(crate) fn reconcile_child_fibers<I: Clone>(
        self,
        tree: &mut FiberTree<I>,
        return_fiber: FiberId,
        current_first_child: Option<FiberId>,
        new_child: &Node,
    ) -> Option<FiberId> {
        match new_child {
            Node::Element(element) => {
                let fiber =
                    self.reconcile_single_element(tree, return_fiber, current_first_child, element);
                Some(self.place_single_child(tree, fiber))
            }
            Node::Text(content) => {
                let fiber = self.reconcile_single_text_node(
                    tree,
                    return_fiber,
                    current_first_child,
                    content,
                );
                Some(self.place_single_child(tree, fiber))
            }
            Node::Empty => {
                if let Some(current) = current_first_child {
                    self.delete_child(tree, return_fiber, current);
                }
                None
            }
            Node::List(children) => {
                log::warn!(
                    "[begin] `{}`: multi-child lists are not reconciled ({} children dropped)",
                    tree[return_fiber].display_name(),
                    children.len()
                );
                if let Some(current) = current_first_child {
                    self.delete_child(tree, return_fiber, current);
                }
                None
            }
        }
    }

    /// Stage `child` for removal at commit.
    fn delete_child<I: Clone>(self, tree: &mut FiberTree<I>, return_fiber: FiberId, child: FiberId) {
        if !self.track_effects {
            return;
        }
        log::trace!(
            "[begin] stage deletion of `{}` under `{}`",
            tree[child].display_name(),
            tree[return_fiber].display_name()
        );
        let parent = &mut tree[return_fiber];
        parent.deletions.push(child);
        parent.flags |= Flags::CHILD_DELETION;
    }

    fn reconcile_single_element<I: Clone>(
        self,
        tree: &mut FiberTree<I>,
        return_fiber: FiberId,
        current_first_child: Option<FiberId>,
        element: &Rc<Element>,
    ) -> FiberId {
        if let Some(current) = current_first_child {
            let fiber = &tree[current];
            let same_key = fiber.key == element.key;
            let same_type = fiber.element_type.as_ref() == Some(&element.element_type);
            if same_key && same_type {
                let existing = use_fiber(tree, current, FiberProps::Element(element.props.clone()));
                tree[existing].return_fiber = Some(return_fiber);
                return existing;
            }
            self.delete_child(tree, return_fiber, current);
        }

        let fiber = tree.create_fiber_from_element(element);
        tree[fiber].return_fiber = Some(return_fiber);
        fiber
    }

    /// Text children match on tag alone; keys are ignored.
    fn reconcile_single_text_node<I: Clone>(
        self,
        tree: &mut FiberTree<I>,
        return_fiber: FiberId,
        current_first_child: Option<FiberId>,
        content: &Rc<str>,
    ) -> FiberId {
        if let Some(current) = current_first_child {
            if tree[current].tag == WorkTag::Text {
                let existing = use_fiber(tree, current, FiberProps::Text(content.clone()));
                tree[existing].return_fiber = Some(return_fiber);
                return existing;
            }
            self.delete_child(tree, return_fiber, current);
        }

        let fiber = tree.create_fiber_from_text(content);
        tree[fiber].return_fiber = Some(return_fiber);
        fiber
    }

    /// Flag a fiber with no counterpart for insertion.
    fn place_single_child<I: Clone>(self, tree: &mut FiberTree<I>, fiber: FiberId) -> FiberId {
        if self.track_effects && tree[fiber].alternate.is_none() {
            tree[fiber].flags |= Flags::PLACEMENT;
        }
        fiber
    }
}

/// Clone-reuse `fiber` as the only child of its new parent.
fn use_fiber<I: Clone>(tree: &mut FiberTree<I>, fiber: FiberId, pending_props: FiberProps) -> FiberId {
    let clone = tree.create_work_in_progress(fiber, pending_props);
    let clone_fiber = &mut tree[clone];
    clone_fiber.index = 0;
    clone_fiber.sibling = None;
    clone
}
