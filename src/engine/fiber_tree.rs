//! Fiber Tree - Arena storage and the double-buffer discipline.
//!
//! Both generations (current and work-in-progress) live in one arena.
//! Counterparts are paired through `alternate`, symmetric and created lazily
//! the first time a current fiber is cloned.
//!
//! # Lifetime
//!
//! - Fibers are inserted during the begin phase (fresh mount or first clone).
//! - Fibers created by a pass that later aborts are released by
//!   [`FiberTree::discard_pass`].
//! - Deleted subtrees (and their alternates) are released at commit by
//!   [`FiberTree::release_subtree`]. That is the only other destruction point.

use std::ops::{Index, IndexMut};

use slotmap::SlotMap;

use super::fiber::{Fiber, FiberId, FiberProps};
use crate::primitives::{Element, ElementType, Node};
use crate::state::SharedQueue;
use crate::types::{Flags, WorkTag};

/// Arena of fibers for one root.
pub struct FiberTree<I> {
    fibers: SlotMap<FiberId, Fiber<I>>,
    /// Fibers inserted since the current pass started.
    created_this_pass: Vec<FiberId>,
}

impl<I: Clone> FiberTree<I> {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self {
            fibers: SlotMap::with_key(),
            created_this_pass: Vec::new(),
        }
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn get(&self, id: FiberId) -> Option<&Fiber<I>> {
        self.fibers.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: FiberId) -> Option<&mut Fiber<I>> {
        self.fibers.get_mut(id)
    }

    pub fn contains(&self, id: FiberId) -> bool {
        self.fibers.contains_key(id)
    }

    /// Number of fibers alive across both generations.
    pub fn len(&self) -> usize {
        self.fibers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fibers.is_empty()
    }

    /// Direct children of `id`, first child then its siblings.
    pub fn children(&self, id: FiberId) -> impl Iterator<Item = FiberId> + '_ {
        let first = self.get(id).and_then(|fiber| fiber.child);
        std::iter::successors(first, |&child| self.get(child).and_then(|f| f.sibling))
    }

    /// Pre-order walk of the subtree rooted at `id` (not its siblings).
    pub fn subtree(&self, id: FiberId) -> Vec<FiberId> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            if !self.contains(node) {
                continue;
            }
            order.push(node);
            let children: Vec<FiberId> = self.children(node).collect();
            stack.extend(children.into_iter().rev());
        }
        order
    }

    // =========================================================================
    // Creation
    // =========================================================================

    fn insert(&mut self, fiber: Fiber<I>) -> FiberId {
        let id = self.fibers.insert(fiber);
        self.created_this_pass.push(id);
        id
    }

    /// Create the root fiber that owns `container` and the top-level queue.
    pub(crate) fn create_host_root(&mut self, container: I, queue: SharedQueue<Node>) -> FiberId {
        let mut fiber = Fiber::new(WorkTag::Root, FiberProps::Root, None);
        fiber.state_node = Some(container);
        fiber.update_queue = Some(queue);
        let id = self.fibers.insert(fiber);
        log::trace!("[fiber] created host root {:?}", id);
        id
    }

    /// Fiber for a freshly described element.
    pub(crate) fn create_fiber_from_element(&mut self, element: &Element) -> FiberId {
        let tag = match element.element_type {
            ElementType::Host(_) => WorkTag::HostElement,
            ElementType::Component(_) => WorkTag::FunctionComponent,
        };
        let mut fiber = Fiber::new(
            tag,
            FiberProps::Element(element.props.clone()),
            element.key.clone(),
        );
        fiber.element_type = Some(element.element_type.clone());
        self.insert(fiber)
    }

    /// Fiber for a text child.
    pub(crate) fn create_fiber_from_text(&mut self, content: &std::rc::Rc<str>) -> FiberId {
        self.insert(Fiber::new(
            WorkTag::Text,
            FiberProps::Text(content.clone()),
            None,
        ))
    }

    /// Clone `current` into its work-in-progress counterpart.
    ///
    /// Reuses the existing alternate when there is one, otherwise allocates it
    /// and links the pair. Either way the clone starts with no flags and no
    /// deletions, and shares `child`, state and queue with `current`.
    pub(crate) fn create_work_in_progress(
        &mut self,
        current: FiberId,
        pending_props: FiberProps,
    ) -> FiberId {
        let alternate = self[current]
            .alternate
            .filter(|&alternate| self.contains(alternate));

        let wip = match alternate {
            None => {
                let source = &self[current];
                let mut fiber = Fiber::new(source.tag, pending_props, source.key.clone());
                fiber.state_node = source.state_node.clone();
                fiber.alternate = Some(current);
                let id = self.insert(fiber);
                self[current].alternate = Some(id);
                id
            }
            Some(id) => {
                let fiber = &mut self[id];
                fiber.pending_props = pending_props;
                fiber.flags = Flags::NONE;
                fiber.subtree_flags = Flags::NONE;
                fiber.deletions.clear();
                id
            }
        };

        let source = &self[current];
        let element_type = source.element_type.clone();
        let update_queue = source.update_queue.clone();
        let child = source.child;
        let memoized_props = source.memoized_props.clone();
        let memoized_state = source.memoized_state.clone();

        let fiber = &mut self[wip];
        fiber.element_type = element_type;
        fiber.update_queue = update_queue;
        fiber.child = child;
        fiber.memoized_props = memoized_props;
        fiber.memoized_state = memoized_state;
        wip
    }

    // =========================================================================
    // Pass bookkeeping / release
    // =========================================================================

    /// Start tracking fibers created by a new render pass.
    pub(crate) fn begin_pass(&mut self) {
        self.created_this_pass.clear();
    }

    /// The pass committed; its fibers are now part of the tree.
    pub(crate) fn finish_pass(&mut self) {
        self.created_this_pass.clear();
    }

    /// Drop every fiber the aborted pass created and unpair their alternates.
    pub(crate) fn discard_pass(&mut self) -> usize {
        let created = std::mem::take(&mut self.created_this_pass);
        let mut released = 0;
        for id in created {
            let Some(fiber) = self.fibers.remove(id) else {
                continue;
            };
            released += 1;
            if let Some(counterpart) = fiber.alternate.and_then(|a| self.fibers.get_mut(a)) {
                if counterpart.alternate == Some(id) {
                    counterpart.alternate = None;
                }
            }
        }
        log::trace!("[fiber] discarded {} fibers from aborted pass", released);
        released
    }

    /// Release a detached subtree and the alternates of its fibers.
    pub(crate) fn release_subtree(&mut self, root: FiberId) -> usize {
        let mut released = 0;
        for id in self.subtree(root) {
            let Some(fiber) = self.fibers.remove(id) else {
                continue;
            };
            released += 1;
            if let Some(alternate) = fiber.alternate {
                if self.fibers.remove(alternate).is_some() {
                    released += 1;
                }
            }
        }
        released
    }
}

impl<I: Clone> Default for FiberTree<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> Index<FiberId> for FiberTree<I> {
    type Output = Fiber<I>;

    fn index(&self, id: FiberId) -> &Fiber<I> {
        &self.fibers[id]
    }
}

impl<I> IndexMut<FiberId> for FiberTree<I> {
    fn index_mut(&mut self, id: FiberId) -> &mut Fiber<I> {
        &mut self.fibers[id]
    }
}

impl<I> FiberTree<I> {
    /// Re-derive `subtree_flags` bottom-up without touching anything else.
    ///
    /// Used to check the bubbling invariant; the render path bubbles incrementally.
    pub fn collect_subtree_flags(&self, id: FiberId) -> Flags {
        let mut flags = Flags::NONE;
        let mut stack: Vec<FiberId> = Vec::new();
        let mut child = self.fibers.get(id).and_then(|f| f.child);
        while let Some(c) = child {
            stack.push(c);
            child = self.fibers.get(c).and_then(|f| f.sibling);
        }
        while let Some(node) = stack.pop() {
            let Some(fiber) = self.fibers.get(node) else {
                continue;
            };
            flags |= fiber.flags;
            let mut child = fiber.child;
            while let Some(c) = child {
                stack.push(c);
                child = self.fibers.get(c).and_then(|f| f.sibling);
            }
        }
        flags
    }
}
