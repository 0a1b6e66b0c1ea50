//! Commit - Apply a finished tree's mutations to the host.
//!
//! The walk is iterative: descend into a child only while the fiber's
//! `subtree_flags` report pending mutations, commit each visited fiber's own
//! flags on the way back up, then move to the sibling. Clean subtrees are
//! never entered.
//!
//! Per fiber the order is fixed: Placement, Update, ChildDeletion. Each flag
//! is cleared as soon as its effect has been applied.

use crate::engine::{Fiber, FiberId, FiberTree};
use crate::host::HostConfig;
use crate::types::{Flags, WorkTag};

/// What one commit did to the host tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitSummary {
    /// Fibers whose host node was inserted.
    pub placements: usize,
    /// Text nodes patched in place.
    pub updates: usize,
    /// Subtrees removed.
    pub deletions: usize,
    /// Fibers released from the arena with those subtrees.
    pub released_fibers: usize,
}

impl CommitSummary {
    pub fn is_empty(&self) -> bool {
        self.placements == 0 && self.updates == 0 && self.deletions == 0
    }
}

pub(crate) fn commit_mutation_effects<H: HostConfig>(
    tree: &mut FiberTree<H::Instance>,
    host: &mut H,
    finished_work: FiberId,
) -> CommitSummary {
    let mut summary = CommitSummary::default();
    let mut next_effect = Some(finished_work);

    while let Some(id) = next_effect {
        let fiber = &tree[id];
        if let Some(child) = fiber.child.filter(|_| fiber.subtree_flags.has_mutation()) {
            next_effect = Some(child);
            continue;
        }

        let mut node = id;
        next_effect = loop {
            commit_mutation_effects_on_fiber(tree, host, node, &mut summary);
            if node == finished_work {
                break None;
            }
            if let Some(sibling) = tree[node].sibling {
                break Some(sibling);
            }
            match tree[node].return_fiber {
                Some(parent) => node = parent,
                None => break None,
            }
        };
    }

    summary
}

fn commit_mutation_effects_on_fiber<H: HostConfig>(
    tree: &mut FiberTree<H::Instance>,
    host: &mut H,
    finished_work: FiberId,
    summary: &mut CommitSummary,
) {
    let flags = tree[finished_work].flags;

    if flags.contains(Flags::PLACEMENT) {
        commit_placement(tree, host, finished_work);
        tree[finished_work].flags.remove(Flags::PLACEMENT);
        summary.placements += 1;
    }

    if flags.contains(Flags::UPDATE) {
        if commit_update(tree, host, finished_work) {
            summary.updates += 1;
        }
        tree[finished_work].flags.remove(Flags::UPDATE);
    }

    if flags.contains(Flags::CHILD_DELETION) {
        let deletions = std::mem::take(&mut tree[finished_work].deletions);
        for child_to_delete in deletions {
            summary.released_fibers += commit_deletion(tree, host, child_to_delete);
            summary.deletions += 1;
        }
        tree[finished_work].flags.remove(Flags::CHILD_DELETION);
    }

    // Children are done by the time a fiber is visited here.
    tree[finished_work].subtree_flags.remove(Flags::MUTATION_MASK);
}

// =============================================================================
// Placement
// =============================================================================

fn commit_placement<H: HostConfig>(
    tree: &FiberTree<H::Instance>,
    host: &mut H,
    finished_work: FiberId,
) {
    log::trace!("[commit] place `{}`", tree[finished_work].display_name());
    if let Some(host_parent) = get_host_parent(tree, finished_work) {
        append_placement_node_into_container(tree, host, finished_work, &host_parent);
    }
}

/// Nearest ancestor that owns a host node able to take children.
fn get_host_parent<I: Clone>(tree: &FiberTree<I>, fiber: FiberId) -> Option<I> {
    let mut parent = tree[fiber].return_fiber;
    while let Some(id) = parent {
        let parent_fiber = tree.get(id)?;
        if parent_fiber.tag.is_host_parent() {
            return parent_fiber.state_node.clone();
        }
        parent = parent_fiber.return_fiber;
    }
    log::warn!(
        "[commit] no host parent found for `{}`",
        tree[fiber].display_name()
    );
    None
}

/// Insert the host node of `fiber`, or of its children if it has none.
fn append_placement_node_into_container<H: HostConfig>(
    tree: &FiberTree<H::Instance>,
    host: &mut H,
    fiber: FiberId,
    host_parent: &H::Instance,
) {
    let node = &tree[fiber];
    if node.tag.is_host() {
        if let Some(instance) = &node.state_node {
            host.append_to_container(host_parent, instance);
        }
        return;
    }
    for child in tree.children(fiber) {
        append_placement_node_into_container(tree, host, child, host_parent);
    }
}

// =============================================================================
// Update
// =============================================================================

fn commit_update<H: HostConfig>(
    tree: &FiberTree<H::Instance>,
    host: &mut H,
    finished_work: FiberId,
) -> bool {
    let fiber = &tree[finished_work];
    match (fiber.tag, &fiber.state_node) {
        (WorkTag::Text, Some(instance)) => {
            let content = fiber
                .memoized_props
                .as_ref()
                .and_then(|props| props.text())
                .unwrap_or_default();
            log::trace!("[commit] text update {:?}", content);
            host.commit_text_update(instance, content);
            true
        }
        _ => {
            log::warn!(
                "[commit] unimplemented update for `{}` ({:?})",
                fiber.display_name(),
                fiber.tag
            );
            false
        }
    }
}

// =============================================================================
// Deletion
// =============================================================================

/// Unmount a subtree, detach its top host nodes and release its fibers.
///
/// Returns the number of fibers released from the arena.
fn commit_deletion<H: HostConfig>(
    tree: &mut FiberTree<H::Instance>,
    host: &mut H,
    child_to_delete: FiberId,
) -> usize {
    if !tree.contains(child_to_delete) {
        return 0;
    }

    let mut root_host_nodes = Vec::new();
    commit_nested_unmounts(tree, child_to_delete, |fiber, under_host| {
        if fiber.tag.is_host() && !under_host {
            if let Some(instance) = &fiber.state_node {
                root_host_nodes.push(instance.clone());
            }
        }
    });

    if !root_host_nodes.is_empty() {
        if let Some(host_parent) = get_host_parent(tree, child_to_delete) {
            for instance in &root_host_nodes {
                host.remove_child(instance, &host_parent);
            }
        }
    }

    tree[child_to_delete].return_fiber = None;
    let released = tree.release_subtree(child_to_delete);
    log::trace!("[commit] released {} fibers", released);
    released
}

/// Visit every fiber of the subtree once, pre-order.
///
/// The callback also learns whether a host node sits between the fiber and
/// the deleted root.
fn commit_nested_unmounts<I: Clone>(
    tree: &FiberTree<I>,
    root: FiberId,
    mut on_unmount: impl FnMut(&Fiber<I>, bool),
) {
    let mut stack = vec![(root, false)];
    while let Some((id, under_host)) = stack.pop() {
        let Some(fiber) = tree.get(id) else {
            continue;
        };
        match fiber.tag {
            WorkTag::HostElement | WorkTag::Text | WorkTag::FunctionComponent => {
                log::trace!("[commit] unmount `{}`", fiber.display_name());
            }
            WorkTag::Root => {
                log::warn!("[commit] unexpected root fiber inside a deleted subtree");
            }
        }
        on_unmount(fiber, under_host);

        let below_host = under_host || fiber.tag.is_host();
        let children: Vec<FiberId> = tree.children(id).collect();
        stack.extend(children.into_iter().rev().map(|child| (child, below_host)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FiberProps;
    use crate::host::{HostOp, MemoryHost, MemoryNode};
    use crate::primitives::{Component, Element, Node};
    use crate::state::create_update_queue;

    fn link(tree: &mut FiberTree<MemoryNode>, parent: FiberId, child: FiberId) {
        tree[parent].child = Some(child);
        tree[child].return_fiber = Some(parent);
    }

    fn root(tree: &mut FiberTree<MemoryNode>, host: &MemoryHost) -> FiberId {
        tree.create_host_root(host.container(), create_update_queue())
    }

    #[test]
    fn test_placement_through_component() {
        let component = Component::new("App", |_| Ok(Node::Empty));
        let mut host = MemoryHost::new();
        let mut tree = FiberTree::new();
        let root = root(&mut tree, &host);

        let app = tree.create_fiber_from_element(&Element::component(&component));
        let div = tree.create_fiber_from_element(&Element::host("div"));
        link(&mut tree, root, app);
        link(&mut tree, app, div);
        let instance = host.create_instance("div", &Default::default());
        tree[div].state_node = Some(instance);
        tree[app].flags = Flags::PLACEMENT;
        tree[root].subtree_flags = Flags::PLACEMENT;

        let summary = commit_mutation_effects(&mut tree, &mut host, root);
        assert_eq!(summary.placements, 1);
        assert_eq!(host.to_markup(), "<div></div>");
        assert_eq!(tree[app].flags, Flags::NONE);
        assert_eq!(tree[root].subtree_flags, Flags::NONE);
    }

    #[test]
    fn test_clean_subtree_is_not_entered() {
        let mut host = MemoryHost::new();
        let mut tree = FiberTree::new();
        let root = root(&mut tree, &host);
        let div = tree.create_fiber_from_element(&Element::host("div"));
        let text = tree.create_fiber_from_text(&"x".into());
        link(&mut tree, root, div);
        link(&mut tree, div, text);
        // Stale bit below a clean subtree must not be applied.
        tree[text].flags = Flags::UPDATE;

        let summary = commit_mutation_effects(&mut tree, &mut host, root);
        assert!(summary.is_empty());
        assert!(host.ops().is_empty());
        assert_eq!(tree[text].flags, Flags::UPDATE);
    }

    #[test]
    fn test_text_update_uses_memoized_props() {
        let mut host = MemoryHost::new();
        let mut tree = FiberTree::new();
        let root = root(&mut tree, &host);
        let text = tree.create_fiber_from_text(&"100".into());
        link(&mut tree, root, text);
        let instance = host.create_text_instance("100");
        let container = host.container();
        host.append_to_container(&container, &instance);
        tree[text].state_node = Some(instance);
        tree[text].memoized_props = Some(FiberProps::Text("1".into()));
        tree[text].flags = Flags::UPDATE;
        tree[root].subtree_flags = Flags::UPDATE;
        host.take_ops();

        let summary = commit_mutation_effects(&mut tree, &mut host, root);
        assert_eq!(summary.updates, 1);
        assert_eq!(host.to_markup(), "1");
        assert_eq!(
            host.ops(),
            &[HostOp::CommitTextUpdate {
                id: 1,
                content: "1".into()
            }]
        );
    }

    #[test]
    fn test_deletion_removes_top_host_node_and_releases() {
        let component = Component::new("Old", |_| Ok(Node::Empty));
        let mut host = MemoryHost::new();
        let mut tree = FiberTree::new();
        let root = root(&mut tree, &host);

        let old = tree.create_fiber_from_element(&Element::component(&component));
        let span = tree.create_fiber_from_element(&Element::host("span"));
        let text = tree.create_fiber_from_text(&"bye".into());
        link(&mut tree, old, span);
        link(&mut tree, span, text);
        tree[old].return_fiber = Some(root);

        let span_node = host.create_instance("span", &Default::default());
        let text_node = host.create_text_instance("bye");
        host.append_initial_child(&span_node, &text_node);
        let container = host.container();
        host.append_to_container(&container, &span_node);
        tree[span].state_node = Some(span_node);
        tree[text].state_node = Some(text_node);
        host.take_ops();

        tree[root].deletions.push(old);
        tree[root].flags = Flags::CHILD_DELETION;

        let summary = commit_mutation_effects(&mut tree, &mut host, root);
        assert_eq!(summary.deletions, 1);
        assert_eq!(summary.released_fibers, 3);
        assert_eq!(host.to_markup(), "");
        assert_eq!(
            host.ops().len(),
            1,
            "only the top host node is detached: {:?}",
            host.ops()
        );
        assert!(!tree.contains(old) && !tree.contains(span) && !tree.contains(text));
        assert!(tree[root].deletions.is_empty());
        assert_eq!(tree[root].flags, Flags::NONE);
    }
}
