//! Complete Work - Bottom-up half of the render traversal.
//!
//! Materializes host instances for fibers that have none yet, marks text
//! fibers whose content changed, and bubbles flags to the parent.

use crate::engine::{FiberId, FiberProps, FiberTree};
use crate::host::HostConfig;
use crate::types::{Flags, WorkTag};

pub(crate) fn complete_work<H: HostConfig>(
    tree: &mut FiberTree<H::Instance>,
    host: &mut H,
    wip: FiberId,
) {
    let fiber = &tree[wip];
    let current = fiber.alternate.filter(|&current| tree.contains(current));
    let materialized = current.is_some() && fiber.state_node.is_some();
    let tag = fiber.tag;

    match tag {
        WorkTag::HostElement => {
            if !materialized {
                let type_name = fiber
                    .element_type
                    .as_ref()
                    .map_or("", |element_type| element_type.name())
                    .to_string();
                let props = match &fiber.pending_props {
                    FiberProps::Element(props) => props.clone(),
                    _ => Default::default(),
                };
                let instance = host.create_instance(&type_name, &props);
                append_all_children(tree, host, &instance, wip);
                log::trace!("[complete] created <{}> for {:?}", type_name, wip);
                tree[wip].state_node = Some(instance);
            }
        }
        WorkTag::Text => {
            let content = fiber.pending_props.text().unwrap_or_default().to_string();
            match current {
                Some(current) if materialized => {
                    let previous = tree[current].memoized_props.as_ref().and_then(|p| p.text());
                    if previous != Some(content.as_str()) {
                        log::trace!("[complete] text {:?} changed to {:?}", wip, content);
                        tree[wip].flags |= Flags::UPDATE;
                    }
                }
                _ => {
                    let instance = host.create_text_instance(&content);
                    tree[wip].state_node = Some(instance);
                }
            }
        }
        WorkTag::Root | WorkTag::FunctionComponent => {}
    }

    bubble_properties(tree, wip);
}

/// Attach the nearest host descendants of `wip` under `parent`.
///
/// Component fibers have no host node, so the walk looks through them.
fn append_all_children<H: HostConfig>(
    tree: &FiberTree<H::Instance>,
    host: &mut H,
    parent: &H::Instance,
    wip: FiberId,
) {
    let mut node = tree[wip].child;

    while let Some(id) = node {
        let fiber = &tree[id];
        if fiber.tag.is_host() {
            if let Some(instance) = &fiber.state_node {
                host.append_initial_child(parent, instance);
            }
        } else if let Some(child) = fiber.child {
            node = Some(child);
            continue;
        }

        // Climb until a sibling is found or we are back at `wip`.
        let mut climb = id;
        node = loop {
            if let Some(sibling) = tree[climb].sibling {
                break Some(sibling);
            }
            match tree[climb].return_fiber {
                Some(parent_fiber) if parent_fiber != wip => climb = parent_fiber,
                _ => break None,
            }
        };
    }
}

/// Recompute `subtree_flags` from the children and fix their return links.
fn bubble_properties<I: Clone>(tree: &mut FiberTree<I>, wip: FiberId) {
    let children: Vec<FiberId> = tree.children(wip).collect();
    let mut subtree_flags = Flags::NONE;
    for child in children {
        let fiber = &mut tree[child];
        subtree_flags |= fiber.aggregate_flags();
        fiber.return_fiber = Some(wip);
    }
    tree[wip].subtree_flags = subtree_flags;
}
