//! MemoryHost - An in-memory host tree that logs every mutation.
//!
//! Nodes are shared handles (`Rc<RefCell<..>>`), compared by identity.
//! Every [`HostConfig`] call appends a [`HostOp`], so callers can assert on
//! exactly what a commit did, and [`MemoryHost::to_markup`] renders the
//! container for quick structural checks.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::HostConfig;
use crate::primitives::{PropValue, Props};

// =============================================================================
// Nodes
// =============================================================================

/// What a host node is.
#[derive(Clone, Debug, PartialEq)]
pub enum MemoryNodeKind {
    Container,
    Element {
        tag: Rc<str>,
        attributes: Vec<(String, PropValue)>,
    },
    Text(String),
}

struct NodeData {
    id: usize,
    kind: MemoryNodeKind,
    children: Vec<MemoryNode>,
    parent: Weak<RefCell<NodeData>>,
}

/// Handle to one node of the in-memory tree.
#[derive(Clone)]
pub struct MemoryNode(Rc<RefCell<NodeData>>);

impl MemoryNode {
    fn new(id: usize, kind: MemoryNodeKind) -> Self {
        Self(Rc::new(RefCell::new(NodeData {
            id,
            kind,
            children: Vec::new(),
            parent: Weak::new(),
        })))
    }

    /// Creation order; the container is 0.
    pub fn id(&self) -> usize {
        self.0.borrow().id
    }

    pub fn kind(&self) -> MemoryNodeKind {
        self.0.borrow().kind.clone()
    }

    /// Element tag, if this is an element.
    pub fn tag(&self) -> Option<Rc<str>> {
        match &self.0.borrow().kind {
            MemoryNodeKind::Element { tag, .. } => Some(tag.clone()),
            _ => None,
        }
    }

    /// Text content, if this is a text node.
    pub fn text(&self) -> Option<String> {
        match &self.0.borrow().kind {
            MemoryNodeKind::Text(content) => Some(content.clone()),
            _ => None,
        }
    }

    pub fn children(&self) -> Vec<MemoryNode> {
        self.0.borrow().children.clone()
    }

    pub fn parent(&self) -> Option<MemoryNode> {
        self.0.borrow().parent.upgrade().map(MemoryNode)
    }

    /// Serialize this node and its descendants.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    fn write_markup(&self, out: &mut String) {
        let data = self.0.borrow();
        match &data.kind {
            MemoryNodeKind::Container => {
                for child in &data.children {
                    child.write_markup(out);
                }
            }
            MemoryNodeKind::Text(content) => out.push_str(content),
            MemoryNodeKind::Element { tag, attributes } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    match value {
                        PropValue::Bool(false) => {}
                        PropValue::Bool(true) => {
                            out.push(' ');
                            out.push_str(name);
                        }
                        PropValue::Str(text) => out.push_str(&format!(" {}=\"{}\"", name, text)),
                        PropValue::Number(n) => out.push_str(&format!(" {}=\"{}\"", name, n)),
                    }
                }
                out.push('>');
                for child in &data.children {
                    child.write_markup(out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    /// Unlink from the current parent, if any.
    fn detach(&self) {
        let parent = self.0.borrow().parent.upgrade();
        if let Some(parent) = parent {
            parent
                .borrow_mut()
                .children
                .retain(|child| !Rc::ptr_eq(&child.0, &self.0));
        }
        self.0.borrow_mut().parent = Weak::new();
    }

    fn append(&self, child: &MemoryNode) {
        child.detach();
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        self.0.borrow_mut().children.push(child.clone());
    }
}

impl PartialEq for MemoryNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for MemoryNode {}

impl fmt::Debug for MemoryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        match &data.kind {
            MemoryNodeKind::Container => write!(f, "#{} container", data.id),
            MemoryNodeKind::Element { tag, .. } => write!(f, "#{} <{}>", data.id, tag),
            MemoryNodeKind::Text(content) => write!(f, "#{} {:?}", data.id, content),
        }
    }
}

// =============================================================================
// Operation log
// =============================================================================

/// One recorded host call. Node references are ids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostOp {
    CreateInstance { id: usize, tag: String },
    CreateTextInstance { id: usize, content: String },
    AppendInitialChild { parent: usize, child: usize },
    AppendToContainer { parent: usize, child: usize },
    RemoveChild { parent: usize, child: usize },
    CommitTextUpdate { id: usize, content: String },
}

impl HostOp {
    /// True for calls that change the attached tree.
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            HostOp::CreateInstance { .. } | HostOp::CreateTextInstance { .. }
        )
    }
}

// =============================================================================
// MemoryHost
// =============================================================================

/// Host backed by [`MemoryNode`]s.
pub struct MemoryHost {
    container: MemoryNode,
    next_id: usize,
    ops: Vec<HostOp>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            container: MemoryNode::new(0, MemoryNodeKind::Container),
            next_id: 1,
            ops: Vec::new(),
        }
    }

    /// The container node to mount into.
    pub fn container(&self) -> MemoryNode {
        self.container.clone()
    }

    pub fn ops(&self) -> &[HostOp] {
        &self.ops
    }

    /// Return and clear the operation log.
    pub fn take_ops(&mut self) -> Vec<HostOp> {
        std::mem::take(&mut self.ops)
    }

    /// Markup of everything under the container.
    pub fn to_markup(&self) -> String {
        self.container.to_markup()
    }

    fn allocate(&mut self, kind: MemoryNodeKind) -> MemoryNode {
        let node = MemoryNode::new(self.next_id, kind);
        self.next_id += 1;
        node
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostConfig for MemoryHost {
    type Instance = MemoryNode;

    fn create_instance(&mut self, tag: &str, props: &Props) -> MemoryNode {
        let attributes = props
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        let node = self.allocate(MemoryNodeKind::Element {
            tag: tag.into(),
            attributes,
        });
        self.ops.push(HostOp::CreateInstance {
            id: node.id(),
            tag: tag.to_string(),
        });
        node
    }

    fn create_text_instance(&mut self, content: &str) -> MemoryNode {
        let node = self.allocate(MemoryNodeKind::Text(content.to_string()));
        self.ops.push(HostOp::CreateTextInstance {
            id: node.id(),
            content: content.to_string(),
        });
        node
    }

    fn append_initial_child(&mut self, parent: &MemoryNode, child: &MemoryNode) {
        parent.append(child);
        self.ops.push(HostOp::AppendInitialChild {
            parent: parent.id(),
            child: child.id(),
        });
    }

    fn append_to_container(&mut self, container: &MemoryNode, child: &MemoryNode) {
        container.append(child);
        self.ops.push(HostOp::AppendToContainer {
            parent: container.id(),
            child: child.id(),
        });
    }

    fn remove_child(&mut self, child: &MemoryNode, container: &MemoryNode) {
        if child.parent().as_ref() != Some(container) {
            log::warn!(
                "[host] remove_child: {:?} is not a child of {:?}",
                child,
                container
            );
        }
        child.detach();
        self.ops.push(HostOp::RemoveChild {
            parent: container.id(),
            child: child.id(),
        });
    }

    fn commit_text_update(&mut self, text: &MemoryNode, content: &str) {
        if let MemoryNodeKind::Text(current) = &mut text.0.borrow_mut().kind {
            *current = content.to_string();
        }
        self.ops.push(HostOp::CommitTextUpdate {
            id: text.id(),
            content: content.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_and_render_markup() {
        let mut host = MemoryHost::new();
        let props = {
            let mut props = Props::new();
            props.set("id", "main");
            props.set("hidden", false);
            props
        };
        let div = host.create_instance("div", &props);
        let text = host.create_text_instance("hi");
        host.append_initial_child(&div, &text);
        let container = host.container();
        host.append_to_container(&container, &div);

        assert_eq!(host.to_markup(), "<div id=\"main\">hi</div>");
        assert_eq!(text.parent(), Some(div.clone()));
        assert_eq!(
            host.ops().iter().filter(|op| op.is_mutation()).count(),
            2
        );
    }

    #[test]
    fn test_append_moves_existing_child() {
        let mut host = MemoryHost::new();
        let a = host.create_instance("a", &Props::new());
        let b = host.create_instance("b", &Props::new());
        let text = host.create_text_instance("x");
        host.append_initial_child(&a, &text);
        host.append_initial_child(&b, &text);

        assert!(a.children().is_empty());
        assert_eq!(b.children(), vec![text]);
    }

    #[test]
    fn test_remove_and_text_update() {
        let mut host = MemoryHost::new();
        let container = host.container();
        let text = host.create_text_instance("100");
        host.append_to_container(&container, &text);
        host.commit_text_update(&text, "1");
        assert_eq!(host.to_markup(), "1");

        host.remove_child(&text, &container);
        assert_eq!(host.to_markup(), "");
        assert_eq!(
            host.take_ops().last(),
            Some(&HostOp::RemoveChild {
                parent: 0,
                child: text.id()
            })
        );
        assert!(host.ops().is_empty());
    }
}
