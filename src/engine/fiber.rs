//! Fiber - The unit of work and the tree node.
//!
//! A fiber tracks one description instance across renders. Fibers live in a
//! [`FiberTree`](super::FiberTree) arena and point at each other by
//! [`FiberId`]: `child`/`sibling` form the owning structure, `return_fiber`
//! and `alternate` are non-owning back-references.

use std::rc::Rc;

use smallvec::SmallVec;

use crate::primitives::{ElementType, Node, Props};
use crate::state::{Hook, SharedQueue};
use crate::types::{Flags, Key, WorkTag};

slotmap::new_key_type! {
    /// Stable handle to a fiber in the arena.
    pub struct FiberId;
}

// =============================================================================
// Props / State carried by a fiber
// =============================================================================

/// Props a fiber renders with.
#[derive(Clone, Debug, PartialEq)]
pub enum FiberProps {
    /// Root fibers carry no props.
    Root,
    /// Host elements and components.
    Element(Rc<Props>),
    /// Text content.
    Text(Rc<str>),
}

impl FiberProps {
    /// Children value for host elements; empty otherwise.
    pub fn children(&self) -> Node {
        match self {
            FiberProps::Element(props) => props.children.clone(),
            _ => Node::Empty,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            FiberProps::Text(content) => Some(content),
            _ => None,
        }
    }
}

/// Tag-specific state kept between renders.
#[derive(Clone, Debug, Default)]
pub enum MemoizedState {
    #[default]
    None,
    /// Root: the last rendered top-level description.
    Element(Node),
    /// Function component: hook slots in call order.
    Hooks(Vec<Hook>),
}

impl MemoizedState {
    pub fn hooks(&self) -> &[Hook] {
        match self {
            MemoizedState::Hooks(hooks) => hooks,
            _ => &[],
        }
    }

    pub fn element(&self) -> Node {
        match self {
            MemoizedState::Element(node) => node.clone(),
            _ => Node::Empty,
        }
    }
}

// =============================================================================
// Fiber
// =============================================================================

/// One node of a fiber tree. `I` is the host instance handle type.
#[derive(Debug)]
pub struct Fiber<I> {
    pub tag: WorkTag,
    pub key: Option<Key>,
    /// Host tag or component. `None` for Root and Text.
    pub element_type: Option<ElementType>,

    pub pending_props: FiberProps,
    /// Props as of the last completed begin phase.
    pub memoized_props: Option<FiberProps>,
    pub memoized_state: MemoizedState,
    /// Root only: queue of top-level descriptions.
    pub update_queue: Option<SharedQueue<Node>>,

    /// Host instance (HostElement/Text) or container (Root).
    pub state_node: Option<I>,

    pub return_fiber: Option<FiberId>,
    pub child: Option<FiberId>,
    pub sibling: Option<FiberId>,
    pub index: usize,

    pub flags: Flags,
    pub subtree_flags: Flags,
    pub deletions: SmallVec<[FiberId; 2]>,

    pub alternate: Option<FiberId>,
}

impl<I> Fiber<I> {
    pub fn new(tag: WorkTag, pending_props: FiberProps, key: Option<Key>) -> Self {
        Self {
            tag,
            key,
            element_type: None,
            pending_props,
            memoized_props: None,
            memoized_state: MemoizedState::None,
            update_queue: None,
            state_node: None,
            return_fiber: None,
            child: None,
            sibling: None,
            index: 0,
            flags: Flags::NONE,
            subtree_flags: Flags::NONE,
            deletions: SmallVec::new(),
            alternate: None,
        }
    }

    /// Own flags plus everything bubbled up from descendants.
    #[inline]
    pub fn aggregate_flags(&self) -> Flags {
        self.flags | self.subtree_flags
    }

    /// Name for logs: host tag, component name, or the tag itself.
    pub fn display_name(&self) -> &str {
        match (&self.element_type, self.tag) {
            (Some(ty), _) => ty.name(),
            (None, WorkTag::Root) => "#root",
            (None, WorkTag::Text) => "#text",
            (None, _) => "#unknown",
        }
    }
}
