//! Update Queue - Pending actions and the fold that turns them into state.
//!
//! Every state container (a hook slot, or the root's top-level description)
//! owns one queue. Dispatching appends an [`Update`] in O(1); the next render
//! drains the whole list at once with [`process_update_queue`].
//!
//! # Folding rules
//!
//! Updates apply in enqueue order:
//! - `Action::Reduce(f)` - `state = f(state)`
//! - `Action::Replace(v)` - `state = v`, discarding whatever came before
//!
//! So functions compose, and the last literal wins over earlier work.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

// =============================================================================
// Action / Update
// =============================================================================

/// A requested state change.
pub enum Action<S> {
    /// Literal next state.
    Replace(S),
    /// Pure function from previous state to next state.
    Reduce(Box<dyn FnOnce(S) -> S>),
}

impl<S> Action<S> {
    /// Wrap a reducer closure.
    pub fn reduce(f: impl FnOnce(S) -> S + 'static) -> Self {
        Action::Reduce(Box::new(f))
    }

    fn apply(self, state: S) -> S {
        match self {
            Action::Replace(next) => next,
            Action::Reduce(f) => f(state),
        }
    }
}

impl<S> From<S> for Action<S> {
    fn from(value: S) -> Self {
        Action::Replace(value)
    }
}

impl<S: fmt::Debug> fmt::Debug for Action<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Replace(value) => f.debug_tuple("Replace").field(value).finish(),
            Action::Reduce(_) => f.write_str("Reduce(..)"),
        }
    }
}

/// One entry in a pending list.
pub struct Update<S> {
    pub action: Action<S>,
}

impl<S> Update<S> {
    pub fn new(action: impl Into<Action<S>>) -> Self {
        Self {
            action: action.into(),
        }
    }
}

// =============================================================================
// Pending List (circular)
// =============================================================================

struct PendingNode<S> {
    update: Option<Update<S>>,
    next: usize,
}

/// Circular singly-linked list of updates, addressed by index.
///
/// `last` points at the most recently enqueued node; `nodes[last].next`
/// is the oldest. Enqueue is O(1), a drain visits each node once.
pub struct PendingList<S> {
    nodes: Vec<PendingNode<S>>,
    last: Option<usize>,
}

impl<S> PendingList<S> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            last: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_none()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Append after `last`, closing the ring back to the oldest node.
    pub fn push(&mut self, update: Update<S>) {
        let index = self.nodes.len();
        let next = match self.last {
            None => index,
            Some(last) => {
                let first = self.nodes[last].next;
                self.nodes[last].next = index;
                first
            }
        };
        self.nodes.push(PendingNode {
            update: Some(update),
            next,
        });
        self.last = Some(index);
    }

    /// Consume the list, yielding updates oldest first.
    pub fn drain(mut self) -> impl Iterator<Item = Update<S>> {
        let mut drained = Vec::with_capacity(self.nodes.len());
        if let Some(last) = self.last {
            let mut cursor = self.nodes[last].next;
            loop {
                if let Some(update) = self.nodes[cursor].update.take() {
                    drained.push(update);
                }
                if cursor == last {
                    break;
                }
                cursor = self.nodes[cursor].next;
            }
        }
        drained.into_iter()
    }
}

impl<S> Default for PendingList<S> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Update Queue
// =============================================================================

/// Per-container queue of pending updates.
pub struct UpdateQueue<S> {
    pending: PendingList<S>,
}

/// Queue shared between the two fiber generations of one container.
pub type SharedQueue<S> = Rc<RefCell<UpdateQueue<S>>>;

impl<S> UpdateQueue<S> {
    pub fn new() -> Self {
        Self {
            pending: PendingList::new(),
        }
    }

    /// Append an update. O(1).
    pub fn enqueue(&mut self, update: Update<S>) {
        self.pending.push(update);
    }

    /// Detach the whole pending list, leaving the queue empty.
    pub fn take_pending(&mut self) -> PendingList<S> {
        std::mem::take(&mut self.pending)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

impl<S> Default for UpdateQueue<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for UpdateQueue<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateQueue")
            .field("pending", &self.pending.len())
            .finish()
    }
}

/// Create a fresh shared queue.
pub fn create_update_queue<S>() -> SharedQueue<S> {
    Rc::new(RefCell::new(UpdateQueue::new()))
}

/// Append an update to a shared queue.
pub fn enqueue_update<S>(queue: &SharedQueue<S>, update: Update<S>) {
    queue.borrow_mut().enqueue(update);
}

/// Fold a pending list over `base_state`.
///
/// Returns `base_state` untouched when the list is empty.
pub fn process_update_queue<S>(base_state: S, pending: PendingList<S>) -> S {
    pending
        .drain()
        .fold(base_state, |state, update| update.action.apply(state))
}
