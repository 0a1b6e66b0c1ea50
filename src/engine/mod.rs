//! Reconciler Engine - Fiber nodes and the arena that owns them.
//!
//! The engine manages the core data structures:
//! - Fiber: one node of a render tree, tagged with a [`WorkTag`](crate::WorkTag)
//! - FiberTree: slot-map arena holding both tree generations
//!
//! # Architecture
//!
//! Fibers are NOT linked by pointers. They are keys into one arena:
//!
//! ```text
//! current                      work-in-progress
//! Root ──alternate──────────── Root'
//!  │ child                      │ child
//!  App ──alternate──────────── App'
//!  │ child                      │ child
//!  div ──alternate──────────── div'
//! ```
//!
//! `child`/`sibling` are the owning links, `return_fiber`/`alternate` are
//! back-references resolved by lookup, so there are no reference cycles.

mod fiber;
mod fiber_tree;

pub use fiber::*;
pub use fiber_tree::*;
