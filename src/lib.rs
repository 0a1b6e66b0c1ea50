//! # spark-reconciler
//!
//! A fiber reconciler for declarative UI trees.
//!
//! Describe what the UI should look like with immutable [`Element`]s; the
//! reconciler diffs each new description against the tree it committed last
//! time and applies the smallest set of host mutations that brings the host
//! tree into agreement.
//!
//! ## Architecture
//!
//! Two fiber trees live side by side: `current` (what the host shows) and the
//! work-in-progress tree being built. Every update runs one synchronous pass:
//!
//! ```text
//! update_root / dispatch → begin (diff, top-down) → complete (instances, bottom-up)
//!                        → commit (Placement / Update / ChildDeletion) → swap current
//! ```
//!
//! Component state lives in hook slots ([`use_state`]) attached to the
//! component's fiber and carried between the two trees.
//!
//! ## Modules
//!
//! - [`types`] - Work tags, effect flags, keys
//! - [`primitives`] - Elements, props, components
//! - [`state`] - Update queues and hooks
//! - [`engine`] - Fiber nodes and the fiber arena
//! - [`host`] - Host interface and the in-memory host
//! - [`renderer`] - Commit phase
//! - [`pipeline`] - Roots and the work loop

pub mod engine;
pub mod error;
pub mod host;
pub mod pipeline;
pub mod primitives;
mod reconciler;
pub mod renderer;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use error::{HookError, ReconcileError, RenderError};

pub use engine::{Fiber, FiberId, FiberProps, FiberTree, MemoizedState};

pub use host::{HostConfig, HostOp, MemoryHost, MemoryNode, MemoryNodeKind};

pub use pipeline::{
    create_root, create_root_with_options, update_root, Root, RootOptions,
    DEFAULT_NESTED_UPDATE_LIMIT,
};

pub use primitives::{Component, Element, ElementType, Node, PropValue, Props};

pub use renderer::CommitSummary;

pub use state::{
    // Hooks
    is_rendering, use_state, use_state_with, Dispatch, Hook, ScheduleUpdate,
    // Update queue
    Action, Update,
};
