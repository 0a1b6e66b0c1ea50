//! State Module - Update queues and component hooks.
//!
//! - **Update queue** - O(1) enqueue, fold-on-render pending lists
//! - **Hooks** - `use_state` slots bound to the fiber being rendered

mod hooks;
mod update_queue;

pub use hooks::*;
pub use update_queue::*;
