//! Render Pipeline
//!
//! Connects triggers (root updates, dispatched state) to render passes.
//!
//! # Pipeline Architecture
//!
//! ```text
//! update_root / dispatch ─► schedule_update ─► render_root ─► commit_root
//!                               │                  │
//!                         (pass running?)     begin/complete
//!                          defer, rerun
//! ```
//!
//! ## Key Design Principles
//!
//! - **Synchronous**: a pass runs to completion before the call returns
//! - **All-or-nothing**: an aborted pass commits nothing
//! - **Bounded**: follow-up passes are capped by [`RootOptions`]

mod options;
mod root;
mod work_loop;

pub use options::{DEFAULT_NESTED_UPDATE_LIMIT, RootOptions};
pub use root::{Root, create_root, create_root_with_options, update_root};
