//! Reconciler - The render traversal.
//!
//! ```text
//! begin_work (top-down)                 complete_work (bottom-up)
//!   Root      drain queue, diff child     Root      bubble flags
//!   Host      diff `children` prop        Host      create instance, adopt children
//!   Component render with hooks, diff     Component bubble flags
//!   Text      -                           Text      create instance or flag UPDATE
//! ```
//!
//! Both phases only touch the work-in-progress generation. Host nodes are
//! created detached; nothing is attached to a live tree until commit.

mod begin_work;
mod child_fibers;
mod complete_work;

pub(crate) use begin_work::begin_work;
pub(crate) use complete_work::complete_work;
