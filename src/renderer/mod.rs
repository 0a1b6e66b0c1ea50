//! Renderer - Applies finished work to the host tree.
//!
//! Rendering (begin/complete) only computes what changed. This module is the
//! single place where host nodes are attached, patched or removed.

mod commit;

pub use commit::CommitSummary;
pub(crate) use commit::commit_mutation_effects;
