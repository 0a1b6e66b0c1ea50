//! Host Interface - The seam between the reconciler and a concrete tree.
//!
//! The reconciler never touches host nodes itself. Complete work builds
//! detached nodes through a [`HostConfig`], and commit attaches, patches and
//! removes them through the same trait.
//!
//! [`MemoryHost`] is an in-process implementation that records every call.

mod memory;

pub use memory::*;

use std::fmt::Debug;

use crate::primitives::Props;

/// Operations a host environment provides.
///
/// `Instance` is a handle to one host node (element, text or container).
/// Handles are cloned freely, so they should be cheap references.
pub trait HostConfig {
    type Instance: Clone + Debug;

    /// Create a detached element node.
    fn create_instance(&mut self, tag: &str, props: &Props) -> Self::Instance;

    /// Create a detached text node.
    fn create_text_instance(&mut self, content: &str) -> Self::Instance;

    /// Attach `child` under a parent that is not yet in the tree.
    fn append_initial_child(&mut self, parent: &Self::Instance, child: &Self::Instance);

    /// Attach `child` under a live parent, which may be the container.
    fn append_to_container(&mut self, container: &Self::Instance, child: &Self::Instance) {
        self.append_initial_child(container, child);
    }

    /// Detach `child` from `container`.
    fn remove_child(&mut self, child: &Self::Instance, container: &Self::Instance);

    /// Replace the content of a text node.
    fn commit_text_update(&mut self, text: &Self::Instance, content: &str);
}
