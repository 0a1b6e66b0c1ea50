//! Core types for spark-reconciler.
//!
//! These types define the vocabulary shared by every phase: what kind of
//! node a fiber is, which mutations it carries, and how siblings are keyed.

use std::rc::Rc;

// =============================================================================
// Key
// =============================================================================

/// Identity hint for an element, unique among its siblings.
///
/// Shared so that descriptions and fibers can hold the same key cheaply.
pub type Key = Rc<str>;

// =============================================================================
// Work Tag
// =============================================================================

/// What kind of node a fiber represents.
///
/// Closed set: begin, complete and commit all match on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkTag {
    /// The root of a fiber tree. Its host node is the container.
    Root,
    /// A host element such as `div`.
    HostElement,
    /// A user component function. Has no host node of its own.
    FunctionComponent,
    /// A text leaf.
    Text,
}

impl WorkTag {
    /// Tags that own a host instance directly.
    #[inline]
    pub const fn is_host(self) -> bool {
        matches!(self, Self::HostElement | Self::Text)
    }

    /// Tags whose host node can act as a parent for inserted children.
    #[inline]
    pub const fn is_host_parent(self) -> bool {
        matches!(self, Self::HostElement | Self::Root)
    }
}

// =============================================================================
// Effect Flags (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Pending mutation kinds on a fiber.
    ///
    /// Combine with bitwise OR: `Flags::PLACEMENT | Flags::UPDATE`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Flags: u8 {
        const NONE = 0;
        /// The fiber's host node must be inserted into its host parent.
        const PLACEMENT = 1 << 1;
        /// The fiber's host node must be patched in place.
        const UPDATE = 1 << 2;
        /// The fiber has children staged in `deletions`.
        const CHILD_DELETION = 1 << 4;
    }
}

impl Flags {
    /// Every flag the commit phase acts on.
    pub const MUTATION_MASK: Self = Self::PLACEMENT
        .union(Self::UPDATE)
        .union(Self::CHILD_DELETION);

    /// True if any mutation bit is set.
    #[inline]
    pub fn has_mutation(self) -> bool {
        self.intersects(Self::MUTATION_MASK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutation_mask() {
        assert!(Flags::PLACEMENT.has_mutation());
        assert!((Flags::UPDATE | Flags::CHILD_DELETION).has_mutation());
        assert!(!Flags::NONE.has_mutation());
        assert_eq!(
            Flags::MUTATION_MASK,
            Flags::PLACEMENT | Flags::UPDATE | Flags::CHILD_DELETION
        );
    }

    #[test]
    fn test_host_tags() {
        assert!(WorkTag::HostElement.is_host());
        assert!(WorkTag::Text.is_host());
        assert!(!WorkTag::FunctionComponent.is_host());
        assert!(WorkTag::Root.is_host_parent());
        assert!(!WorkTag::Text.is_host_parent());
    }
}
