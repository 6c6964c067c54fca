//! Identifiers for proposals and voting-tree nodes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric identifier of a Protocol DAO proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProposalId(u64);

impl ProposalId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 1-based index into a complete binary tree.
///
/// The root is index 1; the children of index `i` are `2i` and `2i + 1`.
/// Index 0 is not a valid position and is rejected by [`NodeIndex::new`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeIndex(u64);

impl NodeIndex {
    /// The root of the tree.
    pub const ROOT: Self = Self(1);

    /// Create an index. Returns `None` for 0, which has no position in a
    /// 1-based tree.
    pub fn new(index: u64) -> Option<Self> {
        (index != 0).then_some(Self(index))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == 1
    }

    /// Depth below the root (the root is at depth 0).
    pub fn depth(&self) -> u32 {
        self.0.ilog2()
    }

    pub fn left_child(&self) -> NodeIndex {
        Self(self.0 * 2)
    }

    pub fn right_child(&self) -> NodeIndex {
        Self(self.0 * 2 + 1)
    }

    pub fn parent(&self) -> Option<NodeIndex> {
        (self.0 > 1).then_some(Self(self.0 / 2))
    }

    /// The sibling sharing this node's parent. The root has none.
    pub fn sibling(&self) -> Option<NodeIndex> {
        if self.0 == 1 {
            None
        } else if self.0 % 2 == 0 {
            Some(Self(self.0 + 1))
        } else {
            Some(Self(self.0 - 1))
        }
    }

    /// The descendant of this node at relative depth `d`, offset `o` from the
    /// leftmost descendant on that level.
    pub fn descendant(&self, relative_depth: u32, offset: u64) -> NodeIndex {
        Self((self.0 << relative_depth) + offset)
    }

    /// Whether `other` lies in the subtree rooted at this node (a node is a
    /// descendant of itself).
    pub fn is_ancestor_of(&self, other: NodeIndex) -> bool {
        let mut cursor = other.0;
        while cursor >= self.0 {
            if cursor == self.0 {
                return true;
            }
            cursor /= 2;
        }
        false
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(i: u64) -> NodeIndex {
        NodeIndex::new(i).unwrap()
    }

    #[test]
    fn zero_is_rejected() {
        assert!(NodeIndex::new(0).is_none());
        assert!(NodeIndex::new(1).is_some());
    }

    #[test]
    fn children_and_parent() {
        assert_eq!(idx(3).left_child(), idx(6));
        assert_eq!(idx(3).right_child(), idx(7));
        assert_eq!(idx(6).parent(), Some(idx(3)));
        assert_eq!(idx(7).parent(), Some(idx(3)));
        assert_eq!(NodeIndex::ROOT.parent(), None);
    }

    #[test]
    fn depth_follows_levels() {
        assert_eq!(NodeIndex::ROOT.depth(), 0);
        assert_eq!(idx(2).depth(), 1);
        assert_eq!(idx(3).depth(), 1);
        assert_eq!(idx(4).depth(), 2);
        assert_eq!(idx(7).depth(), 2);
        assert_eq!(idx(8).depth(), 3);
    }

    #[test]
    fn sibling_pairs() {
        assert_eq!(idx(4).sibling(), Some(idx(5)));
        assert_eq!(idx(5).sibling(), Some(idx(4)));
        assert_eq!(NodeIndex::ROOT.sibling(), None);
    }

    #[test]
    fn descendant_math() {
        // Children of 1 are 2 and 3; grandchildren 4..=7.
        assert_eq!(NodeIndex::ROOT.descendant(1, 0), idx(2));
        assert_eq!(NodeIndex::ROOT.descendant(1, 1), idx(3));
        assert_eq!(NodeIndex::ROOT.descendant(2, 3), idx(7));
        assert_eq!(idx(2).descendant(1, 1), idx(5));
    }

    #[test]
    fn ancestry() {
        assert!(NodeIndex::ROOT.is_ancestor_of(idx(7)));
        assert!(idx(2).is_ancestor_of(idx(5)));
        assert!(idx(2).is_ancestor_of(idx(2)));
        assert!(!idx(3).is_ancestor_of(idx(5)));
        assert!(!idx(4).is_ancestor_of(idx(2)));
    }
}
