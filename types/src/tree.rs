//! The per-index voting-tree commitment.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::hash::H256;

/// An opaque commitment to one node of the voting tree.
///
/// `sum` is the aggregate voting weight of the subtree below the node and
/// `hash` commits to its children. The dispute game only ever compares these
/// two fields; how a parent is derived from its children is the concern of
/// the tree builder (and, ultimately, the on-chain contract).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VotingTreeNode {
    pub sum: u128,
    pub hash: H256,
}

impl VotingTreeNode {
    pub fn new(sum: u128, hash: H256) -> Self {
        Self { sum, hash }
    }
}

impl fmt::Debug for VotingTreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VotingTreeNode {{ sum: {}, hash: {:?} }}", self.sum, self.hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_covers_both_fields() {
        let a = VotingTreeNode::new(10, H256::new([1u8; 32]));
        let same = VotingTreeNode::new(10, H256::new([1u8; 32]));
        let other_sum = VotingTreeNode::new(11, H256::new([1u8; 32]));
        let other_hash = VotingTreeNode::new(10, H256::new([2u8; 32]));
        assert_eq!(a, same);
        assert_ne!(a, other_sum);
        assert_ne!(a, other_hash);
    }
}
