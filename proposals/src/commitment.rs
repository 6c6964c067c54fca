//! Tree-node commitment derivation.
//!
//! The dispute game treats `(hash, sum)` as opaque; this module fixes the
//! local derivation so every honest node builds an identical tree. A parent
//! commits to both children's hashes and sums; sums are encoded as 32-byte
//! big-endian words.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

use mooring_types::{VotingTreeNode, H256};

type Blake2b256 = Blake2b<U32>;

/// Derive a parent commitment from its two children.
pub fn parent(left: &VotingTreeNode, right: &VotingTreeNode) -> VotingTreeNode {
    let mut hasher = Blake2b256::new();
    hasher.update(left.hash.as_bytes());
    hasher.update(sum_word(left.sum));
    hasher.update(right.hash.as_bytes());
    hasher.update(sum_word(right.sum));

    let mut hash = [0u8; 32];
    hash.copy_from_slice(&hasher.finalize());

    VotingTreeNode {
        sum: left.sum.saturating_add(right.sum),
        hash: H256::new(hash),
    }
}

/// Derive a leaf commitment from a node's voting power.
pub fn leaf(power: u128) -> VotingTreeNode {
    let mut hasher = Blake2b256::new();
    hasher.update(sum_word(power));

    let mut hash = [0u8; 32];
    hash.copy_from_slice(&hasher.finalize());

    VotingTreeNode {
        sum: power,
        hash: H256::new(hash),
    }
}

/// The padding leaf for trees whose leaf count is not a power of two.
pub fn zero_leaf() -> VotingTreeNode {
    leaf(0)
}

fn sum_word(sum: u128) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&sum.to_be_bytes());
    word
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_with_equal_power_agree() {
        assert_eq!(leaf(100), leaf(100));
        assert_ne!(leaf(100), leaf(101));
    }

    #[test]
    fn parent_sums_children() {
        let p = parent(&leaf(30), &leaf(12));
        assert_eq!(p.sum, 42);
    }

    #[test]
    fn parent_is_order_sensitive() {
        let ab = parent(&leaf(1), &leaf(2));
        let ba = parent(&leaf(2), &leaf(1));
        assert_eq!(ab.sum, ba.sum);
        assert_ne!(ab.hash, ba.hash);
    }

    #[test]
    fn zero_leaf_commits_to_zero_power() {
        assert_eq!(zero_leaf().sum, 0);
        assert_eq!(zero_leaf(), leaf(0));
    }
}
