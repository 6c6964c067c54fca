use proptest::prelude::*;

use mooring_proposals::{commitment, Divergence, VotingTree};
use mooring_types::{NodeIndex, VotingTreeNode};

fn tree_from_powers(powers: &[u128], depth_per_round: u32) -> VotingTree {
    let leaves: Vec<VotingTreeNode> = powers.iter().map(|p| commitment::leaf(*p)).collect();
    VotingTree::from_leaves(77, &leaves, depth_per_round).unwrap()
}

proptest! {
    /// Every internal node is derived from its children.
    #[test]
    fn parent_invariant_holds(powers in prop::collection::vec(0u128..1_000_000, 1..40)) {
        let tree = tree_from_powers(&powers, 1);
        let internal_count = tree.leaf_count() as u64 - 1;
        for i in 1..=internal_count {
            let index = NodeIndex::new(i).unwrap();
            let parent = tree.node_at(index).unwrap();
            let left = tree.node_at(index.left_child()).unwrap();
            let right = tree.node_at(index.right_child()).unwrap();
            prop_assert_eq!(*parent, commitment::parent(left, right));
        }
    }

    /// The root sum aggregates all voting power (padding adds zero).
    #[test]
    fn root_sums_all_power(powers in prop::collection::vec(0u128..1_000_000, 1..64)) {
        let tree = tree_from_powers(&powers, 1);
        let total: u128 = powers.iter().sum();
        prop_assert_eq!(tree.root().sum, total);
    }

    /// A tree never diverges from its own pollards, at any index.
    #[test]
    fn self_comparison_is_clean(
        powers in prop::collection::vec(0u128..1_000_000, 1..32),
        index_seed in 1u64..64,
    ) {
        let tree = tree_from_powers(&powers, 1);
        let node_count = tree.leaf_count() as u64 * 2 - 1;
        let index = NodeIndex::new((index_seed - 1) % node_count + 1).unwrap();
        let (_, pollard) = tree.pollard(index).unwrap();
        prop_assert_eq!(
            tree.check_for_divergence(index, &pollard).unwrap(),
            Divergence::NoDivergence
        );
    }

    /// Descending through a tampered tree strictly deepens each round,
    /// reaches the leaf row within `depth` rounds, and lands on the
    /// tampered leaf.
    #[test]
    fn descent_terminates_at_the_tampered_leaf(
        powers in prop::collection::vec(1u128..1_000_000, 2..48),
        tamper_seed in 0usize..48,
        depth_per_round in 1u32..4,
    ) {
        let tamper = tamper_seed % powers.len();
        let mut tampered = powers.clone();
        tampered[tamper] += 1;

        let honest = tree_from_powers(&powers, depth_per_round);
        let dishonest = tree_from_powers(&tampered, depth_per_round);
        let depth = honest.depth();

        let mut accepted = NodeIndex::ROOT;
        let mut rounds = 0u32;
        let leaf = loop {
            prop_assert!(rounds <= depth, "descent exceeded the depth bound");
            rounds += 1;

            let (_, pollard) = dishonest.pollard(accepted).unwrap();
            match honest.check_for_divergence(accepted, &pollard).unwrap() {
                Divergence::Diverged { index, .. } => {
                    prop_assert!(index.depth() > accepted.depth(), "descent must deepen");
                    if index.depth() == depth {
                        break index;
                    }
                    accepted = index;
                }
                Divergence::NoDivergence => {
                    prop_assert!(false, "root mismatch cannot vanish mid-descent");
                    unreachable!();
                }
            }
        };

        // The leaf the game converges on is exactly the tampered one.
        let expected_leaf = NodeIndex::new(honest.leaf_count() as u64 + tamper as u64).unwrap();
        prop_assert_eq!(leaf, expected_leaf);
    }
}
