//! The committed voting-power tree and the divergence locator.

use serde::{Deserialize, Serialize};

use mooring_types::{NodeIndex, VotingTreeNode};

use crate::commitment;
use crate::error::ProposalError;

/// Outcome of comparing a submitted pollard against the local tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Divergence {
    /// The submitted data disagrees with the local tree at `index`, a strict
    /// descendant of the compared node. `node` is the *submitted* commitment
    /// at that position and `witness` proves its position beneath the
    /// already-accepted ancestor (derived from the submitted pollard itself,
    /// since the challenge must reference on-chain data).
    Diverged {
        index: NodeIndex,
        node: VotingTreeNode,
        witness: Vec<VotingTreeNode>,
    },
    /// The submitted pollard matches the local tree; nothing beneath the
    /// compared node can be challenged.
    NoDivergence,
}

/// A complete binary Merkle tree over per-node voting power.
///
/// Nodes use 1-based indexing (root = 1, children of `i` at `2i`/`2i + 1`)
/// and are stored as a flat array since the tree never changes once built.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VotingTree {
    block_number: u64,
    /// Level of the leaf row (the root is level 0).
    depth: u32,
    /// How many levels one pollard row spans.
    depth_per_round: u32,
    nodes: Vec<VotingTreeNode>,
}

impl VotingTree {
    /// Build a tree from leaf commitments, padding to the next power of two
    /// with zero-power leaves.
    pub fn from_leaves(
        block_number: u64,
        leaves: &[VotingTreeNode],
        depth_per_round: u32,
    ) -> Result<Self, ProposalError> {
        if leaves.is_empty() {
            return Err(ProposalError::EmptyLeaves);
        }

        let padded = leaves.len().next_power_of_two();
        let depth = padded.ilog2();

        let mut nodes = vec![commitment::zero_leaf(); padded * 2 - 1];
        let leaf_start = padded - 1;
        nodes[leaf_start..leaf_start + leaves.len()].copy_from_slice(leaves);

        // Derive every internal node from its children, bottom-up.
        for i in (1..padded).rev() {
            nodes[i - 1] = commitment::parent(&nodes[2 * i - 1], &nodes[2 * i]);
        }

        Ok(Self {
            block_number,
            depth,
            depth_per_round,
            nodes,
        })
    }

    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    /// Level of the leaf row; also the number of descent rounds to reach it.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn leaf_count(&self) -> usize {
        (self.nodes.len() + 1) / 2
    }

    pub fn root(&self) -> &VotingTreeNode {
        &self.nodes[0]
    }

    pub fn node_at(&self, index: NodeIndex) -> Option<&VotingTreeNode> {
        let i = index.as_u64() as usize;
        (i <= self.nodes.len()).then(|| &self.nodes[i - 1])
    }

    /// The pollard rooted at `index`: the node itself plus the row of its
    /// descendants `depth_per_round` levels below (clamped at the leaf row,
    /// so a leaf's pollard is the leaf alone).
    pub fn pollard(
        &self,
        index: NodeIndex,
    ) -> Result<(VotingTreeNode, Vec<VotingTreeNode>), ProposalError> {
        let root = *self
            .node_at(index)
            .ok_or(ProposalError::IndexOutOfRange {
                index: index.as_u64(),
                depth: self.depth,
            })?;

        let level = index.depth();
        let relative = self.depth_per_round.min(self.depth - level);
        let size = 1u64 << relative;

        let mut row = Vec::with_capacity(size as usize);
        for offset in 0..size {
            let child = index.descendant(relative, offset);
            // In range by construction: `child` is at most `depth` levels down.
            row.push(*self.node_at(child).expect("pollard row inside tree"));
        }
        Ok((root, row))
    }

    /// Merkle summation proof for `index`: the sibling path from the node up
    /// to (excluding) the root.
    pub fn merkle_proof(&self, index: NodeIndex) -> Result<Vec<VotingTreeNode>, ProposalError> {
        if self.node_at(index).is_none() {
            return Err(ProposalError::IndexOutOfRange {
                index: index.as_u64(),
                depth: self.depth,
            });
        }

        let mut proof = Vec::with_capacity(index.depth() as usize);
        let mut cursor = index;
        while let Some(sibling) = cursor.sibling() {
            proof.push(*self.node_at(sibling).expect("sibling inside tree"));
            cursor = cursor.parent().expect("non-root has a parent");
        }
        Ok(proof)
    }

    /// Compare the pollard submitted beneath an accepted `index` against the
    /// locally derived one and locate the first disagreeing descendant.
    ///
    /// The returned witness is generated inside a subtree rebuilt from the
    /// submitted pollard, proving the challenged node's position under the
    /// accepted ancestor using the proposer's own data.
    pub fn check_for_divergence(
        &self,
        index: NodeIndex,
        submitted: &[VotingTreeNode],
    ) -> Result<Divergence, ProposalError> {
        let (_, local) = self.pollard(index)?;
        if local.len() != submitted.len() {
            return Err(ProposalError::PollardSizeMismatch {
                local: local.len(),
                submitted: submitted.len(),
            });
        }

        let offset = match local
            .iter()
            .zip(submitted)
            .position(|(ours, theirs)| ours != theirs)
        {
            Some(offset) => offset,
            None => return Ok(Divergence::NoDivergence),
        };

        let relative = (local.len() as u64).ilog2();
        let diverged = index.descendant(relative, offset as u64);

        let subtree = VotingTree::from_leaves(self.block_number, submitted, self.depth_per_round)?;
        let subtree_leaf = NodeIndex::new((submitted.len() + offset) as u64)
            .expect("pollard leaf index is nonzero");
        let witness = subtree.merkle_proof(subtree_leaf)?;

        Ok(Divergence::Diverged {
            index: diverged,
            node: submitted[offset],
            witness,
        })
    }
}
