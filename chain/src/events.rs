//! Verifier-contract events consumed by the dispute-game tasks.

use serde::{Deserialize, Serialize};

use mooring_types::{Address, NodeIndex, ProposalId, Timestamp, VotingTreeNode};

/// Emitted when a proposer submits a tree node (at proposal time for the
/// root, or in response to a challenge). Immutable once mined.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RootSubmitted {
    pub proposal_id: ProposalId,
    pub proposer: Address,
    /// The execution block the proposal's voting tree snapshots.
    pub tree_block_number: u64,
    /// The index the submission roots at.
    pub index: NodeIndex,
    /// The committed node at `index`.
    pub root: VotingTreeNode,
    /// The descendants submitted beneath `index` (one pollard row).
    pub pollard: Vec<VotingTreeNode>,
    pub timestamp: Timestamp,
}

/// Emitted when a verifier disputes the node at `index`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChallengeSubmitted {
    pub proposal_id: ProposalId,
    pub challenger: Address,
    pub index: NodeIndex,
    pub timestamp: Timestamp,
}
