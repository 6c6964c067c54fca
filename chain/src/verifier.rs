//! The on-chain Protocol DAO verifier contract surface.

use mooring_types::{ChallengeState, NodeIndex, ProposalId, VotingTreeNode};

use crate::error::ChainError;
use crate::events::{ChallengeSubmitted, RootSubmitted};
use crate::tx::TxInfo;

/// Read and write access to the dispute-game contract.
///
/// The three write methods prepare and simulate a transaction without
/// sending it; submission goes through [`crate::TxSubmitter`]. Event queries
/// cover an inclusive block range and are expected to be called with ranges
/// no wider than the backend's log-scan limit — callers chunk with
/// [`crate::block_windows`].
pub trait VerifierContract: Send + Sync {
    /// How many tree levels one pollard row spans. A protocol constant read
    /// once at startup.
    fn depth_per_round(&self) -> Result<u32, ChainError>;

    /// The committed node of a proposal at `index`.
    fn tree_node(
        &self,
        proposal: ProposalId,
        index: NodeIndex,
    ) -> Result<VotingTreeNode, ChainError>;

    /// The challenge state of `(proposal, index)`.
    fn challenge_state(
        &self,
        proposal: ProposalId,
        index: NodeIndex,
    ) -> Result<ChallengeState, ChainError>;

    /// `RootSubmitted` events for `proposals` in `[from_block, to_block]`.
    fn root_submitted_events(
        &self,
        proposals: &[ProposalId],
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RootSubmitted>, ChainError>;

    /// `ChallengeSubmitted` events for `proposals` in `[from_block, to_block]`.
    fn challenge_submitted_events(
        &self,
        proposals: &[ProposalId],
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<ChallengeSubmitted>, ChainError>;

    /// Prepare a challenge against `index`, witnessed as a descendant of an
    /// accepted ancestor. Reverts in simulation if `index` is not a valid
    /// unchallenged descendant.
    fn create_challenge(
        &self,
        proposal: ProposalId,
        index: NodeIndex,
        node: VotingTreeNode,
        witness: &[VotingTreeNode],
    ) -> Result<TxInfo, ChainError>;

    /// Prepare a defeat of `proposal` at an unanswered `index`. Reverts in
    /// simulation while the challenge window is open or once answered.
    fn defeat_proposal(&self, proposal: ProposalId, index: NodeIndex)
        -> Result<TxInfo, ChainError>;

    /// Prepare the proposer's response to a challenge at `index`. Reverts in
    /// simulation unless the index is currently `Challenged`.
    fn submit_root(
        &self,
        proposal: ProposalId,
        index: NodeIndex,
        pollard: &[VotingTreeNode],
    ) -> Result<TxInfo, ChainError>;
}
