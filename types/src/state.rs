//! On-chain lifecycle enums for proposals and challenges.

use serde::{Deserialize, Serialize};

/// The lifecycle state of a Protocol DAO proposal.
///
/// Only `Pending` proposals participate in the dispute game; every other
/// state causes the daemon to prune the proposal from its caches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalState {
    /// In the challenge phase; the voting-power snapshot may be disputed.
    Pending,
    /// Challenge phase passed; voting is open.
    Active,
    /// Vote passed, awaiting execution.
    Succeeded,
    /// Executed on-chain. Terminal.
    Executed,
    /// Cancelled by the proposer. Terminal.
    Cancelled,
    /// Lost the dispute game. Terminal; can never execute.
    Defeated,
    /// Vetoed by the security council. Terminal.
    Vetoed,
    /// Passed but never executed in time. Terminal.
    Expired,
}

impl ProposalState {
    /// Whether the proposal is still in the challenge phase.
    pub fn is_challengeable(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// The state of a challenge against one tree index of a proposal.
///
/// Owned by the on-chain verifier contract; the daemon only reads it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChallengeState {
    /// No challenge has been raised at this index.
    Unchallenged,
    /// Challenged; the proposer must respond within the challenge window.
    Challenged,
    /// The proposer answered with the node's children.
    Responded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_is_challengeable() {
        assert!(ProposalState::Pending.is_challengeable());
        for state in [
            ProposalState::Active,
            ProposalState::Succeeded,
            ProposalState::Executed,
            ProposalState::Cancelled,
            ProposalState::Defeated,
            ProposalState::Vetoed,
            ProposalState::Expired,
        ] {
            assert!(!state.is_challengeable());
        }
    }
}
