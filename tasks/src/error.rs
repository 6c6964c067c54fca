use thiserror::Error;

use mooring_chain::ChainError;
use mooring_proposals::ProposalError;
use mooring_types::{NodeIndex, ProposalId};

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("proposal error: {0}")]
    Proposal(#[from] ProposalError),

    #[error("challenge against proposal {proposal}, index {index} has been responded to but the RootSubmitted event is missing")]
    MissingRootSubmission {
        proposal: ProposalId,
        index: NodeIndex,
    },

    #[error("divergence search for proposal {proposal} returned the already-challenged index {index}")]
    DescentCycle {
        proposal: ProposalId,
        index: NodeIndex,
    },

    #[error("descent for proposal {proposal} exceeded the tree depth bound of {depth} rounds")]
    DescentDepthExceeded { proposal: ProposalId, depth: u32 },
}

impl TaskError {
    /// Whether this error poisons the whole cycle rather than one proposal.
    ///
    /// Transient chain faults abort the cycle for all proposals uniformly
    /// (fail-closed, retried next tick). Simulation reverts and protocol
    /// invariant violations are scoped to a single action or proposal; the
    /// rest of the batch continues.
    pub fn is_cycle_fatal(&self) -> bool {
        match self {
            Self::Chain(ChainError::Simulation { .. }) => false,
            Self::Chain(_) => true,
            Self::Proposal(ProposalError::Chain(ChainError::Simulation { .. })) => false,
            Self::Proposal(ProposalError::Chain(_)) | Self::Proposal(ProposalError::Cache(_)) => {
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_errors_poison_the_cycle() {
        let err = TaskError::Chain(ChainError::Rpc("connection refused".into()));
        assert!(err.is_cycle_fatal());
    }

    #[test]
    fn simulation_errors_are_scoped_to_the_action() {
        let err = TaskError::Chain(ChainError::Simulation {
            action: "challenge".into(),
            reason: "reverted".into(),
        });
        assert!(!err.is_cycle_fatal());
    }

    #[test]
    fn invariant_violations_are_scoped_to_the_proposal() {
        let err = TaskError::DescentCycle {
            proposal: ProposalId::new(3),
            index: NodeIndex::ROOT,
        };
        assert!(!err.is_cycle_fatal());

        let err = TaskError::MissingRootSubmission {
            proposal: ProposalId::new(3),
            index: NodeIndex::ROOT,
        };
        assert!(!err.is_cycle_fatal());
    }

    #[test]
    fn malformed_submitted_data_is_scoped_to_the_proposal() {
        let err = TaskError::Proposal(ProposalError::PollardSizeMismatch {
            local: 2,
            submitted: 3,
        });
        assert!(!err.is_cycle_fatal());
    }
}
