//! Prepared transactions and the submission collaborator.
//!
//! The fee estimation, signing, and mining-wait plumbing live behind
//! [`TxSubmitter`]; this crate only defines what crosses the seam. A
//! prepared [`TxInfo`] has already been simulated — a simulation failure
//! is carried in the result rather than silently dropped, so the task that
//! prepared it can log and skip that single action.

use serde::{Deserialize, Serialize};
use std::fmt;

use mooring_types::{NodeIndex, ProposalId, VotingTreeNode};

use crate::error::ChainError;

/// The verifier-contract calls the dispute-game tasks can make.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxPayload {
    CreateChallenge {
        proposal: ProposalId,
        index: NodeIndex,
        node: VotingTreeNode,
        witness: Vec<VotingTreeNode>,
    },
    DefeatProposal {
        proposal: ProposalId,
        index: NodeIndex,
    },
    SubmitRoot {
        proposal: ProposalId,
        index: NodeIndex,
        pollard: Vec<VotingTreeNode>,
    },
}

impl fmt::Display for TxPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateChallenge { proposal, index, .. } => {
                write!(f, "challenge against proposal {proposal}, index {index}")
            }
            Self::DefeatProposal { proposal, index } => {
                write!(f, "defeat of proposal {proposal} at index {index}")
            }
            Self::SubmitRoot { proposal, index, .. } => {
                write!(f, "root submission for proposal {proposal}, index {index}")
            }
        }
    }
}

/// Result of simulating a prepared transaction against the head state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationResult {
    pub estimated_gas: u64,
    /// The revert reason, if simulation failed.
    pub error: Option<String>,
}

impl SimulationResult {
    pub fn success(estimated_gas: u64) -> Self {
        Self {
            estimated_gas,
            error: None,
        }
    }

    pub fn reverted(reason: impl Into<String>) -> Self {
        Self {
            estimated_gas: 0,
            error: Some(reason.into()),
        }
    }
}

/// A prepared, simulated transaction ready for submission.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TxInfo {
    pub payload: TxPayload,
    pub simulation: SimulationResult,
}

impl TxInfo {
    /// Fail if the simulation reverted, so a bad action never reaches the
    /// submitter.
    pub fn checked(self) -> Result<Self, ChainError> {
        match &self.simulation.error {
            Some(reason) => Err(ChainError::Simulation {
                action: self.payload.to_string(),
                reason: reason.clone(),
            }),
            None => Ok(self),
        }
    }
}

/// Fee configuration applied to every submitted transaction.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TxOptions {
    pub max_fee_gwei: f64,
    pub max_priority_fee_gwei: f64,
    /// Automatic submission is withheld while the network fee exceeds this.
    pub gas_threshold_gwei: f64,
}

impl Default for TxOptions {
    fn default() -> Self {
        Self {
            max_fee_gwei: 0.0,
            max_priority_fee_gwei: 2.0,
            gas_threshold_gwei: 100.0,
        }
    }
}

/// The shared transaction-submission collaborator.
///
/// Implementations simulate once more before sending, apply the configured
/// fees, and block until every transaction is mined or errors.
pub trait TxSubmitter: Send + Sync {
    fn submit_batch(&self, txs: Vec<TxInfo>, opts: &TxOptions) -> Result<(), ChainError>;
}
