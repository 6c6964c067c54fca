//! The read-only network-state snapshot passed into each task run.

use serde::{Deserialize, Serialize};

use mooring_types::{Address, ProposalId, ProposalState, Timestamp};

use crate::beacon::BeaconConfig;
use crate::error::ChainError;

/// On-chain details of one Protocol DAO proposal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProposalDetails {
    pub id: ProposalId,
    pub proposer: Address,
    pub state: ProposalState,
    pub created_time: Timestamp,
    /// The execution block whose voting power the proposal snapshots.
    pub target_block: u64,
    /// Seconds a challenged proposer has to respond before defeat.
    pub challenge_window_secs: u64,
}

/// A consistent snapshot of the chain state one task cycle works against.
///
/// Tasks never reach around this snapshot for "fresher" data: all timing
/// decisions use `el_block_timestamp`, never the local clock.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NetworkState {
    pub el_block_number: u64,
    pub el_block_timestamp: Timestamp,
    pub beacon_config: BeaconConfig,
    pub proposals: Vec<ProposalDetails>,
}

/// Produces the snapshot at the head of the chain.
pub trait NetworkStateProvider: Send + Sync {
    fn latest_state(&self) -> Result<NetworkState, ChainError>;
}
