//! Consensus-layer client abstraction.

use serde::{Deserialize, Serialize};

use mooring_types::Timestamp;

use crate::error::ChainError;

/// Static consensus-chain parameters needed to map timestamps to slots.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BeaconConfig {
    pub genesis_time: Timestamp,
    pub seconds_per_slot: u64,
}

impl BeaconConfig {
    /// The slot in progress at `time`. Times before genesis map to slot 0.
    pub fn slot_at(&self, time: Timestamp) -> u64 {
        self.genesis_time.elapsed_since(time) / self.seconds_per_slot.max(1)
    }
}

/// A consensus-layer block header, reduced to what the daemon consumes.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BeaconBlock {
    pub slot: u64,
    /// The execution-layer block number of the block's payload.
    pub execution_block_number: u64,
}

/// Read access to the consensus chain.
pub trait BeaconClient: Send + Sync {
    /// The beacon block at `slot`, or `None` for a skipped slot.
    fn beacon_block(&self, slot: u64) -> Result<Option<BeaconBlock>, ChainError>;
}
