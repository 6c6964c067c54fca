//! Deterministic voting-power source.

use mooring_chain::ChainError;
use mooring_proposals::{SnapshotSource, VotingPowerEntry, VotingPowerSnapshot};
use mooring_types::Address;

/// Serves a fixed voting-power table for every block.
pub struct NullSnapshotSource {
    powers: Vec<u128>,
}

impl NullSnapshotSource {
    /// Entry `i` is assigned the deterministic address `[i + 1; 20]`.
    pub fn new(powers: Vec<u128>) -> Self {
        Self { powers }
    }
}

impl SnapshotSource for NullSnapshotSource {
    fn voting_power_snapshot(
        &self,
        block_number: u64,
    ) -> Result<VotingPowerSnapshot, ChainError> {
        Ok(VotingPowerSnapshot {
            block_number,
            entries: self
                .powers
                .iter()
                .enumerate()
                .map(|(i, power)| VotingPowerEntry {
                    address: Address::new([i as u8 + 1; 20]),
                    power: *power,
                })
                .collect(),
        })
    }
}
