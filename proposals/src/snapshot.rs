//! Per-node voting power at a snapshot block.

use serde::{Deserialize, Serialize};

use mooring_chain::ChainError;
use mooring_types::{Address, VotingTreeNode};

use crate::commitment;

/// One node operator's voting power.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingPowerEntry {
    pub address: Address,
    pub power: u128,
}

/// The full voting-power assignment at a snapshot block, in canonical
/// (registration) order. Leaf order is part of the commitment: every honest
/// node must derive the same leaves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingPowerSnapshot {
    pub block_number: u64,
    pub entries: Vec<VotingPowerEntry>,
}

impl VotingPowerSnapshot {
    /// Leaf commitments in canonical order.
    pub fn leaves(&self) -> Vec<VotingTreeNode> {
        self.entries
            .iter()
            .map(|entry| commitment::leaf(entry.power))
            .collect()
    }
}

/// Produces voting-power snapshots. How power is assigned is outside this
/// crate; implementations read it from chain state at the given block.
pub trait SnapshotSource: Send + Sync {
    fn voting_power_snapshot(&self, block_number: u64)
        -> Result<VotingPowerSnapshot, ChainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_follow_entry_order() {
        let snapshot = VotingPowerSnapshot {
            block_number: 10,
            entries: vec![
                VotingPowerEntry {
                    address: Address::new([1; 20]),
                    power: 100,
                },
                VotingPowerEntry {
                    address: Address::new([2; 20]),
                    power: 50,
                },
            ],
        };
        let leaves = snapshot.leaves();
        assert_eq!(leaves.len(), 2);
        assert_eq!(leaves[0].sum, 100);
        assert_eq!(leaves[1].sum, 50);
    }
}
