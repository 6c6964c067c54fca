//! Deterministic beacon client.

use std::collections::HashSet;
use std::sync::Mutex;

use mooring_chain::{BeaconBlock, BeaconClient, ChainError};

/// Maps every slot to one execution block (`genesis_block + slot`), matching
/// [`crate::NullChain`]'s one-block-per-slot model. Individual slots can be
/// marked missed, and the whole client can be made to fail.
pub struct NullBeacon {
    genesis_block: u64,
    missed_slots: Mutex<HashSet<u64>>,
    fail_rpc: Mutex<bool>,
}

impl NullBeacon {
    pub fn new(genesis_block: u64) -> Self {
        Self {
            genesis_block,
            missed_slots: Mutex::new(HashSet::new()),
            fail_rpc: Mutex::new(false),
        }
    }

    /// Mark a slot as having no block.
    pub fn miss_slot(&self, slot: u64) {
        self.missed_slots.lock().unwrap().insert(slot);
    }

    pub fn set_fail_rpc(&self, fail: bool) {
        *self.fail_rpc.lock().unwrap() = fail;
    }
}

impl BeaconClient for NullBeacon {
    fn beacon_block(&self, slot: u64) -> Result<Option<BeaconBlock>, ChainError> {
        if *self.fail_rpc.lock().unwrap() {
            return Err(ChainError::Rpc("injected RPC failure".to_string()));
        }
        if self.missed_slots.lock().unwrap().contains(&slot) {
            return Ok(None);
        }
        Ok(Some(BeaconBlock {
            slot,
            execution_block_number: self.genesis_block + slot,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_map_linearly_to_blocks() {
        let beacon = NullBeacon::new(100);
        let block = beacon.beacon_block(7).unwrap().unwrap();
        assert_eq!(block.slot, 7);
        assert_eq!(block.execution_block_number, 107);
    }

    #[test]
    fn missed_slots_return_none() {
        let beacon = NullBeacon::new(0);
        beacon.miss_slot(3);
        assert!(beacon.beacon_block(3).unwrap().is_none());
        assert!(beacon.beacon_block(4).unwrap().is_some());
    }

    #[test]
    fn failure_injection() {
        let beacon = NullBeacon::new(0);
        beacon.set_fail_rpc(true);
        assert!(beacon.beacon_block(1).is_err());
    }
}
