//! Windowed, incremental event scanning and the per-proposal event caches.
//!
//! Events are immutable once mined, so both caches merge with first-write-
//! wins semantics: re-scanning an already-covered range, or seeing the same
//! event twice, leaves the cache unchanged. Entries are pruned only when a
//! proposal leaves the challenge phase. A scan failure leaves
//! `last_scanned_block` untouched so the failed range is re-covered next
//! cycle — the cache is advisory and must never go partial silently.

use std::collections::{HashMap, HashSet};

use mooring_chain::{
    block_windows, BeaconClient, ChainError, ChallengeSubmitted, NetworkState, RootSubmitted,
    VerifierContract,
};
use mooring_types::{NodeIndex, ProposalId, Timestamp};

use crate::error::TaskError;

/// Cached `RootSubmitted` events keyed by `(proposal, index)`.
#[derive(Default)]
pub struct RootSubmissionCache {
    entries: HashMap<(ProposalId, NodeIndex), RootSubmitted>,
}

impl RootSubmissionCache {
    pub fn insert(&mut self, event: RootSubmitted) {
        self.entries
            .entry((event.proposal_id, event.index))
            .or_insert(event);
    }

    pub fn get(&self, proposal: ProposalId, index: NodeIndex) -> Option<&RootSubmitted> {
        self.entries.get(&(proposal, index))
    }

    pub fn retain_proposals(&mut self, keep: &HashSet<ProposalId>) {
        self.entries.retain(|(id, _), _| keep.contains(id));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Incremental scanner that accumulates `RootSubmitted` events.
pub struct RootSubmissionScanner {
    cache: RootSubmissionCache,
    last_scanned_block: Option<u64>,
    /// Maximum blocks per log query.
    interval: u64,
}

impl RootSubmissionScanner {
    pub fn new(interval: u64) -> Self {
        Self {
            cache: RootSubmissionCache::default(),
            last_scanned_block: None,
            interval,
        }
    }

    pub fn cache(&self) -> &RootSubmissionCache {
        &self.cache
    }

    pub fn last_scanned_block(&self) -> Option<u64> {
        self.last_scanned_block
    }

    pub fn retain_proposals(&mut self, keep: &HashSet<ProposalId>) {
        self.cache.retain_proposals(keep);
    }

    /// Scan `[last_scanned + 1, head]` for events of `ids` and merge them.
    ///
    /// `earliest_created` bounds the very first scan: no event older than the
    /// earliest relevant proposal can matter, so the start block is derived
    /// from its creation time via the beacon chain.
    pub fn scan(
        &mut self,
        contract: &dyn VerifierContract,
        beacon: &dyn BeaconClient,
        state: &NetworkState,
        ids: &[ProposalId],
        earliest_created: Timestamp,
    ) -> Result<(), TaskError> {
        if ids.is_empty() {
            return Ok(());
        }

        let to_block = state.el_block_number;
        let from_block = match self.last_scanned_block {
            Some(last) => last + 1,
            None => first_relevant_block(beacon, state, earliest_created)?,
        };

        for (start, end) in block_windows(from_block, to_block, self.interval) {
            for event in contract.root_submitted_events(ids, start, end)? {
                self.cache.insert(event);
            }
        }
        self.last_scanned_block = Some(to_block);
        Ok(())
    }
}

/// Incremental scanner that accumulates `ChallengeSubmitted` events.
pub struct ChallengeScanner {
    entries: HashMap<(ProposalId, NodeIndex), ChallengeSubmitted>,
    last_scanned_block: Option<u64>,
    interval: u64,
}

impl ChallengeScanner {
    pub fn new(interval: u64) -> Self {
        Self {
            entries: HashMap::new(),
            last_scanned_block: None,
            interval,
        }
    }

    pub fn last_scanned_block(&self) -> Option<u64> {
        self.last_scanned_block
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn retain_proposals(&mut self, keep: &HashSet<ProposalId>) {
        self.entries.retain(|(id, _), _| keep.contains(id));
    }

    /// Cached challenges in deterministic `(proposal, index)` order.
    pub fn challenges(&self) -> Vec<&ChallengeSubmitted> {
        let mut all: Vec<&ChallengeSubmitted> = self.entries.values().collect();
        all.sort_by_key(|event| (event.proposal_id, event.index));
        all
    }

    /// Same contract as [`RootSubmissionScanner::scan`].
    pub fn scan(
        &mut self,
        contract: &dyn VerifierContract,
        beacon: &dyn BeaconClient,
        state: &NetworkState,
        ids: &[ProposalId],
        earliest_created: Timestamp,
    ) -> Result<(), TaskError> {
        if ids.is_empty() {
            return Ok(());
        }

        let to_block = state.el_block_number;
        let from_block = match self.last_scanned_block {
            Some(last) => last + 1,
            None => first_relevant_block(beacon, state, earliest_created)?,
        };

        for (start, end) in block_windows(from_block, to_block, self.interval) {
            for event in contract.challenge_submitted_events(ids, start, end)? {
                self.entries
                    .entry((event.proposal_id, event.index))
                    .or_insert(event);
            }
        }
        self.last_scanned_block = Some(to_block);
        Ok(())
    }
}

/// The execution block in effect when `created` was mined: creation time →
/// consensus slot → beacon block → execution block number. A missing beacon
/// block fails the scan; the next cycle retries.
fn first_relevant_block(
    beacon: &dyn BeaconClient,
    state: &NetworkState,
    created: Timestamp,
) -> Result<u64, TaskError> {
    let slot = state.beacon_config.slot_at(created);
    let block = beacon
        .beacon_block(slot)?
        .ok_or(ChainError::MissingBeaconBlock { slot })?;
    Ok(block.execution_block_number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mooring_types::{Address, VotingTreeNode, H256};

    fn event(proposal: u64, index: u64, sum: u128) -> RootSubmitted {
        RootSubmitted {
            proposal_id: ProposalId::new(proposal),
            proposer: Address::new([7; 20]),
            tree_block_number: 100,
            index: NodeIndex::new(index).unwrap(),
            root: VotingTreeNode::new(sum, H256::new([sum as u8; 32])),
            pollard: vec![],
            timestamp: Timestamp::new(0),
        }
    }

    #[test]
    fn insert_and_get() {
        let mut cache = RootSubmissionCache::default();
        cache.insert(event(1, 1, 10));
        cache.insert(event(1, 2, 20));
        cache.insert(event(2, 1, 30));

        assert_eq!(cache.len(), 3);
        let found = cache
            .get(ProposalId::new(1), NodeIndex::new(2).unwrap())
            .unwrap();
        assert_eq!(found.root.sum, 20);
        assert!(cache
            .get(ProposalId::new(3), NodeIndex::ROOT)
            .is_none());
    }

    #[test]
    fn duplicate_insert_keeps_the_first_entry() {
        let mut cache = RootSubmissionCache::default();
        cache.insert(event(1, 1, 10));
        cache.insert(event(1, 1, 99));

        assert_eq!(cache.len(), 1);
        let found = cache.get(ProposalId::new(1), NodeIndex::ROOT).unwrap();
        assert_eq!(found.root.sum, 10);
    }

    #[test]
    fn retain_prunes_whole_proposals() {
        let mut cache = RootSubmissionCache::default();
        cache.insert(event(1, 1, 10));
        cache.insert(event(1, 2, 20));
        cache.insert(event(2, 1, 30));

        let keep: HashSet<ProposalId> = [ProposalId::new(2)].into_iter().collect();
        cache.retain_proposals(&keep);

        assert_eq!(cache.len(), 1);
        assert!(cache.get(ProposalId::new(1), NodeIndex::ROOT).is_none());
        assert!(cache.get(ProposalId::new(2), NodeIndex::ROOT).is_some());
    }
}
