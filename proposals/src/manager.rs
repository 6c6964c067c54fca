//! Builds and caches voting trees and produces dispute-game artifacts.

use std::collections::HashMap;
use std::path::Path;

use mooring_chain::RootSubmitted;
use mooring_types::{NodeIndex, VotingTreeNode};
use mooring_utils::ChecksumCache;

use crate::error::ProposalError;
use crate::snapshot::{SnapshotSource, VotingPowerSnapshot};
use crate::tree::{Divergence, VotingTree};

/// Builds the local voting tree for any snapshot block and answers the
/// dispute game's three questions: does the root match, where does a
/// submitted pollard diverge, and what pollard answers a challenge.
///
/// Trees and snapshots are cached on disk (checksummed) and memoized in
/// memory; both caches are advisory and rebuilt on any miss.
pub struct ProposalManager {
    source: Box<dyn SnapshotSource>,
    cache: ChecksumCache,
    depth_per_round: u32,
    trees: HashMap<u64, VotingTree>,
}

impl ProposalManager {
    pub fn new(
        source: Box<dyn SnapshotSource>,
        cache_dir: impl AsRef<Path>,
        depth_per_round: u32,
    ) -> Self {
        Self {
            source,
            cache: ChecksumCache::new(cache_dir.as_ref()),
            depth_per_round,
            trees: HashMap::new(),
        }
    }

    /// The local voting tree for `block_number`.
    pub fn network_tree(&mut self, block_number: u64) -> Result<&VotingTree, ProposalError> {
        if !self.trees.contains_key(&block_number) {
            let tree = self.load_or_build_tree(block_number)?;
            self.trees.insert(block_number, tree);
        }
        Ok(&self.trees[&block_number])
    }

    /// Whether the locally derived root matches an on-chain commitment.
    pub fn root_matches(
        &mut self,
        block_number: u64,
        submitted_root: &VotingTreeNode,
    ) -> Result<bool, ProposalError> {
        Ok(self.network_tree(block_number)?.root() == submitted_root)
    }

    /// Locate the first divergence beneath a cached root submission, with
    /// the challenged node and its position witness.
    pub fn check_for_challengeable_artifacts(
        &mut self,
        event: &RootSubmitted,
    ) -> Result<Divergence, ProposalError> {
        self.network_tree(event.tree_block_number)?
            .check_for_divergence(event.index, &event.pollard)
    }

    /// The root node and pollard answering a challenge at `index`.
    pub fn artifacts_for_challenge_response(
        &mut self,
        block_number: u64,
        index: NodeIndex,
    ) -> Result<(VotingTreeNode, Vec<VotingTreeNode>), ProposalError> {
        self.network_tree(block_number)?.pollard(index)
    }

    fn load_or_build_tree(&mut self, block_number: u64) -> Result<VotingTree, ProposalError> {
        let entry = format!("network-tree-{block_number}");
        if let Some(tree) = self.cache.load::<VotingTree>(&entry) {
            return Ok(tree);
        }

        tracing::info!(block = block_number, "building network voting tree");
        let snapshot = self.snapshot(block_number)?;
        let tree = VotingTree::from_leaves(block_number, &snapshot.leaves(), self.depth_per_round)?;
        self.cache.save(&entry, &tree)?;
        Ok(tree)
    }

    fn snapshot(&mut self, block_number: u64) -> Result<VotingPowerSnapshot, ProposalError> {
        let entry = format!("voting-power-{block_number}");
        if let Some(snapshot) = self.cache.load::<VotingPowerSnapshot>(&entry) {
            return Ok(snapshot);
        }

        tracing::info!(block = block_number, "creating voting power snapshot");
        let snapshot = self.source.voting_power_snapshot(block_number)?;
        self.cache.save(&entry, &snapshot)?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::VotingPowerEntry;
    use mooring_chain::ChainError;
    use mooring_types::{Address, ProposalId, Timestamp};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSource {
        powers: Vec<u128>,
        calls: Arc<AtomicUsize>,
    }

    impl SnapshotSource for CountingSource {
        fn voting_power_snapshot(
            &self,
            block_number: u64,
        ) -> Result<VotingPowerSnapshot, ChainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
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

    fn manager_with(powers: Vec<u128>, dir: &Path) -> (ProposalManager, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = CountingSource {
            powers,
            calls: calls.clone(),
        };
        (ProposalManager::new(Box::new(source), dir, 1), calls)
    }

    #[test]
    fn builds_tree_once_per_block() {
        let dir = tempfile::tempdir().unwrap();
        let (mut mgr, calls) = manager_with(vec![1, 2, 3, 4], dir.path());

        let root = *mgr.network_tree(50).unwrap().root();
        assert_eq!(root.sum, 10);
        let again = *mgr.network_tree(50).unwrap().root();
        assert_eq!(again, root);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn disk_cache_survives_a_new_manager() {
        let dir = tempfile::tempdir().unwrap();
        let (mut first, _) = manager_with(vec![1, 2, 3, 4], dir.path());
        let root = *first.network_tree(50).unwrap().root();

        let (mut second, calls) = manager_with(vec![1, 2, 3, 4], dir.path());
        assert_eq!(*second.network_tree(50).unwrap().root(), root);
        // Served entirely from disk.
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn root_matches_detects_tampering() {
        let dir = tempfile::tempdir().unwrap();
        let (mut mgr, _) = manager_with(vec![1, 2, 3, 4], dir.path());
        let honest_root = *mgr.network_tree(50).unwrap().root();
        assert!(mgr.root_matches(50, &honest_root).unwrap());

        let mut tampered = honest_root;
        tampered.sum += 1;
        assert!(!mgr.root_matches(50, &tampered).unwrap());
    }

    #[test]
    fn challengeable_artifacts_flow_through_the_event() {
        let dir = tempfile::tempdir().unwrap();
        let honest_dir = tempfile::tempdir().unwrap();
        let (mut dishonest, _) = manager_with(vec![1, 9, 3, 4], dir.path());
        let (mut honest, _) = manager_with(vec![1, 2, 3, 4], honest_dir.path());

        let (root, pollard) = dishonest.artifacts_for_challenge_response(50, NodeIndex::ROOT).unwrap();
        let event = RootSubmitted {
            proposal_id: ProposalId::new(1),
            proposer: Address::new([9; 20]),
            tree_block_number: 50,
            index: NodeIndex::ROOT,
            root,
            pollard,
            timestamp: Timestamp::new(0),
        };

        match honest.check_for_challengeable_artifacts(&event).unwrap() {
            Divergence::Diverged { index, .. } => {
                assert_eq!(index, NodeIndex::new(2).unwrap());
            }
            Divergence::NoDivergence => panic!("tampered tree must diverge"),
        }
    }
}
