//! The verifier task: challenge dishonest proposals, defeat unresponsive ones.

use std::collections::HashSet;
use std::sync::Arc;

use mooring_chain::{
    BeaconClient, NetworkState, ProposalDetails, TxInfo, TxOptions, TxSubmitter, VerifierContract,
};
use mooring_proposals::{Divergence, ProposalManager};
use mooring_types::{Address, ChallengeState, NodeIndex, ProposalId};

use crate::error::TaskError;
use crate::event_cache::RootSubmissionScanner;

/// Checks every pending Protocol DAO proposal made by other nodes against
/// the locally derived voting tree and plays the verifier side of the
/// bisection game: challenge the first diverging index, recurse through
/// answered challenges, and defeat the proposal once the challenge window
/// lapses without a response.
pub struct VerifyProposalsTask {
    node_address: Address,
    manager: ProposalManager,
    contract: Arc<dyn VerifierContract>,
    beacon: Arc<dyn BeaconClient>,
    submitter: Arc<dyn TxSubmitter>,
    tx_options: TxOptions,
    /// Proposals whose root already matched locally; skipped until pruned.
    valid_props: HashSet<ProposalId>,
    scanner: RootSubmissionScanner,
}

impl VerifyProposalsTask {
    pub fn new(
        node_address: Address,
        manager: ProposalManager,
        contract: Arc<dyn VerifierContract>,
        beacon: Arc<dyn BeaconClient>,
        submitter: Arc<dyn TxSubmitter>,
        tx_options: TxOptions,
        event_log_interval: u64,
    ) -> Self {
        Self {
            node_address,
            manager,
            contract,
            beacon,
            submitter,
            tx_options,
            valid_props: HashSet::new(),
            scanner: RootSubmissionScanner::new(event_log_interval),
        }
    }

    /// Number of root submissions currently cached.
    pub fn cached_root_submissions(&self) -> usize {
        self.scanner.cache().len()
    }

    /// One verification cycle over the given state snapshot.
    pub fn run(&mut self, state: &NetworkState) -> Result<(), TaskError> {
        tracing::info!("checking for Protocol DAO proposals to challenge");

        let eligible = self.eligible_proposals(state);
        if eligible.is_empty() {
            return Ok(());
        }

        let mismatching = self.mismatching_proposals(&eligible)?;
        if mismatching.is_empty() {
            return Ok(());
        }

        // Pull every root submission mined since the last scan into the
        // cache before walking any tree.
        let ids: Vec<ProposalId> = mismatching.iter().map(|p| p.id).collect();
        let earliest_created = mismatching
            .iter()
            .map(|p| p.created_time)
            .min()
            .expect("mismatching set is non-empty");
        self.scanner
            .scan(&*self.contract, &*self.beacon, state, &ids, earliest_created)?;

        let mut txs: Vec<TxInfo> = Vec::new();
        for prop in &mismatching {
            match self.challenge_or_defeat(prop, state) {
                Ok(Some(tx)) => txs.push(tx),
                Ok(None) => {}
                Err(e) if e.is_cycle_fatal() => return Err(e),
                Err(e) => {
                    tracing::error!(
                        proposal = %prop.id,
                        error = %e,
                        "skipping proposal until next cycle"
                    );
                }
            }
        }

        if txs.is_empty() {
            return Ok(());
        }
        self.submitter.submit_batch(txs, &self.tx_options)?;
        tracing::info!("successfully submitted all transactions");
        Ok(())
    }

    /// Pending proposals made by other nodes. Everything else is pruned from
    /// the caches — once a proposal leaves the challenge phase it can never
    /// re-enter the game.
    fn eligible_proposals<'a>(&mut self, state: &'a NetworkState) -> Vec<&'a ProposalDetails> {
        let eligible: Vec<&ProposalDetails> = state
            .proposals
            .iter()
            .filter(|p| p.state.is_challengeable() && p.proposer != self.node_address)
            .collect();

        let keep: HashSet<ProposalId> = eligible.iter().map(|p| p.id).collect();
        self.valid_props.retain(|id| keep.contains(id));
        self.scanner.retain_proposals(&keep);
        eligible
    }

    /// Compare each proposal's on-chain root against the local tree, caching
    /// the ones that match so they are never rebuilt.
    fn mismatching_proposals<'a>(
        &mut self,
        eligible: &[&'a ProposalDetails],
    ) -> Result<Vec<&'a ProposalDetails>, TaskError> {
        let mut mismatching = Vec::new();
        for prop in eligible {
            if self.valid_props.contains(&prop.id) {
                continue;
            }

            let submitted_root = self.contract.tree_node(prop.id, NodeIndex::ROOT)?;
            if self.manager.root_matches(prop.target_block, &submitted_root)? {
                tracing::info!(
                    proposal = %prop.id,
                    "proposal matches the local tree artifacts, no challenge needed"
                );
                self.valid_props.insert(prop.id);
            } else {
                tracing::info!(
                    proposal = %prop.id,
                    "proposal does not match the local tree artifacts and must be challenged"
                );
                mismatching.push(*prop);
            }
        }
        Ok(mismatching)
    }

    /// Walk down the proposal's tree and decide this cycle's action: a
    /// challenge at the deepest known divergence, a defeat once the window
    /// lapsed on an unanswered challenge, or nothing while waiting on the
    /// proposer.
    ///
    /// The disputed index starts at the root (its claim read straight off the
    /// contract, witnessed trivially). Every answered challenge yields a
    /// `RootSubmitted` event whose pollard the divergence locator compares
    /// against the local tree, moving the dispute to a strictly deeper index.
    /// The loop is therefore bounded by the tree depth; exceeding the bound
    /// means the descent stopped making progress, which is an invariant
    /// violation.
    fn challenge_or_defeat(
        &mut self,
        prop: &ProposalDetails,
        state: &NetworkState,
    ) -> Result<Option<TxInfo>, TaskError> {
        let depth = self.manager.network_tree(prop.target_block)?.depth();

        // The disputed index, the submitted node claimed there, and the
        // witness that would accompany a challenge against it.
        let mut target = NodeIndex::ROOT;
        let mut node = self.contract.tree_node(prop.id, NodeIndex::ROOT)?;
        let mut witness = Vec::new();

        for _ in 0..=depth {
            match self.contract.challenge_state(prop.id, target)? {
                ChallengeState::Unchallenged => {
                    tracing::info!(proposal = %prop.id, index = %target, "creating challenge");
                    let tx = self
                        .contract
                        .create_challenge(prop.id, target, node, &witness)?
                        .checked()?;
                    return Ok(Some(tx));
                }
                ChallengeState::Challenged => {
                    if prop
                        .created_time
                        .window_elapsed(prop.challenge_window_secs, state.el_block_timestamp)
                    {
                        tracing::info!(
                            proposal = %prop.id,
                            index = %target,
                            "challenge window lapsed without a response, defeating proposal"
                        );
                        let tx = self.contract.defeat_proposal(prop.id, target)?.checked()?;
                        return Ok(Some(tx));
                    }
                    tracing::info!(
                        proposal = %prop.id,
                        index = %target,
                        "proposal has already been challenged, waiting for proposer to respond"
                    );
                    return Ok(None);
                }
                ChallengeState::Responded => {
                    // The proposer answered with the pollard beneath
                    // `target`; locate the next divergence inside it.
                    let event = self
                        .scanner
                        .cache()
                        .get(prop.id, target)
                        .ok_or(TaskError::MissingRootSubmission {
                            proposal: prop.id,
                            index: target,
                        })?
                        .clone();

                    match self.manager.check_for_challengeable_artifacts(&event)? {
                        Divergence::NoDivergence => {
                            tracing::info!(
                                proposal = %prop.id,
                                index = %target,
                                "check showed no challengeable artifacts"
                            );
                            return Ok(None);
                        }
                        Divergence::Diverged {
                            index,
                            node: submitted,
                            witness: proof,
                        } => {
                            if index == target {
                                return Err(TaskError::DescentCycle {
                                    proposal: prop.id,
                                    index,
                                });
                            }
                            target = index;
                            node = submitted;
                            witness = proof;
                        }
                    }
                }
            }
        }

        Err(TaskError::DescentDepthExceeded {
            proposal: prop.id,
            depth,
        })
    }
}
