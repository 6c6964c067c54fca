//! The defender task: answer challenges against this node's own proposals.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use mooring_chain::{
    BeaconClient, ChallengeSubmitted, NetworkState, ProposalDetails, TxInfo, TxOptions,
    TxSubmitter, VerifierContract,
};
use mooring_proposals::ProposalManager;
use mooring_types::{Address, ChallengeState, NodeIndex, ProposalId};

use crate::error::TaskError;
use crate::event_cache::ChallengeScanner;

/// Watches for `ChallengeSubmitted` events against the node's own pending
/// proposals and answers each open challenge with the pollard beneath the
/// challenged index. Responding before the challenge window lapses is a hard
/// deadline — an unanswered challenge lets any verifier defeat the proposal.
pub struct DefendProposalsTask {
    node_address: Address,
    manager: ProposalManager,
    contract: Arc<dyn VerifierContract>,
    beacon: Arc<dyn BeaconClient>,
    submitter: Arc<dyn TxSubmitter>,
    tx_options: TxOptions,
    scanner: ChallengeScanner,
}

impl DefendProposalsTask {
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
            scanner: ChallengeScanner::new(event_log_interval),
        }
    }

    /// Number of challenges currently cached.
    pub fn cached_challenges(&self) -> usize {
        self.scanner.len()
    }

    /// One defense cycle over the given state snapshot.
    pub fn run(&mut self, state: &NetworkState) -> Result<(), TaskError> {
        tracing::info!("checking for Protocol DAO proposal challenges to defend");

        let eligible: Vec<&ProposalDetails> = state
            .proposals
            .iter()
            .filter(|p| p.state.is_challengeable() && p.proposer == self.node_address)
            .collect();

        let keep: HashSet<ProposalId> = eligible.iter().map(|p| p.id).collect();
        self.scanner.retain_proposals(&keep);
        if eligible.is_empty() {
            return Ok(());
        }

        let ids: Vec<ProposalId> = eligible.iter().map(|p| p.id).collect();
        let earliest_created = eligible
            .iter()
            .map(|p| p.created_time)
            .min()
            .expect("eligible set is non-empty");
        self.scanner
            .scan(&*self.contract, &*self.beacon, state, &ids, earliest_created)?;

        let by_id: HashMap<ProposalId, &ProposalDetails> =
            eligible.iter().map(|p| (p.id, *p)).collect();

        // Clone out of the cache so the scanner isn't borrowed while the
        // manager builds trees below.
        let challenges: Vec<ChallengeSubmitted> =
            self.scanner.challenges().into_iter().cloned().collect();

        let mut txs: Vec<TxInfo> = Vec::new();
        for event in &challenges {
            let Some(prop) = by_id.get(&event.proposal_id) else {
                continue;
            };

            // Only answer challenges that are still open; anything already
            // responded to (this cycle included) is settled on-chain.
            if self.contract.challenge_state(event.proposal_id, event.index)?
                != ChallengeState::Challenged
            {
                continue;
            }

            tracing::info!(
                proposal = %event.proposal_id,
                index = %event.index,
                challenger = %event.challenger,
                "responding to challenge"
            );
            match self.respond(prop, event.index) {
                Ok(tx) => txs.push(tx),
                Err(e) if e.is_cycle_fatal() => return Err(e),
                Err(e) => {
                    tracing::error!(
                        proposal = %event.proposal_id,
                        index = %event.index,
                        error = %e,
                        "failed to prepare challenge response, retrying next cycle"
                    );
                }
            }
        }

        if txs.is_empty() {
            return Ok(());
        }
        self.submitter.submit_batch(txs, &self.tx_options)?;
        tracing::info!("successfully submitted all challenge responses");
        Ok(())
    }

    /// Prepare the `SubmitRoot` answering a challenge at `index`.
    fn respond(&mut self, prop: &ProposalDetails, index: NodeIndex) -> Result<TxInfo, TaskError> {
        let (_, pollard) = self
            .manager
            .artifacts_for_challenge_response(prop.target_block, index)?;
        Ok(self
            .contract
            .submit_root(prop.id, index, &pollard)?
            .checked()?)
    }
}
