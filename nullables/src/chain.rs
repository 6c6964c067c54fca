//! In-memory verifier contract and chain state.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use mooring_chain::{
    BeaconConfig, ChainError, ChallengeSubmitted, NetworkState, NetworkStateProvider,
    ProposalDetails, RootSubmitted, SimulationResult, TxInfo, TxPayload, VerifierContract,
};
use mooring_proposals::commitment;
use mooring_types::{
    Address, ChallengeState, NodeIndex, ProposalId, ProposalState, Timestamp, VotingTreeNode, H256,
};

struct DevProposal {
    details: ProposalDetails,
    /// Leaf-row level of the committed tree; responses below it revert.
    depth: u32,
}

struct Inner {
    beacon_config: BeaconConfig,
    genesis_block: u64,
    block_number: u64,
    depth_per_round: u32,
    fail_rpc: bool,
    proposals: BTreeMap<ProposalId, DevProposal>,
    nodes: HashMap<(ProposalId, NodeIndex), VotingTreeNode>,
    challenge_states: HashMap<(ProposalId, NodeIndex), ChallengeState>,
    root_events: Vec<(u64, RootSubmitted)>,
    challenge_events: Vec<(u64, ChallengeSubmitted)>,
}

impl Inner {
    fn now(&self) -> Timestamp {
        let elapsed = (self.block_number - self.genesis_block) * self.beacon_config.seconds_per_slot;
        Timestamp::new(self.beacon_config.genesis_time.as_secs() + elapsed)
    }

    fn state_of(&self, proposal: ProposalId, index: NodeIndex) -> ChallengeState {
        self.challenge_states
            .get(&(proposal, index))
            .copied()
            .unwrap_or(ChallengeState::Unchallenged)
    }
}

/// An in-memory chain carrying the full dispute-game contract semantics.
///
/// One block per consensus slot, so block `genesis_block + n` is mined at
/// `genesis_time + n * seconds_per_slot`. Time only advances when the test
/// (or the dev-network ticker) calls [`NullChain::advance_slots`].
pub struct NullChain {
    inner: Mutex<Inner>,
}

impl NullChain {
    pub fn new(beacon_config: BeaconConfig, genesis_block: u64, depth_per_round: u32) -> Self {
        Self {
            inner: Mutex::new(Inner {
                beacon_config,
                genesis_block,
                block_number: genesis_block,
                depth_per_round,
                fail_rpc: false,
                proposals: BTreeMap::new(),
                nodes: HashMap::new(),
                challenge_states: HashMap::new(),
                root_events: Vec::new(),
                challenge_events: Vec::new(),
            }),
        }
    }

    /// Mine `slots` empty blocks, advancing chain time accordingly.
    pub fn advance_slots(&self, slots: u64) {
        self.inner.lock().unwrap().block_number += slots;
    }

    pub fn block_number(&self) -> u64 {
        self.inner.lock().unwrap().block_number
    }

    pub fn now(&self) -> Timestamp {
        self.inner.lock().unwrap().now()
    }

    /// Make every trait call fail with an RPC error until cleared.
    pub fn set_fail_rpc(&self, fail: bool) {
        self.inner.lock().unwrap().fail_rpc = fail;
    }

    /// Create a pending proposal committing `root` over a tree whose leaf
    /// row sits at `tree_depth`. Only the bare root claim goes on chain;
    /// deeper nodes appear as challenges are answered.
    pub fn submit_proposal(
        &self,
        id: ProposalId,
        proposer: Address,
        target_block: u64,
        challenge_window_secs: u64,
        root: VotingTreeNode,
        tree_depth: u32,
    ) {
        let mut inner = self.inner.lock().unwrap();
        let created_time = inner.now();
        inner.proposals.insert(
            id,
            DevProposal {
                details: ProposalDetails {
                    id,
                    proposer,
                    state: ProposalState::Pending,
                    created_time,
                    target_block,
                    challenge_window_secs,
                },
                depth: tree_depth,
            },
        );
        inner.nodes.insert((id, NodeIndex::ROOT), root);
    }

    pub fn proposal_state(&self, id: ProposalId) -> Option<ProposalState> {
        self.inner
            .lock()
            .unwrap()
            .proposals
            .get(&id)
            .map(|p| p.details.state)
    }

    /// Force a proposal's lifecycle state (e.g. to simulate the challenge
    /// phase ending externally).
    pub fn set_proposal_state(&self, id: ProposalId, state: ProposalState) {
        if let Some(prop) = self.inner.lock().unwrap().proposals.get_mut(&id) {
            prop.details.state = state;
        }
    }

    /// Execute a mined transaction, returning the revert reason on failure.
    pub fn apply(&self, sender: Address, payload: &TxPayload) -> Result<(), String> {
        let mut inner = self.inner.lock().unwrap();
        validate(&inner, payload)?;
        execute(&mut inner, sender, payload);
        Ok(())
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, Inner>, ChainError> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_rpc {
            return Err(ChainError::Rpc("injected RPC failure".to_string()));
        }
        Ok(inner)
    }

    fn prepare(&self, payload: TxPayload) -> Result<TxInfo, ChainError> {
        let inner = self.guard()?;
        let simulation = match validate(&inner, &payload) {
            Ok(gas) => SimulationResult::success(gas),
            Err(reason) => SimulationResult::reverted(reason),
        };
        Ok(TxInfo {
            payload,
            simulation,
        })
    }
}

/// Check a payload against current chain state, returning a gas estimate or
/// the revert reason.
fn validate(inner: &Inner, payload: &TxPayload) -> Result<u64, String> {
    match payload {
        TxPayload::CreateChallenge {
            proposal,
            index,
            node,
            witness,
        } => {
            let prop = inner
                .proposals
                .get(proposal)
                .ok_or("unknown proposal".to_string())?;
            if prop.details.state != ProposalState::Pending {
                return Err("proposal is not in the challenge phase".to_string());
            }
            if index.depth() > prop.depth {
                return Err("index is beyond the leaf row".to_string());
            }
            if inner.state_of(*proposal, *index) != ChallengeState::Unchallenged {
                return Err("index has already been challenged".to_string());
            }
            if witness.len() as u32 > index.depth() {
                return Err("witness is longer than the index's depth".to_string());
            }

            // Fold the node up through the witness; it must land exactly on
            // a node the chain has already accepted.
            let ancestor = NodeIndex::new(index.as_u64() >> witness.len())
                .ok_or("witness overshoots the root".to_string())?;
            let accepted = inner
                .nodes
                .get(&(*proposal, ancestor))
                .ok_or("witness does not reach an accepted node".to_string())?;

            let mut cursor = index.as_u64();
            let mut folded = *node;
            for sibling in witness {
                folded = if cursor % 2 == 0 {
                    commitment::parent(&folded, sibling)
                } else {
                    commitment::parent(sibling, &folded)
                };
                cursor /= 2;
            }
            if folded != *accepted {
                return Err("witness does not prove the node's position".to_string());
            }

            Ok(150_000 + 20_000 * witness.len() as u64)
        }

        TxPayload::SubmitRoot {
            proposal,
            index,
            pollard,
        } => {
            let prop = inner
                .proposals
                .get(proposal)
                .ok_or("unknown proposal".to_string())?;
            if prop.details.state != ProposalState::Pending {
                return Err("proposal is not in the challenge phase".to_string());
            }
            if inner.state_of(*proposal, *index) != ChallengeState::Challenged {
                return Err("challenge is not open".to_string());
            }

            let level = index.depth();
            if level >= prop.depth {
                return Err("no children beneath the leaf row".to_string());
            }
            let relative = inner.depth_per_round.min(prop.depth - level);
            let expected = 1usize << relative;
            if pollard.len() != expected {
                return Err(format!(
                    "pollard must span {expected} nodes, got {}",
                    pollard.len()
                ));
            }

            // The revealed row must fold back to the committed node.
            let mut row = pollard.clone();
            while row.len() > 1 {
                row = row
                    .chunks(2)
                    .map(|pair| commitment::parent(&pair[0], &pair[1]))
                    .collect();
            }
            let committed = inner
                .nodes
                .get(&(*proposal, *index))
                .ok_or("challenged node is missing".to_string())?;
            if row[0] != *committed {
                return Err("pollard does not match the committed node".to_string());
            }

            Ok(100_000 + 15_000 * pollard.len() as u64)
        }

        TxPayload::DefeatProposal { proposal, index } => {
            let prop = inner
                .proposals
                .get(proposal)
                .ok_or("unknown proposal".to_string())?;
            if prop.details.state != ProposalState::Pending {
                return Err("proposal is not in the challenge phase".to_string());
            }
            match inner.state_of(*proposal, *index) {
                ChallengeState::Challenged => {}
                ChallengeState::Unchallenged => {
                    return Err("index has not been challenged".to_string())
                }
                ChallengeState::Responded => {
                    return Err("proposer already responded".to_string())
                }
            }
            if !prop
                .details
                .created_time
                .window_elapsed(prop.details.challenge_window_secs, inner.now())
            {
                return Err("challenge window has not elapsed".to_string());
            }
            Ok(90_000)
        }
    }
}

/// Apply an already-validated payload.
fn execute(inner: &mut Inner, sender: Address, payload: &TxPayload) {
    // Transactions submitted against a head snapshot are included in the
    // following block, so incremental scans bounded by the snapshot never
    // miss them.
    let block = inner.block_number + 1;
    let timestamp = inner.now();
    match payload {
        TxPayload::CreateChallenge {
            proposal,
            index,
            node,
            ..
        } => {
            inner
                .challenge_states
                .insert((*proposal, *index), ChallengeState::Challenged);
            inner.nodes.entry((*proposal, *index)).or_insert(*node);
            inner.challenge_events.push((
                block,
                ChallengeSubmitted {
                    proposal_id: *proposal,
                    challenger: sender,
                    index: *index,
                    timestamp,
                },
            ));
        }

        TxPayload::SubmitRoot {
            proposal,
            index,
            pollard,
        } => {
            inner
                .challenge_states
                .insert((*proposal, *index), ChallengeState::Responded);

            let relative = (pollard.len() as u64).ilog2();
            for (offset, node) in pollard.iter().enumerate() {
                inner
                    .nodes
                    .insert((*proposal, index.descendant(relative, offset as u64)), *node);
            }

            let root = inner.nodes[&(*proposal, *index)];
            let tree_block_number = inner.proposals[proposal].details.target_block;
            inner.root_events.push((
                block,
                RootSubmitted {
                    proposal_id: *proposal,
                    proposer: sender,
                    tree_block_number,
                    index: *index,
                    root,
                    pollard: pollard.clone(),
                    timestamp,
                },
            ));
        }

        TxPayload::DefeatProposal { proposal, .. } => {
            if let Some(prop) = inner.proposals.get_mut(proposal) {
                prop.details.state = ProposalState::Defeated;
            }
        }
    }
}

impl VerifierContract for NullChain {
    fn depth_per_round(&self) -> Result<u32, ChainError> {
        Ok(self.guard()?.depth_per_round)
    }

    fn tree_node(
        &self,
        proposal: ProposalId,
        index: NodeIndex,
    ) -> Result<VotingTreeNode, ChainError> {
        let inner = self.guard()?;
        Ok(inner
            .nodes
            .get(&(proposal, index))
            .copied()
            .unwrap_or(VotingTreeNode::new(0, H256::ZERO)))
    }

    fn challenge_state(
        &self,
        proposal: ProposalId,
        index: NodeIndex,
    ) -> Result<ChallengeState, ChainError> {
        Ok(self.guard()?.state_of(proposal, index))
    }

    fn root_submitted_events(
        &self,
        proposals: &[ProposalId],
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RootSubmitted>, ChainError> {
        let inner = self.guard()?;
        Ok(inner
            .root_events
            .iter()
            .filter(|(block, event)| {
                (from_block..=to_block).contains(block) && proposals.contains(&event.proposal_id)
            })
            .map(|(_, event)| event.clone())
            .collect())
    }

    fn challenge_submitted_events(
        &self,
        proposals: &[ProposalId],
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<ChallengeSubmitted>, ChainError> {
        let inner = self.guard()?;
        Ok(inner
            .challenge_events
            .iter()
            .filter(|(block, event)| {
                (from_block..=to_block).contains(block) && proposals.contains(&event.proposal_id)
            })
            .map(|(_, event)| event.clone())
            .collect())
    }

    fn create_challenge(
        &self,
        proposal: ProposalId,
        index: NodeIndex,
        node: VotingTreeNode,
        witness: &[VotingTreeNode],
    ) -> Result<TxInfo, ChainError> {
        self.prepare(TxPayload::CreateChallenge {
            proposal,
            index,
            node,
            witness: witness.to_vec(),
        })
    }

    fn defeat_proposal(
        &self,
        proposal: ProposalId,
        index: NodeIndex,
    ) -> Result<TxInfo, ChainError> {
        self.prepare(TxPayload::DefeatProposal { proposal, index })
    }

    fn submit_root(
        &self,
        proposal: ProposalId,
        index: NodeIndex,
        pollard: &[VotingTreeNode],
    ) -> Result<TxInfo, ChainError> {
        self.prepare(TxPayload::SubmitRoot {
            proposal,
            index,
            pollard: pollard.to_vec(),
        })
    }
}

impl NetworkStateProvider for NullChain {
    fn latest_state(&self) -> Result<NetworkState, ChainError> {
        let inner = self.guard()?;
        Ok(NetworkState {
            el_block_number: inner.block_number,
            el_block_timestamp: inner.now(),
            beacon_config: inner.beacon_config,
            proposals: inner
                .proposals
                .values()
                .map(|p| p.details.clone())
                .collect(),
        })
    }
}
