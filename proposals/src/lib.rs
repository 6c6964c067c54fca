//! Voting trees and proposal artifacts for the Protocol DAO dispute game.
//!
//! A proposal commits to a complete binary Merkle tree whose leaves carry
//! per-node voting power at a snapshot block. This crate builds that tree
//! locally, generates the pollards and Merkle witnesses the dispute game
//! exchanges, and locates the first index where a submitted pollard diverges
//! from the locally derived one.

pub mod commitment;
pub mod error;
pub mod manager;
pub mod snapshot;
pub mod tree;

pub use error::ProposalError;
pub use manager::ProposalManager;
pub use snapshot::{SnapshotSource, VotingPowerEntry, VotingPowerSnapshot};
pub use tree::{Divergence, VotingTree};
