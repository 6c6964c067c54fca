//! Fundamental types for the Mooring daemon.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: hashes, addresses, timestamps, proposal/tree identifiers, the
//! voting-tree node commitment, and the on-chain lifecycle enums.

pub mod address;
pub mod error;
pub mod hash;
pub mod id;
pub mod state;
pub mod time;
pub mod tree;

pub use address::Address;
pub use error::TypeError;
pub use hash::H256;
pub use id::{NodeIndex, ProposalId};
pub use state::{ChallengeState, ProposalState};
pub use time::Timestamp;
pub use tree::VotingTreeNode;
