//! Deterministic in-memory backends for the chain collaborator traits.
//!
//! All external dependencies of the dispute-game tasks (verifier contract,
//! beacon client, tx submitter, voting-power source) are abstracted behind
//! traits; this crate provides implementations that are controlled
//! programmatically and never touch the network. [`NullChain`] carries the
//! full verifier-contract semantics — challenge, respond, defeat, event log —
//! so the entire bisection game can be played in-process, both by tests and
//! by the dev network.

pub mod beacon;
pub mod chain;
pub mod snapshot;
pub mod submitter;

pub use beacon::NullBeacon;
pub use chain::NullChain;
pub use snapshot::NullSnapshotSource;
pub use submitter::NullSubmitter;
