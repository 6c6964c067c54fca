//! Abstract chain-client traits for the Mooring daemon.
//!
//! Every backend (a JSON-RPC transport in deployment builds, the in-memory
//! dev chain for tests and the dev network) implements these traits. The
//! dispute-game tasks depend only on the traits, never on a transport.

pub mod beacon;
pub mod error;
pub mod events;
pub mod scan;
pub mod state;
pub mod tx;
pub mod verifier;

pub use beacon::{BeaconBlock, BeaconClient, BeaconConfig};
pub use error::ChainError;
pub use events::{ChallengeSubmitted, RootSubmitted};
pub use scan::block_windows;
pub use state::{NetworkState, NetworkStateProvider, ProposalDetails};
pub use tx::{SimulationResult, TxInfo, TxOptions, TxPayload, TxSubmitter};
pub use verifier::VerifierContract;
