use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    /// A transport-level failure. Always treated as transient and retried
    /// next cycle.
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("beacon block at slot {slot} was missing")]
    MissingBeaconBlock { slot: u64 },

    #[error("simulating {action} failed: {reason}")]
    Simulation { action: String, reason: String },

    #[error("waiting for {action} to be mined failed: {reason}")]
    Wait { action: String, reason: String },
}
