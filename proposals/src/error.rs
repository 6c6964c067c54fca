use thiserror::Error;

use mooring_chain::ChainError;
use mooring_utils::CacheError;

#[derive(Debug, Error)]
pub enum ProposalError {
    #[error("cannot build a voting tree from zero leaves")]
    EmptyLeaves,

    #[error("tree index {index} is outside a tree of depth {depth}")]
    IndexOutOfRange { index: u64, depth: u32 },

    #[error("pollard size mismatch: local pollard has {local} nodes, submitted pollard has {submitted}")]
    PollardSizeMismatch { local: usize, submitted: usize },

    #[error("chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
}
