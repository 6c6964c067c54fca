use thiserror::Error;

use mooring_chain::ChainError;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("config error: {0}")]
    Config(String),

    #[error("chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
