//! Transaction submitter that mines straight into the in-memory chain.

use std::sync::{Arc, Mutex};

use mooring_chain::{ChainError, TxInfo, TxOptions, TxPayload, TxSubmitter};
use mooring_types::Address;

use crate::chain::NullChain;

/// Applies each submitted payload to a [`NullChain`] as `sender`, recording
/// everything that was mined. A revert at apply time surfaces as a wait
/// error, exactly like a transaction failing on-chain after simulation
/// passed.
pub struct NullSubmitter {
    chain: Arc<NullChain>,
    sender: Address,
    submitted: Mutex<Vec<TxPayload>>,
}

impl NullSubmitter {
    pub fn new(chain: Arc<NullChain>, sender: Address) -> Self {
        Self {
            chain,
            sender,
            submitted: Mutex::new(Vec::new()),
        }
    }

    /// Every payload mined through this submitter, in order.
    pub fn submissions(&self) -> Vec<TxPayload> {
        self.submitted.lock().unwrap().clone()
    }
}

impl TxSubmitter for NullSubmitter {
    fn submit_batch(&self, txs: Vec<TxInfo>, _opts: &TxOptions) -> Result<(), ChainError> {
        for tx in txs {
            let tx = tx.checked()?;
            tracing::debug!(sender = %self.sender, action = %tx.payload, "mining transaction");
            self.chain
                .apply(self.sender, &tx.payload)
                .map_err(|reason| ChainError::Wait {
                    action: tx.payload.to_string(),
                    reason,
                })?;
            self.submitted.lock().unwrap().push(tx.payload);
        }
        Ok(())
    }
}
