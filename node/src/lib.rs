//! The Mooring daemon runtime.
//!
//! Wires the dispute-game tasks into a long-lived loop: one tick runs the
//! verifier and then the defender to completion against a single network
//! snapshot, with a randomized pause between ticks and graceful shutdown in
//! between tasks.

pub mod config;
pub mod error;
pub mod shutdown;
pub mod task_loop;

pub use config::{NetworkId, NodeConfig};
pub use error::NodeError;
pub use shutdown::{ShutdownController, ShutdownSignal};
pub use task_loop::TaskLoop;
