//! The Protocol DAO dispute-game tasks.
//!
//! Two symmetric background tasks drive the bisection game over a proposal's
//! committed voting tree:
//!
//! - [`VerifyProposalsTask`] runs from the perspective of a non-proposing
//!   oDAO member: it compares every pending proposal's submitted tree against
//!   the locally derived one, challenges the first diverging index, and
//!   defeats proposals whose challenges go unanswered past the window.
//! - [`DefendProposalsTask`] runs from the proposer's perspective: it watches
//!   for challenges against the node's own proposals and answers each with
//!   the pollard beneath the challenged index.
//!
//! Both tasks are fed a read-only [`mooring_chain::NetworkState`] snapshot
//! per cycle and keep only advisory caches between cycles.

pub mod defend;
pub mod error;
pub mod event_cache;
pub mod verify;

pub use defend::DefendProposalsTask;
pub use error::TaskError;
pub use event_cache::{ChallengeScanner, RootSubmissionCache, RootSubmissionScanner};
pub use verify::VerifyProposalsTask;
