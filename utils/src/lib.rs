//! Shared utilities for the Mooring daemon.

pub mod checksum_cache;
pub mod logging;

pub use checksum_cache::{CacheError, ChecksumCache};
pub use logging::init_tracing;
