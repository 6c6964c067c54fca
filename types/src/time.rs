//! Timestamp type used throughout the daemon.
//!
//! Timestamps are Unix epoch seconds (UTC). Protocol timing (the challenge
//! window) is always computed from on-chain timestamps carried in the network
//! state snapshot, never from the local clock.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A Unix timestamp in seconds since epoch (UTC).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Seconds elapsed since this timestamp (relative to `now`).
    pub fn elapsed_since(&self, now: Timestamp) -> u64 {
        now.0.saturating_sub(self.0)
    }

    /// Whether the window starting at this timestamp has fully elapsed.
    ///
    /// The boundary is strict: a window of `W` seconds starting at `T` has
    /// elapsed only once `now > T + W`. At exactly `T + W` it has not.
    pub fn window_elapsed(&self, window_secs: u64, now: Timestamp) -> bool {
        now.0 > self.0.saturating_add(window_secs)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_since_saturates() {
        let later = Timestamp::new(100);
        let earlier = Timestamp::new(50);
        assert_eq!(earlier.elapsed_since(later), 50);
        assert_eq!(later.elapsed_since(earlier), 0);
    }

    #[test]
    fn window_boundary_is_strict() {
        let created = Timestamp::new(1000);
        assert!(!created.window_elapsed(3600, Timestamp::new(4599)));
        assert!(!created.window_elapsed(3600, Timestamp::new(4600)));
        assert!(created.window_elapsed(3600, Timestamp::new(4601)));
    }

    #[test]
    fn window_elapsed_saturates_at_max() {
        let created = Timestamp::new(u64::MAX - 10);
        assert!(!created.window_elapsed(100, Timestamp::new(u64::MAX)));
    }
}
