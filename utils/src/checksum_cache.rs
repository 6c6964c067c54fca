//! Checksummed on-disk cache for generated artifacts.
//!
//! Voting trees and voting-power snapshots are expensive to rebuild, so they
//! are cached as JSON files next to a Blake2b-256 digest sidecar. A missing,
//! corrupt, or unparseable entry loads as `None` and the caller regenerates —
//! the cache is advisory, never the source of truth.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

type Blake2b256 = Blake2b<U32>;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A directory of checksummed JSON entries keyed by name.
pub struct ChecksumCache {
    dir: PathBuf,
}

impl ChecksumCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Serialize `value` and write it with its digest sidecar.
    pub fn save<T: Serialize>(&self, name: &str, value: &T) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)?;
        let payload = serde_json::to_vec_pretty(value)?;
        fs::write(self.payload_path(name), &payload)?;
        fs::write(self.checksum_path(name), digest_hex(&payload))?;
        Ok(())
    }

    /// Load an entry, verifying its digest.
    ///
    /// Returns `None` when the entry is missing or fails verification; a
    /// corrupt entry is logged and removed so the next save starts clean.
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let payload = fs::read(self.payload_path(name)).ok()?;
        let recorded = fs::read_to_string(self.checksum_path(name)).ok()?;
        if recorded.trim() != digest_hex(&payload) {
            tracing::warn!(entry = name, "cache checksum mismatch, discarding entry");
            self.remove(name);
            return None;
        }
        match serde_json::from_slice(&payload) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(entry = name, error = %e, "cache entry unparseable, discarding");
                self.remove(name);
                None
            }
        }
    }

    /// Delete an entry and its sidecar if present.
    pub fn remove(&self, name: &str) {
        let _ = fs::remove_file(self.payload_path(name));
        let _ = fs::remove_file(self.checksum_path(name));
    }

    fn payload_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    fn checksum_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.checksum"))
    }
}

fn digest_hex(payload: &[u8]) -> String {
    let mut hasher = Blake2b256::new();
    hasher.update(payload);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Entry {
        block: u64,
        label: String,
    }

    fn sample() -> Entry {
        Entry {
            block: 42,
            label: "tree".to_string(),
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ChecksumCache::new(dir.path());
        cache.save("entry", &sample()).unwrap();
        let loaded: Entry = cache.load("entry").unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn missing_entry_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ChecksumCache::new(dir.path());
        assert!(cache.load::<Entry>("nope").is_none());
    }

    #[test]
    fn tampered_payload_is_rejected_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ChecksumCache::new(dir.path());
        cache.save("entry", &sample()).unwrap();

        let payload = dir.path().join("entry.json");
        fs::write(&payload, b"{\"block\":43,\"label\":\"tree\"}").unwrap();

        assert!(cache.load::<Entry>("entry").is_none());
        // Entry discarded entirely, not just skipped.
        assert!(!payload.exists());
    }

    #[test]
    fn missing_sidecar_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ChecksumCache::new(dir.path());
        cache.save("entry", &sample()).unwrap();
        fs::remove_file(dir.path().join("entry.checksum")).unwrap();
        assert!(cache.load::<Entry>("entry").is_none());
    }

    #[test]
    fn save_overwrites_previous_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ChecksumCache::new(dir.path());
        cache.save("entry", &sample()).unwrap();
        let updated = Entry {
            block: 43,
            label: "tree".to_string(),
        };
        cache.save("entry", &updated).unwrap();
        let loaded: Entry = cache.load("entry").unwrap();
        assert_eq!(loaded, updated);
    }
}
