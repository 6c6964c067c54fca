//! Daemon configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use mooring_chain::TxOptions;

use crate::error::NodeError;

/// Which network the daemon operates against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    Mainnet,
    Holesky,
    /// In-process chain backends; used for tests and local simulation.
    Dev,
}

impl NetworkId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Holesky => "holesky",
            Self::Dev => "dev",
        }
    }
}

/// Configuration for the Mooring daemon.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Which network to operate against.
    #[serde(default = "default_network")]
    pub network: NetworkId,

    /// Data directory for cached trees and snapshots.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// This node's account address (`0x`-prefixed hex). The dev network
    /// derives one when unset.
    #[serde(default)]
    pub node_address: Option<String>,

    /// Maximum blocks covered by one event-log query.
    #[serde(default = "default_event_log_interval")]
    pub event_log_interval: u64,

    /// Lower bound of the randomized pause between task-loop ticks.
    #[serde(default = "default_interval_min_secs")]
    pub interval_min_secs: u64,

    /// Upper bound of the randomized pause between task-loop ticks.
    #[serde(default = "default_interval_max_secs")]
    pub interval_max_secs: u64,

    /// Max fee applied to automatic transactions, in gwei (0 = estimate).
    #[serde(default)]
    pub max_fee_gwei: f64,

    /// Priority fee applied to automatic transactions, in gwei.
    #[serde(default = "default_max_priority_fee_gwei")]
    pub max_priority_fee_gwei: f64,

    /// Automatic transactions are withheld while the network fee exceeds
    /// this, in gwei.
    #[serde(default = "default_gas_threshold_gwei")]
    pub gas_threshold_gwei: f64,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_network() -> NetworkId {
    NetworkId::Dev
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./mooring_data")
}

fn default_event_log_interval() -> u64 {
    1000
}

fn default_interval_min_secs() -> u64 {
    240
}

fn default_interval_max_secs() -> u64 {
    360
}

fn default_max_priority_fee_gwei() -> f64 {
    2.0
}

fn default_gas_threshold_gwei() -> f64 {
    100.0
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        let config: Self = toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))?;
        if config.interval_min_secs > config.interval_max_secs {
            return Err(NodeError::Config(format!(
                "interval_min_secs ({}) exceeds interval_max_secs ({})",
                config.interval_min_secs, config.interval_max_secs
            )));
        }
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("NodeConfig is always serializable to TOML")
    }

    /// The fee configuration handed to the transaction submitter.
    pub fn tx_options(&self) -> TxOptions {
        TxOptions {
            max_fee_gwei: self.max_fee_gwei,
            max_priority_fee_gwei: self.max_priority_fee_gwei,
            gas_threshold_gwei: self.gas_threshold_gwei,
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            data_dir: default_data_dir(),
            node_address: None,
            event_log_interval: default_event_log_interval(),
            interval_min_secs: default_interval_min_secs(),
            interval_max_secs: default_interval_max_secs(),
            max_fee_gwei: 0.0,
            max_priority_fee_gwei: default_max_priority_fee_gwei(),
            gas_threshold_gwei: default_gas_threshold_gwei(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = NodeConfig::default();
        let toml_str = config.to_toml_string();
        let parsed = NodeConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.network, config.network);
        assert_eq!(parsed.event_log_interval, config.event_log_interval);
        assert_eq!(parsed.interval_min_secs, config.interval_min_secs);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = NodeConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.network, NetworkId::Dev);
        assert_eq!(config.event_log_interval, 1000);
        assert_eq!(config.interval_min_secs, 240);
        assert_eq!(config.interval_max_secs, 360);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            network = "holesky"
            event_log_interval = 500
        "#;
        let config = NodeConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.network, NetworkId::Holesky);
        assert_eq!(config.event_log_interval, 500);
        assert_eq!(config.log_level, "info"); // default
    }

    #[test]
    fn inverted_interval_bounds_are_rejected() {
        let toml = r#"
            interval_min_secs = 400
            interval_max_secs = 300
        "#;
        let err = NodeConfig::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, NodeError::Config(_)));
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = NodeConfig::from_toml_file("/nonexistent/mooring.toml");
        assert!(matches!(result, Err(NodeError::Config(_))));
    }

    #[test]
    fn tx_options_mirror_the_fee_fields() {
        let mut config = NodeConfig::default();
        config.max_fee_gwei = 30.0;
        config.max_priority_fee_gwei = 1.5;
        let opts = config.tx_options();
        assert_eq!(opts.max_fee_gwei, 30.0);
        assert_eq!(opts.max_priority_fee_gwei, 1.5);
        assert_eq!(opts.gas_threshold_gwei, 100.0);
    }
}
