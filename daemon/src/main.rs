//! Mooring daemon — entry point for running a staking-pool node.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use mooring_chain::{BeaconConfig, TxOptions, VerifierContract};
use mooring_node::{NetworkId, NodeConfig, ShutdownController, TaskLoop};
use mooring_nullables::{NullBeacon, NullChain, NullSnapshotSource, NullSubmitter};
use mooring_proposals::{commitment, ProposalManager, VotingTree};
use mooring_tasks::{DefendProposalsTask, VerifyProposalsTask};
use mooring_types::{Address, ProposalId, Timestamp, VotingTreeNode};

/// Tick bounds used on the dev network instead of the production interval.
const DEV_INTERVAL_MIN_SECS: u64 = 2;
const DEV_INTERVAL_MAX_SECS: u64 = 4;

#[derive(Parser)]
#[command(name = "mooring-daemon", about = "Mooring staking-pool node daemon")]
struct Cli {
    /// Network to operate against: "mainnet", "holesky", or "dev".
    /// When a config file is provided, defaults to the file's network value.
    #[arg(long, env = "MOORING_NETWORK")]
    network: Option<String>,

    /// Data directory for cached voting trees and snapshots.
    #[arg(long, default_value = "./mooring_data", env = "MOORING_DATA_DIR")]
    data_dir: PathBuf,

    /// This node's account address (`0x`-prefixed hex).
    #[arg(long, env = "MOORING_NODE_ADDRESS")]
    node_address: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "info", env = "MOORING_LOG_LEVEL")]
    log_level: String,

    /// Dev network: comma-separated per-operator voting powers.
    #[arg(long, value_delimiter = ',', default_values_t = vec![100u128, 200, 150, 50, 75, 225, 125, 300])]
    dev_powers: Vec<u128>,

    /// Dev network: leaf index the simulated proposer tampers with.
    /// Omit it to watch an honest proposal clear verification.
    #[arg(long)]
    dev_tamper_index: Option<usize>,

    /// Dev network: challenge window in seconds.
    #[arg(long, default_value_t = 600)]
    dev_challenge_window: u64,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Start the daemon.
    #[command(name = "node")]
    Node {
        #[command(subcommand)]
        action: NodeAction,
    },
}

#[derive(clap::Subcommand)]
enum NodeAction {
    /// Run the daemon task loop.
    Run,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mooring_utils::init_tracing();

    let cli = Cli::parse();

    fn parse_network(s: &str) -> Option<NetworkId> {
        match s.to_lowercase().as_str() {
            "mainnet" => Some(NetworkId::Mainnet),
            "holesky" => Some(NetworkId::Holesky),
            "dev" => Some(NetworkId::Dev),
            _ => None,
        }
    }

    let cli_network = match cli.network.as_deref() {
        Some(raw) => Some(
            parse_network(raw).ok_or_else(|| anyhow::anyhow!("unknown network '{raw}'"))?,
        ),
        None => None,
    };

    let file_config: Option<NodeConfig> = if let Some(ref config_path) = cli.config {
        match NodeConfig::from_toml_file(&config_path.display().to_string()) {
            Ok(cfg) => {
                tracing::info!("loaded config from {}", config_path.display());
                Some(cfg)
            }
            Err(e) => {
                tracing::warn!("failed to load config file: {e}, using CLI defaults");
                None
            }
        }
    } else {
        None
    };

    let config = {
        let base = file_config.unwrap_or_default();
        NodeConfig {
            network: cli_network.unwrap_or(base.network),
            data_dir: cli.data_dir.clone(),
            node_address: cli.node_address.clone().or(base.node_address),
            log_level: cli.log_level.clone(),
            ..base
        }
    };

    match &cli.command {
        Command::Node { action } => match action {
            NodeAction::Run => {
                tracing::info!(
                    network = config.network.as_str(),
                    data_dir = %config.data_dir.display(),
                    "starting Mooring daemon"
                );

                match config.network {
                    NetworkId::Dev => run_dev(&config, &cli).await?,
                    NetworkId::Mainnet | NetworkId::Holesky => {
                        anyhow::bail!(
                            "network '{}' requires an execution/beacon transport build; \
                             this build only wires the in-process dev network",
                            config.network.as_str()
                        );
                    }
                }

                tracing::info!("Mooring daemon exited cleanly");
            }
        },
    }

    Ok(())
}

/// Run the task loop against the in-process dev chain, seeded with one
/// proposal so the dispute game plays out in the logs.
async fn run_dev(config: &NodeConfig, cli: &Cli) -> anyhow::Result<()> {
    let node_address = match &config.node_address {
        Some(raw) => raw.parse::<Address>().map_err(|e| anyhow::anyhow!("{e}"))?,
        None => Address::new([0xaa; 20]),
    };
    let proposer = Address::new([0xbb; 20]);

    let beacon_config = BeaconConfig {
        genesis_time: Timestamp::new(1_606_824_023),
        seconds_per_slot: 12,
    };
    let chain = Arc::new(NullChain::new(beacon_config, 0, 1));
    let beacon = Arc::new(NullBeacon::new(0));
    let depth_per_round = chain.depth_per_round()?;

    // The simulated proposer commits its own (possibly tampered) view of the
    // voting power snapshot.
    let honest = cli.dev_powers.clone();
    let mut submitted = honest.clone();
    match cli.dev_tamper_index {
        Some(i) if i < submitted.len() => {
            submitted[i] += 1;
            tracing::info!(leaf = i, "dev proposer submits a tampered tree");
        }
        Some(i) => anyhow::bail!("--dev-tamper-index {i} is out of range"),
        None => tracing::info!("dev proposer submits an honest tree"),
    }

    let target_block = 100;
    let leaves: Vec<VotingTreeNode> = submitted.iter().map(|p| commitment::leaf(*p)).collect();
    let tree = VotingTree::from_leaves(target_block, &leaves, depth_per_round)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    chain.submit_proposal(
        ProposalId::new(1),
        proposer,
        target_block,
        cli.dev_challenge_window,
        *tree.root(),
        tree.depth(),
    );
    tracing::info!(
        proposal = 1,
        window_secs = cli.dev_challenge_window,
        "seeded dev proposal"
    );

    let tx_options: TxOptions = config.tx_options();
    let verify = VerifyProposalsTask::new(
        node_address,
        ProposalManager::new(
            Box::new(NullSnapshotSource::new(honest)),
            config.data_dir.join("cache").join("verifier"),
            depth_per_round,
        ),
        chain.clone(),
        beacon.clone(),
        Arc::new(NullSubmitter::new(chain.clone(), node_address)),
        tx_options,
        config.event_log_interval,
    );
    let defend = DefendProposalsTask::new(
        proposer,
        ProposalManager::new(
            Box::new(NullSnapshotSource::new(submitted)),
            config.data_dir.join("cache").join("proposer"),
            depth_per_round,
        ),
        chain.clone(),
        beacon,
        Arc::new(NullSubmitter::new(chain.clone(), proposer)),
        tx_options,
        config.event_log_interval,
    );

    let controller = ShutdownController::new();
    let task_loop = TaskLoop::new(
        verify,
        defend,
        chain.clone(),
        controller.signal(),
        DEV_INTERVAL_MIN_SECS,
        DEV_INTERVAL_MAX_SECS,
    );

    // Dev chain ticker: one slot per second so challenge windows actually
    // elapse while the loop runs.
    let ticker_chain = chain.clone();
    let mut ticker_shutdown = controller.signal();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(1)) => ticker_chain.advance_slots(1),
                _ = ticker_shutdown.wait() => return,
            }
        }
    });

    let loop_handle = tokio::spawn(task_loop.run());
    controller.wait_for_signal().await;
    loop_handle.await?;

    if let Some(state) = chain.proposal_state(ProposalId::new(1)) {
        tracing::info!(proposal = 1, state = ?state, "final dev proposal state");
    }
    Ok(())
}
