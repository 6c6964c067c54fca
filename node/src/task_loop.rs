//! The sequential daemon task loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use mooring_chain::NetworkStateProvider;
use mooring_tasks::{DefendProposalsTask, VerifyProposalsTask};

use crate::shutdown::ShutdownSignal;

/// Runs the dispute-game tasks sequentially on a randomized interval.
///
/// Each tick snapshots the network state once and runs the verifier, then
/// the defender, to completion against it — no concurrent invocations of the
/// same task. Task failures are logged and retried next tick; the loop
/// itself only stops on shutdown.
pub struct TaskLoop {
    verify: VerifyProposalsTask,
    defend: DefendProposalsTask,
    state_provider: Arc<dyn NetworkStateProvider>,
    shutdown: ShutdownSignal,
    interval_min_secs: u64,
    interval_max_secs: u64,
    /// Ticks complete synchronously, so this latch should never be observed
    /// set; it guards against overlapping invocations all the same.
    tick_running: AtomicBool,
}

impl TaskLoop {
    pub fn new(
        verify: VerifyProposalsTask,
        defend: DefendProposalsTask,
        state_provider: Arc<dyn NetworkStateProvider>,
        shutdown: ShutdownSignal,
        interval_min_secs: u64,
        interval_max_secs: u64,
    ) -> Self {
        Self {
            verify,
            defend,
            state_provider,
            shutdown,
            interval_min_secs,
            interval_max_secs,
            tick_running: AtomicBool::new(false),
        }
    }

    /// Run ticks until shutdown. The first tick runs immediately.
    pub async fn run(mut self) {
        loop {
            self.run_once();

            let pause = self.next_pause();
            tracing::debug!(seconds = pause.as_secs(), "sleeping until next task cycle");
            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                _ = self.shutdown.wait() => {
                    tracing::info!("task loop stopping");
                    return;
                }
            }
        }
    }

    /// Execute one tick: snapshot the state and run both tasks against it.
    pub fn run_once(&mut self) {
        if self.tick_running.swap(true, Ordering::SeqCst) {
            tracing::warn!("previous tick still running, skipping this one");
            return;
        }
        self.tick();
        self.tick_running.store(false, Ordering::SeqCst);
    }

    fn tick(&mut self) {
        let state = match self.state_provider.latest_state() {
            Ok(state) => state,
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch network state, retrying next cycle");
                return;
            }
        };

        if let Err(e) = self.verify.run(&state) {
            tracing::error!(task = "verify-proposals", error = %e, "task failed");
        }

        // Shutdown is honored between tasks, never mid-task.
        if self.shutdown.is_shutdown() {
            return;
        }

        if let Err(e) = self.defend.run(&state) {
            tracing::error!(task = "defend-proposals", error = %e, "task failed");
        }
    }

    fn next_pause(&self) -> Duration {
        let secs = rand::thread_rng().gen_range(self.interval_min_secs..=self.interval_max_secs);
        Duration::from_secs(secs)
    }
}
