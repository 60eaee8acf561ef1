//! Drives the cosmetic stage sequence alongside one real remote call.

use std::{future::Future, time::Duration};

use tokio::time::{interval_at, sleep, sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::{
    error::{ClientError, RunError},
    progress::{advance, complete_all, current_index, reset, Stage, StagePlan},
};

pub const DEFAULT_STAGE_INTERVAL: Duration = Duration::from_millis(3500);
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatorConfig {
    pub interval: Duration,
    pub settle_delay: Duration,
    /// `None` waits for the remote call indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_STAGE_INTERVAL,
            settle_delay: DEFAULT_SETTLE_DELAY,
            timeout: None,
        }
    }
}

/// Receives every visible change of the stage list during a run.
pub trait ProgressListener: Send {
    fn on_stages(&mut self, stages: &[Stage]);
}

impl<F> ProgressListener for F
where
    F: FnMut(&[Stage]) + Send,
{
    fn on_stages(&mut self, stages: &[Stage]) {
        self(stages)
    }
}

pub struct NoopListener;

impl ProgressListener for NoopListener {
    fn on_stages(&mut self, _stages: &[Stage]) {}
}

#[derive(Debug, Clone)]
pub struct ProgressSimulator {
    plan: StagePlan,
    config: SimulatorConfig,
}

impl ProgressSimulator {
    pub fn new(plan: StagePlan, config: SimulatorConfig) -> Self {
        Self { plan, config }
    }

    pub fn plan(&self) -> &StagePlan {
        &self.plan
    }

    pub fn config(&self) -> SimulatorConfig {
        self.config
    }

    /// Runs `operation` to completion while stepping the stage list on a fixed
    /// interval.
    ///
    /// On success every stage is marked completed, the settle delay elapses and
    /// the operation's value is returned. On failure or timeout the stages are
    /// reset to pending before the error is returned. The interval timer only
    /// lives inside this future, so dropping it stops the timer as well.
    pub async fn run<T, Fut>(
        &self,
        operation: Fut,
        listener: &mut dyn ProgressListener,
    ) -> Result<T, RunError>
    where
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let started = Instant::now();
        let mut stages = self.plan.start();
        listener.on_stages(&stages);

        let period = self.config.interval.max(Duration::from_millis(1));
        let mut ticker = interval_at(started + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let deadline = self.config.timeout.map(|limit| (started + limit, limit));
        let expiry = async move {
            match deadline {
                Some((at, limit)) => {
                    sleep_until(at).await;
                    limit
                }
                None => std::future::pending().await,
            }
        };

        tokio::pin!(operation);
        tokio::pin!(expiry);

        let outcome = loop {
            tokio::select! {
                biased;
                result = &mut operation => break result.map_err(RunError::from),
                limit = &mut expiry => break Err(RunError::TimedOut(limit)),
                _ = ticker.tick() => {
                    let next = advance(&stages);
                    if next != stages {
                        stages = next;
                        debug!(
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            stage = ?current_index(&stages).map(|i| stages[i].id.as_str()),
                            "advanced progress stage"
                        );
                        listener.on_stages(&stages);
                    }
                }
            }
        };
        drop(ticker);

        match outcome {
            Ok(value) => {
                stages = complete_all(&stages);
                listener.on_stages(&stages);
                info!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "remote operation settled; holding completed stages"
                );
                sleep(self.config.settle_delay).await;
                Ok(value)
            }
            Err(err) => {
                stages = reset(&stages);
                listener.on_stages(&stages);
                warn!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "remote operation failed; progress reset: {err}"
                );
                Err(err)
            }
        }
    }
}

impl Default for ProgressSimulator {
    fn default() -> Self {
        Self::new(StagePlan::default(), SimulatorConfig::default())
    }
}

#[cfg(test)]
#[path = "tests/simulator_tests.rs"]
mod tests;
