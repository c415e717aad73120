//! Tick-driven virtual-user scheduler

use crate::error::EngineResult;
use crate::metrics::RunMetrics;
use crate::stages::StagePlan;
use crate::summary::RunSummary;
use crate::thresholds;
use chrono::Utc;
use futures::future::join_all;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use taskload_config::{TaskloadConfig, ThresholdsConfig};
use taskload_driver::{SampleSink, VirtualUser, Workload};
use taskload_http::HttpClient;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Default scheduler tick
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Join the retired users that have already exited, keeping the rest
async fn reap_finished(retired: &mut Vec<JoinHandle<u64>>, metrics: &RunMetrics) {
    let (finished, running): (Vec<_>, Vec<_>) =
        retired.drain(..).partition(JoinHandle::is_finished);
    *retired = running;
    record_joined(join_all(finished).await, metrics);
}

fn record_joined(joined: Vec<Result<u64, JoinError>>, metrics: &RunMetrics) {
    for result in joined {
        match result {
            Ok(iterations) => metrics.add_iterations(iterations),
            Err(e) => warn!("Virtual user task failed: {}", e),
        }
    }
}

struct ActiveUser {
    stop: watch::Sender<bool>,
    handle: JoinHandle<u64>,
}

impl ActiveUser {
    fn retire(self) -> JoinHandle<u64> {
        // a closed receiver means the user already exited
        let _ = self.stop.send(true);
        self.handle
    }
}

pub struct Engine {
    client: Arc<dyn HttpClient>,
    workload: Arc<Workload>,
    plan: StagePlan,
    tick: Duration,
    thresholds: ThresholdsConfig,
    seed: Option<u64>,
}

impl Engine {
    pub fn new(client: Arc<dyn HttpClient>, workload: Workload, plan: StagePlan) -> Self {
        Self {
            client,
            workload: Arc::new(workload),
            plan,
            tick: DEFAULT_TICK,
            thresholds: ThresholdsConfig::default(),
            seed: None,
        }
    }

    pub fn from_config(config: &TaskloadConfig, client: Arc<dyn HttpClient>) -> EngineResult<Self> {
        let workload = Workload::from_config(&config.target, &config.workload)?;
        let plan = StagePlan::from_config(&config.ramp)?;
        Ok(Self::new(client, workload, plan)
            .with_tick(config.ramp.tick)
            .with_thresholds(config.thresholds.clone()))
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn with_thresholds(mut self, thresholds: ThresholdsConfig) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Seed the per-user random sources for a reproducible run
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn plan(&self) -> &StagePlan {
        &self.plan
    }

    /// Run the full stage plan
    pub async fn run(self) -> RunSummary {
        self.run_until(std::future::pending()).await
    }

    /// Run the stage plan, stopping early once `shutdown` resolves.
    ///
    /// Either way every virtual user is signalled and joined before the
    /// summary is built.
    pub async fn run_until<F>(self, shutdown: F) -> RunSummary
    where
        F: Future<Output = ()>,
    {
        let metrics = Arc::new(RunMetrics::new());
        let sink: Arc<dyn SampleSink> = metrics.clone();
        let mut seeder = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        info!(
            "Starting run: {} stages over {}s, up to {} virtual users",
            self.plan.stages().len(),
            self.plan.total_duration().as_secs(),
            self.plan.max_target()
        );

        let started_at = Utc::now();
        let start = Instant::now();
        let mut active: Vec<ActiveUser> = Vec::new();
        let mut retired: Vec<JoinHandle<u64>> = Vec::new();
        let mut next_id = 0usize;
        let mut interrupted = false;

        let mut ticker = tokio::time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    warn!("Shutdown requested, stopping {} virtual users", active.len());
                    interrupted = true;
                    break;
                }
                _ = ticker.tick() => {}
            }

            let Some(desired) = self.plan.desired_vus(start.elapsed()) else {
                break;
            };

            if desired != active.len() {
                debug!("Scaling virtual users {} -> {}", active.len(), desired);
            }

            while active.len() < desired {
                let (stop, stop_rx) = watch::channel(false);
                let user = VirtualUser::new(
                    next_id,
                    self.client.clone(),
                    self.workload.clone(),
                    StdRng::seed_from_u64(seeder.random()),
                    sink.clone(),
                );
                next_id += 1;
                active.push(ActiveUser {
                    stop,
                    handle: tokio::spawn(user.run(stop_rx)),
                });
            }

            while active.len() > desired {
                if let Some(user) = active.pop() {
                    retired.push(user.retire());
                }
            }

            metrics.observe_vus(active.len());
            reap_finished(&mut retired, &metrics).await;
        }

        retired.extend(active.into_iter().map(ActiveUser::retire));
        record_joined(join_all(retired).await, &metrics);

        let snapshot = metrics.snapshot();
        let thresholds = thresholds::evaluate(&self.thresholds, &snapshot);
        let summary = RunSummary {
            started_at,
            duration_secs: start.elapsed().as_secs_f64(),
            interrupted,
            metrics: snapshot,
            thresholds,
        };

        info!(
            "Run finished: {} iterations, {} samples, {} thresholds breached",
            summary.metrics.iterations,
            summary.metrics.samples,
            summary.breached().count()
        );
        summary
    }
}
