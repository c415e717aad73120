//! Virtual-user iteration loop

use crate::catalog::Catalog;
use crate::error::DriverResult;
use crate::operation::OperationKind;
use crate::pool::{EntityIdPool, PoolLimits};
use crate::sample::{Sample, SampleSink};
use crate::selector::{ScenarioSelector, Selection};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use taskload_config::WorkloadConfig;
use taskload_config::TargetConfig;
use taskload_http::HttpClient;
use tokio::sync::watch;
use tracing::{debug, trace};

/// Default delay between two iterations of one virtual user
pub const DEFAULT_PACING: Duration = Duration::from_secs(1);

/// Read-only workload definition shared by all virtual users
#[derive(Debug, Clone)]
pub struct Workload {
    catalog: Catalog,
    selector: ScenarioSelector,
    pool_limits: PoolLimits,
    pacing: Duration,
}

impl Workload {
    pub fn new(
        catalog: Catalog,
        selector: ScenarioSelector,
        pool_limits: PoolLimits,
        pacing: Duration,
    ) -> Self {
        Self {
            catalog,
            selector,
            pool_limits,
            pacing,
        }
    }

    /// Default mix and limits against `catalog`
    pub fn with_catalog(catalog: Catalog) -> Self {
        Self::new(
            catalog,
            ScenarioSelector::default(),
            PoolLimits::default(),
            DEFAULT_PACING,
        )
    }

    pub fn from_config(target: &TargetConfig, workload: &WorkloadConfig) -> DriverResult<Self> {
        Ok(Self::new(
            Catalog::from_config(target),
            ScenarioSelector::from_config(workload)?,
            PoolLimits::try_from(&workload.pool)?,
            workload.pacing,
        ))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selector(&self) -> &ScenarioSelector {
        &self.selector
    }

    pub fn pool_limits(&self) -> PoolLimits {
        self.pool_limits
    }

    pub fn pacing(&self) -> Duration {
        self.pacing
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }
}

/// What one iteration executed
#[derive(Debug, Clone, PartialEq)]
pub struct IterationReport {
    pub selection: Selection,
    /// `None` when the primary operation was skipped
    pub primary: Option<Sample>,
    pub health: Option<Sample>,
}

impl IterationReport {
    pub fn samples(&self) -> impl Iterator<Item = &Sample> {
        self.primary.iter().chain(self.health.iter())
    }
}

/// One simulated client.
///
/// Owns its id pool and random source; iterations never overlap.
pub struct VirtualUser<C, R> {
    id: usize,
    client: C,
    workload: Arc<Workload>,
    pool: EntityIdPool,
    rng: R,
    sink: Arc<dyn SampleSink>,
}

impl<C, R> VirtualUser<C, R>
where
    C: HttpClient,
    R: Rng + Send,
{
    pub fn new(
        id: usize,
        client: C,
        workload: Arc<Workload>,
        rng: R,
        sink: Arc<dyn SampleSink>,
    ) -> Self {
        let pool = EntityIdPool::with_limits(workload.pool_limits());
        Self {
            id,
            client,
            workload,
            pool,
            rng,
            sink,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn pool(&self) -> &EntityIdPool {
        &self.pool
    }

    /// Draw and execute one iteration without pacing
    pub async fn iterate(&mut self) -> IterationReport {
        let selection = self.workload.selector().draw(&mut self.rng);
        let primary = self.execute(selection.primary).await;
        let health = if selection.health_check {
            self.execute(OperationKind::HealthCheck).await
        } else {
            None
        };

        IterationReport {
            selection,
            primary,
            health,
        }
    }

    /// One iteration followed by the pacing delay
    pub async fn run_iteration(&mut self) -> IterationReport {
        let report = self.iterate().await;
        tokio::time::sleep(self.workload.pacing()).await;
        report
    }

    /// Iterate until `stop` turns true or its sender goes away.
    ///
    /// Stop is only observed between iterations and during pacing.
    /// Returns the number of completed iterations.
    pub async fn run(mut self, mut stop: watch::Receiver<bool>) -> u64 {
        let mut iterations = 0u64;
        debug!("Virtual user {} started", self.id);

        loop {
            if *stop.borrow_and_update() {
                break;
            }

            self.iterate().await;
            iterations += 1;

            tokio::select! {
                _ = tokio::time::sleep(self.workload.pacing()) => {}
                changed = stop.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        debug!(
            "Virtual user {} stopped after {} iterations",
            self.id, iterations
        );
        iterations
    }

    async fn execute(&mut self, kind: OperationKind) -> Option<Sample> {
        let sample = self
            .workload
            .catalog()
            .execute(kind, &self.client, &mut self.pool, &mut self.rng)
            .await;

        match &sample {
            Some(sample) => {
                self.sink.record(sample);
                if !sample.passed {
                    let failed: Vec<&str> =
                        sample.failed_checks().map(|c| c.name.as_str()).collect();
                    debug!("VU {} {} failed: {:?}", self.id, kind, failed);
                }
            }
            None => trace!("VU {} skipped {} (pool size {})", self.id, kind, self.pool.len()),
        }

        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::TaskId;
    use crate::sample::MemorySink;
    use crate::selector::WorkloadMix;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;
    use taskload_http::{HttpMethod, MockHttpClient, MockReply};

    const TASKS: &str = "http://t/api/tasks";
    const HEALTH: &str = "http://t/actuator/health";

    fn only(kind: OperationKind, health_check_probability: f64) -> ScenarioSelector {
        let mix = WorkloadMix::from_thresholds(vec![(1.0, kind)]).unwrap();
        ScenarioSelector::new(mix, health_check_probability).unwrap()
    }

    fn workload(selector: ScenarioSelector) -> Arc<Workload> {
        Arc::new(Workload::new(
            Catalog::new(TASKS, HEALTH),
            selector,
            PoolLimits::default(),
            DEFAULT_PACING,
        ))
    }

    fn user(
        client: Arc<MockHttpClient>,
        workload: Arc<Workload>,
        sink: Arc<MemorySink>,
    ) -> VirtualUser<Arc<MockHttpClient>, StdRng> {
        VirtualUser::new(0, client, workload, StdRng::seed_from_u64(5), sink)
    }

    #[tokio::test]
    async fn test_skipped_primary_records_nothing() {
        let client = Arc::new(MockHttpClient::new());
        let sink = Arc::new(MemorySink::new());
        let mut vu = user(
            client.clone(),
            workload(only(OperationKind::ReadById, 0.0)),
            sink.clone(),
        );

        let report = vu.iterate().await;
        assert_eq!(report.primary, None);
        assert_eq!(report.health, None);
        assert!(sink.is_empty());
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_health_check_rides_along() {
        let client = Arc::new(MockHttpClient::new());
        client
            .add_mock(HttpMethod::Get, TASKS, MockReply::json(200, json!([{"id": 1}])))
            .add_mock(HttpMethod::Get, HEALTH, MockReply::json(200, json!({"status": "UP"})));
        let sink = Arc::new(MemorySink::new());
        let mut vu = user(
            client.clone(),
            workload(only(OperationKind::List, 1.0)),
            sink.clone(),
        );

        let report = vu.iterate().await;
        assert!(report.selection.health_check);
        assert_eq!(report.samples().count(), 2);
        assert!(report.samples().all(|s| s.passed));
        assert_eq!(sink.len(), 2);
        assert_eq!(vu.pool().iter().cloned().collect::<Vec<_>>(), vec![TaskId::from(1)]);
    }

    #[tokio::test]
    async fn test_failures_never_stop_the_user() {
        let client = Arc::new(MockHttpClient::new());
        client.add_mock(HttpMethod::Post, TASKS, MockReply::ConnectionFailed);
        let sink = Arc::new(MemorySink::new());
        let mut vu = user(
            client.clone(),
            workload(only(OperationKind::Create, 0.0)),
            sink.clone(),
        );

        for _ in 0..20 {
            vu.iterate().await;
        }
        assert_eq!(sink.len(), 20);
        assert_eq!(sink.error_rate(), 1.0);
        assert!(vu.pool().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_iteration_paces() {
        let client = Arc::new(MockHttpClient::new());
        client.add_mock(HttpMethod::Get, TASKS, MockReply::json(200, json!([])));
        let sink = Arc::new(MemorySink::new());
        let mut vu = user(client, workload(only(OperationKind::List, 0.0)), sink);

        let started = tokio::time::Instant::now();
        vu.run_iteration().await;
        vu.run_iteration().await;
        assert!(started.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_during_pacing() {
        let client = Arc::new(MockHttpClient::new());
        client.add_mock(HttpMethod::Get, TASKS, MockReply::json(200, json!([])));
        let sink = Arc::new(MemorySink::new());
        let vu = user(client, workload(only(OperationKind::List, 0.0)), sink.clone());

        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(vu.run(stop_rx));

        tokio::time::sleep(Duration::from_millis(3500)).await;
        stop_tx.send(true).unwrap();

        let iterations = handle.await.unwrap();
        assert_eq!(iterations, 4);
        assert_eq!(sink.len(), 4);
    }
}
