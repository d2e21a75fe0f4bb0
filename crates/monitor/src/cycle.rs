use std::sync::Arc;
use std::time::{Duration, Instant};

use sqs_exporter_queues::QueueService;
use tracing::{debug, info};

use crate::depth::QueueDepth;
use crate::discovery::{LabelCollisionPolicy, QueueDiscovery};
use crate::error::MonitoringError;
use crate::fetcher::AttributeFetcher;
use crate::metrics::QueueMetrics;

/// Options for configuring a `MonitoringCycle`.
pub struct MonitoringCycleOptions<S>
where
    S: QueueService,
{
    /// The queue service to sample.
    pub service: Arc<S>,

    /// Only queues whose name starts with this prefix are monitored.
    pub queue_name_prefix: Option<String>,

    /// Whether queue tags are fetched alongside attributes.
    pub fetch_tags: bool,

    /// How queues sharing a short name are labelled.
    pub collision_policy: LabelCollisionPolicy,

    /// Metrics updated by the cycle.
    pub metrics: QueueMetrics,
}

/// Summary of a successful cycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CycleReport {
    /// Number of queues whose gauges were updated.
    pub queues: usize,
}

/// One discovery, fetch and update pass over the monitored queues.
pub struct MonitoringCycle<S>
where
    S: QueueService,
{
    discovery: QueueDiscovery<S>,
    fetcher: AttributeFetcher<S>,
    metrics: QueueMetrics,
}

impl<S> MonitoringCycle<S>
where
    S: QueueService,
{
    /// Creates a new `MonitoringCycle`.
    pub fn new(
        MonitoringCycleOptions {
            service,
            queue_name_prefix,
            fetch_tags,
            collision_policy,
            metrics,
        }: MonitoringCycleOptions<S>,
    ) -> Self {
        Self {
            discovery: QueueDiscovery::new(service.clone(), queue_name_prefix, collision_policy),
            fetcher: AttributeFetcher::new(service, fetch_tags),
            metrics,
        }
    }

    /// Runs one cycle.
    ///
    /// Queues are processed in discovery order and the first failure aborts
    /// the cycle. Queues processed before the failure keep their new values;
    /// the rest keep whatever the previous cycle wrote.
    pub async fn run(&self) -> Result<CycleReport, MonitoringError> {
        let queues = self.discovery.discover().await?;

        for queue in &queues {
            let snapshot = self.fetcher.fetch(queue).await?;

            if let Some(tags) = &snapshot.tags {
                debug!("queue {} has {} tags", queue.name, tags.len());
            }

            let depth = QueueDepth::parse(&queue.name, &snapshot.attributes)?;
            self.metrics.set_depth(&queue.name, &depth);

            debug!(
                "queue {}: visible={} delayed={} in_flight={}",
                queue.name, depth.visible, depth.delayed, depth.in_flight
            );
        }

        Ok(CycleReport {
            queues: queues.len(),
        })
    }

    /// Runs one cycle bounded by `timeout` and records its outcome.
    pub async fn run_with_timeout(&self, timeout: Duration) -> Result<CycleReport, MonitoringError> {
        let start = Instant::now();

        let result = tokio::time::timeout(timeout, self.run())
            .await
            .unwrap_or(Err(MonitoringError::Timeout(timeout)));

        let elapsed = start.elapsed();
        self.metrics.record_cycle(&result, elapsed);

        if let Ok(report) = &result {
            info!(
                "monitoring cycle updated {} queues in {:?}",
                report.queues, elapsed
            );
        }

        result
    }
}
