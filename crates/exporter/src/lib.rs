//! Exports AWS SQS queue depth as Prometheus metrics.
//!
//! An [`Exporter`] wires a scheduled monitoring cycle to a scrape server and
//! supervises both according to a [`SupervisionPolicy`].
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_pub_crate)]

mod config;
mod error;
mod supervisor;

pub use config::Config;
pub use error::{Error, Result};
pub use supervisor::{Decision, Failure, SupervisionPolicy};

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sqs_exporter_monitor::{
    LabelCollisionPolicy, MonitoringCycle, MonitoringCycleOptions, QueueMetrics, Scheduler,
    SchedulerOptions,
};
use sqs_exporter_queues::QueueService;
use sqs_exporter_scrape_server::{ScrapeServer, ScrapeServerOptions};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Options for configuring an `Exporter`.
pub struct ExporterOptions<S>
where
    S: QueueService,
{
    /// Queue service to monitor.
    pub service: S,

    /// Address the scrape server listens on.
    pub listen_addr: SocketAddr,

    /// Path metrics are served under, starting with `/`.
    pub metrics_path: String,

    /// Time between the start of consecutive cycles.
    pub interval: Duration,

    /// Upper bound on a single cycle.
    pub cycle_timeout: Duration,

    /// Only queues whose name starts with this prefix are monitored.
    pub queue_name_prefix: Option<String>,

    /// Whether to fetch queue tags every cycle.
    pub fetch_tags: bool,

    /// How queues sharing a short name are labelled.
    pub collision_policy: LabelCollisionPolicy,

    /// Whether failed cycles are tolerated.
    pub keep_running_on_error: bool,
}

/// Runs monitoring cycles and serves their results until told to stop.
pub struct Exporter<S>
where
    S: QueueService,
{
    metrics: QueueMetrics,
    policy: SupervisionPolicy,
    scheduler: Scheduler<S>,
    server: ScrapeServer,
}

impl<S> Exporter<S>
where
    S: QueueService,
{
    /// Creates a new instance of `Exporter`.
    pub fn new(
        ExporterOptions {
            service,
            listen_addr,
            metrics_path,
            interval,
            cycle_timeout,
            queue_name_prefix,
            fetch_tags,
            collision_policy,
            keep_running_on_error,
        }: ExporterOptions<S>,
    ) -> Result<Self> {
        let metrics = QueueMetrics::new()?;

        let cycle = MonitoringCycle::new(MonitoringCycleOptions {
            service: Arc::new(service),
            queue_name_prefix,
            fetch_tags,
            collision_policy,
            metrics: metrics.clone(),
        });

        let scheduler = Scheduler::new(
            cycle,
            SchedulerOptions {
                period: interval,
                cycle_timeout,
            },
        );

        let server = ScrapeServer::new(ScrapeServerOptions {
            listen_addr,
            metrics_path,
            registry: metrics.registry().clone(),
        });

        Ok(Self {
            metrics,
            policy: SupervisionPolicy {
                keep_running_on_error,
            },
            scheduler,
            server,
        })
    }

    /// The metrics written by monitoring cycles.
    pub const fn metrics(&self) -> &QueueMetrics {
        &self.metrics
    }

    /// The address the scrape server is bound to, once running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.local_addr()
    }

    /// Serves metrics and runs cycles until `shutdown_signal` resolves or a
    /// failure the policy does not tolerate occurs.
    ///
    /// Failing to bind the scrape server is always fatal.
    pub async fn run(&self, shutdown_signal: impl Future<Output = ()>) -> Result<()> {
        let mut server_handle = self.server.start().await?;

        let (failures_tx, mut failures_rx) = mpsc::channel(16);

        if let Err(e) = self.scheduler.start(failures_tx) {
            self.server.shutdown().await;
            return Err(e.into());
        }

        tokio::pin!(shutdown_signal);

        let result = loop {
            let failure = tokio::select! {
                () = &mut shutdown_signal => {
                    info!("shutdown requested");
                    break Ok(());
                }
                result = &mut server_handle => Failure::Server(match result {
                    Ok(Ok(())) => Error::ScrapeServerStopped,
                    Ok(Err(e)) => Error::ScrapeServer(e),
                    Err(e) => Error::ScrapeServerTask(e),
                }),
                Some(e) = failures_rx.recv() => Failure::Cycle(e),
            };

            error!("{}", failure);

            match self.policy.decide(&failure) {
                Decision::Continue => {
                    warn!("continuing with last known values");
                }
                Decision::Terminate => break Err(failure.into()),
            }
        };

        self.scheduler.shutdown().await;
        self.server.shutdown().await;

        result
    }
}
