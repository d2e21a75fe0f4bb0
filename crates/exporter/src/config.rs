use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::Parser;
use clap::builder::BoolishValueParser;
use sqs_exporter_monitor::LabelCollisionPolicy;
use sqs_exporter_queues::QueueService;
use sqs_exporter_queues_sqs::SqsQueueServiceOptions;
use tracing::Level;

use crate::ExporterOptions;
use crate::error::{Error, Result};

/// Exports AWS SQS queue depth as Prometheus metrics.
#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Port the metrics server listens on
    #[arg(long, env = "PORT", default_value_t = 9434)]
    pub port: u16,

    /// Minutes between monitoring cycles
    #[arg(long, env = "INTERVAL", default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// Path metrics are served under
    #[arg(long, env = "ENDPOINT", default_value = "metrics")]
    pub endpoint: String,

    /// Keep serving the last known values when a monitoring cycle fails
    #[arg(long, env = "KEEP_RUNNING", default_value_t = true, action = clap::ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub keep_running: bool,

    /// Only monitor queues whose name starts with this prefix
    #[arg(long, env = "SQS_QUEUE_NAME_PREFIX", default_value = "")]
    pub queue_name_prefix: String,

    /// SQS endpoint override (e.g. a LocalStack URL)
    #[arg(long, env = "AWS_SQS_ENDPOINT")]
    pub sqs_endpoint: Option<String>,

    /// Also fetch queue tags every cycle
    #[arg(long, env = "FETCH_TAGS", default_value_t = false, action = clap::ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub fetch_tags: bool,

    /// Seconds a monitoring cycle may take before it is abandoned
    #[arg(long, env = "CYCLE_TIMEOUT", default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub cycle_timeout: u64,

    /// Seconds a single SQS operation may take, retries included
    #[arg(long, env = "SQS_OPERATION_TIMEOUT", value_parser = clap::value_parser!(u64).range(1..))]
    pub sqs_operation_timeout: Option<u64>,

    /// How queues sharing a short name are labelled: overwrite, reject or full-address
    #[arg(long, env = "LABEL_COLLISION_POLICY", default_value = "overwrite")]
    pub label_collision_policy: LabelCollisionPolicy,

    /// Maximum log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: Level,
}

impl Config {
    /// Address the metrics server binds to.
    #[must_use]
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    /// The metrics path with a single leading `/`.
    pub fn metrics_path(&self) -> Result<String> {
        let path = self.endpoint.trim().trim_start_matches('/');

        if path.is_empty() {
            return Err(Error::Config(format!(
                "endpoint {:?} would shadow the landing page",
                self.endpoint
            )));
        }

        // Route syntax would turn the endpoint into a capture or wildcard.
        if path.split('/').any(|segment| {
            segment.starts_with(':') || segment.starts_with('*') || segment.contains(['{', '}'])
        }) {
            return Err(Error::Config(format!(
                "endpoint {:?} contains route syntax",
                self.endpoint
            )));
        }

        Ok(format!("/{path}"))
    }

    /// Time between the start of consecutive cycles.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval.saturating_mul(60))
    }

    /// Options for the SQS client.
    #[must_use]
    pub fn sqs_options(&self) -> SqsQueueServiceOptions {
        SqsQueueServiceOptions {
            endpoint: self.sqs_endpoint.clone().filter(|e| !e.is_empty()),
            operation_timeout: self.sqs_operation_timeout.map(Duration::from_secs),
        }
    }

    /// Exporter options for `service`.
    pub fn exporter_options<S>(&self, service: S) -> Result<ExporterOptions<S>>
    where
        S: QueueService,
    {
        Ok(ExporterOptions {
            service,
            listen_addr: self.listen_addr(),
            metrics_path: self.metrics_path()?,
            interval: self.interval(),
            cycle_timeout: Duration::from_secs(self.cycle_timeout),
            queue_name_prefix: Some(self.queue_name_prefix.clone()).filter(|p| !p.is_empty()),
            fetch_tags: self.fetch_tags,
            collision_policy: self.label_collision_policy,
            keep_running_on_error: self.keep_running,
        })
    }
}
