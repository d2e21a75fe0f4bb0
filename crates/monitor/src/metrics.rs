//! Prometheus gauges for queue depth, plus cycle bookkeeping.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use prometheus::{
    Encoder, Gauge, GaugeVec, Histogram, IntCounterVec, Registry, TextEncoder,
    register_gauge_vec_with_registry, register_gauge_with_registry,
    register_histogram_with_registry, register_int_counter_vec_with_registry,
};

use crate::depth::QueueDepth;
use crate::error::{MonitoringError, Result};

/// Label carrying the queue short name.
pub const QUEUE_LABEL: &str = "queue_name";

/// Handle to the exporter's metrics.
///
/// Clones share the same underlying registry and gauges. Each gauge is updated
/// independently, so readers never wait on a whole cycle.
#[derive(Clone, Debug)]
pub struct QueueMetrics {
    registry: Registry,
    visible: GaugeVec,
    delayed: GaugeVec,
    invisible: GaugeVec,
    cycles: IntCounterVec,
    cycle_duration: Histogram,
    last_success: Gauge,
}

impl QueueMetrics {
    /// Registers the exporter's metrics in a fresh registry.
    pub fn new() -> Result<Self> {
        Self::with_registry(Registry::new())
    }

    /// Registers the exporter's metrics in `registry`.
    pub fn with_registry(registry: Registry) -> Result<Self> {
        let visible = register_gauge_vec_with_registry!(
            "sqs_messages_visible",
            "The approximate number of messages available for retrieval from the queue.",
            &[QUEUE_LABEL],
            registry
        )?;

        let delayed = register_gauge_vec_with_registry!(
            "sqs_messages_delayed",
            "The approximate number of messages in the queue that are delayed and not available for reading immediately.",
            &[QUEUE_LABEL],
            registry
        )?;

        let invisible = register_gauge_vec_with_registry!(
            "sqs_messages_invisible",
            "The approximate number of messages that are in flight: received but not yet deleted or expired.",
            &[QUEUE_LABEL],
            registry
        )?;

        let cycles = register_int_counter_vec_with_registry!(
            "sqs_exporter_cycles_total",
            "Monitoring cycles by result",
            &["result"],
            registry
        )?;

        let cycle_duration = register_histogram_with_registry!(
            "sqs_exporter_cycle_duration_seconds",
            "Monitoring cycle duration",
            vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0],
            registry
        )?;

        let last_success = register_gauge_with_registry!(
            "sqs_exporter_last_success_timestamp_seconds",
            "Unix time of the last successful monitoring cycle",
            registry
        )?;

        Ok(Self {
            registry,
            visible,
            delayed,
            invisible,
            cycles,
            cycle_duration,
            last_success,
        })
    }

    /// The registry holding every exporter metric.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Sets the gauges of `queue` to `depth`, replacing earlier values.
    pub fn set_depth(&self, queue: &str, depth: &QueueDepth) {
        self.visible.with_label_values(&[queue]).set(depth.visible);
        self.delayed.with_label_values(&[queue]).set(depth.delayed);
        self.invisible.with_label_values(&[queue]).set(depth.in_flight);
    }

    /// Records the outcome of one cycle.
    pub fn record_cycle<T>(&self, result: &std::result::Result<T, MonitoringError>, elapsed: Duration) {
        let label = match result {
            Ok(_) => "success",
            Err(e) => e.kind().as_str(),
        };

        self.cycles.with_label_values(&[label]).inc();
        self.cycle_duration.observe(elapsed.as_secs_f64());

        if result.is_ok() {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default();
            self.last_success.set(now.as_secs_f64());
        }
    }

    /// Renders every metric in the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;

        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
