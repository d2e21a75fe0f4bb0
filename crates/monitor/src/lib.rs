//! Samples queue depth on a schedule and records it as Prometheus gauges.
//!
//! A [`MonitoringCycle`] discovers queues, fetches their attributes and sets
//! one gauge per attribute and queue. The [`Scheduler`] runs cycles serially
//! and reports failures, classified by [`MonitoringErrorKind`], to whoever
//! supervises it.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc)]

mod cycle;
mod depth;
mod discovery;
mod error;
mod fetcher;
mod metrics;
mod scheduler;

pub use cycle::{CycleReport, MonitoringCycle, MonitoringCycleOptions};
pub use depth::QueueDepth;
pub use discovery::{LabelCollisionPolicy, QueueDiscovery};
pub use error::{
    BoxError, DiscoveryError, Error, FetchError, FetchStage, MonitoringError,
    MonitoringErrorKind, ParseError, Result,
};
pub use fetcher::{AttributeFetcher, QueueSnapshot};
pub use metrics::{QUEUE_LABEL, QueueMetrics};
pub use scheduler::{Scheduler, SchedulerOptions};
