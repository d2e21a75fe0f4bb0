use sqs_exporter_monitor::MonitoringError;
use thiserror::Error;

/// Result type for the exporter.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that stop the exporter.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A monitoring cycle failed and the exporter is not configured to keep running.
    #[error(transparent)]
    Cycle(#[from] MonitoringError),

    /// Monitor error.
    #[error(transparent)]
    Monitor(#[from] sqs_exporter_monitor::Error),

    /// Scrape server error.
    #[error(transparent)]
    ScrapeServer(#[from] sqs_exporter_scrape_server::Error),

    /// The scrape server stopped without being asked to.
    #[error("scrape server stopped unexpectedly")]
    ScrapeServerStopped,

    /// The scrape server task panicked or was aborted.
    #[error("scrape server task failed: {0}")]
    ScrapeServerTask(#[from] tokio::task::JoinError),

    /// Could not set global default subscriber.
    #[error("could not set global default subscriber: {0}")]
    SetTracing(#[from] tracing::dispatcher::SetGlobalDefaultError),
}
