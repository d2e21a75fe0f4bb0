//! Binary exporting SQS queue depth to Prometheus.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use clap::Parser;
use sqs_exporter::{Config, Exporter, Result};
use sqs_exporter_queues_sqs::SqsQueueService;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_max_level(config.log_level)
            .with_writer(std::io::stderr)
            .finish(),
    )?;

    info!(
        "monitoring queues every {} minute(s) with prefix {:?}",
        config.interval, config.queue_name_prefix
    );

    let service = SqsQueueService::new(config.sqs_options()).await;
    let exporter = Exporter::new(config.exporter_options(service)?)?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    if let Err(e) = exporter.run(shutdown_signal).await {
        error!("exporter stopped: {}", e);
        return Err(e);
    }

    info!("exporter stopped");

    Ok(())
}
