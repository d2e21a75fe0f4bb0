use sqs_exporter_queues::QueueServiceError;
use thiserror::Error;

/// Errors that can occur in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// The SQS API returned an error.
    #[error(transparent)]
    Sqs(#[from] aws_sdk_sqs::Error),
}

impl QueueServiceError for Error {}
