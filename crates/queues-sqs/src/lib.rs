//! Implementation of the queue service interface using AWS SQS.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::result_large_err)]

mod error;

pub use error::Error;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::timeout::TimeoutConfig;
use aws_sdk_sqs::Client;
use aws_sdk_sqs::types::QueueAttributeName;
use sqs_exporter_queues::{QueueAttribute, QueueService};
use tracing::debug;

/// Largest page size accepted by `ListQueues`.
const LIST_QUEUES_PAGE_SIZE: i32 = 1000;

/// Options for configuring an `SqsQueueService`.
#[derive(Clone, Debug, Default)]
pub struct SqsQueueServiceOptions {
    /// Overrides the SQS endpoint resolved from the environment.
    pub endpoint: Option<String>,

    /// Upper bound on each SQS operation, retries included.
    pub operation_timeout: Option<Duration>,
}

/// Queue service backed by AWS SQS.
#[derive(Clone, Debug)]
pub struct SqsQueueService {
    client: Client,
}

impl SqsQueueService {
    /// Creates a new `SqsQueueService`, resolving region and credentials from
    /// the environment.
    pub async fn new(
        SqsQueueServiceOptions {
            endpoint,
            operation_timeout,
        }: SqsQueueServiceOptions,
    ) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(timeout) = operation_timeout {
            loader = loader.timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(timeout)
                    .build(),
            );
        }

        let config = loader.load().await;

        let mut builder = aws_sdk_sqs::config::Builder::from(&config);
        if let Some(endpoint) = endpoint {
            debug!("using sqs endpoint override {}", endpoint);
            builder = builder.endpoint_url(endpoint);
        }

        Self {
            client: Client::from_conf(builder.build()),
        }
    }

    /// Wraps an already configured SQS client.
    #[must_use]
    pub const fn from_client(client: Client) -> Self {
        Self { client }
    }
}

fn to_sqs_attribute(attribute: QueueAttribute) -> QueueAttributeName {
    match attribute {
        QueueAttribute::ApproximateNumberOfMessages => {
            QueueAttributeName::ApproximateNumberOfMessages
        }
        QueueAttribute::ApproximateNumberOfMessagesDelayed => {
            QueueAttributeName::ApproximateNumberOfMessagesDelayed
        }
        QueueAttribute::ApproximateNumberOfMessagesNotVisible => {
            QueueAttributeName::ApproximateNumberOfMessagesNotVisible
        }
    }
}

#[async_trait]
impl QueueService for SqsQueueService {
    type Error = Error;

    async fn list_queue_urls(&self, prefix: Option<&str>) -> Result<Vec<String>, Self::Error> {
        let mut urls = Vec::new();
        let mut next_token = None;

        loop {
            let resp = self
                .client
                .list_queues()
                .set_queue_name_prefix(prefix.map(str::to_string))
                .max_results(LIST_QUEUES_PAGE_SIZE)
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|e| Error::Sqs(e.into()))?;

            urls.extend(resp.queue_urls.unwrap_or_default());

            match resp.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }

        Ok(urls)
    }

    async fn get_queue_attributes(
        &self,
        url: &str,
        attributes: &[QueueAttribute],
    ) -> Result<HashMap<QueueAttribute, String>, Self::Error> {
        let resp = self
            .client
            .get_queue_attributes()
            .queue_url(url)
            .set_attribute_names(Some(
                attributes.iter().copied().map(to_sqs_attribute).collect(),
            ))
            .send()
            .await
            .map_err(|e| Error::Sqs(e.into()))?;

        let mut returned = resp.attributes.unwrap_or_default();

        Ok(attributes
            .iter()
            .filter_map(|attribute| {
                returned
                    .remove(&to_sqs_attribute(*attribute))
                    .map(|value| (*attribute, value))
            })
            .collect())
    }

    async fn list_queue_tags(&self, url: &str) -> Result<HashMap<String, String>, Self::Error> {
        let resp = self
            .client
            .list_queue_tags()
            .queue_url(url)
            .send()
            .await
            .map_err(|e| Error::Sqs(e.into()))?;

        Ok(resp.tags.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_names_match_sqs() {
        for attribute in QueueAttribute::ALL {
            assert_eq!(to_sqs_attribute(attribute).as_str(), attribute.as_str());
        }
    }
}
