use std::collections::HashMap;
use std::sync::Arc;

use sqs_exporter_queues::{QueueAttribute, QueueRef, QueueService};

use crate::error::{FetchError, FetchStage};

/// Raw data fetched for one queue.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueueSnapshot {
    /// Attribute values as returned by the service.
    pub attributes: HashMap<QueueAttribute, String>,

    /// Queue tags, when tag fetching is enabled.
    pub tags: Option<HashMap<String, String>>,
}

/// Fetches attributes (and optionally tags) of discovered queues.
pub struct AttributeFetcher<S>
where
    S: QueueService,
{
    service: Arc<S>,
    fetch_tags: bool,
}

impl<S> AttributeFetcher<S>
where
    S: QueueService,
{
    /// Creates a new `AttributeFetcher`.
    pub const fn new(service: Arc<S>, fetch_tags: bool) -> Self {
        Self {
            service,
            fetch_tags,
        }
    }

    /// Fetches the depth attributes of `queue`, and its tags if enabled.
    ///
    /// A failed tag request fails the whole fetch.
    pub async fn fetch(&self, queue: &QueueRef) -> Result<QueueSnapshot, FetchError> {
        let attributes = self
            .service
            .get_queue_attributes(&queue.url, &QueueAttribute::ALL)
            .await
            .map_err(|e| FetchError {
                queue: queue.name.clone(),
                stage: FetchStage::Attributes,
                source: Box::new(e),
            })?;

        let tags = if self.fetch_tags {
            Some(
                self.service
                    .list_queue_tags(&queue.url)
                    .await
                    .map_err(|e| FetchError {
                        queue: queue.name.clone(),
                        stage: FetchStage::Tags,
                        source: Box::new(e),
                    })?,
            )
        } else {
            None
        };

        Ok(QueueSnapshot { attributes, tags })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use sqs_exporter_queues_mock::MockQueueService;

    const ORDERS: &str = "http://localhost:4566/000000000000/orders";

    #[tokio::test]
    async fn test_fetch_without_tags() {
        let service = MockQueueService::new();
        service.add_queue(ORDERS);
        service.set_depth(ORDERS, 4, 1, 2);

        let fetcher = AttributeFetcher::new(Arc::new(service.clone()), false);
        let snapshot = fetcher.fetch(&QueueRef::from_url(ORDERS)).await.unwrap();

        assert_eq!(snapshot.attributes.len(), 3);
        assert_eq!(
            snapshot.attributes[&QueueAttribute::ApproximateNumberOfMessages],
            "4"
        );
        assert!(snapshot.tags.is_none());
        assert!(service.tag_calls().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_with_tags() {
        let service = MockQueueService::new();
        service.add_queue(ORDERS);
        service.set_tag(ORDERS, "team", "checkout");

        let fetcher = AttributeFetcher::new(Arc::new(service), true);
        let snapshot = fetcher.fetch(&QueueRef::from_url(ORDERS)).await.unwrap();

        let tags = snapshot.tags.unwrap();
        assert_eq!(tags.get("team").map(String::as_str), Some("checkout"));
    }

    #[tokio::test]
    async fn test_tag_failure_fails_fetch() {
        let service = MockQueueService::new();
        service.add_queue(ORDERS);
        service.fail_tags(ORDERS, true);

        let fetcher = AttributeFetcher::new(Arc::new(service), true);
        let err = fetcher.fetch(&QueueRef::from_url(ORDERS)).await.unwrap_err();

        assert_eq!(err.queue, "orders");
        assert_eq!(err.stage, FetchStage::Tags);
    }

    #[tokio::test]
    async fn test_attribute_failure() {
        let service = MockQueueService::new();
        service.add_queue(ORDERS);
        service.fail_attributes(ORDERS, true);

        let fetcher = AttributeFetcher::new(Arc::new(service.clone()), true);
        let err = fetcher.fetch(&QueueRef::from_url(ORDERS)).await.unwrap_err();

        assert_eq!(err.stage, FetchStage::Attributes);
        assert!(service.tag_calls().is_empty());
    }
}
