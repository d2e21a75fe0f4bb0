//! In-memory queue service for tests, with injectable failures.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use sqs_exporter_queues::{QueueAttribute, QueueService, QueueServiceError};
use thiserror::Error;

/// Errors returned by `MockQueueService`.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum Error {
    /// A failure injected by the test.
    #[error("injected failure: {0}")]
    Injected(String),

    /// The queue does not exist.
    #[error("queue does not exist: {0}")]
    NonExistentQueue(String),
}

impl QueueServiceError for Error {}

#[derive(Debug, Default)]
struct MockQueue {
    url: String,
    attributes: HashMap<QueueAttribute, String>,
    tags: HashMap<String, String>,
}

#[derive(Debug, Default)]
struct State {
    queues: Vec<MockQueue>,
    fail_listing: bool,
    latency: Option<Duration>,
    failing_attributes: HashSet<String>,
    failing_tags: HashSet<String>,
    list_calls: usize,
    attribute_calls: Vec<String>,
    tag_calls: Vec<String>,
}

/// Queue service holding its queues in memory.
///
/// Clones share state, so a test can keep a handle while the service under
/// test owns another.
#[derive(Clone, Debug, Default)]
pub struct MockQueueService {
    state: Arc<Mutex<State>>,
}

impl MockQueueService {
    /// Creates an empty `MockQueueService`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a queue with zero depth. Queues are listed in insertion order.
    pub fn add_queue(&self, url: impl Into<String>) {
        let attributes = QueueAttribute::ALL
            .into_iter()
            .map(|attribute| (attribute, "0".to_string()))
            .collect();

        self.state.lock().queues.push(MockQueue {
            url: url.into(),
            attributes,
            tags: HashMap::new(),
        });
    }

    /// Sets the raw value returned for one attribute of a queue.
    pub fn set_attribute(&self, url: &str, attribute: QueueAttribute, value: impl Into<String>) {
        if let Some(queue) = self.state.lock().queues.iter_mut().find(|q| q.url == url) {
            queue.attributes.insert(attribute, value.into());
        }
    }

    /// Sets the visible, delayed and in-flight counts of a queue.
    pub fn set_depth(&self, url: &str, visible: u64, delayed: u64, in_flight: u64) {
        self.set_attribute(url, QueueAttribute::ApproximateNumberOfMessages, visible.to_string());
        self.set_attribute(
            url,
            QueueAttribute::ApproximateNumberOfMessagesDelayed,
            delayed.to_string(),
        );
        self.set_attribute(
            url,
            QueueAttribute::ApproximateNumberOfMessagesNotVisible,
            in_flight.to_string(),
        );
    }

    /// Stops returning an attribute for a queue.
    pub fn remove_attribute(&self, url: &str, attribute: QueueAttribute) {
        if let Some(queue) = self.state.lock().queues.iter_mut().find(|q| q.url == url) {
            queue.attributes.remove(&attribute);
        }
    }

    /// Attaches a tag to a queue.
    pub fn set_tag(&self, url: &str, key: impl Into<String>, value: impl Into<String>) {
        if let Some(queue) = self.state.lock().queues.iter_mut().find(|q| q.url == url) {
            queue.tags.insert(key.into(), value.into());
        }
    }

    /// Makes queue listing fail (or succeed again).
    pub fn fail_listing(&self, fail: bool) {
        self.state.lock().fail_listing = fail;
    }

    /// Makes attribute requests for a queue fail (or succeed again).
    pub fn fail_attributes(&self, url: &str, fail: bool) {
        let mut state = self.state.lock();
        if fail {
            state.failing_attributes.insert(url.to_string());
        } else {
            state.failing_attributes.remove(url);
        }
    }

    /// Makes tag requests for a queue fail (or succeed again).
    pub fn fail_tags(&self, url: &str, fail: bool) {
        let mut state = self.state.lock();
        if fail {
            state.failing_tags.insert(url.to_string());
        } else {
            state.failing_tags.remove(url);
        }
    }

    /// Delays every call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.state.lock().latency = Some(latency);
    }

    async fn simulate_latency(&self) {
        let latency = self.state.lock().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    /// Number of times queues have been listed.
    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.state.lock().list_calls
    }

    /// Queue addresses whose attributes were requested, in call order.
    #[must_use]
    pub fn attribute_calls(&self) -> Vec<String> {
        self.state.lock().attribute_calls.clone()
    }

    /// Queue addresses whose tags were requested, in call order.
    #[must_use]
    pub fn tag_calls(&self) -> Vec<String> {
        self.state.lock().tag_calls.clone()
    }
}

#[async_trait]
impl QueueService for MockQueueService {
    type Error = Error;

    async fn list_queue_urls(&self, prefix: Option<&str>) -> Result<Vec<String>, Self::Error> {
        self.simulate_latency().await;
        let mut state = self.state.lock();
        state.list_calls += 1;

        if state.fail_listing {
            return Err(Error::Injected("list queues".to_string()));
        }

        Ok(state
            .queues
            .iter()
            .filter(|queue| {
                prefix.is_none_or(|prefix| {
                    sqs_exporter_queues::short_name(&queue.url).starts_with(prefix)
                })
            })
            .map(|queue| queue.url.clone())
            .collect())
    }

    async fn get_queue_attributes(
        &self,
        url: &str,
        attributes: &[QueueAttribute],
    ) -> Result<HashMap<QueueAttribute, String>, Self::Error> {
        self.simulate_latency().await;
        let mut state = self.state.lock();
        state.attribute_calls.push(url.to_string());

        if state.failing_attributes.contains(url) {
            return Err(Error::Injected(format!("get attributes of {url}")));
        }

        let queue = state
            .queues
            .iter()
            .find(|queue| queue.url == url)
            .ok_or_else(|| Error::NonExistentQueue(url.to_string()))?;

        Ok(attributes
            .iter()
            .filter_map(|attribute| {
                queue
                    .attributes
                    .get(attribute)
                    .map(|value| (*attribute, value.clone()))
            })
            .collect())
    }

    async fn list_queue_tags(&self, url: &str) -> Result<HashMap<String, String>, Self::Error> {
        self.simulate_latency().await;
        let mut state = self.state.lock();
        state.tag_calls.push(url.to_string());

        if state.failing_tags.contains(url) {
            return Err(Error::Injected(format!("list tags of {url}")));
        }

        state
            .queues
            .iter()
            .find(|queue| queue.url == url)
            .map(|queue| queue.tags.clone())
            .ok_or_else(|| Error::NonExistentQueue(url.to_string()))
    }
}
