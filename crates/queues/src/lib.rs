//! Abstract interface for the queueing service queried by the exporter.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod attribute;
mod queue;

pub use attribute::QueueAttribute;
pub use queue::{QueueRef, short_name};

use std::collections::HashMap;
use std::error::Error;
use std::fmt::Debug;

use async_trait::async_trait;

/// Marker trait for `QueueService` errors
pub trait QueueServiceError: Debug + Error + Send + Sync + 'static {}

/// A queueing service that can list queues and describe them.
#[async_trait]
pub trait QueueService
where
    Self: Send + Sync + 'static,
{
    /// The error type for this service.
    type Error: QueueServiceError;

    /// Lists the addresses of all queues whose name starts with `prefix`.
    ///
    /// `None` lists every queue visible to the configured credentials.
    async fn list_queue_urls(&self, prefix: Option<&str>) -> Result<Vec<String>, Self::Error>;

    /// Fetches the requested attributes for the queue at `url`.
    ///
    /// Attributes the service did not return are absent from the map.
    async fn get_queue_attributes(
        &self,
        url: &str,
        attributes: &[QueueAttribute],
    ) -> Result<HashMap<QueueAttribute, String>, Self::Error>;

    /// Lists the tags attached to the queue at `url`.
    async fn list_queue_tags(&self, url: &str) -> Result<HashMap<String, String>, Self::Error>;
}
