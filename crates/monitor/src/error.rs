use std::fmt;
use std::time::Duration;

use sqs_exporter_queues::QueueAttribute;
use thiserror::Error;

/// Boxed error from the underlying queue service.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors outside a monitoring cycle.
#[derive(Debug, Error)]
pub enum Error {
    /// The scheduler has already been started.
    #[error("the scheduler has already been started")]
    AlreadyStarted,

    /// Metric registration failed.
    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Queue discovery failed.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The service reported no queues.
    #[error("no queues found (prefix: {prefix:?})")]
    Empty {
        /// Prefix the listing was filtered by.
        prefix: Option<String>,
    },

    /// Listing queues failed.
    #[error("failed to list queues: {0}")]
    Transport(#[source] BoxError),

    /// Two queues derive the same short name.
    #[error("queues {first} and {second} share the name {name}")]
    DuplicateName {
        /// The shared short name.
        name: String,

        /// Address of the queue listed first.
        first: String,

        /// Address of the queue listed second.
        second: String,
    },
}

/// The request that failed while fetching a queue.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FetchStage {
    /// Fetching numeric attributes.
    Attributes,

    /// Fetching tags.
    Tags,
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attributes => f.write_str("attributes"),
            Self::Tags => f.write_str("tags"),
        }
    }
}

/// Fetching a queue's attributes or tags failed.
#[derive(Debug, Error)]
#[error("failed to fetch {stage} of queue {queue}: {source}")]
pub struct FetchError {
    /// Label of the queue being fetched.
    pub queue: String,

    /// Which request failed.
    pub stage: FetchStage,

    /// The underlying service error.
    #[source]
    pub source: BoxError,
}

/// A queue attribute was missing or not a non-negative integer.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The service did not return the attribute.
    #[error("queue {queue} did not return {attribute}")]
    Missing {
        /// Label of the queue.
        queue: String,

        /// The missing attribute.
        attribute: QueueAttribute,
    },

    /// The attribute value is not a base-10 non-negative integer.
    #[error("queue {queue} returned invalid {attribute} {value:?}")]
    Invalid {
        /// Label of the queue.
        queue: String,

        /// The malformed attribute.
        attribute: QueueAttribute,

        /// The raw value.
        value: String,
    },
}

/// A monitoring cycle failed. Values written before the failure are kept.
#[derive(Debug, Error)]
pub enum MonitoringError {
    /// Discovery failed.
    #[error("monitoring cycle failed during discovery: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Fetching a queue failed.
    #[error("monitoring cycle failed during fetch: {0}")]
    Fetch(#[from] FetchError),

    /// Parsing a queue attribute failed.
    #[error("monitoring cycle failed during parse: {0}")]
    Parse(#[from] ParseError),

    /// The cycle did not finish in time.
    #[error("monitoring cycle exceeded its timeout of {0:?}")]
    Timeout(Duration),
}

/// Classification of a `MonitoringError`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MonitoringErrorKind {
    /// See [`MonitoringError::Discovery`].
    Discovery,

    /// See [`MonitoringError::Fetch`].
    Fetch,

    /// See [`MonitoringError::Parse`].
    Parse,

    /// See [`MonitoringError::Timeout`].
    Timeout,
}

impl MonitoringErrorKind {
    /// Lowercase name, used as a metric label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::Fetch => "fetch",
            Self::Parse => "parse",
            Self::Timeout => "timeout",
        }
    }
}

impl fmt::Display for MonitoringErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl MonitoringError {
    /// Returns the kind of this error.
    #[must_use]
    pub const fn kind(&self) -> MonitoringErrorKind {
        match self {
            Self::Discovery(_) => MonitoringErrorKind::Discovery,
            Self::Fetch(_) => MonitoringErrorKind::Fetch,
            Self::Parse(_) => MonitoringErrorKind::Parse,
            Self::Timeout(_) => MonitoringErrorKind::Timeout,
        }
    }

    /// Label of the queue the cycle stopped at, if any.
    #[must_use]
    pub fn queue(&self) -> Option<&str> {
        match self {
            Self::Fetch(FetchError { queue, .. })
            | Self::Parse(ParseError::Missing { queue, .. } | ParseError::Invalid { queue, .. }) => {
                Some(queue)
            }
            Self::Discovery(_) | Self::Timeout(_) => None,
        }
    }
}
