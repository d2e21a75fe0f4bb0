use std::fmt;

/// A discovered queue: its service address and the label it is exported under.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct QueueRef {
    /// Label used for the queue's metrics.
    pub name: String,

    /// Service-assigned address of the queue.
    pub url: String,
}

impl QueueRef {
    /// Creates a `QueueRef` labelled with the short name of `url`.
    #[must_use]
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();

        Self {
            name: short_name(&url).to_string(),
            url,
        }
    }
}

impl fmt::Display for QueueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.url)
    }
}

/// Returns the final path segment of a queue address.
#[must_use]
pub fn short_name(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}
