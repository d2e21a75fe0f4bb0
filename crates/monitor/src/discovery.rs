use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use sqs_exporter_queues::{QueueRef, QueueService};
use tracing::{debug, warn};

use crate::error::DiscoveryError;

/// What discovery does when two queue addresses share a short name.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LabelCollisionPolicy {
    /// Keep both; the queue listed later overwrites the earlier one's gauges.
    #[default]
    Overwrite,

    /// Fail discovery.
    Reject,

    /// Label every colliding queue with its full address.
    FullAddress,
}

impl fmt::Display for LabelCollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overwrite => f.write_str("overwrite"),
            Self::Reject => f.write_str("reject"),
            Self::FullAddress => f.write_str("full-address"),
        }
    }
}

impl FromStr for LabelCollisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "reject" => Ok(Self::Reject),
            "full-address" | "full_address" => Ok(Self::FullAddress),
            other => Err(format!(
                "unknown label collision policy {other:?} (expected overwrite, reject or full-address)"
            )),
        }
    }
}

/// Lists the queues to monitor.
pub struct QueueDiscovery<S>
where
    S: QueueService,
{
    service: Arc<S>,
    prefix: Option<String>,
    collision_policy: LabelCollisionPolicy,
}

impl<S> QueueDiscovery<S>
where
    S: QueueService,
{
    /// Creates a new `QueueDiscovery`. An empty prefix matches every queue.
    pub fn new(
        service: Arc<S>,
        prefix: Option<String>,
        collision_policy: LabelCollisionPolicy,
    ) -> Self {
        Self {
            service,
            prefix: prefix.filter(|prefix| !prefix.is_empty()),
            collision_policy,
        }
    }

    /// Lists matching queues, in the order the service returned them.
    pub async fn discover(&self) -> Result<Vec<QueueRef>, DiscoveryError> {
        let urls = self
            .service
            .list_queue_urls(self.prefix.as_deref())
            .await
            .map_err(|e| DiscoveryError::Transport(Box::new(e)))?;

        if urls.is_empty() {
            return Err(DiscoveryError::Empty {
                prefix: self.prefix.clone(),
            });
        }

        debug!("discovered {} queues", urls.len());

        let queues = urls.into_iter().map(QueueRef::from_url).collect();

        resolve_collisions(queues, self.collision_policy)
    }
}

fn resolve_collisions(
    mut queues: Vec<QueueRef>,
    policy: LabelCollisionPolicy,
) -> Result<Vec<QueueRef>, DiscoveryError> {
    let mut first_seen: HashMap<&str, &str> = HashMap::new();
    let mut colliding: HashSet<String> = HashSet::new();

    for queue in &queues {
        let first = match first_seen.entry(queue.name.as_str()) {
            Entry::Vacant(entry) => {
                entry.insert(&queue.url);
                continue;
            }
            Entry::Occupied(entry) => *entry.get(),
        };

        match policy {
            LabelCollisionPolicy::Reject => {
                return Err(DiscoveryError::DuplicateName {
                    name: queue.name.clone(),
                    first: first.to_string(),
                    second: queue.url.clone(),
                });
            }
            LabelCollisionPolicy::Overwrite => {
                warn!(
                    "queues {} and {} share the name {}; the latter overwrites the former",
                    first, queue.url, queue.name
                );
            }
            LabelCollisionPolicy::FullAddress => {}
        }

        colliding.insert(queue.name.clone());
    }

    if policy == LabelCollisionPolicy::FullAddress {
        for queue in &mut queues {
            if colliding.contains(&queue.name) {
                queue.name.clone_from(&queue.url);
            }
        }
    }

    Ok(queues)
}
