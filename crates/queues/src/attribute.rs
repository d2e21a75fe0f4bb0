use std::fmt;

/// Numeric queue attributes sampled by the exporter.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum QueueAttribute {
    /// Messages available for retrieval.
    ApproximateNumberOfMessages,

    /// Messages waiting out their delivery delay.
    ApproximateNumberOfMessagesDelayed,

    /// Messages received but not yet deleted or timed out.
    ApproximateNumberOfMessagesNotVisible,
}

impl QueueAttribute {
    /// Every attribute the exporter requests, in request order.
    pub const ALL: [Self; 3] = [
        Self::ApproximateNumberOfMessages,
        Self::ApproximateNumberOfMessagesDelayed,
        Self::ApproximateNumberOfMessagesNotVisible,
    ];

    /// The attribute name as used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApproximateNumberOfMessages => "ApproximateNumberOfMessages",
            Self::ApproximateNumberOfMessagesDelayed => "ApproximateNumberOfMessagesDelayed",
            Self::ApproximateNumberOfMessagesNotVisible => {
                "ApproximateNumberOfMessagesNotVisible"
            }
        }
    }
}

impl fmt::Display for QueueAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        let names: Vec<_> = QueueAttribute::ALL.iter().map(ToString::to_string).collect();

        assert_eq!(
            names,
            vec![
                "ApproximateNumberOfMessages",
                "ApproximateNumberOfMessagesDelayed",
                "ApproximateNumberOfMessagesNotVisible",
            ]
        );
    }
}
