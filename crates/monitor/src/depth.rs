use std::collections::HashMap;

use sqs_exporter_queues::QueueAttribute;

use crate::error::ParseError;

/// Parsed message counts of one queue.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct QueueDepth {
    /// Messages available for retrieval.
    pub visible: f64,

    /// Messages still within their delivery delay.
    pub delayed: f64,

    /// Messages received but not yet deleted.
    pub in_flight: f64,
}

impl QueueDepth {
    /// Creates a `QueueDepth` from already parsed counts.
    #[must_use]
    pub const fn new(visible: f64, delayed: f64, in_flight: f64) -> Self {
        Self {
            visible,
            delayed,
            in_flight,
        }
    }

    /// Parses the raw attribute values returned for `queue`.
    ///
    /// Every attribute must be present and a base-10 non-negative integer.
    pub fn parse(
        queue: &str,
        attributes: &HashMap<QueueAttribute, String>,
    ) -> Result<Self, ParseError> {
        Ok(Self {
            visible: parse_count(queue, attributes, QueueAttribute::ApproximateNumberOfMessages)?,
            delayed: parse_count(
                queue,
                attributes,
                QueueAttribute::ApproximateNumberOfMessagesDelayed,
            )?,
            in_flight: parse_count(
                queue,
                attributes,
                QueueAttribute::ApproximateNumberOfMessagesNotVisible,
            )?,
        })
    }
}

#[allow(clippy::cast_precision_loss)]
fn parse_count(
    queue: &str,
    attributes: &HashMap<QueueAttribute, String>,
    attribute: QueueAttribute,
) -> Result<f64, ParseError> {
    let value = attributes.get(&attribute).ok_or_else(|| ParseError::Missing {
        queue: queue.to_string(),
        attribute,
    })?;

    // u64 parsing accepts a leading '+', which is not a plain base-10 count.
    value
        .parse::<u64>()
        .ok()
        .filter(|_| !value.starts_with('+'))
        .map(|count| count as f64)
        .ok_or_else(|| ParseError::Invalid {
            queue: queue.to_string(),
            attribute,
            value: value.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attributes(visible: &str, delayed: &str, in_flight: &str) -> HashMap<QueueAttribute, String> {
        HashMap::from([
            (QueueAttribute::ApproximateNumberOfMessages, visible.to_string()),
            (QueueAttribute::ApproximateNumberOfMessagesDelayed, delayed.to_string()),
            (QueueAttribute::ApproximateNumberOfMessagesNotVisible, in_flight.to_string()),
        ])
    }

    #[test]
    fn test_parse_counts() {
        let depth = QueueDepth::parse("orders", &attributes("12", "0", "3")).unwrap();

        assert_eq!(depth, QueueDepth::new(12.0, 0.0, 3.0));
    }

    #[test]
    fn test_zero_is_valid() {
        let depth = QueueDepth::parse("orders", &attributes("0", "0", "0")).unwrap();

        assert!(depth.visible.abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejects_non_numeric() {
        let err = QueueDepth::parse("orders", &attributes("abc", "0", "0")).unwrap_err();

        match err {
            ParseError::Invalid {
                queue,
                attribute,
                value,
            } => {
                assert_eq!(queue, "orders");
                assert_eq!(attribute, QueueAttribute::ApproximateNumberOfMessages);
                assert_eq!(value, "abc");
            }
            ParseError::Missing { .. } => panic!("expected invalid value"),
        }
    }

    #[test]
    fn test_rejects_negative_and_signed() {
        assert!(QueueDepth::parse("orders", &attributes("-1", "0", "0")).is_err());
        assert!(QueueDepth::parse("orders", &attributes("+1", "0", "0")).is_err());
        assert!(QueueDepth::parse("orders", &attributes("1.5", "0", "0")).is_err());
    }

    #[test]
    fn test_missing_attribute() {
        let mut attrs = attributes("1", "2", "3");
        attrs.remove(&QueueAttribute::ApproximateNumberOfMessagesDelayed);

        let err = QueueDepth::parse("orders", &attrs).unwrap_err();

        assert!(matches!(
            err,
            ParseError::Missing {
                attribute: QueueAttribute::ApproximateNumberOfMessagesDelayed,
                ..
            }
        ));
    }
}
