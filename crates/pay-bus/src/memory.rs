//! # In-Memory Publisher
//!
//! Records every published message instead of sending it anywhere.
//! Used by tests and for running the gateway without a bus.

use async_trait::async_trait;
use pay_core::{EventPublisher, PaymentError, PaymentResult};
use std::sync::RwLock;

/// A message captured by [`InMemoryPublisher`]
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedMessage {
    pub topic: String,
    pub payload: serde_json::Value,
}

/// Publisher that keeps messages in process memory.
///
/// ```ignore
/// let bus = Arc::new(InMemoryPublisher::new());
/// bus.publish("payment.succeeded", json!({ "orderId": "abc123" })).await?;
/// assert_eq!(bus.count_on("payment.succeeded"), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryPublisher {
    published: RwLock<Vec<PublishedMessage>>,
    failure: Option<String>,
}

impl InMemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A publisher whose every `publish` call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            published: RwLock::new(Vec::new()),
            failure: Some(message.into()),
        }
    }

    /// All published messages, in publish order
    pub fn messages(&self) -> Vec<PublishedMessage> {
        self.published
            .read()
            .map(|published| published.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Messages published on `topic`
    pub fn messages_on(&self, topic: &str) -> Vec<PublishedMessage> {
        self.messages()
            .into_iter()
            .filter(|m| m.topic == topic)
            .collect()
    }

    /// Total publish count
    pub fn count(&self) -> usize {
        self.messages().len()
    }

    /// Publish count for `topic`
    pub fn count_on(&self, topic: &str) -> usize {
        self.messages_on(topic).len()
    }
}

#[async_trait]
impl EventPublisher for InMemoryPublisher {
    async fn publish(&self, topic: &str, payload: serde_json::Value) -> PaymentResult<()> {
        if let Some(message) = &self.failure {
            return Err(PaymentError::PublishFailed {
                topic: topic.to_string(),
                message: message.clone(),
            });
        }

        self.published
            .write()
            .map_err(|_| PaymentError::Internal("publisher lock poisoned".to_string()))?
            .push(PublishedMessage {
                topic: topic.to_string(),
                payload,
            });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_records_messages_in_order() {
        let bus = InMemoryPublisher::new();

        bus.publish("payment.succeeded", json!({ "orderId": "a" }))
            .await
            .unwrap();
        bus.publish("payment.failed", json!({ "orderId": "b" }))
            .await
            .unwrap();
        bus.publish("payment.succeeded", json!({ "orderId": "c" }))
            .await
            .unwrap();

        assert_eq!(bus.count(), 3);
        assert_eq!(bus.count_on("payment.succeeded"), 2);

        let succeeded = bus.messages_on("payment.succeeded");
        assert_eq!(succeeded[0].payload["orderId"], "a");
        assert_eq!(succeeded[1].payload["orderId"], "c");
    }

    #[tokio::test]
    async fn test_failing_publisher_records_nothing() {
        let bus = InMemoryPublisher::failing("connection closed");

        let err = bus
            .publish("payment.succeeded", json!({}))
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::PublishFailed { .. }));
        assert!(err.to_string().contains("connection closed"));
        assert_eq!(bus.count(), 0);
    }
}
