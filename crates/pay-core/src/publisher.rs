//! # Event Publisher Trait
//!
//! Narrow view of the message bus: the gateway only ever emits.

use crate::error::PaymentResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Fire-and-forget publisher.
///
/// `publish` returns once the message is handed to the transport. No reply
/// or acknowledgment from a consumer is awaited.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: serde_json::Value) -> PaymentResult<()>;
}

/// Type alias for a shared publisher
pub type BoxedEventPublisher = Arc<dyn EventPublisher>;

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn EventPublisher) {}

    #[test]
    fn test_boxed_publisher_is_send_sync() {
        fn check<T: Send + Sync>() {}
        check::<BoxedEventPublisher>();
    }
}
