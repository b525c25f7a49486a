//! # Payment Strategy Trait
//!
//! Seam between the gateway and the payment provider client.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PaymentStrategy (trait)                  │
//! │  ├── create_checkout()                                      │
//! │  ├── verify_webhook()                                       │
//! │  └── provider_name()                                        │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                    ┌───────┴───────┐
//!                    │StripeCheckout │
//!                    │   Strategy    │
//!                    └───────────────┘
//! ```

use crate::error::PaymentResult;
use crate::event::WebhookEvent;
use crate::session::{PaymentSessionRequest, PaymentSessionResult};
use async_trait::async_trait;
use std::sync::Arc;

/// Payment provider client.
///
/// Long-lived and injected at construction; the gateway never reaches
/// for a global client.
#[async_trait]
pub trait PaymentStrategy: Send + Sync {
    /// Create a hosted checkout session and return its redirect URLs.
    ///
    /// Provider errors are returned unchanged; nothing is retried.
    async fn create_checkout(
        &self,
        request: &PaymentSessionRequest,
        success_url: &str,
        cancel_url: &str,
    ) -> PaymentResult<PaymentSessionResult>;

    /// Verify a webhook signature against the raw body and parse the event.
    ///
    /// # Arguments
    /// * `payload` - Raw webhook body bytes, exactly as received
    /// * `signature` - Signature header from the request
    async fn verify_webhook(&self, payload: &[u8], signature: &str)
        -> PaymentResult<WebhookEvent>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared payment strategy (dynamic dispatch)
pub type BoxedPaymentStrategy = Arc<dyn PaymentStrategy>;

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn PaymentStrategy) {}

    #[test]
    fn test_boxed_strategy_is_send_sync() {
        fn check<T: Send + Sync>() {}
        check::<BoxedPaymentStrategy>();
    }
}
