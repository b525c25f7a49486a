//! # Payments Service
//!
//! Session creation and webhook relaying, independent of the HTTP layer.
//!
//! ```text
//!  POST /payments/webhook
//!          │
//!          ▼
//!  ┌───────────────┐  400  ┌──────────────────────┐
//!  │   verifying   │──────▶│ rejected (no publish)│
//!  └───────┬───────┘       └──────────────────────┘
//!          │ verified
//!          ▼
//!  ┌───────────────┐  charge.succeeded  ┌───────────────────────┐
//!  │  dispatched   │───────────────────▶│ emit payment.succeeded│
//!  └───────────────┘                    └───────────────────────┘
//!          │ 200 (always, once dispatched)
//! ```

use async_trait::async_trait;
use pay_core::{
    BoxedEventPublisher, BoxedPaymentStrategy, ChargeSucceeded, PaymentError, PaymentResult,
    PaymentSessionRequest, PaymentSessionResult, PaymentSucceeded, PAYMENT_SUCCEEDED_TOPIC,
};
use pay_stripe::{dispatch_webhook_event, WebhookHandler};
use std::collections::HashSet;
use std::sync::Mutex;
use tracing::{error, info, instrument, warn};

/// Relays successful charges to the message bus.
///
/// Without a dedup guard every verified delivery is published, so provider
/// redeliveries become duplicate messages.
pub struct PaymentRelay {
    publisher: BoxedEventPublisher,
    seen_charges: Option<Mutex<HashSet<String>>>,
}

impl PaymentRelay {
    pub fn new(publisher: BoxedEventPublisher) -> Self {
        Self {
            publisher,
            seen_charges: None,
        }
    }

    /// Builder: publish each charge id at most once for the life of the process
    pub fn with_dedup(mut self) -> Self {
        self.seen_charges = Some(Mutex::new(HashSet::new()));
        self
    }

    /// Returns false when the charge was already relayed.
    fn claim(&self, charge_id: &str) -> PaymentResult<bool> {
        match &self.seen_charges {
            Some(seen) => Ok(seen
                .lock()
                .map_err(|_| PaymentError::Internal("dedup lock poisoned".to_string()))?
                .insert(charge_id.to_string())),
            None => Ok(true),
        }
    }

    fn release(&self, charge_id: &str) {
        if let Some(seen) = &self.seen_charges {
            if let Ok(mut seen) = seen.lock() {
                seen.remove(charge_id);
            }
        }
    }
}

#[async_trait]
impl WebhookHandler for PaymentRelay {
    async fn on_charge_succeeded(&self, charge: ChargeSucceeded) -> PaymentResult<()> {
        if !self.claim(&charge.charge_id)? {
            info!("Charge {} already relayed, skipping", charge.charge_id);
            return Ok(());
        }

        let charge_id = charge.charge_id.clone();
        let message = PaymentSucceeded::from(charge);
        let payload = serde_json::to_value(&message)?;

        // Fire-and-forget: a bus failure is logged, never surfaced to the provider.
        match self.publisher.publish(PAYMENT_SUCCEEDED_TOPIC, payload).await {
            Ok(()) => info!(
                "Published {}: charge={}, order={:?}",
                PAYMENT_SUCCEEDED_TOPIC, charge_id, message.order_id
            ),
            Err(e) => {
                error!("Failed to publish {}: {}", PAYMENT_SUCCEEDED_TOPIC, e);
                self.release(&charge_id);
            }
        }

        Ok(())
    }
}

/// Session Initiator and Webhook Handler behind one injected facade.
pub struct PaymentsService {
    strategy: BoxedPaymentStrategy,
    relay: PaymentRelay,
    success_url: String,
    cancel_url: String,
}

impl PaymentsService {
    pub fn new(
        strategy: BoxedPaymentStrategy,
        publisher: BoxedEventPublisher,
        success_url: impl Into<String>,
        cancel_url: impl Into<String>,
    ) -> Self {
        Self {
            strategy,
            relay: PaymentRelay::new(publisher),
            success_url: success_url.into(),
            cancel_url: cancel_url.into(),
        }
    }

    /// Builder: enable or disable charge deduplication
    pub fn with_charge_dedup(mut self, enabled: bool) -> Self {
        if enabled {
            self.relay = self.relay.with_dedup();
        }
        self
    }

    /// Create a hosted checkout session for `request`.
    ///
    /// Provider errors are returned as-is.
    #[instrument(skip(self, request), fields(order_id = %request.order_id, items = request.items.len()))]
    pub async fn create_payment_session(
        &self,
        request: &PaymentSessionRequest,
    ) -> PaymentResult<PaymentSessionResult> {
        request.validate()?;

        self.strategy
            .create_checkout(request, &self.success_url, &self.cancel_url)
            .await
    }

    /// Verify a webhook delivery and route the event.
    ///
    /// An `Err` means the delivery was rejected and nothing was published.
    #[instrument(skip(self, payload, signature), fields(provider = self.strategy.provider_name()))]
    pub async fn handle_webhook(&self, payload: &[u8], signature: &str) -> PaymentResult<()> {
        let event = self
            .strategy
            .verify_webhook(payload, signature)
            .await
            .map_err(|e| {
                warn!("Webhook rejected: {}", e);
                e
            })?;

        info!("Received webhook: type={}", event.event_type());

        dispatch_webhook_event(&self.relay, event).await
    }
}
