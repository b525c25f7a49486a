//! # Webhook Event Types
//!
//! Verified provider events and the messages derived from them.

use serde::{Deserialize, Serialize};

/// Topic for successful-charge notifications on the message bus
pub const PAYMENT_SUCCEEDED_TOPIC: &str = "payment.succeeded";

/// Provider event type string for a successful charge
pub const CHARGE_SUCCEEDED: &str = "charge.succeeded";

/// Fields of a `charge.succeeded` event consumed by the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeSucceeded {
    /// Provider charge id (`ch_...`)
    pub charge_id: String,
    /// Order id attached as payment intent metadata at session creation
    pub order_id: Option<String>,
    /// Hosted receipt page
    pub receipt_url: Option<String>,
}

/// A verified webhook event
///
/// New event kinds get their own variant; everything unhandled lands in `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    ChargeSucceeded(ChargeSucceeded),
    Other { event_type: String },
}

impl WebhookEvent {
    /// The provider's event type string
    pub fn event_type(&self) -> &str {
        match self {
            WebhookEvent::ChargeSucceeded(_) => CHARGE_SUCCEEDED,
            WebhookEvent::Other { event_type } => event_type,
        }
    }
}

/// Message published on [`PAYMENT_SUCCEEDED_TOPIC`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSucceeded {
    pub stripe_payment_id: String,
    pub order_id: Option<String>,
    pub receipt_url: Option<String>,
}

impl From<ChargeSucceeded> for PaymentSucceeded {
    fn from(charge: ChargeSucceeded) -> Self {
        Self {
            stripe_payment_id: charge.charge_id,
            order_id: charge.order_id,
            receipt_url: charge.receipt_url,
        }
    }
}
