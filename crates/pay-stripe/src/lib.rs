//! # pay-stripe
//!
//! Stripe payment strategy for payments-gateway-rs.
//!
//! **StripeCheckoutStrategy** wraps the Checkout Sessions API for one-time
//! payments and verifies Stripe webhook signatures.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pay_stripe::{StripeCheckoutStrategy, StripeConfig};
//! use pay_core::{PaymentSessionRequest, PaymentStrategy};
//!
//! // Create strategy from environment
//! let strategy = StripeCheckoutStrategy::new(StripeConfig::from_env()?);
//!
//! // Create checkout session
//! let session = strategy.create_checkout(
//!     &request,
//!     "https://example.com/payments/success",
//!     "https://example.com/payments/cancel",
//! ).await?;
//!
//! // Redirect user to session.checkout_url
//! ```
//!
//! ## Webhook Handling
//!
//! ```rust,ignore
//! use pay_stripe::webhook::{dispatch_webhook_event, WebhookHandler};
//!
//! struct MyHandler;
//!
//! #[async_trait]
//! impl WebhookHandler for MyHandler {
//!     async fn on_charge_succeeded(&self, charge: ChargeSucceeded) -> PaymentResult<()> {
//!         println!("Order {:?} paid!", charge.order_id);
//!         Ok(())
//!     }
//! }
//!
//! // In your webhook endpoint:
//! let event = strategy.verify_webhook(&raw_body, signature).await?;
//! dispatch_webhook_event(&MyHandler, event).await?;
//! ```

pub mod checkout;
pub mod config;
pub mod webhook;

// Re-exports
pub use checkout::StripeCheckoutStrategy;
pub use config::StripeConfig;
pub use webhook::{
    dispatch_webhook_event, WebhookHandler, REQUIRED_WEBHOOK_EVENTS, SIGNATURE_HEADER,
};
