//! # pay-core
//!
//! Core types and traits for the payments gateway.
//!
//! This crate provides:
//! - `PaymentStrategy` trait for the payment provider client
//! - `EventPublisher` trait for the message bus
//! - `PaymentSessionRequest` and `PaymentSessionResult` for checkout
//! - `WebhookEvent` and `PaymentSucceeded` for webhook relaying
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use pay_core::{PaymentSessionRequest, PaymentStrategy};
//!
//! let request = PaymentSessionRequest::new("usd", "order-42")
//!     .with_item("Keyboard", 49.99, 1);
//! request.validate()?;
//!
//! let session = strategy.create_checkout(&request, success_url, cancel_url).await?;
//!
//! // Redirect user to session.checkout_url
//! ```

pub mod error;
pub mod event;
pub mod publisher;
pub mod session;
pub mod strategy;

// Re-exports for convenience
pub use error::{PaymentError, PaymentResult};
pub use event::{
    ChargeSucceeded, PaymentSucceeded, WebhookEvent, CHARGE_SUCCEEDED, PAYMENT_SUCCEEDED_TOPIC,
};
pub use publisher::{BoxedEventPublisher, EventPublisher};
pub use session::{
    to_smallest_unit, PaymentSessionItem, PaymentSessionRequest, PaymentSessionResult,
    MAX_UNIT_AMOUNT,
};
pub use strategy::{BoxedPaymentStrategy, PaymentStrategy};
