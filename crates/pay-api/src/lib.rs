//! # pay-api
//!
//! HTTP API layer for payments-gateway-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Checkout session creation
//! - Stripe webhook verification and relaying to the message bus
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/payments/create-payment-session` | Create checkout session |
//! | GET | `/payments/success` | Checkout success redirect |
//! | GET | `/payments/cancel` | Checkout cancel redirect |
//! | POST | `/payments/webhook` | Stripe webhook |

pub mod handlers;
pub mod routes;
pub mod service;
pub mod state;

pub use routes::create_router;
pub use service::{PaymentRelay, PaymentsService};
pub use state::{AppConfig, AppState};
