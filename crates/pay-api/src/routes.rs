//! # Routes
//!
//! Axum router configuration for the payments API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the main application router
///
/// Routes:
/// - GET  /health - Health check
/// - POST /payments/create-payment-session - Create checkout session
/// - GET  /payments/success - Success redirect target
/// - GET  /payments/cancel - Cancel redirect target
/// - POST /payments/webhook - Stripe webhook (raw body)
pub fn create_router(state: AppState) -> Router {
    let payment_routes = Router::new()
        .route(
            "/create-payment-session",
            post(handlers::create_payment_session),
        )
        .route("/success", get(handlers::payment_success))
        .route("/cancel", get(handlers::payment_cancel))
        .route("/webhook", post(handlers::stripe_webhook));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/payments", payment_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
