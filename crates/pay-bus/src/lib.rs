//! # pay-bus
//!
//! Message bus publishers for payments-gateway-rs.
//!
//! Both implement `pay_core::EventPublisher`:
//!
//! - `NatsPublisher` - emits on NATS subjects (production)
//! - `InMemoryPublisher` - records messages for assertions (tests)

pub mod memory;
pub mod nats;

pub use memory::{InMemoryPublisher, PublishedMessage};
pub use nats::NatsPublisher;
