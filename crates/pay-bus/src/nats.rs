//! # NATS Publisher
//!
//! Emits messages on NATS subjects using the `{ pattern, data }` envelope
//! that the downstream microservices' NATS transport decodes.

use async_trait::async_trait;
use pay_core::{EventPublisher, PaymentError, PaymentResult};
use serde::Serialize;
use tracing::{debug, info, instrument};

#[derive(Debug, Serialize)]
struct EventPacket<'a> {
    pattern: &'a str,
    data: &'a serde_json::Value,
}

/// Encode a payload for `topic` in the event envelope.
pub fn encode_packet(topic: &str, payload: &serde_json::Value) -> PaymentResult<Vec<u8>> {
    let packet = EventPacket {
        pattern: topic,
        data: payload,
    };
    Ok(serde_json::to_vec(&packet)?)
}

/// Core-NATS publisher. No JetStream acknowledgment is requested.
#[derive(Clone)]
pub struct NatsPublisher {
    client: async_nats::Client,
}

impl NatsPublisher {
    pub fn new(client: async_nats::Client) -> Self {
        Self { client }
    }

    /// Connect to the given server URLs.
    pub async fn connect(servers: &[String]) -> PaymentResult<Self> {
        if servers.is_empty() {
            return Err(PaymentError::Configuration(
                "at least one NATS server is required".to_string(),
            ));
        }

        let addrs = servers.join(",");
        let client = async_nats::connect(addrs.as_str())
            .await
            .map_err(|e| PaymentError::Configuration(format!("NATS connect failed: {}", e)))?;

        info!("Connected to NATS: {}", addrs);
        Ok(Self::new(client))
    }
}

#[async_trait]
impl EventPublisher for NatsPublisher {
    #[instrument(skip(self, payload))]
    async fn publish(&self, topic: &str, payload: serde_json::Value) -> PaymentResult<()> {
        let bytes = encode_packet(topic, &payload)?;

        self.client
            .publish(topic.to_string(), bytes.into())
            .await
            .map_err(|e| PaymentError::PublishFailed {
                topic: topic.to_string(),
                message: e.to_string(),
            })?;

        debug!("Emitted message on {}", topic);
        Ok(())
    }
}
