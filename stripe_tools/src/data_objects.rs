use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A deserialized webhook event envelope, field names as they appear on the Stripe wire.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookEventData {
    pub object: PaymentIntentObject,
}

/// The payment intent object, as returned by the payment intent endpoints and embedded in webhook events.
///
/// Only the fields the payment server acts on are kept. `client_secret` is only present on responses to
/// authenticated API calls, never in webhook deliveries.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentIntentObject {
    pub id: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl PaymentIntentObject {
    /// The order id this intent was created for, if the intent carries one in its metadata.
    pub fn order_id(&self) -> Option<&str> {
        self.metadata.get("order_id").map(|s| s.as_str())
    }
}

/// A webhook event sorted into the two outcomes the reconciler acts on. Everything else lands in
/// [`PaymentEvent::Unhandled`] and is acknowledged without side effects.
#[derive(Debug, Clone)]
pub enum PaymentEvent {
    PaymentSucceeded(PaymentIntentObject),
    PaymentFailed(PaymentIntentObject),
    Unhandled(String),
}

impl From<WebhookEvent> for PaymentEvent {
    fn from(event: WebhookEvent) -> Self {
        match event.event_type.as_str() {
            "payment_intent.succeeded" => PaymentEvent::PaymentSucceeded(event.data.object),
            "payment_intent.payment_failed" => PaymentEvent::PaymentFailed(event.data.object),
            _ => PaymentEvent::Unhandled(event.event_type),
        }
    }
}
