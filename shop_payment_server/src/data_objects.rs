use serde::{Deserialize, Serialize};
use shop_payment_engine::{
    db_types::{NewOrderItem, OrderId},
    order_objects::{CheckoutRequest, CheckoutSummary},
};

/// The checkout request body, as the storefront posts it.
///
/// `items` may be omitted, in which case the order is built from the customer's stored cart. Note that totals and
/// unit prices are never part of the payload; the engine prices every line against the catalog itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload {
    pub customer_id: String,
    pub shipping_address: String,
    #[serde(default)]
    pub items: Option<Vec<CheckoutItem>>,
    #[serde(default)]
    pub memo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    pub product_id: String,
    pub quantity: i64,
}

impl From<CheckoutPayload> for CheckoutRequest {
    fn from(payload: CheckoutPayload) -> Self {
        let items = payload
            .items
            .map(|items| items.into_iter().map(|i| NewOrderItem::new(i.product_id, i.quantity)).collect());
        let mut request = CheckoutRequest::new(payload.customer_id, payload.shipping_address, items);
        request.memo = payload.memo;
        request
    }
}

/// The checkout response. `client_secret` is what the storefront hands to Stripe.js to collect payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResult {
    pub success: bool,
    pub order_id: OrderId,
    pub client_secret: String,
}

impl From<CheckoutSummary> for CheckoutResult {
    fn from(summary: CheckoutSummary) -> Self {
        Self { success: true, order_id: summary.order.order_id, client_secret: summary.client_secret }
    }
}

/// The body Stripe expects back for an acknowledged webhook delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub received: bool,
}

impl WebhookAck {
    pub fn received() -> Self {
        Self { received: true }
    }
}
