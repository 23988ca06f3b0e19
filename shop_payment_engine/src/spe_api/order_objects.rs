use serde::{Deserialize, Serialize};

use crate::db_types::{NewOrderItem, Order};

/// A checkout request as handed to [`crate::OrderFlowApi::checkout`].
///
/// When `items` is present, those line items are ordered as given. When it is absent, the customer's stored cart
/// supplies the items, and the cart is emptied in the same transaction that creates the order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub customer_id: String,
    pub shipping_address: String,
    pub items: Option<Vec<NewOrderItem>>,
    pub memo: Option<String>,
}

impl CheckoutRequest {
    pub fn new<S1, S2>(customer_id: S1, shipping_address: S2, items: Option<Vec<NewOrderItem>>) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self { customer_id: customer_id.into(), shipping_address: shipping_address.into(), items, memo: None }
    }
}

/// The result of a successful checkout: the stored pending order, and the client secret the storefront needs to
/// collect payment against the intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSummary {
    pub order: Order,
    pub client_secret: String,
}
