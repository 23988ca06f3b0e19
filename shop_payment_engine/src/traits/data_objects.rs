use serde::{Deserialize, Serialize};
use spg_common::Cents;

use crate::db_types::{Order, OrderId};

/// A request for a new payment intent at the payment provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPaymentIntent {
    pub order_id: OrderId,
    pub customer_id: String,
    pub amount: Cents,
    pub currency: String,
}

impl NewPaymentIntent {
    /// Builds the intent request for a freshly created pending order.
    pub fn for_order(order: &Order) -> Self {
        Self {
            order_id: order.order_id.clone(),
            customer_id: order.customer_id.clone(),
            amount: order.total_amount,
            currency: order.currency.clone(),
        }
    }
}

/// The provider-side payment intent, as far as the engine cares about it: the id that webhook events will carry,
/// and the client secret the storefront needs to collect payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}
