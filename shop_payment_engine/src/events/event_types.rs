use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderStatusType};

/// Fired when a settlement confirms an order: payment is `Paid`, the order is `Confirmed`, and the stock decrement
/// has been committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmedEvent {
    pub order: Order,
}

impl OrderConfirmedEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

/// Fired when a payment-failure event moves an order's payment status to `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentFailedEvent {
    pub order: Order,
}

impl PaymentFailedEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

/// Fired when an order is annulled, either as checkout compensation or by the expiry sweep. Subscribers typically
/// cancel the provider-side payment intent, if one was attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAnnulledEvent {
    pub order: Order,
    pub status: OrderStatusType,
}

impl OrderAnnulledEvent {
    pub fn new(order: Order) -> Self {
        let status = order.status;
        Self { order, status }
    }
}
