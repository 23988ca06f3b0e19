use crate::{
    db_types::{Order, OrderId, OrderItem},
    traits::PaymentGatewayError,
};

/// The `OrderManagement` trait provides queries over orders and their line items.
///
/// The [`super::PaymentGatewayDatabase`] trait handles the machinery of creating and settling orders;
/// `OrderManagement` is the read side used by the flows themselves, by the server, and by tests.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Fetches the order with the given public order id. If no order exists, `None` is returned.
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, PaymentGatewayError>;

    /// Fetches the order that has the given payment intent attached. Until checkout attaches the intent id, webhook
    /// events referencing it will not find the order; the reconciler reports that as a retryable miss.
    async fn fetch_order_by_payment_intent(&self, payment_intent_id: &str)
        -> Result<Option<Order>, PaymentGatewayError>;

    /// Fetches the line items of an order, in insertion order.
    async fn fetch_order_items(&self, order_id: &OrderId) -> Result<Vec<OrderItem>, PaymentGatewayError>;

    /// Fetches all orders placed by the given customer, oldest first.
    async fn fetch_orders_for_customer(&self, customer_id: &str) -> Result<Vec<Order>, PaymentGatewayError>;
}
