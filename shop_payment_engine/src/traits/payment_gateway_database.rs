use chrono::Duration;
use thiserror::Error;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderItemSource, SettlementOutcome},
    traits::{CartManagement, CatalogManagement, OrderManagement, PaymentProviderError},
};

/// This trait defines the highest level of behaviour for backends supporting the Shop Payment Engine.
///
/// This behaviour includes:
/// * Turning a validated checkout request into a durable pending order.
/// * Settling successful payment events: confirming the order and committing the stock decrement atomically, with
///   duplicate deliveries suppressed.
/// * Recording failed payment events.
/// * Reclaiming stale pending orders.
#[allow(async_fn_in_trait)]
pub trait PaymentGatewayDatabase: Clone + OrderManagement + CartManagement + CatalogManagement {
    /// The URL of the database.
    fn url(&self) -> &str;

    /// Takes a new order and, in a single atomic transaction:
    /// * prices every line item against the catalog *at call time* and computes the order total,
    /// * stores the order with `New` status and `Pending` payment status, along with its line items,
    /// * clears the customer's cart when the items were sourced from it (`OrderItemSource::CustomerCart`).
    ///
    /// Stock is neither checked nor reserved here; the decrement is deferred to settlement.
    ///
    /// Returns the stored order record.
    async fn create_pending_order(&self, order: NewOrder, source: OrderItemSource) -> Result<Order, PaymentGatewayError>;

    /// Attaches the payment-provider intent id to the order. The intent id is set exactly once: attaching the same
    /// id again is a no-op, while attaching a different id to an order that already has one is an error.
    ///
    /// Returns the updated order record.
    async fn attach_payment_intent(
        &self,
        order_id: &OrderId,
        payment_intent_id: &str,
    ) -> Result<Order, PaymentGatewayError>;

    /// Annuls a pending order. This is called as checkout compensation when the payment provider rejects the intent
    /// request, and by the expiry sweep for stale orders.
    ///
    /// The order must still be pending (`New` / `Pending`); orders with settled or failed payments are refused. The
    /// reason is recorded in the order's memo field.
    ///
    /// Returns the cancelled order record.
    async fn cancel_order(&self, order_id: &OrderId, reason: &str) -> Result<Order, PaymentGatewayError>;

    /// Settles a successful payment event against the order holding `payment_intent_id`. In a single atomic
    /// transaction:
    /// * the order is loaded by intent id ([`PaymentGatewayError::OrderNotFoundForIntent`] if there is none),
    /// * an order that is already `Paid` short-circuits to [`SettlementOutcome::AlreadySettled`] without touching
    ///   anything — this is what makes duplicate webhook deliveries harmless,
    /// * the order is marked `Paid` and `Confirmed`,
    /// * every line item re-reads its product's stock and decrements it, failing the whole transaction with
    ///   [`PaymentGatewayError::InsufficientStock`] if any line cannot be covered.
    ///
    /// On insufficient stock nothing is committed: no stock moves and the order stays pending for manual
    /// intervention.
    async fn settle_order_by_intent(&self, payment_intent_id: &str) -> Result<SettlementOutcome, PaymentGatewayError>;

    /// Records a failed payment event against the order holding `payment_intent_id`. The payment status moves to
    /// `Failed` only from `Pending`; the call is idempotent and returns `None` when nothing changed (repeat
    /// deliveries, or an order that already settled).
    ///
    /// Returns the updated order record when a transition happened.
    async fn fail_order_by_intent(&self, payment_intent_id: &str) -> Result<Option<Order>, PaymentGatewayError>;

    /// Cancels pending orders that have not been updated for longer than `unpaid_limit`. These are typically
    /// checkouts that were abandoned before payment, or that crashed between order creation and intent attachment.
    ///
    /// The result is the list of orders that were cancelled.
    async fn expire_old_orders(&self, unpaid_limit: Duration) -> Result<Vec<Order>, PaymentGatewayError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), PaymentGatewayError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum PaymentGatewayError {
    #[error("We have an internal database error (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("The checkout request is missing the required field {0}")]
    MissingField(String),
    #[error("Cannot create an order with no line items")]
    EmptyOrder,
    #[error("Line item quantity for product {0} must be positive, not {1}")]
    InvalidQuantity(String, i64),
    #[error("Product {0} is not listed in the catalog")]
    ProductNotFound(String),
    #[error("Insufficient stock of product {product_id}: {requested} requested, {available} available")]
    InsufficientStock { product_id: String, requested: i64, available: i64 },
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("No order is associated with payment intent {0}")]
    OrderNotFoundForIntent(String),
    #[error("Order {0} already has payment intent {1} attached")]
    PaymentIntentAlreadyAttached(OrderId, String),
    #[error("Illegal payment status change for order {0}: {1}")]
    PaymentStatusUpdateError(OrderId, String),
    #[error("Order {0} is not pending and cannot be cancelled")]
    OrderNotPending(OrderId),
    #[error("Payment provider error: {0}")]
    GatewayError(#[from] PaymentProviderError),
}

impl PaymentGatewayError {
    /// Whether a retry of the triggering request could plausibly succeed. The webhook endpoint uses this to pick
    /// between statuses that ask the payment provider to redeliver and statuses that should page an operator.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentGatewayError::DatabaseError(_) | PaymentGatewayError::OrderNotFoundForIntent(_)
        )
    }
}

impl From<sqlx::Error> for PaymentGatewayError {
    fn from(e: sqlx::Error) -> Self {
        PaymentGatewayError::DatabaseError(e.to_string())
    }
}
