use std::fmt::Debug;

use chrono::Duration;
use log::*;

use crate::{
    db_types::{NewOrder, NewOrderItem, Order, OrderItemSource, SettlementOutcome},
    events::{EventProducers, OrderAnnulledEvent, OrderConfirmedEvent, PaymentFailedEvent},
    spe_api::order_objects::{CheckoutRequest, CheckoutSummary},
    traits::{NewPaymentIntent, PaymentGateway, PaymentGatewayDatabase, PaymentGatewayError},
};

/// `OrderFlowApi` is the primary API for handling checkout and settlement flows in response to storefront requests
/// and payment-provider webhook events.
pub struct OrderFlowApi<B, G> {
    db: B,
    gateway: G,
    producers: EventProducers,
}

impl<B, G> Debug for OrderFlowApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B, G> OrderFlowApi<B, G> {
    pub fn new(db: B, gateway: G, producers: EventProducers) -> Self {
        Self { db, gateway, producers }
    }
}

impl<B, G> OrderFlowApi<B, G>
where
    B: PaymentGatewayDatabase,
    G: PaymentGateway,
{
    /// Runs the checkout flow for a storefront request.
    ///
    /// The request is validated, its line items are resolved (explicitly given, or read from the customer's stored
    /// cart), and a pending order is stored with unit prices captured from the catalog. A payment intent for the
    /// order total is then requested from the payment provider. If the provider refuses, the freshly created order is
    /// cancelled again and the provider error is returned; the storefront can safely re-submit the checkout.
    ///
    /// No stock is checked or reserved here. Stock is only decremented when the payment settles.
    pub async fn checkout(&self, request: CheckoutRequest) -> Result<CheckoutSummary, PaymentGatewayError> {
        let (items, source) = self.resolve_line_items(&request).await?;
        let mut new_order = NewOrder::new(request.customer_id, request.shipping_address, items);
        if let Some(memo) = request.memo {
            new_order = new_order.with_memo(memo);
        }
        let order_id = new_order.order_id.clone();
        let order = self.db.create_pending_order(new_order, source).await?;
        trace!("🛒️ Order {order_id} has been stored and is awaiting a payment intent");
        let intent = match self.gateway.create_payment_intent(NewPaymentIntent::for_order(&order)).await {
            Ok(intent) => intent,
            Err(e) => {
                warn!("🛒️ No payment intent could be created for order {order_id} ({e}). Rolling the order back.");
                self.db.cancel_order(&order_id, "Payment intent could not be created").await?;
                return Err(PaymentGatewayError::GatewayError(e));
            },
        };
        let order = self.db.attach_payment_intent(&order_id, &intent.id).await?;
        info!(
            "🛒️ Checkout for order {order_id} is complete. Intent {} awaits payment of {}",
            intent.id, order.total_amount
        );
        Ok(CheckoutSummary { order, client_secret: intent.client_secret })
    }

    /// Settles a successful payment event delivered by the payment provider.
    ///
    /// Wraps [`PaymentGatewayDatabase::settle_order_by_intent`] and notifies order-confirmed subscribers when this
    /// delivery was the one that settled the order. Duplicate deliveries return
    /// [`SettlementOutcome::AlreadySettled`] and fire nothing.
    pub async fn settle_webhook_payment(
        &self,
        payment_intent_id: &str,
    ) -> Result<SettlementOutcome, PaymentGatewayError> {
        trace!("🔄️✅️ Intent {payment_intent_id} reports a successful payment");
        let outcome = self.db.settle_order_by_intent(payment_intent_id).await?;
        match &outcome {
            SettlementOutcome::Settled(order) => {
                debug!("🔄️✅️ Order {} has been confirmed", order.order_id);
                self.call_order_confirmed_hook(order).await;
            },
            SettlementOutcome::AlreadySettled(order) => {
                debug!("🔄️✅️ Duplicate delivery for order {}. Nothing to do", order.order_id);
            },
        }
        Ok(outcome)
    }

    /// Records a failed payment event delivered by the payment provider.
    ///
    /// Wraps [`PaymentGatewayDatabase::fail_order_by_intent`] and notifies payment-failed subscribers when the order
    /// actually transitioned. An intent that matches no order is logged and swallowed: the provider has nothing
    /// useful to redeliver in that case.
    pub async fn fail_webhook_payment(&self, payment_intent_id: &str) -> Result<Option<Order>, PaymentGatewayError> {
        trace!("🔄️❌️ Intent {payment_intent_id} reports a failed payment");
        let updated = match self.db.fail_order_by_intent(payment_intent_id).await {
            Ok(updated) => updated,
            Err(PaymentGatewayError::OrderNotFoundForIntent(intent)) => {
                warn!("🔄️❌️ A payment failure was reported for intent {intent}, but no order references it");
                return Ok(None);
            },
            Err(e) => return Err(e),
        };
        if let Some(order) = &updated {
            self.call_payment_failed_hook(order).await;
        }
        Ok(updated)
    }

    /// Cancels pending orders that have been waiting for payment for longer than `unpaid_limit`, and notifies
    /// order-annulled subscribers for each one. The expiry worker calls this on a timer.
    pub async fn expire_old_orders(&self, unpaid_limit: Duration) -> Result<Vec<Order>, PaymentGatewayError> {
        let expired = self.db.expire_old_orders(unpaid_limit).await?;
        for order in &expired {
            debug!(
                "🕰️ Order {} went unpaid for more than {} min and has expired",
                order.order_id,
                unpaid_limit.num_minutes()
            );
            self.call_order_annulled_hook(order).await;
        }
        Ok(expired)
    }

    async fn call_order_confirmed_hook(&self, order: &Order) {
        for emitter in &self.producers.order_confirmed_producer {
            debug!("🔄️✅️ Notifying order confirmed hook subscribers");
            let event = OrderConfirmedEvent::new(order.clone());
            emitter.publish_event(event).await;
        }
    }

    async fn call_payment_failed_hook(&self, order: &Order) {
        for emitter in &self.producers.payment_failed_producer {
            debug!("🔄️❌️ Notifying payment failed hook subscribers");
            let event = PaymentFailedEvent::new(order.clone());
            emitter.publish_event(event).await;
        }
    }

    async fn call_order_annulled_hook(&self, order: &Order) {
        for emitter in &self.producers.order_annulled_producer {
            debug!("🕰️ Notifying order annulled hook subscribers");
            let event = OrderAnnulledEvent::new(order.clone());
            emitter.publish_event(event).await;
        }
    }

    async fn resolve_line_items(
        &self,
        request: &CheckoutRequest,
    ) -> Result<(Vec<NewOrderItem>, OrderItemSource), PaymentGatewayError> {
        if request.customer_id.trim().is_empty() {
            return Err(PaymentGatewayError::MissingField("customer_id".to_string()));
        }
        if request.shipping_address.trim().is_empty() {
            return Err(PaymentGatewayError::MissingField("shipping_address".to_string()));
        }
        let (items, source) = match &request.items {
            Some(items) => (items.clone(), OrderItemSource::Explicit),
            None => {
                let cart = self.db.cart_for_customer(&request.customer_id).await?;
                let items = cart.into_iter().map(NewOrderItem::from).collect::<Vec<_>>();
                trace!("🛒️ Customer [{}] is checking out their cart of {} items", request.customer_id, items.len());
                (items, OrderItemSource::CustomerCart)
            },
        };
        if items.is_empty() {
            return Err(PaymentGatewayError::EmptyOrder);
        }
        if let Some(bad) = items.iter().find(|i| i.quantity <= 0) {
            return Err(PaymentGatewayError::InvalidQuantity(bad.product_id.clone(), bad.quantity));
        }
        Ok((items, source))
    }

    /// Returns a reference to the underlying database.
    pub fn db(&self) -> &B {
        &self.db
    }

    /// Returns a mutable reference to the underlying database, e.g. to close the connection on shutdown.
    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }
}
