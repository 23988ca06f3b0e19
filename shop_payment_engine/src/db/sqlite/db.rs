use std::fmt::Debug;

use chrono::Duration;
use log::*;
use sqlx::SqlitePool;

use super::{carts, db_url, new_pool, orders, orders::PricedLineItem, products};
use crate::{
    db_types::{
        CartItem,
        NewOrder,
        NewOrderItem,
        NewProduct,
        Order,
        OrderId,
        OrderItem,
        OrderItemSource,
        OrderStatusType,
        PaymentStatusType,
        Product,
        SettlementOutcome,
    },
    traits::{CartManagement, CatalogManagement, OrderManagement, PaymentGatewayDatabase, PaymentGatewayError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl PaymentGatewayDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn create_pending_order(
        &self,
        order: NewOrder,
        source: OrderItemSource,
    ) -> Result<Order, PaymentGatewayError> {
        if order.items.is_empty() {
            return Err(PaymentGatewayError::EmptyOrder);
        }
        let mut tx = self.pool.begin().await?;
        let mut priced = Vec::with_capacity(order.items.len());
        for item in &order.items {
            let product = products::product_by_id(&item.product_id, &mut tx)
                .await?
                .ok_or_else(|| PaymentGatewayError::ProductNotFound(item.product_id.clone()))?;
            priced.push(PricedLineItem {
                product_id: product.product_id,
                quantity: item.quantity,
                unit_price: product.price,
            });
        }
        let total_amount = priced.iter().map(PricedLineItem::line_total).sum();
        let id = orders::insert_order(&order, total_amount, &mut tx).await?;
        debug!("🗃️ Order {} has been saved in the DB with id {id}", order.order_id);
        orders::insert_order_items(&order.order_id, &priced, &mut tx).await?;
        if source == OrderItemSource::CustomerCart {
            let removed = carts::clear_cart(&order.customer_id, &mut tx).await?;
            debug!("🗃️ Removed {removed} cart items for customer [{}] as part of checkout", order.customer_id);
        }
        let stored = orders::fetch_order_by_order_id(&order.order_id, &mut tx)
            .await?
            .ok_or_else(|| PaymentGatewayError::OrderNotFound(order.order_id.clone()))?;
        tx.commit().await?;
        debug!("🗃️ Order {} is pending payment. Total: {}", stored.order_id, stored.total_amount);
        Ok(stored)
    }

    async fn attach_payment_intent(
        &self,
        order_id: &OrderId,
        payment_intent_id: &str,
    ) -> Result<Order, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut tx)
            .await?
            .ok_or_else(|| PaymentGatewayError::OrderNotFound(order_id.clone()))?;
        if let Some(existing) = &order.payment_intent_id {
            if existing == payment_intent_id {
                debug!("🗃️ Payment intent {payment_intent_id} is already attached to order {order_id}. No action to take");
                return Ok(order);
            }
            return Err(PaymentGatewayError::PaymentIntentAlreadyAttached(order_id.clone(), existing.clone()));
        }
        orders::set_payment_intent(order_id, payment_intent_id, &mut tx).await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut tx)
            .await?
            .ok_or_else(|| PaymentGatewayError::OrderNotFound(order_id.clone()))?;
        tx.commit().await?;
        debug!("🗃️ Payment intent {payment_intent_id} attached to order {order_id}");
        Ok(order)
    }

    async fn cancel_order(&self, order_id: &OrderId, reason: &str) -> Result<Order, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut tx)
            .await?
            .ok_or_else(|| PaymentGatewayError::OrderNotFound(order_id.clone()))?;
        if !order.is_pending() {
            return Err(PaymentGatewayError::OrderNotPending(order_id.clone()));
        }
        orders::mark_cancelled(order_id, reason, &mut tx).await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut tx)
            .await?
            .ok_or_else(|| PaymentGatewayError::OrderNotFound(order_id.clone()))?;
        tx.commit().await?;
        info!("🗃️ Order {order_id} has been cancelled. Reason: {reason}");
        Ok(order)
    }

    /// Takes a payment intent id from a successful payment event, and in a single atomic transaction,
    /// * loads the order holding the intent,
    /// * returns `AlreadySettled` immediately if the order has already been paid (duplicate delivery),
    /// * marks the order as `Paid` and `Confirmed`,
    /// * decrements the stock level for every line item, with a guard that keeps stock from going negative.
    ///
    /// Any failure rolls the entire transaction back, so a stock shortfall leaves the order pending and the stock
    /// levels of every product untouched.
    async fn settle_order_by_intent(&self, payment_intent_id: &str) -> Result<SettlementOutcome, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order_by_payment_intent(payment_intent_id, &mut tx)
            .await?
            .ok_or_else(|| PaymentGatewayError::OrderNotFoundForIntent(payment_intent_id.to_string()))?;
        match order.payment_status {
            PaymentStatusType::Paid => {
                debug!(
                    "🗃️ Order {} has already settled against intent {payment_intent_id}. No action to take",
                    order.order_id
                );
                return Ok(SettlementOutcome::AlreadySettled(order));
            },
            PaymentStatusType::Failed => {
                error!(
                    "🗃️ Intent {payment_intent_id} reports success, but order {} has already been marked as failed. \
                     Perform a manual adjustment to reconcile the two.",
                    order.order_id
                );
                return Err(PaymentGatewayError::PaymentStatusUpdateError(
                    order.order_id.clone(),
                    "payment status is Failed and cannot become Paid".to_string(),
                ));
            },
            PaymentStatusType::Pending => {},
        }
        if order.status == OrderStatusType::Cancelled {
            error!(
                "🗃️ Intent {payment_intent_id} reports success, but order {} has been cancelled. Perform a manual \
                 refund to reconcile the two.",
                order.order_id
            );
            return Err(PaymentGatewayError::PaymentStatusUpdateError(
                order.order_id.clone(),
                "order is Cancelled and cannot be confirmed".to_string(),
            ));
        }
        orders::update_order_statuses(&order.order_id, OrderStatusType::Confirmed, PaymentStatusType::Paid, &mut tx)
            .await?;
        let items = orders::fetch_order_items(&order.order_id, &mut tx).await?;
        for item in &items {
            let product = products::product_by_id(&item.product_id, &mut tx)
                .await?
                .ok_or_else(|| PaymentGatewayError::ProductNotFound(item.product_id.clone()))?;
            let decremented = products::decrement_stock(&item.product_id, item.quantity, &mut tx).await?;
            if !decremented {
                warn!(
                    "🗃️ Cannot settle order {}. Product {} has {} units left, but the order wants {}. Rolling back.",
                    order.order_id, item.product_id, product.stock, item.quantity
                );
                return Err(PaymentGatewayError::InsufficientStock {
                    product_id: item.product_id.clone(),
                    requested: item.quantity,
                    available: product.stock,
                });
            }
            trace!("🗃️ Stock of {} reduced by {} for order {}", item.product_id, item.quantity, order.order_id);
        }
        let order = orders::fetch_order_by_order_id(&order.order_id, &mut tx)
            .await?
            .ok_or_else(|| PaymentGatewayError::OrderNotFound(order.order_id.clone()))?;
        tx.commit().await?;
        info!(
            "🗃️ Order {} is confirmed. Stock has been decremented for {} line items.",
            order.order_id,
            items.len()
        );
        Ok(SettlementOutcome::Settled(order))
    }

    async fn fail_order_by_intent(&self, payment_intent_id: &str) -> Result<Option<Order>, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order_by_payment_intent(payment_intent_id, &mut tx)
            .await?
            .ok_or_else(|| PaymentGatewayError::OrderNotFoundForIntent(payment_intent_id.to_string()))?;
        match order.payment_status {
            PaymentStatusType::Pending => {},
            PaymentStatusType::Paid => {
                warn!(
                    "🗃️ Intent {payment_intent_id} reports failure, but order {} has already settled. No action to \
                     take",
                    order.order_id
                );
                return Ok(None);
            },
            PaymentStatusType::Failed => {
                debug!("🗃️ Order {} is already marked as failed. No action to take", order.order_id);
                return Ok(None);
            },
        }
        orders::update_payment_status(&order.order_id, PaymentStatusType::Failed, &mut tx).await?;
        let order = orders::fetch_order_by_order_id(&order.order_id, &mut tx)
            .await?
            .ok_or_else(|| PaymentGatewayError::OrderNotFound(order.order_id.clone()))?;
        tx.commit().await?;
        info!("🗃️ Payment for order {} has failed (intent {payment_intent_id})", order.order_id);
        Ok(Some(order))
    }

    async fn expire_old_orders(&self, unpaid_limit: Duration) -> Result<Vec<Order>, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let stale = orders::fetch_stale_orders(unpaid_limit.num_seconds(), &mut tx).await?;
        let mut cancelled = Vec::with_capacity(stale.len());
        for order in stale {
            orders::mark_cancelled(&order.order_id, "Order expired: no payment received", &mut tx).await?;
            let updated = orders::fetch_order_by_order_id(&order.order_id, &mut tx)
                .await?
                .ok_or_else(|| PaymentGatewayError::OrderNotFound(order.order_id.clone()))?;
            cancelled.push(updated);
        }
        tx.commit().await?;
        if !cancelled.is_empty() {
            info!("🗃️ {} stale orders have been cancelled", cancelled.len());
        }
        Ok(cancelled)
    }

    async fn close(&mut self) -> Result<(), PaymentGatewayError> {
        self.pool.close().await;
        Ok(())
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_by_order_id(order_id, &mut conn).await
    }

    async fn fetch_order_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_by_payment_intent(payment_intent_id, &mut conn).await
    }

    async fn fetch_order_items(&self, order_id: &OrderId) -> Result<Vec<OrderItem>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_items(order_id, &mut conn).await
    }

    async fn fetch_orders_for_customer(&self, customer_id: &str) -> Result<Vec<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_orders_for_customer(customer_id, &mut conn).await
    }
}

impl CartManagement for SqliteDatabase {
    async fn cart_for_customer(&self, customer_id: &str) -> Result<Vec<CartItem>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        carts::items_for_customer(customer_id, &mut conn).await
    }

    async fn replace_cart(
        &self,
        customer_id: &str,
        items: &[NewOrderItem],
    ) -> Result<Vec<CartItem>, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        carts::replace_cart_items(customer_id, items, &mut tx).await?;
        let cart = carts::items_for_customer(customer_id, &mut tx).await?;
        tx.commit().await?;
        Ok(cart)
    }

    async fn clear_cart(&self, customer_id: &str) -> Result<u64, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        carts::clear_cart(customer_id, &mut conn).await
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn upsert_product(&self, product: NewProduct) -> Result<Product, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let stored = products::upsert_product(&product, &mut conn).await?;
        debug!(
            "🗃️ Product {} ({}) is listed at {} with {} units in stock",
            stored.product_id, stored.name, stored.price, stored.stock
        );
        Ok(stored)
    }

    async fn fetch_product(&self, product_id: &str) -> Result<Option<Product>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        products::product_by_id(product_id, &mut conn).await
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL from the environment, or the default path.
    pub async fn new(max_connections: u32) -> Result<Self, PaymentGatewayError> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, PaymentGatewayError> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Applies any outstanding schema migrations. The server calls this once at startup.
    pub async fn run_migrations(&self) -> Result<(), PaymentGatewayError> {
        sqlx::migrate!("./src/db/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| PaymentGatewayError::DatabaseError(e.to_string()))?;
        info!("🗃️ Database migrations are up to date");
        Ok(())
    }
}
