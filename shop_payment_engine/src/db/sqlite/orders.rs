use log::trace;
use spg_common::Cents;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderItem, OrderStatusType, PaymentStatusType},
    traits::PaymentGatewayError,
};

const ORDER_COLUMNS: &str = "id, order_id, customer_id, shipping_address, memo, total_amount, currency, \
                             payment_intent_id, created_at, updated_at, status, payment_status";

/// A line item that has been priced against the catalog and is ready to be stored.
#[derive(Debug, Clone)]
pub(crate) struct PricedLineItem {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price: Cents,
}

impl PricedLineItem {
    pub fn line_total(&self) -> Cents {
        self.unit_price * self.quantity
    }
}

/// Inserts a new order row. This is not atomic on its own; embed the call inside a transaction and pass `&mut tx`
/// as the connection argument to get atomicity with the line-item inserts.
pub(crate) async fn insert_order(
    order: &NewOrder,
    total_amount: Cents,
    conn: &mut SqliteConnection,
) -> Result<i64, PaymentGatewayError> {
    let result = sqlx::query(
        r#"INSERT INTO orders (order_id, customer_id, shipping_address, memo, total_amount, currency)
           VALUES (?, ?, ?, ?, ?, ?)"#,
    )
    .bind(order.order_id.as_str())
    .bind(&order.customer_id)
    .bind(&order.shipping_address)
    .bind(&order.memo)
    .bind(total_amount)
    .bind(&order.currency)
    .execute(conn)
    .await?;
    Ok(result.last_insert_rowid())
}

pub(crate) async fn insert_order_items(
    order_id: &OrderId,
    items: &[PricedLineItem],
    conn: &mut SqliteConnection,
) -> Result<(), PaymentGatewayError> {
    for item in items {
        sqlx::query("INSERT INTO order_items (order_id, product_id, quantity, unit_price) VALUES (?, ?, ?, ?)")
            .bind(order_id.as_str())
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .execute(&mut *conn)
            .await?;
    }
    trace!("📝️ Stored {} line items for order {order_id}", items.len());
    Ok(())
}

/// Fetches the order with the given public order id, or `None` if it does not exist.
pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, PaymentGatewayError> {
    let query = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = ? LIMIT 1");
    let order = sqlx::query_as::<_, Order>(&query).bind(order_id.as_str()).fetch_one(conn).await;
    match order {
        Err(sqlx::Error::RowNotFound) => Ok(None),
        Err(e) => Err(e.into()),
        Ok(o) => Ok(Some(o)),
    }
}

/// Fetches the order that has the given payment intent attached, or `None` if no order references it (yet).
pub async fn fetch_order_by_payment_intent(
    payment_intent_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, PaymentGatewayError> {
    let query = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE payment_intent_id = ? LIMIT 1");
    let order = sqlx::query_as::<_, Order>(&query).bind(payment_intent_id).fetch_one(conn).await;
    match order {
        Err(sqlx::Error::RowNotFound) => Ok(None),
        Err(e) => Err(e.into()),
        Ok(o) => Ok(Some(o)),
    }
}

pub async fn fetch_order_items(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderItem>, PaymentGatewayError> {
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT id, order_id, product_id, quantity, unit_price FROM order_items WHERE order_id = ? ORDER BY id ASC",
    )
    .bind(order_id.as_str())
    .fetch_all(conn)
    .await?;
    Ok(items)
}

/// Fetches all orders for the given customer, ordered by `created_at` in ascending order.
pub async fn fetch_orders_for_customer(
    customer_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, PaymentGatewayError> {
    let query = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE customer_id = ? ORDER BY created_at ASC, id ASC");
    let orders = sqlx::query_as::<_, Order>(&query).bind(customer_id).fetch_all(conn).await?;
    Ok(orders)
}

/// Writes the payment intent id onto the order. Callers are responsible for checking the set-once rule first.
pub(crate) async fn set_payment_intent(
    order_id: &OrderId,
    payment_intent_id: &str,
    conn: &mut SqliteConnection,
) -> Result<(), PaymentGatewayError> {
    let _ = sqlx::query("UPDATE orders SET payment_intent_id = ?, updated_at = CURRENT_TIMESTAMP WHERE order_id = ?")
        .bind(payment_intent_id)
        .bind(order_id.as_str())
        .execute(conn)
        .await?;
    Ok(())
}

/// Sets the order status and payment status in one statement. Settlement relies on this to move an order to
/// `Confirmed`/`Paid` as a unit.
pub(crate) async fn update_order_statuses(
    order_id: &OrderId,
    status: OrderStatusType,
    payment_status: PaymentStatusType,
    conn: &mut SqliteConnection,
) -> Result<(), PaymentGatewayError> {
    let _ = sqlx::query(
        "UPDATE orders SET status = ?, payment_status = ?, updated_at = CURRENT_TIMESTAMP WHERE order_id = ?",
    )
    .bind(status.to_string())
    .bind(payment_status.to_string())
    .bind(order_id.as_str())
    .execute(conn)
    .await?;
    Ok(())
}

pub(crate) async fn update_payment_status(
    order_id: &OrderId,
    payment_status: PaymentStatusType,
    conn: &mut SqliteConnection,
) -> Result<(), PaymentGatewayError> {
    let _ = sqlx::query("UPDATE orders SET payment_status = ?, updated_at = CURRENT_TIMESTAMP WHERE order_id = ?")
        .bind(payment_status.to_string())
        .bind(order_id.as_str())
        .execute(conn)
        .await?;
    Ok(())
}

/// Marks an order as cancelled, recording the reason in the memo field.
pub(crate) async fn mark_cancelled(
    order_id: &OrderId,
    reason: &str,
    conn: &mut SqliteConnection,
) -> Result<(), PaymentGatewayError> {
    let _ = sqlx::query("UPDATE orders SET status = ?, memo = ?, updated_at = CURRENT_TIMESTAMP WHERE order_id = ?")
        .bind(OrderStatusType::Cancelled.to_string())
        .bind(reason)
        .bind(order_id.as_str())
        .execute(conn)
        .await?;
    Ok(())
}

/// Fetches orders that are still `New`, have not settled, and have not been touched for at least `stale_secs`
/// seconds. These are checkout leftovers the expiry sweep reclaims.
pub(crate) async fn fetch_stale_orders(
    stale_secs: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, PaymentGatewayError> {
    let query = format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE status = 'New' AND payment_status != 'Paid' AND updated_at <= \
         datetime('now', '-' || ? || ' seconds') ORDER BY created_at ASC"
    );
    let orders = sqlx::query_as::<_, Order>(&query).bind(stale_secs).fetch_all(conn).await?;
    Ok(orders)
}
