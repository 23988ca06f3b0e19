use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{CartItem, NewOrderItem},
    traits::PaymentGatewayError,
};

pub async fn items_for_customer(
    customer_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<CartItem>, PaymentGatewayError> {
    let items = sqlx::query_as::<_, CartItem>(
        "SELECT id, customer_id, product_id, quantity FROM cart_items WHERE customer_id = ? ORDER BY id ASC",
    )
    .bind(customer_id)
    .fetch_all(conn)
    .await?;
    Ok(items)
}

/// Replaces the customer's cart with the given items. The delete and the inserts are separate statements; embed the
/// call inside a transaction and pass `&mut tx` as the connection argument to make the swap atomic.
pub(crate) async fn replace_cart_items(
    customer_id: &str,
    items: &[NewOrderItem],
    conn: &mut SqliteConnection,
) -> Result<(), PaymentGatewayError> {
    let _ = sqlx::query("DELETE FROM cart_items WHERE customer_id = ?").bind(customer_id).execute(&mut *conn).await?;
    for item in items {
        sqlx::query("INSERT INTO cart_items (customer_id, product_id, quantity) VALUES (?, ?, ?)")
            .bind(customer_id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .execute(&mut *conn)
            .await?;
    }
    trace!("🧺️ Cart for {customer_id} replaced with {} items", items.len());
    Ok(())
}

/// Empties the customer's cart and returns the number of items that were removed.
pub(crate) async fn clear_cart(customer_id: &str, conn: &mut SqliteConnection) -> Result<u64, PaymentGatewayError> {
    let result = sqlx::query("DELETE FROM cart_items WHERE customer_id = ?").bind(customer_id).execute(conn).await?;
    Ok(result.rows_affected())
}
