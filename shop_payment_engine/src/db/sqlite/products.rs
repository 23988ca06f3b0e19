use sqlx::SqliteConnection;

use crate::{
    db_types::{NewProduct, Product},
    traits::PaymentGatewayError,
};

const PRODUCT_COLUMNS: &str = "id, product_id, name, price, stock, created_at, updated_at";

/// Inserts the product, or updates the name, price and stock level if a product with the same public id already
/// exists. Returns the stored row.
pub(crate) async fn upsert_product(
    product: &NewProduct,
    conn: &mut SqliteConnection,
) -> Result<Product, PaymentGatewayError> {
    sqlx::query(
        r#"INSERT INTO products (product_id, name, price, stock) VALUES (?, ?, ?, ?)
           ON CONFLICT (product_id) DO UPDATE
           SET name = excluded.name, price = excluded.price, stock = excluded.stock, updated_at = CURRENT_TIMESTAMP"#,
    )
    .bind(&product.product_id)
    .bind(&product.name)
    .bind(product.price)
    .bind(product.stock)
    .execute(&mut *conn)
    .await?;
    let stored = product_by_id(&product.product_id, conn)
        .await?
        .ok_or_else(|| PaymentGatewayError::ProductNotFound(product.product_id.clone()))?;
    Ok(stored)
}

/// Fetches the product with the given public id, or `None` if it does not exist. You can embed this call inside a
/// transaction and pass `&mut tx` as the connection argument to read the row under the transaction's snapshot.
pub async fn product_by_id(
    product_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, PaymentGatewayError> {
    let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = ? LIMIT 1");
    let product = sqlx::query_as::<_, Product>(&query).bind(product_id).fetch_one(conn).await;
    match product {
        Err(sqlx::Error::RowNotFound) => Ok(None),
        Err(e) => Err(e.into()),
        Ok(p) => Ok(Some(p)),
    }
}

/// Decrements the stock level for a product, guarding against the level going negative. The check and the write
/// happen in a single statement, so concurrent settlements cannot interleave between them. Returns `true` if the
/// stock was decremented, and `false` if the product had fewer than `quantity` units left.
pub(crate) async fn decrement_stock(
    product_id: &str,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, PaymentGatewayError> {
    let result = sqlx::query(
        "UPDATE products SET stock = stock - ?, updated_at = CURRENT_TIMESTAMP WHERE product_id = ? AND stock >= ?",
    )
    .bind(quantity)
    .bind(product_id)
    .bind(quantity)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}
