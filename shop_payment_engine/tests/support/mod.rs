pub mod gateway;
pub mod prepare_env;

use shop_payment_engine::{db_types::NewProduct, CatalogManagement, SqliteDatabase};
use spg_common::Cents;

/// Seeds the catalog with the `(product_id, name, price, stock)` tuples the test needs.
pub async fn seed_products(db: &SqliteDatabase, products: &[(&str, &str, i64, i64)]) {
    for (product_id, name, price, stock) in products {
        db.upsert_product(NewProduct::new(*product_id, *name, Cents::from(*price), *stock))
            .await
            .expect("Error seeding product");
    }
}
