use crate::{
    db_types::{NewProduct, Product},
    traits::PaymentGatewayError,
};

/// The catalog collaborator interface.
///
/// Product listings are managed elsewhere in the storefront. The payment engine reads the catalog to price line
/// items at checkout and to verify stock at settlement; the only write it ever performs on its own is the stock
/// decrement inside the settlement transaction. `upsert_product` exists for fulfilment tooling and test setup.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    /// Inserts the product, or updates its name, price and stock if a product with the same id already exists.
    async fn upsert_product(&self, product: NewProduct) -> Result<Product, PaymentGatewayError>;

    /// Fetches a product by its public product id. If no product exists, `None` is returned.
    async fn fetch_product(&self, product_id: &str) -> Result<Option<Product>, PaymentGatewayError>;
}
