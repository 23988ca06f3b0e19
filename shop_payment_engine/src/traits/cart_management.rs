use crate::{
    db_types::{CartItem, NewOrderItem},
    traits::PaymentGatewayError,
};

/// The cart-snapshot collaborator interface.
///
/// The storefront's cart UI owns cart contents; the payment engine only needs to read a customer's cart when a
/// checkout arrives without explicit line items, and to clear it once the order has been created.
#[allow(async_fn_in_trait)]
pub trait CartManagement {
    /// Fetches the customer's current cart items.
    async fn cart_for_customer(&self, customer_id: &str) -> Result<Vec<CartItem>, PaymentGatewayError>;

    /// Replaces the customer's cart with the given items, returning the stored records.
    async fn replace_cart(&self, customer_id: &str, items: &[NewOrderItem]) -> Result<Vec<CartItem>, PaymentGatewayError>;

    /// Removes all items from the customer's cart, returning the number of items removed.
    async fn clear_cart(&self, customer_id: &str) -> Result<u64, PaymentGatewayError>;
}
