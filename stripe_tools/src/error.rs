use shop_payment_engine::PaymentProviderError;
use thiserror::Error;

use crate::SignatureError;

#[derive(Debug, Error)]
pub enum StripeApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Webhook signature rejected: {0}")]
    SignatureError(#[from] SignatureError),
}

impl From<StripeApiError> for PaymentProviderError {
    fn from(err: StripeApiError) -> Self {
        match err {
            StripeApiError::QueryError { status, message } if (400..500).contains(&status) => {
                PaymentProviderError::RequestRejected(format!("Error {status}. {message}"))
            },
            other => PaymentProviderError::RequestFailed(other.to_string()),
        }
    }
}
