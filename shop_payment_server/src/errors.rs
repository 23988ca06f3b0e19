use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use shop_payment_engine::PaymentGatewayError;
use stripe_tools::{SignatureError, StripeApiError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Payload deserialization error")]
    CouldNotDeserializePayload,
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Webhook delivery could not be authenticated. {0}")]
    InvalidSignature(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("The payment provider could not complete the request. {0}")]
    UpstreamGatewayError(String),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::CouldNotDeserializePayload => StatusCode::BAD_REQUEST,
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidSignature(_) => StatusCode::UNAUTHORIZED,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::UpstreamGatewayError(_) => StatusCode::BAD_GATEWAY,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<PaymentGatewayError> for ServerError {
    fn from(e: PaymentGatewayError) -> Self {
        match e {
            PaymentGatewayError::MissingField(_) |
            PaymentGatewayError::EmptyOrder |
            PaymentGatewayError::InvalidQuantity(_, _) |
            PaymentGatewayError::ProductNotFound(_) => Self::InvalidRequestBody(e.to_string()),
            PaymentGatewayError::OrderNotFound(_) | PaymentGatewayError::OrderNotFoundForIntent(_) => {
                Self::NoRecordFound(e.to_string())
            },
            PaymentGatewayError::GatewayError(ref provider_error) => {
                Self::UpstreamGatewayError(provider_error.to_string())
            },
            PaymentGatewayError::DatabaseError(_) |
            PaymentGatewayError::InsufficientStock { .. } |
            PaymentGatewayError::PaymentIntentAlreadyAttached(_, _) |
            PaymentGatewayError::PaymentStatusUpdateError(_, _) |
            PaymentGatewayError::OrderNotPending(_) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<StripeApiError> for ServerError {
    fn from(e: StripeApiError) -> Self {
        match e {
            StripeApiError::Initialization(s) => Self::InitializeError(s),
            StripeApiError::SignatureError(e) => Self::InvalidSignature(e.to_string()),
            other => Self::UpstreamGatewayError(other.to_string()),
        }
    }
}

impl From<SignatureError> for ServerError {
    fn from(e: SignatureError) -> Self {
        Self::InvalidSignature(e.to_string())
    }
}
