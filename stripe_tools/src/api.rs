use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client,
    Method,
};
use serde::de::DeserializeOwned;
use shop_payment_engine::{
    traits::{NewPaymentIntent, PaymentIntent},
    PaymentGateway,
    PaymentProviderError,
};

use crate::{
    config::StripeConfig,
    data_objects::PaymentIntentObject,
    signature::verify_webhook_signature,
    SignatureError,
    StripeApiError,
};

#[derive(Clone)]
pub struct StripeApi {
    config: StripeConfig,
    client: Arc<Client>,
}

impl StripeApi {
    pub fn new(config: StripeConfig) -> Result<Self, StripeApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.secret_key.reveal()))
            .map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    /// Sends a form-encoded request (the Stripe API does not take JSON bodies) and deserializes the JSON response.
    pub async fn form_query<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        form: &[(&str, String)],
    ) -> Result<T, StripeApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {url}");
        let mut req = self.client.request(method, url);
        if !form.is_empty() {
            req = req.form(form);
        }
        let response = req.send().await.map_err(|e| StripeApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| StripeApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| StripeApiError::RestResponseError(e.to_string()))?;
            Err(StripeApiError::QueryError { status, message })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/v1{path}", self.config.api_url)
    }

    /// Creates a payment intent for an order. The order and customer ids ride along as metadata so that webhook
    /// payloads and the Stripe dashboard can be correlated with the order they belong to.
    pub async fn create_intent(&self, request: &NewPaymentIntent) -> Result<PaymentIntentObject, StripeApiError> {
        let form = [
            ("amount", request.amount.value().to_string()),
            ("currency", request.currency.clone()),
            ("metadata[order_id]", request.order_id.as_str().to_string()),
            ("metadata[customer_id]", request.customer_id.clone()),
        ];
        debug!("Creating a payment intent for order {}", request.order_id);
        let intent = self.form_query::<PaymentIntentObject>(Method::POST, "/payment_intents", &form).await?;
        info!("Created payment intent {} for order {}", intent.id, request.order_id);
        Ok(intent)
    }

    pub async fn cancel_intent(&self, payment_intent_id: &str) -> Result<PaymentIntentObject, StripeApiError> {
        let path = format!("/payment_intents/{payment_intent_id}/cancel");
        debug!("Cancelling payment intent {payment_intent_id}");
        let intent = self.form_query::<PaymentIntentObject>(Method::POST, &path, &[]).await?;
        info!("Cancelled payment intent {payment_intent_id}");
        Ok(intent)
    }

    /// Checks the `Stripe-Signature` header on a webhook delivery against the raw request body.
    pub fn verify_webhook_signature(&self, payload: &[u8], header: &str) -> Result<(), SignatureError> {
        verify_webhook_signature(payload, header, self.config.webhook_secret.reveal(), self.config.signature_tolerance)
    }
}

impl PaymentGateway for StripeApi {
    async fn create_payment_intent(&self, request: NewPaymentIntent) -> Result<PaymentIntent, PaymentProviderError> {
        let intent = self.create_intent(&request).await?;
        let client_secret = intent.client_secret.ok_or_else(|| {
            PaymentProviderError::RequestRejected("The payment intent response is missing a client secret".to_string())
        })?;
        Ok(PaymentIntent { id: intent.id, client_secret })
    }

    async fn cancel_payment_intent(&self, payment_intent_id: &str) -> Result<(), PaymentProviderError> {
        let _ = self.cancel_intent(payment_intent_id).await?;
        Ok(())
    }
}
