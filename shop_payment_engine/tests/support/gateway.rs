use std::sync::{Arc, Mutex};

use shop_payment_engine::{
    traits::{NewPaymentIntent, PaymentIntent},
    PaymentGateway,
    PaymentProviderError,
};

/// An in-memory payment provider. Intent ids are handed out sequentially (`pi_test_0001`, ...), every call is
/// recorded, and the next `create_payment_intent` call can be scripted to fail.
#[derive(Default, Clone)]
pub struct TestGateway {
    state: Arc<Mutex<GatewayState>>,
}

#[derive(Default)]
struct GatewayState {
    fail_next: Option<String>,
    requests: Vec<NewPaymentIntent>,
    cancelled: Vec<String>,
    counter: u64,
}

impl TestGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the next `create_payment_intent` call to be rejected with `reason`.
    pub fn fail_next(&self, reason: &str) {
        self.state.lock().unwrap().fail_next = Some(reason.to_string());
    }

    pub fn intent_requests(&self) -> Vec<NewPaymentIntent> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn cancelled_intents(&self) -> Vec<String> {
        self.state.lock().unwrap().cancelled.clone()
    }
}

impl PaymentGateway for TestGateway {
    async fn create_payment_intent(&self, request: NewPaymentIntent) -> Result<PaymentIntent, PaymentProviderError> {
        let mut state = self.state.lock().unwrap();
        if let Some(reason) = state.fail_next.take() {
            return Err(PaymentProviderError::RequestRejected(reason));
        }
        state.counter += 1;
        let id = format!("pi_test_{:04}", state.counter);
        let client_secret = format!("{id}_secret");
        state.requests.push(request);
        Ok(PaymentIntent { id, client_secret })
    }

    async fn cancel_payment_intent(&self, payment_intent_id: &str) -> Result<(), PaymentProviderError> {
        self.state.lock().unwrap().cancelled.push(payment_intent_id.to_string());
        Ok(())
    }
}
