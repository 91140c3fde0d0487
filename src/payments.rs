use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

/// PaymentGateway
///
/// Abstract contract for the payment-intent collaborator. The concrete
/// implementation swaps between the real Stripe client in production and
/// the in-memory mock in tests without touching the handler.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a card payment intent for the given amount (in cents, usd)
    /// and returns the client secret the frontend needs to confirm it.
    async fn create_intent(&self, amount_cents: i64) -> Result<String, String>;
}

/// PaymentState
///
/// The concrete type used to share the gateway across the application state.
pub type PaymentState = Arc<dyn PaymentGateway>;

/// Minimal deserialization target for the Stripe payment-intent response.
#[derive(Deserialize)]
struct StripeIntentResponse {
    client_secret: String,
}

/// StripeGateway
///
/// The real implementation, calling Stripe's REST API with the secret key
/// from configuration. Stripe's API is form-encoded, not JSON.
#[derive(Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
}

impl StripeGateway {
    pub fn new(secret_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: secret_key.to_string(),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(&self, amount_cents: i64) -> Result<String, String> {
        let params = [
            ("amount", amount_cents.to_string()),
            ("currency", "usd".to_string()),
            ("payment_method_types[]", "card".to_string()),
        ];

        let response = self
            .client
            .post("https://api.stripe.com/v1/payment_intents")
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("stripe rejected intent: {}", response.status()));
        }

        let intent = response
            .json::<StripeIntentResponse>()
            .await
            .map_err(|e| e.to_string())?;

        Ok(intent.client_secret)
    }
}

/// MockPaymentGateway
///
/// Test double. Returns a deterministic client secret embedding the
/// requested amount so tests can assert the conversion to cents.
#[derive(Clone)]
pub struct MockPaymentGateway {
    /// When true, all operations return a simulated failure.
    pub should_fail: bool,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self { should_fail: false }
    }

    pub fn new_failing() -> Self {
        Self { should_fail: true }
    }
}

impl Default for MockPaymentGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_intent(&self, amount_cents: i64) -> Result<String, String> {
        if self.should_fail {
            return Err("mock gateway error: simulation requested".to_string());
        }
        Ok(format!("pi_mock_{}_secret_test", amount_cents))
    }
}
