//! Checkout-session client for the external payment processor.
//!
//! The processor only hands back a session reference on the return redirect,
//! so everything the finalize step needs to reconstruct an order travels as
//! opaque metadata on the session and round-trips unmodified.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Request(String),

    #[error("gateway returned {status}: {message}")]
    Response { status: u16, message: String },

    #[error("gateway response could not be decoded: {0}")]
    Decode(String),
}

/// Order context carried through the processor as string key/value metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionMetadata {
    pub product_id: String,
    pub product_name: String,
    pub seller_name: String,
    pub seller_email: String,
    pub unit_amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,
}

impl SessionMetadata {
    /// Unit price in minor units, as far as the metadata can be trusted.
    pub fn unit_amount(&self) -> Option<i64> {
        self.unit_amount.parse().ok().filter(|v| *v > 0)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerDetails {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub payment_intent: Option<String>,
    pub amount_total: Option<i64>,
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
    #[serde(default)]
    pub metadata: SessionMetadata,
}

#[derive(Debug, Clone)]
pub struct CreateSessionRequest {
    pub unit_amount: i64,
    pub quantity: i32,
    pub product_name: String,
    pub customer_email: String,
    pub metadata: SessionMetadata,
    pub success_url: String,
    pub cancel_url: String,
}

#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    async fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<CheckoutSession, GatewayError>;

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, GatewayError>;
}

/// Stripe Checkout Sessions over its form-encoded REST API.
#[derive(Clone)]
pub struct StripeGateway {
    client: Client,
    secret_key: String,
}

impl StripeGateway {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            secret_key: secret_key.into(),
        }
    }

    fn form_params(request: &CreateSessionRequest) -> Vec<(String, String)> {
        let meta = &request.metadata;
        let mut params = vec![
            ("mode".into(), "payment".into()),
            ("customer_email".into(), request.customer_email.clone()),
            (
                "line_items[0][price_data][currency]".into(),
                "usd".into(),
            ),
            (
                "line_items[0][price_data][unit_amount]".into(),
                request.unit_amount.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".into(),
                request.product_name.clone(),
            ),
            (
                "line_items[0][price_data][product_data][description]".into(),
                format!("Sold by: {}. Thank you for shopping with us!", meta.seller_name),
            ),
            ("line_items[0][quantity]".into(), request.quantity.to_string()),
            ("metadata[productId]".into(), meta.product_id.clone()),
            ("metadata[productName]".into(), meta.product_name.clone()),
            ("metadata[sellerName]".into(), meta.seller_name.clone()),
            ("metadata[sellerEmail]".into(), meta.seller_email.clone()),
            ("metadata[unitAmount]".into(), meta.unit_amount.clone()),
            ("success_url".into(), request.success_url.clone()),
            ("cancel_url".into(), request.cancel_url.clone()),
        ];
        if let Some(code) = &meta.promo_code {
            params.push(("metadata[promoCode]".into(), code.clone()));
        }
        params
    }

    async fn decode(response: reqwest::Response) -> Result<CheckoutSession, GatewayError> {
        if response.status().is_success() {
            response
                .json::<CheckoutSession>()
                .await
                .map_err(|e| GatewayError::Decode(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .map_err(|e| GatewayError::Request(e.to_string()))?;
            Err(GatewayError::Response { status, message })
        }
    }
}

#[async_trait]
impl CheckoutGateway for StripeGateway {
    async fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let response = self
            .client
            .post(format!("{STRIPE_API_BASE}/checkout/sessions"))
            .bearer_auth(&self.secret_key)
            .form(&Self::form_params(request))
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;
        Self::decode(response).await
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, GatewayError> {
        let response = self
            .client
            .get(format!("{STRIPE_API_BASE}/checkout/sessions/{session_id}"))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_round_trips_through_string_map() {
        let meta = SessionMetadata {
            product_id: "p-1".into(),
            product_name: "Widget".into(),
            seller_name: "Ada".into(),
            seller_email: "ada@example.com".into(),
            unit_amount: "1500".into(),
            promo_code: Some("SAVE10".into()),
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["productId"], "p-1");
        assert_eq!(json["unitAmount"], "1500");
        let back: SessionMetadata = serde_json::from_value(json).unwrap();
        assert_eq!(back.unit_amount(), Some(1500));
        assert_eq!(back.promo_code.as_deref(), Some("SAVE10"));
    }

    #[test]
    fn unit_amount_rejects_garbage_and_zero() {
        let mut meta = SessionMetadata::default();
        assert_eq!(meta.unit_amount(), None);
        meta.unit_amount = "0".into();
        assert_eq!(meta.unit_amount(), None);
        meta.unit_amount = "not-a-number".into();
        assert_eq!(meta.unit_amount(), None);
    }

    #[test]
    fn create_params_include_line_item_and_metadata() {
        let request = CreateSessionRequest {
            unit_amount: 2500,
            quantity: 2,
            product_name: "Widget".into(),
            customer_email: "buyer@example.com".into(),
            metadata: SessionMetadata {
                product_id: "p-1".into(),
                product_name: "Widget".into(),
                seller_name: "Ada".into(),
                seller_email: "ada@example.com".into(),
                unit_amount: "2500".into(),
                promo_code: None,
            },
            success_url: "https://shop.test/payment-success?session_id={CHECKOUT_SESSION_ID}"
                .into(),
            cancel_url: "https://shop.test/payment-cancel".into(),
        };
        let params = StripeGateway::form_params(&request);
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("line_items[0][price_data][unit_amount]"), Some("2500"));
        assert_eq!(get("line_items[0][quantity]"), Some("2"));
        assert_eq!(get("metadata[sellerEmail]"), Some("ada@example.com"));
        assert_eq!(get("metadata[promoCode]"), None);
    }
}
