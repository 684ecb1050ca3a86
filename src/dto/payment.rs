use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::gateway::SessionMetadata;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutSessionRequest {
    /// Unit price in minor units.
    pub price: i64,
    pub product_id: String,
    pub quantity: i32,
    pub product_name: String,
    pub user_email: String,
    pub seller_name: String,
    pub seller_email: String,
    pub promo_code: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateCheckoutSessionResponse {
    /// Externally-hosted checkout page to redirect the buyer to.
    pub url: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum FinalizeSessionResponse {
    AlreadyProcessed {
        message: String,
    },
    Completed {
        status: Option<String>,
        payment_status: Option<String>,
        #[schema(value_type = Object)]
        metadata: SessionMetadata,
        customer_email: Option<String>,
    },
}
