use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Cart row joined against live product data.
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: Uuid,
    pub quantity: i32,
    pub name: String,
    pub price: i64,
    pub stock: i32,
    pub image: Option<String>,
    pub category: Option<String>,
    pub seller_email: String,
    pub seller_name: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub user_id: Uuid,
    pub product_id: Uuid,
    /// Signed delta: positive increases quantity, negative decreases it.
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartRequest {
    pub user_id: Uuid,
    pub product_id: Uuid,
    /// Absolute quantity; must be at least 1.
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartRequest {
    pub user_id: Uuid,
    pub product_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartMutationResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RemoveFromCartResponse {
    pub success: bool,
    /// Rows deleted; zero when the item was already absent.
    pub removed: u64,
}
