use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::PromoKind;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidatePromoRequest {
    pub code: String,
    /// Order subtotal in minor units.
    pub subtotal: i64,
}

/// Public quote. Internal counters (`usedCount`, `maxUses`) are never exposed.
#[derive(Debug, Serialize, ToSchema)]
pub struct ValidatePromoResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidatePromoResponse {
    pub fn accepted(discount: i64, description: String, code: String) -> Self {
        Self {
            valid: true,
            discount: Some(discount),
            description: Some(description),
            code: Some(code),
            error: None,
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            discount: None,
            description: None,
            code: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePromoRequest {
    pub code: String,
    #[serde(rename = "type")]
    pub kind: PromoKind,
    pub value: i64,
    #[serde(default)]
    pub description: Option<String>,
    pub min_order: Option<i64>,
    pub max_uses: Option<i32>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePromoRequest {
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<PromoKind>,
    pub value: Option<i64>,
    pub description: Option<String>,
    pub min_order: Option<i64>,
    pub max_uses: Option<i32>,
    pub is_active: Option<bool>,
    pub expires_at: Option<DateTime<Utc>>,
}
