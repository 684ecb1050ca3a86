use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::models::NotificationType;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateNotificationRequest {
    pub email: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub meta: Option<Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecipientQuery {
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MarkAllReadRequest {
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UnreadCountResponse {
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AckResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkAllReadResponse {
    pub success: bool,
    pub modified_count: u64,
}
