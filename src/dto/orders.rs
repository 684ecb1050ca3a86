use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Order;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderListQuery {
    pub seller_email: Option<String>,
    pub customer_email: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    /// One of New, Processing, Shipped, Delivered, Cancelled.
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellerStatsQuery {
    pub seller_email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsQuery {
    pub customer_email: String,
}

/// One day of the trailing-week sales series; days without orders are
/// zero-filled so charts always get seven points.
#[derive(Debug, Serialize, ToSchema)]
pub struct DailySales {
    pub date: String,
    pub day: String,
    pub orders: i64,
    pub revenue: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellerStats {
    pub total_products: i64,
    pub total_orders: i64,
    pub total_revenue: i64,
    pub status_counts: BTreeMap<String, i64>,
    pub last7_days: Vec<DailySales>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_orders: i64,
    pub total_spent: i64,
    pub pending_count: i64,
    pub delivered_count: i64,
    pub wishlist_count: i64,
    pub status_counts: BTreeMap<String, i64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub total_orders: i64,
    pub total_revenue: i64,
    pub total_users: i64,
    pub total_sellers: i64,
    pub total_products: i64,
    pub pending_seller_requests: i64,
    pub today_sales: i64,
    pub today_order_count: i64,
    pub new_users_today: i64,
    pub status_counts: BTreeMap<String, i64>,
    pub last7_days: Vec<DailySales>,
    pub recent_orders: Vec<Order>,
}
