use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::orders::{
        OrderListQuery, PlatformStats, SellerStats, SellerStatsQuery, UpdateOrderStatusRequest,
        UserStats, UserStatsQuery,
    },
    error::{AppError, AppResult},
    models::{Order, OrderStatus},
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/seller-stats", get(seller_stats))
        .route("/user-stats", get(user_stats))
        .route("/platform-stats", get(platform_stats))
        .route("/{id}", patch(update_order_status))
}

#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("sellerEmail" = Option<String>, Query, description = "Filter by seller"),
        ("customerEmail" = Option<String>, Query, description = "Filter by customer")
    ),
    responses(
        (status = 200, description = "Orders, newest first", body = Vec<Order>)
    ),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = order_service::list_orders(&state.pool, query).await?;
    Ok(Json(orders))
}

#[utoipa::path(
    patch,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = Order),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Order not found"),
    ),
    tag = "Orders"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<Order>> {
    let status = payload
        .status
        .parse::<OrderStatus>()
        .map_err(AppError::BadRequest)?;
    let order = order_service::update_status(&state.pool, id, status).await?;
    Ok(Json(order))
}

#[utoipa::path(
    get,
    path = "/orders/seller-stats",
    params(
        ("sellerEmail" = String, Query, description = "Seller email")
    ),
    responses(
        (status = 200, description = "Seller dashboard aggregates", body = SellerStats)
    ),
    tag = "Orders"
)]
pub async fn seller_stats(
    State(state): State<AppState>,
    Query(query): Query<SellerStatsQuery>,
) -> AppResult<Json<SellerStats>> {
    let stats = order_service::seller_stats(&state.pool, &query.seller_email).await?;
    Ok(Json(stats))
}

#[utoipa::path(
    get,
    path = "/orders/user-stats",
    params(
        ("customerEmail" = String, Query, description = "Customer email")
    ),
    responses(
        (status = 200, description = "Buyer dashboard aggregates", body = UserStats)
    ),
    tag = "Orders"
)]
pub async fn user_stats(
    State(state): State<AppState>,
    Query(query): Query<UserStatsQuery>,
) -> AppResult<Json<UserStats>> {
    let stats = order_service::user_stats(&state.pool, &query.customer_email).await?;
    Ok(Json(stats))
}

#[utoipa::path(
    get,
    path = "/orders/platform-stats",
    responses(
        (status = 200, description = "Platform-wide dashboard aggregates", body = PlatformStats)
    ),
    tag = "Orders"
)]
pub async fn platform_stats(State(state): State<AppState>) -> AppResult<Json<PlatformStats>> {
    let stats = order_service::platform_stats(&state.pool).await?;
    Ok(Json(stats))
}
