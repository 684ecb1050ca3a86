use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::notifications::{
        AckResponse, CreateNotificationRequest, MarkAllReadRequest, MarkAllReadResponse,
        RecipientQuery, UnreadCountResponse,
    },
    error::AppResult,
    models::Notification,
    services::notification_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_notification).get(list_notifications))
        .route("/unread-count", get(unread_count))
        .route("/mark-all-read", patch(mark_all_read))
        .route("/{id}/read", patch(mark_read))
        .route("/{id}", delete(delete_notification))
}

#[utoipa::path(
    post,
    path = "/notifications",
    request_body = CreateNotificationRequest,
    responses(
        (status = 201, description = "Notification persisted and pushed to any live channel", body = Notification),
        (status = 400, description = "Missing required fields"),
    ),
    tag = "Notifications"
)]
pub async fn create_notification(
    State(state): State<AppState>,
    Json(payload): Json<CreateNotificationRequest>,
) -> AppResult<(StatusCode, Json<Notification>)> {
    let notification = notification_service::create(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(notification)))
}

#[utoipa::path(
    get,
    path = "/notifications",
    params(
        ("email" = String, Query, description = "Recipient email, matched case-insensitively")
    ),
    responses(
        (status = 200, description = "Up to 50 most-recent notifications", body = Vec<Notification>)
    ),
    tag = "Notifications"
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    Query(query): Query<RecipientQuery>,
) -> AppResult<Json<Vec<Notification>>> {
    let notifications = notification_service::list(&state.pool, &query.email).await?;
    Ok(Json(notifications))
}

#[utoipa::path(
    get,
    path = "/notifications/unread-count",
    params(
        ("email" = String, Query, description = "Recipient email")
    ),
    responses(
        (status = 200, description = "Unread notification count", body = UnreadCountResponse)
    ),
    tag = "Notifications"
)]
pub async fn unread_count(
    State(state): State<AppState>,
    Query(query): Query<RecipientQuery>,
) -> AppResult<Json<UnreadCountResponse>> {
    let count = notification_service::unread_count(&state.pool, &query.email).await?;
    Ok(Json(UnreadCountResponse { count }))
}

#[utoipa::path(
    patch,
    path = "/notifications/mark-all-read",
    request_body = MarkAllReadRequest,
    responses(
        (status = 200, description = "All unread notifications marked read; idempotent", body = MarkAllReadResponse)
    ),
    tag = "Notifications"
)]
pub async fn mark_all_read(
    State(state): State<AppState>,
    Json(payload): Json<MarkAllReadRequest>,
) -> AppResult<Json<MarkAllReadResponse>> {
    let modified_count = notification_service::mark_all_read(&state.pool, &payload.email).await?;
    Ok(Json(MarkAllReadResponse {
        success: true,
        modified_count,
    }))
}

#[utoipa::path(
    patch,
    path = "/notifications/{id}/read",
    params(
        ("id" = Uuid, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Marked read", body = AckResponse),
        (status = 404, description = "Notification not found"),
    ),
    tag = "Notifications"
)]
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<AckResponse>> {
    notification_service::mark_read(&state.pool, id).await?;
    Ok(Json(AckResponse { success: true }))
}

#[utoipa::path(
    delete,
    path = "/notifications/{id}",
    params(
        ("id" = Uuid, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Deleted", body = AckResponse),
        (status = 404, description = "Notification not found"),
    ),
    tag = "Notifications"
)]
pub async fn delete_notification(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<AckResponse>> {
    notification_service::remove(&state.pool, id).await?;
    Ok(Json(AckResponse { success: true }))
}
