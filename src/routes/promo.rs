use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::promo::{
        CreatePromoRequest, UpdatePromoRequest, ValidatePromoRequest, ValidatePromoResponse,
    },
    error::AppResult,
    models::PromoCode,
    services::promo_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/validate", post(validate_promo))
        .route("/admin", get(list_promos).post(create_promo))
        .route("/admin/{id}", patch(update_promo).delete(delete_promo))
}

#[utoipa::path(
    post,
    path = "/promo/validate",
    request_body = ValidatePromoRequest,
    responses(
        (status = 200, description = "Quote, or a rejection with a reason", body = ValidatePromoResponse),
        (status = 400, description = "Malformed request", body = ValidatePromoResponse),
    ),
    tag = "Promo"
)]
pub async fn validate_promo(
    State(state): State<AppState>,
    Json(payload): Json<ValidatePromoRequest>,
) -> AppResult<(StatusCode, Json<ValidatePromoResponse>)> {
    if payload.code.trim().is_empty() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(ValidatePromoResponse::rejected("Invalid request.")),
        ));
    }
    let resp = promo_service::validate(&state.pool, payload).await?;
    Ok((StatusCode::OK, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/promo/admin",
    responses(
        (status = 200, description = "All promo codes, newest first", body = Vec<PromoCode>)
    ),
    tag = "Promo"
)]
pub async fn list_promos(State(state): State<AppState>) -> AppResult<Json<Vec<PromoCode>>> {
    let promos = promo_service::list_all(&state.pool).await?;
    Ok(Json(promos))
}

#[utoipa::path(
    post,
    path = "/promo/admin",
    request_body = CreatePromoRequest,
    responses(
        (status = 201, description = "Promo created and announced to connected clients", body = PromoCode),
        (status = 400, description = "Invalid code, type, or value"),
        (status = 409, description = "Duplicate code"),
    ),
    tag = "Promo"
)]
pub async fn create_promo(
    State(state): State<AppState>,
    Json(payload): Json<CreatePromoRequest>,
) -> AppResult<(StatusCode, Json<PromoCode>)> {
    let promo = promo_service::create(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(promo)))
}

#[utoipa::path(
    patch,
    path = "/promo/admin/{id}",
    params(
        ("id" = Uuid, Path, description = "Promo ID")
    ),
    request_body = UpdatePromoRequest,
    responses(
        (status = 200, description = "Updated promo", body = PromoCode),
        (status = 404, description = "Promo not found"),
        (status = 409, description = "Duplicate code"),
    ),
    tag = "Promo"
)]
pub async fn update_promo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePromoRequest>,
) -> AppResult<Json<PromoCode>> {
    let promo = promo_service::update(&state, id, payload).await?;
    Ok(Json(promo))
}

#[utoipa::path(
    delete,
    path = "/promo/admin/{id}",
    params(
        ("id" = Uuid, Path, description = "Promo ID")
    ),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Promo not found"),
    ),
    tag = "Promo"
)]
pub async fn delete_promo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    promo_service::delete(&state.pool, id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
