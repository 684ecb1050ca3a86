use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{patch, post},
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    dto::payment::{
        CreateCheckoutSessionRequest, CreateCheckoutSessionResponse, FinalizeSessionResponse,
    },
    error::AppResult,
    services::payment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-checkout-session", post(create_checkout_session))
        // Route name kept for wire compatibility with the existing frontend.
        .route(
            "/retrivedsessionAfterPayment",
            patch(finalize_checkout_session),
        )
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SessionQuery {
    pub session_id: String,
}

#[utoipa::path(
    post,
    path = "/payment/create-checkout-session",
    request_body = CreateCheckoutSessionRequest,
    responses(
        (status = 200, description = "Hosted checkout redirect", body = CreateCheckoutSessionResponse),
        (status = 400, description = "Bad request"),
        (status = 500, description = "Payment gateway unavailable"),
    ),
    tag = "Payment"
)]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    Json(payload): Json<CreateCheckoutSessionRequest>,
) -> AppResult<Json<CreateCheckoutSessionResponse>> {
    let resp = payment_service::create_checkout_session(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/payment/retrivedsessionAfterPayment",
    params(
        ("session_id" = String, Query, description = "Checkout session reference from the return redirect")
    ),
    responses(
        (status = 200, description = "Order persisted, or already processed on a retry", body = FinalizeSessionResponse),
        (status = 400, description = "Session has no completed payment"),
        (status = 500, description = "Payment gateway unavailable"),
    ),
    tag = "Payment"
)]
pub async fn finalize_checkout_session(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> AppResult<Json<FinalizeSessionResponse>> {
    let resp = payment_service::finalize_session(&state, &query.session_id).await?;
    Ok(Json(resp))
}
