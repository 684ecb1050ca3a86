use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::cart::{
        AddToCartRequest, CartLine, CartMutationResponse, RemoveFromCartRequest,
        RemoveFromCartResponse, UpdateCartRequest,
    },
    error::AppResult,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{user_id}", get(get_cart))
        .route("/add", post(add_to_cart))
        .route("/update", put(update_cart))
        .route("/remove", delete(remove_from_cart))
}

#[utoipa::path(
    get,
    path = "/cart/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "Cart owner")
    ),
    responses(
        (status = 200, description = "Enriched cart lines, empty when no cart exists", body = Vec<CartLine>)
    ),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<CartLine>>> {
    let lines = cart_service::get_cart(&state.pool, user_id).await?;
    Ok(Json(lines))
}

#[utoipa::path(
    post,
    path = "/cart/add",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Quantity adjusted, item added, or item removed", body = CartMutationResponse),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Product not found"),
    ),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<CartMutationResponse>> {
    let resp = cart_service::add_or_adjust(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/cart/update",
    request_body = UpdateCartRequest,
    responses(
        (status = 200, description = "Quantity overwritten", body = CartMutationResponse),
        (status = 400, description = "Quantity below 1"),
    ),
    tag = "Cart"
)]
pub async fn update_cart(
    State(state): State<AppState>,
    Json(payload): Json<UpdateCartRequest>,
) -> AppResult<Json<CartMutationResponse>> {
    let resp = cart_service::set_quantity(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/cart/remove",
    request_body = RemoveFromCartRequest,
    responses(
        (status = 200, description = "Removed; idempotent when the item was absent", body = RemoveFromCartResponse),
    ),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    Json(payload): Json<RemoveFromCartRequest>,
) -> AppResult<Json<RemoveFromCartResponse>> {
    let resp = cart_service::remove(&state, payload).await?;
    Ok(Json(resp))
}
