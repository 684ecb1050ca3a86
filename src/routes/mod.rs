use axum::{Router, routing::get};

use crate::state::AppState;

pub mod cart;
pub mod doc;
pub mod health;
pub mod notifications;
pub mod orders;
pub mod payment;
pub mod promo;
pub mod ws;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/cart", cart::router())
        .nest("/payment", payment::router())
        .nest("/notifications", notifications::router())
        .nest("/promo", promo::router())
        .nest("/orders", orders::router())
        .route("/ws", get(ws::ws_handler))
}
