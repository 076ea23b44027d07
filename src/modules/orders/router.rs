use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{
    cancel_order, get_all_orders, get_order, get_user_orders, place_order, update_order_status,
};

pub fn init_orders_router() -> Router<AppState> {
    Router::new()
        .route("/", post(place_order))
        .route("/user", get(get_user_orders))
        .route("/admin", get(get_all_orders))
        .route("/{id}", get(get_order))
        .route("/{id}/cancel", post(cancel_order))
        .route("/{id}/status", put(update_order_status))
}
