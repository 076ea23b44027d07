use axum::Json;
use axum::extract::State;
use tracing::instrument;

use bookstore_models::OrderId;

use crate::middleware::auth::AuthUser;
use crate::modules::ErrorResponse;
use crate::state::AppState;
use crate::validator::{ValidatedJson, ValidatedPath};

use super::error::OrderError;
use super::model::{
    OrderDraft, OrderListResponse, OrderResponse, OrderView, PlaceOrderResponse,
    UpdateStatusRequest,
};
use super::service::OrderService;

/// Place an order, reserving stock for every line
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = OrderDraft,
    responses(
        (status = 200, description = "Order placed", body = PlaceOrderResponse),
        (status = 400, description = "Empty order, invalid quantity, blank address or malformed body", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse),
        (status = 409, description = "Insufficient stock", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Orders"
)]
#[instrument(skip_all, fields(user = %principal.username))]
pub async fn place_order(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ValidatedJson(draft): ValidatedJson<OrderDraft>,
) -> Result<Json<PlaceOrderResponse>, OrderError> {
    let order = OrderService::place_order(state.inventory.as_ref(), &principal, draft).await?;

    Ok(Json(PlaceOrderResponse {
        success: true,
        message: "Order placed successfully".to_string(),
        order_id: order.id,
        total_amount: order.total_amount,
        status: order.status,
        order_date: order.created_at,
    }))
}

/// List the caller's orders, newest first
#[utoipa::path(
    get,
    path = "/api/orders/user",
    responses(
        (status = 200, description = "Caller's orders", body = OrderListResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Orders"
)]
#[instrument(skip_all, fields(user = %principal.username))]
pub async fn get_user_orders(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<OrderListResponse>, OrderError> {
    let orders = OrderService::list_for(state.orders.as_ref(), &principal).await?;
    Ok(Json(OrderListResponse::new(
        orders.into_iter().map(OrderView::for_owner).collect(),
    )))
}

/// List every order with its owner (admin only)
#[utoipa::path(
    get,
    path = "/api/orders/admin",
    responses(
        (status = 200, description = "All orders", body = OrderListResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Administrator role required", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Orders"
)]
#[instrument(skip_all)]
pub async fn get_all_orders(
    State(state): State<AppState>,
) -> Result<Json<OrderListResponse>, OrderError> {
    let orders = OrderService::list_all(state.orders.as_ref()).await?;
    Ok(Json(OrderListResponse::new(
        orders.into_iter().map(OrderView::with_owner).collect(),
    )))
}

/// Fetch one order (owner or admin)
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = i64, Path, description = "Order id")
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 400, description = "Order id is not a number", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Order belongs to another user", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Orders"
)]
#[instrument(skip_all, fields(order_id = %id, user = %principal.username))]
pub async fn get_order(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ValidatedPath(id): ValidatedPath<OrderId>,
) -> Result<Json<OrderResponse>, OrderError> {
    let order = OrderService::get_order(state.orders.as_ref(), &principal, id).await?;
    let view = if principal.is_admin() {
        OrderView::with_owner(order)
    } else {
        OrderView::for_owner(order)
    };

    Ok(Json(OrderResponse {
        success: true,
        message: "Order retrieved successfully".to_string(),
        order: view,
    }))
}

/// Cancel an order (owner or admin). Stock is not returned.
#[utoipa::path(
    post,
    path = "/api/orders/{id}/cancel",
    params(
        ("id" = i64, Path, description = "Order id")
    ),
    responses(
        (status = 200, description = "Order cancelled", body = OrderResponse),
        (status = 400, description = "Order id is not a number", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Order belongs to another user", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Orders"
)]
#[instrument(skip_all, fields(order_id = %id, user = %principal.username))]
pub async fn cancel_order(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ValidatedPath(id): ValidatedPath<OrderId>,
) -> Result<Json<OrderResponse>, OrderError> {
    let order = OrderService::cancel_order(state.orders.as_ref(), &principal, id).await?;

    Ok(Json(OrderResponse {
        success: true,
        message: "Order cancelled successfully".to_string(),
        order: OrderView::for_owner(order),
    }))
}

/// Change an order's status (admin only)
#[utoipa::path(
    put,
    path = "/api/orders/{id}/status",
    params(
        ("id" = i64, Path, description = "Order id")
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = OrderResponse),
        (status = 400, description = "Missing or unknown status, or bad order id", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Administrator role required", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Orders"
)]
#[instrument(skip_all, fields(order_id = %id))]
pub async fn update_order_status(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<OrderId>,
    ValidatedJson(dto): ValidatedJson<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, OrderError> {
    let order = OrderService::update_status(state.orders.as_ref(), id, &dto.status).await?;

    Ok(Json(OrderResponse {
        success: true,
        message: "Order status updated successfully".to_string(),
        order: OrderView::with_owner(order),
    }))
}
