use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use bookstore_models::{OrderStatus, Role};

use crate::modules::ErrorResponse;
use crate::modules::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::modules::orders::{
    DraftLine, OrderBookView, OrderDraft, OrderItemView, OrderListResponse, OrderResponse,
    OrderUserView, OrderView, PlaceOrderResponse, UpdateStatusRequest,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register_user,
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::validate_token,
        crate::modules::orders::controller::place_order,
        crate::modules::orders::controller::get_user_orders,
        crate::modules::orders::controller::get_all_orders,
        crate::modules::orders::controller::get_order,
        crate::modules::orders::controller::cancel_order,
        crate::modules::orders::controller::update_order_status,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            Role,
            OrderDraft,
            DraftLine,
            UpdateStatusRequest,
            OrderStatus,
            OrderView,
            OrderItemView,
            OrderBookView,
            OrderUserView,
            PlaceOrderResponse,
            OrderListResponse,
            OrderResponse,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and token validation"),
        (name = "Orders", description = "Order placement and management")
    ),
    info(
        title = "Bookstore API",
        version = "0.1.0",
        description = "Online bookstore order backend with JWT authentication.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
