use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use bookstore_models::{BookId, Order, OrderId, OrderLine, OrderStatus, UserId};

use crate::validator::not_blank;

/// Order as submitted by a customer. Line checks (existence, quantity,
/// stock) happen during placement, not at deserialization.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub items: Vec<DraftLine>,
    #[validate(custom(function = "not_blank", message = "Shipping address is required"))]
    #[schema(example = "221B Baker Street, London")]
    pub shipping_address: String,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftLine {
    pub book_id: BookId,
    #[schema(example = 2)]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStatusRequest {
    #[schema(example = "SHIPPED")]
    pub status: String,
}

/// Catalogue entry as it was when the line was ordered.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderBookView {
    pub id: BookId,
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 10.0)]
    pub price: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemView {
    pub book_id: BookId,
    pub title: String,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 10.0)]
    pub price: Decimal,
    pub book: OrderBookView,
}

impl From<OrderLine> for OrderItemView {
    fn from(line: OrderLine) -> Self {
        Self {
            book: OrderBookView {
                id: line.book_id,
                title: line.title.clone(),
                price: line.unit_price,
            },
            book_id: line.book_id,
            title: line.title,
            quantity: line.quantity,
            price: line.unit_price,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderUserView {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: OrderId,
    pub order_date: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 30.0)]
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub address: String,
    pub order_items: Vec<OrderItemView>,
    /// Present in administrator views only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<OrderUserView>,
}

impl OrderView {
    /// View for the order's owner, without the owner block.
    pub fn for_owner(order: Order) -> Self {
        Self::build(order, false)
    }

    /// View for administrators, including who placed the order.
    pub fn with_owner(order: Order) -> Self {
        Self::build(order, true)
    }

    fn build(order: Order, include_owner: bool) -> Self {
        let user = include_owner.then(|| OrderUserView {
            id: order.owner.id,
            username: order.owner.username,
            email: order.owner.email,
        });

        Self {
            id: order.id,
            order_date: order.created_at,
            total_amount: order.total_amount,
            status: order.status,
            address: order.shipping_address,
            order_items: order.lines.into_iter().map(OrderItemView::from).collect(),
            user,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderResponse {
    pub success: bool,
    pub message: String,
    pub order_id: OrderId,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 30.0)]
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub order_date: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderListResponse {
    pub success: bool,
    pub message: String,
    pub orders: Vec<OrderView>,
    pub count: usize,
}

impl OrderListResponse {
    pub fn new(orders: Vec<OrderView>) -> Self {
        Self {
            success: true,
            message: "Orders retrieved successfully".to_string(),
            count: orders.len(),
            orders,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub success: bool,
    pub message: String,
    pub order: OrderView,
}
