use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use bookstore_core::AppError;
use bookstore_models::{BookId, OrderId};

use crate::store::StoreError;

/// Outcome of a rejected order operation. Every placement failure aborts the
/// reservation, so no stock or order change is visible afterwards.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order must contain at least one item")]
    EmptyOrder,
    #[error("Quantity for book {book_id} must be greater than zero")]
    InvalidQuantity { book_id: BookId },
    #[error("Book not found with id: {0}")]
    BookNotFound(BookId),
    #[error(
        "Insufficient stock for book: {title}. Available: {available}, Requested: {requested}"
    )]
    InsufficientStock {
        book_id: BookId,
        title: String,
        available: i32,
        requested: i32,
    },
    #[error("Order not found with id: {0}")]
    OrderNotFound(OrderId),
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Invalid order status. Valid values are: {valid}")]
    InvalidStatus { valid: String },
    #[error("You do not have access to this order")]
    NotOwner,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl OrderError {
    pub fn status(&self) -> StatusCode {
        match self {
            OrderError::EmptyOrder
            | OrderError::InvalidQuantity { .. }
            | OrderError::MissingField(_)
            | OrderError::InvalidStatus { .. } => StatusCode::BAD_REQUEST,
            OrderError::BookNotFound(_) | OrderError::OrderNotFound(_) => StatusCode::NOT_FOUND,
            OrderError::InsufficientStock { .. } => StatusCode::CONFLICT,
            OrderError::NotOwner => StatusCode::FORBIDDEN,
            OrderError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used as the `reason` on failure metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            OrderError::EmptyOrder => "empty_order",
            OrderError::InvalidQuantity { .. } => "invalid_quantity",
            OrderError::BookNotFound(_) => "book_not_found",
            OrderError::InsufficientStock { .. } => "insufficient_stock",
            OrderError::OrderNotFound(_) => "order_not_found",
            OrderError::MissingField(_) => "missing_field",
            OrderError::InvalidStatus { .. } => "invalid_status",
            OrderError::NotOwner => "not_owner",
            OrderError::Store(_) => "store",
        }
    }

    pub fn into_app_error(self) -> AppError {
        AppError::new(self.status(), self)
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        self.into_app_error().into_response()
    }
}
