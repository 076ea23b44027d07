use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::ids::BookId;

/// Price and available quantity of one book, as locked during placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct StockItem {
    pub book_id: BookId,
    pub title: String,
    pub unit_price: Decimal,
    pub quantity_available: i32,
}
