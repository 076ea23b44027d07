//! PostgreSQL store.
//!
//! Reservations run inside one transaction and lock the affected `books` rows
//! with `SELECT ... FOR UPDATE` in ascending id order, so concurrent
//! placements touching the same book are serialized and cannot deadlock on
//! each other.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use bookstore_models::{
    BookId, NewOrder, NewUser, Order, OrderId, OrderLine, OrderOwner, OrderStatus, StockItem,
    UserId, UserRecord,
};

use super::{InventoryLedger, OrderStore, PlacementTx, StoreError, UserDirectory};

const USER_COLUMNS: &str =
    "id, username, email, password_hash, address, age, customer_id, role, created_at";

const ORDER_SELECT: &str = r#"
    SELECT o.id, o.user_id, u.username, u.email, o.total_amount, o.status,
           o.shipping_address, o.order_date
    FROM orders o
    JOIN users u ON u.id = o.user_id
    WHERE ($1::BIGINT IS NULL OR o.id = $1)
      AND ($2::BIGINT IS NULL OR o.user_id = $2)
    ORDER BY o.order_date DESC, o.id DESC
"#;

#[derive(Debug, FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    username: String,
    email: String,
    total_amount: Decimal,
    status: OrderStatus,
    shipping_address: String,
    order_date: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct OrderItemRow {
    order_id: OrderId,
    book_id: BookId,
    title: String,
    quantity: i32,
    unit_price: Decimal,
}

fn map_unique_violation(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                Some(name) if name.contains("email") => StoreError::Duplicate("email"),
                _ => StoreError::Duplicate("username"),
            };
        }
    }
    StoreError::Database(err)
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_orders(
        &self,
        id: Option<OrderId>,
        owner: Option<UserId>,
    ) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(ORDER_SELECT)
            .bind(id)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<i64> = rows.iter().map(|row| row.id.into_inner()).collect();
        let items = sqlx::query_as::<_, OrderItemRow>(
            "SELECT order_id, book_id, title, quantity, unit_price
             FROM order_items
             WHERE order_id = ANY($1)
             ORDER BY id",
        )
        .bind(&order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut lines_by_order: HashMap<OrderId, Vec<OrderLine>> = HashMap::new();
        for item in items {
            lines_by_order
                .entry(item.order_id)
                .or_default()
                .push(OrderLine {
                    book_id: item.book_id,
                    title: item.title,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                });
        }

        Ok(rows
            .into_iter()
            .map(|row| Order {
                id: row.id,
                owner: OrderOwner {
                    id: row.user_id,
                    username: row.username,
                    email: row.email,
                },
                lines: lines_by_order.remove(&row.id).unwrap_or_default(),
                total_amount: row.total_amount,
                status: row.status,
                shipping_address: row.shipping_address,
                created_at: row.order_date,
            })
            .collect())
    }
}

#[async_trait]
impl UserDirectory for PgStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn username_exists(&self, username: &str) -> Result<bool, StoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn create_user(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (username, email, password_hash, address, age, customer_id, role)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.address)
        .bind(user.age)
        .bind(&user.customer_id)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)
    }
}

#[async_trait]
impl InventoryLedger for PgStore {
    async fn get(&self, book_id: BookId) -> Result<Option<StockItem>, StoreError> {
        let item = sqlx::query_as::<_, StockItem>(
            "SELECT id AS book_id, title, price AS unit_price, stock AS quantity_available
             FROM books WHERE id = $1",
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    async fn begin_reservation(&self) -> Result<Box<dyn PlacementTx>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgPlacement { tx }))
    }
}

struct PgPlacement {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl PlacementTx for PgPlacement {
    async fn lock_stock(&mut self, book_ids: &[BookId]) -> Result<Vec<StockItem>, StoreError> {
        let ids: Vec<i64> = book_ids.iter().map(|id| id.into_inner()).collect();
        let items = sqlx::query_as::<_, StockItem>(
            "SELECT id AS book_id, title, price AS unit_price, stock AS quantity_available
             FROM books
             WHERE id = ANY($1)
             ORDER BY id
             FOR UPDATE",
        )
        .bind(&ids)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(items)
    }

    async fn reserve(&mut self, book_id: BookId, quantity: i32) -> Result<(), StoreError> {
        let result =
            sqlx::query("UPDATE books SET stock = stock - $2 WHERE id = $1 AND stock >= $2")
                .bind(book_id)
                .bind(quantity)
                .execute(&mut *self.tx)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::StockUnderflow(book_id));
        }
        Ok(())
    }

    async fn insert_order(&mut self, order: NewOrder) -> Result<Order, StoreError> {
        let id: OrderId = sqlx::query_scalar(
            "INSERT INTO orders (user_id, total_amount, status, shipping_address, order_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(order.owner_id)
        .bind(order.total_amount)
        .bind(order.status)
        .bind(&order.shipping_address)
        .bind(order.created_at)
        .fetch_one(&mut *self.tx)
        .await?;

        for line in &order.lines {
            sqlx::query(
                "INSERT INTO order_items (order_id, book_id, title, quantity, unit_price)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(id)
            .bind(line.book_id)
            .bind(&line.title)
            .bind(line.quantity)
            .bind(line.unit_price)
            .execute(&mut *self.tx)
            .await?;
        }

        let (username, email): (String, String) =
            sqlx::query_as("SELECT username, email FROM users WHERE id = $1")
                .bind(order.owner_id)
                .fetch_one(&mut *self.tx)
                .await?;

        Ok(Order {
            id,
            owner: OrderOwner {
                id: order.owner_id,
                username,
                email,
            },
            lines: order.lines,
            total_amount: order.total_amount,
            status: order.status,
            shipping_address: order.shipping_address,
            created_at: order.created_at,
        })
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.load_orders(Some(id), None).await?.into_iter().next())
    }

    async fn find_by_owner(&self, owner: UserId) -> Result<Vec<Order>, StoreError> {
        self.load_orders(None, Some(owner)).await
    }

    async fn find_all(&self) -> Result<Vec<Order>, StoreError> {
        self.load_orders(None, None).await
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError> {
        let result = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }
}
