//! Persistence collaborators.
//!
//! Handlers and services only see these traits. [`PgStore`] backs them with
//! PostgreSQL; [`MemoryStore`] keeps everything in process for demos and
//! tests.
//!
//! Order placement runs through a [`PlacementTx`]: the stock rows it reads are
//! locked until the unit of work commits or is dropped, and dropping it
//! without calling [`PlacementTx::commit`] discards every staged change.

use async_trait::async_trait;

use bookstore_models::{
    BookId, NewOrder, NewUser, Order, OrderId, OrderStatus, StockItem, UserId, UserRecord,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique column already holds the value (`username`, `email`).
    #[error("{0} already exists")]
    Duplicate(&'static str),
    #[error("book {0} was not locked by this reservation")]
    NotLocked(BookId),
    #[error("stock for book {0} would become negative")]
    StockUnderflow(BookId),
    #[error("database error")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn username_exists(&self, username: &str) -> Result<bool, StoreError>;

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError>;

    /// Inserts a user, failing with [`StoreError::Duplicate`] on a taken
    /// username or email.
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, StoreError>;
}

#[async_trait]
pub trait InventoryLedger: Send + Sync {
    /// Current stock row for a book, read without locking.
    async fn get(&self, book_id: BookId) -> Result<Option<StockItem>, StoreError>;

    /// Opens the unit of work used to reserve stock and record an order.
    async fn begin_reservation(&self) -> Result<Box<dyn PlacementTx>, StoreError>;
}

/// One atomic stock reservation plus order insert.
#[async_trait]
pub trait PlacementTx: Send {
    /// Locks the stock rows for `book_ids` (sorted ascending, no duplicates)
    /// and returns those that exist. Missing books are simply absent.
    async fn lock_stock(&mut self, book_ids: &[BookId]) -> Result<Vec<StockItem>, StoreError>;

    /// Decrements the stock of a locked book.
    async fn reserve(&mut self, book_id: BookId, quantity: i32) -> Result<(), StoreError>;

    async fn insert_order(&mut self, order: NewOrder) -> Result<Order, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Orders placed by `owner`, newest first.
    async fn find_by_owner(&self, owner: UserId) -> Result<Vec<Order>, StoreError>;

    /// Every order, newest first.
    async fn find_all(&self) -> Result<Vec<Order>, StoreError>;

    /// Sets the status of an order, returning the updated order or `None`
    /// when it does not exist.
    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError>;
}
