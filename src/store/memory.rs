//! In-process store behind a single async mutex.
//!
//! A reservation holds the mutex for its whole unit of work, which serializes
//! concurrent placements the same way row locks do in PostgreSQL. Staged
//! stock decrements and order inserts are applied only on commit.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};

use bookstore_models::{
    BookId, NewOrder, NewUser, Order, OrderId, OrderLine, OrderOwner, OrderStatus, StockItem,
    UserId, UserRecord,
};

use super::{InventoryLedger, OrderStore, PlacementTx, StoreError, UserDirectory};

#[derive(Debug, Clone)]
struct BookRow {
    title: String,
    price: Decimal,
    stock: i32,
}

#[derive(Debug, Clone)]
struct OrderRow {
    owner_id: UserId,
    lines: Vec<OrderLine>,
    total_amount: Decimal,
    status: OrderStatus,
    shipping_address: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryState {
    users: BTreeMap<UserId, UserRecord>,
    books: BTreeMap<BookId, BookRow>,
    orders: BTreeMap<OrderId, OrderRow>,
    last_user_id: i64,
    last_book_id: i64,
    last_order_id: i64,
}

impl MemoryState {
    fn stock_item(&self, book_id: BookId) -> Option<StockItem> {
        self.books.get(&book_id).map(|book| StockItem {
            book_id,
            title: book.title.clone(),
            unit_price: book.price,
            quantity_available: book.stock,
        })
    }

    fn materialize(&self, id: OrderId, row: &OrderRow) -> Order {
        let owner = self.users.get(&row.owner_id);
        Order {
            id,
            owner: OrderOwner {
                id: row.owner_id,
                username: owner.map(|u| u.username.clone()).unwrap_or_default(),
                email: owner.map(|u| u.email.clone()).unwrap_or_default(),
            },
            lines: row.lines.clone(),
            total_amount: row.total_amount,
            status: row.status,
            shipping_address: row.shipping_address.clone(),
            created_at: row.created_at,
        }
    }

    fn newest_first(&self, keep: impl Fn(&OrderRow) -> bool) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|(_, row)| keep(row))
            .map(|(id, row)| self.materialize(*id, row))
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        orders
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a book with its price and initial stock.
    pub async fn add_book(&self, title: &str, price: Decimal, stock: i32) -> BookId {
        let mut state = self.state.lock().await;
        state.last_book_id += 1;
        let id = BookId::new(state.last_book_id);
        state.books.insert(
            id,
            BookRow {
                title: title.to_string(),
                price,
                stock,
            },
        );
        id
    }

    /// Changes the catalog price of a book. Returns `false` if it does not exist.
    pub async fn set_price(&self, book_id: BookId, price: Decimal) -> bool {
        let mut state = self.state.lock().await;
        match state.books.get_mut(&book_id) {
            Some(book) => {
                book.price = price;
                true
            }
            None => false,
        }
    }

    pub async fn order_count(&self) -> usize {
        self.state.lock().await.orders.len()
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn username_exists(&self, username: &str) -> Result<bool, StoreError> {
        let state = self.state.lock().await;
        Ok(state.users.values().any(|user| user.username == username))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        let state = self.state.lock().await;
        Ok(state.users.values().any(|user| user.email == email))
    }

    async fn create_user(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut state = self.state.lock().await;
        if state.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Duplicate("username"));
        }
        if state.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("email"));
        }

        state.last_user_id += 1;
        let record = UserRecord {
            id: UserId::new(state.last_user_id),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            address: user.address,
            age: user.age,
            customer_id: user.customer_id,
            role: user.role,
            created_at: Utc::now(),
        };
        state.users.insert(record.id, record.clone());
        Ok(record)
    }
}

#[async_trait]
impl InventoryLedger for MemoryStore {
    async fn get(&self, book_id: BookId) -> Result<Option<StockItem>, StoreError> {
        Ok(self.state.lock().await.stock_item(book_id))
    }

    async fn begin_reservation(&self) -> Result<Box<dyn PlacementTx>, StoreError> {
        let state = Arc::clone(&self.state).lock_owned().await;
        Ok(Box::new(MemoryPlacement {
            state,
            locked: HashSet::new(),
            reservations: Vec::new(),
            staged_orders: Vec::new(),
        }))
    }
}

struct MemoryPlacement {
    state: OwnedMutexGuard<MemoryState>,
    locked: HashSet<BookId>,
    reservations: Vec<(BookId, i32)>,
    staged_orders: Vec<(OrderId, OrderRow)>,
}

impl MemoryPlacement {
    fn reserved(&self, book_id: BookId) -> i32 {
        self.reservations
            .iter()
            .filter(|(id, _)| *id == book_id)
            .map(|(_, quantity)| quantity)
            .sum()
    }
}

#[async_trait]
impl PlacementTx for MemoryPlacement {
    async fn lock_stock(&mut self, book_ids: &[BookId]) -> Result<Vec<StockItem>, StoreError> {
        let mut items = Vec::with_capacity(book_ids.len());
        for &book_id in book_ids {
            if let Some(item) = self.state.stock_item(book_id) {
                self.locked.insert(book_id);
                items.push(item);
            }
        }
        Ok(items)
    }

    async fn reserve(&mut self, book_id: BookId, quantity: i32) -> Result<(), StoreError> {
        if !self.locked.contains(&book_id) {
            return Err(StoreError::NotLocked(book_id));
        }
        let stock = self.state.books.get(&book_id).map_or(0, |book| book.stock);
        if stock - self.reserved(book_id) < quantity {
            return Err(StoreError::StockUnderflow(book_id));
        }
        self.reservations.push((book_id, quantity));
        Ok(())
    }

    async fn insert_order(&mut self, order: NewOrder) -> Result<Order, StoreError> {
        let id = OrderId::new(self.state.last_order_id + 1 + self.staged_orders.len() as i64);
        let row = OrderRow {
            owner_id: order.owner_id,
            lines: order.lines,
            total_amount: order.total_amount,
            status: order.status,
            shipping_address: order.shipping_address,
            created_at: order.created_at,
        };
        let persisted = self.state.materialize(id, &row);
        self.staged_orders.push((id, row));
        Ok(persisted)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryPlacement {
            mut state,
            reservations,
            staged_orders,
            ..
        } = *self;

        for (book_id, quantity) in reservations {
            if let Some(book) = state.books.get_mut(&book_id) {
                book.stock -= quantity;
            }
        }
        for (id, row) in staged_orders {
            state.last_order_id = state.last_order_id.max(id.into_inner());
            state.orders.insert(id, row);
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.orders.get(&id).map(|row| state.materialize(id, row)))
    }

    async fn find_by_owner(&self, owner: UserId) -> Result<Vec<Order>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.newest_first(|row| row.owner_id == owner))
    }

    async fn find_all(&self) -> Result<Vec<Order>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.newest_first(|_| true))
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError> {
        let mut state = self.state.lock().await;
        let Some(row) = state.orders.get_mut(&id) else {
            return Ok(None);
        };
        row.status = status;
        let row = row.clone();
        Ok(Some(state.materialize(id, &row)))
    }
}
