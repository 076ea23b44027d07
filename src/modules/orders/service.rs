//! Order placement and status management.
//!
//! Placement locks every referenced stock row before validating any line,
//! validates lines in the order they were submitted, and only then stages
//! the decrements and the order insert in the same unit of work. Any
//! failure drops the unit of work, which discards everything staged.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{info, instrument, warn};

use bookstore_models::{
    BookId, NewOrder, Order, OrderId, OrderLine, OrderStatus, Principal, StockItem,
};

use crate::metrics::{
    track_order_placed, track_order_placement_failure, track_order_status_update,
};
use crate::store::{InventoryLedger, OrderStore};

use super::error::OrderError;
use super::model::OrderDraft;

pub struct OrderService;

impl OrderService {
    #[instrument(skip_all, fields(user = %principal.username, lines = draft.items.len()))]
    pub async fn place_order(
        inventory: &dyn InventoryLedger,
        principal: &Principal,
        draft: OrderDraft,
    ) -> Result<Order, OrderError> {
        match Self::reserve_and_record(inventory, principal, draft).await {
            Ok(order) => {
                track_order_placed();
                info!(order_id = %order.id, total = %order.total_amount, "Order placed");
                Ok(order)
            }
            Err(err) => {
                track_order_placement_failure(err.reason());
                warn!(reason = err.reason(), error = %err, "Order rejected");
                Err(err)
            }
        }
    }

    async fn reserve_and_record(
        inventory: &dyn InventoryLedger,
        principal: &Principal,
        draft: OrderDraft,
    ) -> Result<Order, OrderError> {
        if draft.items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        let mut book_ids: Vec<BookId> = draft.items.iter().map(|line| line.book_id).collect();
        book_ids.sort_unstable();
        book_ids.dedup();

        let mut tx = inventory.begin_reservation().await?;
        let mut stock: HashMap<BookId, StockItem> = tx
            .lock_stock(&book_ids)
            .await?
            .into_iter()
            .map(|item| (item.book_id, item))
            .collect();

        let mut lines = Vec::with_capacity(draft.items.len());
        for requested in &draft.items {
            let item = stock
                .get_mut(&requested.book_id)
                .ok_or(OrderError::BookNotFound(requested.book_id))?;

            if requested.quantity <= 0 {
                return Err(OrderError::InvalidQuantity {
                    book_id: requested.book_id,
                });
            }
            if item.quantity_available < requested.quantity {
                return Err(OrderError::InsufficientStock {
                    book_id: item.book_id,
                    title: item.title.clone(),
                    available: item.quantity_available,
                    requested: requested.quantity,
                });
            }

            // Later lines for the same book see this line's reservation.
            item.quantity_available -= requested.quantity;
            lines.push(OrderLine {
                book_id: item.book_id,
                title: item.title.clone(),
                quantity: requested.quantity,
                unit_price: item.unit_price,
            });
        }

        for line in &lines {
            tx.reserve(line.book_id, line.quantity).await?;
        }

        let order = tx
            .insert_order(NewOrder {
                owner_id: principal.subject_id,
                total_amount: Order::total_of(&lines),
                lines,
                status: OrderStatus::Pending,
                shipping_address: draft.shipping_address.trim().to_string(),
                created_at: Utc::now(),
            })
            .await?;

        tx.commit().await?;
        Ok(order)
    }

    /// Sets an order's status from a client-supplied name (case-insensitive).
    #[instrument(skip(orders))]
    pub async fn update_status(
        orders: &dyn OrderStore,
        id: OrderId,
        raw_status: &str,
    ) -> Result<Order, OrderError> {
        if raw_status.trim().is_empty() {
            return Err(OrderError::MissingField("status"));
        }

        orders
            .find_by_id(id)
            .await?
            .ok_or(OrderError::OrderNotFound(id))?;

        let status: OrderStatus = raw_status.parse().map_err(|_| OrderError::InvalidStatus {
            valid: OrderStatus::valid_values(),
        })?;

        let order = orders
            .update_status(id, status)
            .await?
            .ok_or(OrderError::OrderNotFound(id))?;

        track_order_status_update(status.as_str());
        info!(order_id = %id, status = %status, "Order status updated");
        Ok(order)
    }

    pub async fn list_for(
        orders: &dyn OrderStore,
        principal: &Principal,
    ) -> Result<Vec<Order>, OrderError> {
        Ok(orders.find_by_owner(principal.subject_id).await?)
    }

    pub async fn list_all(orders: &dyn OrderStore) -> Result<Vec<Order>, OrderError> {
        Ok(orders.find_all().await?)
    }

    /// Fetches an order visible to `principal`: its owner or any admin.
    pub async fn get_order(
        orders: &dyn OrderStore,
        principal: &Principal,
        id: OrderId,
    ) -> Result<Order, OrderError> {
        let order = orders
            .find_by_id(id)
            .await?
            .ok_or(OrderError::OrderNotFound(id))?;

        if !principal.is_admin() && !order.is_owned_by(principal.subject_id) {
            return Err(OrderError::NotOwner);
        }
        Ok(order)
    }

    /// Marks an order cancelled. Reserved stock is not returned.
    #[instrument(skip(orders, principal), fields(user = %principal.username))]
    pub async fn cancel_order(
        orders: &dyn OrderStore,
        principal: &Principal,
        id: OrderId,
    ) -> Result<Order, OrderError> {
        Self::get_order(orders, principal, id).await?;

        let order = orders
            .update_status(id, OrderStatus::Cancelled)
            .await?
            .ok_or(OrderError::OrderNotFound(id))?;

        track_order_status_update(OrderStatus::Cancelled.as_str());
        info!(order_id = %id, "Order cancelled");
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookstore_models::{NewUser, Role, UserRecord};
    use rust_decimal::Decimal;

    use crate::modules::orders::model::DraftLine;
    use crate::store::{MemoryStore, UserDirectory};

    async fn user(store: &MemoryStore, username: &str, role: Role) -> Principal {
        let record: UserRecord = store
            .create_user(NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash: "hash".to_string(),
                address: "1 Main St".to_string(),
                age: 40,
                customer_id: format!("CUST-{username}"),
                role,
            })
            .await
            .unwrap();
        record.principal()
    }

    fn draft(lines: &[(BookId, i32)]) -> OrderDraft {
        OrderDraft {
            items: lines
                .iter()
                .map(|&(book_id, quantity)| DraftLine { book_id, quantity })
                .collect(),
            shipping_address: "42 Library Road".to_string(),
        }
    }

    async fn stock_of(store: &MemoryStore, book: BookId) -> i32 {
        store.get(book).await.unwrap().unwrap().quantity_available
    }

    #[tokio::test]
    async fn test_place_order_reserves_stock_and_totals() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice", Role::Customer).await;
        let book = store.add_book("Book A", Decimal::new(1000, 2), 5).await;

        let order = OrderService::place_order(&store, &alice, draft(&[(book, 3)]))
            .await
            .unwrap();

        assert_eq!(order.total_amount, Decimal::new(3000, 2));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.owner.id, alice.subject_id);
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].unit_price, Decimal::new(1000, 2));
        assert_eq!(stock_of(&store, book).await, 2);
    }

    #[tokio::test]
    async fn test_empty_order_changes_nothing() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice", Role::Customer).await;
        let book = store.add_book("Book A", Decimal::new(1000, 2), 5).await;

        let err = OrderService::place_order(&store, &alice, draft(&[]))
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::EmptyOrder));
        assert_eq!(stock_of(&store, book).await, 5);
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_failure_on_later_line_rolls_back_earlier_lines() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice", Role::Customer).await;
        let plenty = store.add_book("Plenty", Decimal::new(500, 2), 10).await;
        let scarce = store.add_book("Scarce", Decimal::new(700, 2), 1).await;

        let err = OrderService::place_order(&store, &alice, draft(&[(plenty, 4), (scarce, 2)]))
            .await
            .unwrap_err();

        match err {
            OrderError::InsufficientStock {
                title,
                available,
                requested,
                ..
            } => {
                assert_eq!(title, "Scarce");
                assert_eq!(available, 1);
                assert_eq!(requested, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(stock_of(&store, plenty).await, 10);
        assert_eq!(stock_of(&store, scarce).await, 1);
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_errors_follow_input_order() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice", Role::Customer).await;
        let book = store.add_book("Book A", Decimal::new(1000, 2), 1).await;

        let err = OrderService::place_order(
            &store,
            &alice,
            draft(&[(BookId::new(999), 1), (book, 0)]),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, OrderError::BookNotFound(id) if id == BookId::new(999)));

        let err = OrderService::place_order(&store, &alice, draft(&[(book, 0)]))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidQuantity { .. }));

        let err = OrderService::place_order(&store, &alice, draft(&[(book, -3)]))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidQuantity { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_lines_are_checked_cumulatively() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice", Role::Customer).await;
        let book = store.add_book("Book A", Decimal::new(1000, 2), 3).await;

        let err = OrderService::place_order(&store, &alice, draft(&[(book, 2), (book, 2)]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OrderError::InsufficientStock {
                available: 1,
                requested: 2,
                ..
            }
        ));
        assert_eq!(stock_of(&store, book).await, 3);

        let order = OrderService::place_order(&store, &alice, draft(&[(book, 2), (book, 1)]))
            .await
            .unwrap();
        assert_eq!(order.lines.len(), 2);
        assert_eq!(stock_of(&store, book).await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_orders_for_last_copy() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice", Role::Customer).await;
        let bob = user(&store, "bob", Role::Customer).await;
        let book = store.add_book("Last Copy", Decimal::new(1999, 2), 1).await;

        let handles: Vec<_> = [alice, bob]
            .into_iter()
            .map(|principal| {
                let store = store.clone();
                tokio::spawn(async move {
                    OrderService::place_order(&store, &principal, draft(&[(book, 1)])).await
                })
            })
            .collect();

        let mut placed = 0;
        let mut short = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => placed += 1,
                Err(OrderError::InsufficientStock { .. }) => short += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(placed, 1);
        assert_eq!(short, 1);
        assert_eq!(stock_of(&store, book).await, 0);
        assert_eq!(store.order_count().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_orders_never_oversell() {
        let store = MemoryStore::new();
        let book = store.add_book("Popular", Decimal::new(1250, 2), 10).await;

        let mut handles = Vec::new();
        for i in 0..25 {
            let buyer = user(&store, &format!("buyer{i}"), Role::Customer).await;
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                OrderService::place_order(&store, &buyer, draft(&[(book, 1)])).await
            }));
        }

        let mut placed = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                placed += 1;
            }
        }

        assert_eq!(placed, 10);
        assert_eq!(stock_of(&store, book).await, 0);
    }

    #[tokio::test]
    async fn test_price_snapshot_survives_price_change() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice", Role::Customer).await;
        let book = store.add_book("Book A", Decimal::new(1000, 2), 5).await;

        let placed = OrderService::place_order(&store, &alice, draft(&[(book, 2)]))
            .await
            .unwrap();
        assert!(store.set_price(book, Decimal::new(9900, 2)).await);

        let stored = OrderService::get_order(&store, &alice, placed.id)
            .await
            .unwrap();
        assert_eq!(stored.lines[0].unit_price, Decimal::new(1000, 2));
        assert_eq!(stored.total_amount, Decimal::new(2000, 2));
        assert_eq!(stored.total_amount, Order::total_of(&stored.lines));
    }

    #[tokio::test]
    async fn test_update_status() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice", Role::Customer).await;
        let book = store.add_book("Book A", Decimal::new(1000, 2), 5).await;
        let order = OrderService::place_order(&store, &alice, draft(&[(book, 1)]))
            .await
            .unwrap();

        let updated = OrderService::update_status(&store, order.id, "shipped")
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Shipped);
        assert_eq!(updated.total_amount, order.total_amount);

        let err = OrderService::update_status(&store, order.id, "TELEPORTED")
            .await
            .unwrap_err();
        match err {
            OrderError::InvalidStatus { valid } => {
                assert_eq!(valid, "PENDING, SHIPPED, DELIVERED, CANCELLED")
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let stored = OrderService::get_order(&store, &alice, order.id)
            .await
            .unwrap();
        assert_eq!(stored.status, OrderStatus::Shipped);

        let err = OrderService::update_status(&store, order.id, "  ")
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::MissingField("status")));

        let err = OrderService::update_status(&store, OrderId::new(404), "PENDING")
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::OrderNotFound(_)));
    }

    #[tokio::test]
    async fn test_visibility_and_cancellation() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice", Role::Customer).await;
        let bob = user(&store, "bob", Role::Customer).await;
        let admin = user(&store, "admin", Role::Admin).await;
        let book = store.add_book("Book A", Decimal::new(1000, 2), 5).await;
        let order = OrderService::place_order(&store, &alice, draft(&[(book, 2)]))
            .await
            .unwrap();

        let err = OrderService::get_order(&store, &bob, order.id)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::NotOwner));
        assert!(OrderService::get_order(&store, &admin, order.id).await.is_ok());

        let err = OrderService::cancel_order(&store, &bob, order.id)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::NotOwner));

        let cancelled = OrderService::cancel_order(&store, &alice, order.id)
            .await
            .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        let again = OrderService::cancel_order(&store, &admin, order.id)
            .await
            .unwrap();
        assert_eq!(again.status, OrderStatus::Cancelled);
        assert_eq!(stock_of(&store, book).await, 3);
    }

    #[tokio::test]
    async fn test_listing_is_scoped_and_newest_first() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice", Role::Customer).await;
        let bob = user(&store, "bob", Role::Customer).await;
        let book = store.add_book("Book A", Decimal::new(1000, 2), 10).await;

        let first = OrderService::place_order(&store, &alice, draft(&[(book, 1)]))
            .await
            .unwrap();
        let second = OrderService::place_order(&store, &alice, draft(&[(book, 2)]))
            .await
            .unwrap();
        OrderService::place_order(&store, &bob, draft(&[(book, 1)]))
            .await
            .unwrap();

        let mine = OrderService::list_for(&store, &alice).await.unwrap();
        let ids: Vec<OrderId> = mine.iter().map(|order| order.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);

        let all = OrderService::list_all(&store).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].owner.username, "bob");
    }
}
