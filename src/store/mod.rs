use async_trait::async_trait;
use diesel::result::DatabaseErrorKind;
use thiserror::Error;

use crate::aggregate::OrderAggregate;

pub mod orders;

pub use orders::PgOrderStore;

/// Errors surfaced by order persistence. Every transactional operation
/// rolls back before one of these propagates; nothing is retried here.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(diesel::result::Error),

    #[error("connection pool error: {0}")]
    Pool(String),
}

impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => StoreError::NotFound,
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                StoreError::Conflict(info.message().to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

/// Persistence boundary for orders and their lines. The service layer
/// depends on this trait; `PgOrderStore` is the one SQL-backed
/// implementation.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Return the id of the customer's open order, creating one with an
    /// empty total if none exists. Safe under concurrent calls for the
    /// same customer.
    async fn get_or_create_open_order(&self, customer_id: i32) -> Result<i32, StoreError>;

    /// Insert or replace the line for `(order_id, book_id)` and recompute
    /// the order total, atomically. `subtotal` is in minor units.
    async fn upsert_cart_line(
        &self,
        order_id: i32,
        book_id: i32,
        quantity: i32,
        subtotal: i64,
    ) -> Result<(), StoreError>;

    /// Delete the line for `(order_id, book_id)` and recompute the order
    /// total, atomically. Removing an absent line still commits.
    async fn remove_cart_line(&self, order_id: i32, book_id: i32) -> Result<(), StoreError>;

    /// Read one order with its nested lines. An order with no lines comes
    /// back as an empty aggregate; a missing order is `NotFound`.
    async fn get_cart(&self, order_id: i32) -> Result<OrderAggregate, StoreError>;

    /// Read the customer's non-open orders, oldest first, windowed by
    /// `LIMIT limit OFFSET page * limit` over orders.
    async fn get_order_history(
        &self,
        customer_id: i32,
        limit: i64,
        page: i64,
    ) -> Result<Vec<OrderAggregate>, StoreError>;

    /// Transition the customer's open order to paid. `NotFound` when the
    /// customer has no open order.
    async fn pay_order(&self, customer_id: i32) -> Result<(), StoreError>;
}

#[async_trait]
impl<S: OrderStore + ?Sized> OrderStore for std::sync::Arc<S> {
    async fn get_or_create_open_order(&self, customer_id: i32) -> Result<i32, StoreError> {
        (**self).get_or_create_open_order(customer_id).await
    }

    async fn upsert_cart_line(
        &self,
        order_id: i32,
        book_id: i32,
        quantity: i32,
        subtotal: i64,
    ) -> Result<(), StoreError> {
        (**self)
            .upsert_cart_line(order_id, book_id, quantity, subtotal)
            .await
    }

    async fn remove_cart_line(&self, order_id: i32, book_id: i32) -> Result<(), StoreError> {
        (**self).remove_cart_line(order_id, book_id).await
    }

    async fn get_cart(&self, order_id: i32) -> Result<OrderAggregate, StoreError> {
        (**self).get_cart(order_id).await
    }

    async fn get_order_history(
        &self,
        customer_id: i32,
        limit: i64,
        page: i64,
    ) -> Result<Vec<OrderAggregate>, StoreError> {
        (**self).get_order_history(customer_id, limit, page).await
    }

    async fn pay_order(&self, customer_id: i32) -> Result<(), StoreError> {
        (**self).pay_order(customer_id).await
    }
}
