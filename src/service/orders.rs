use crate::aggregate::OrderAggregate;
use crate::app_error::AppError;
use crate::money;
use crate::store::OrderStore;

/// History page size substituted when the caller passes 0.
pub const DEFAULT_HISTORY_LIMIT: i64 = 10;

/// Use-case orchestration over the order store. Every cart operation
/// resolves the customer's open order first, so the store stays scoped to
/// order ids and the "cart == open order" policy lives in one place.
#[derive(Clone)]
pub struct OrderService<S> {
    store: S,
}

impl<S: OrderStore> OrderService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Add `quantity` copies of a book to the customer's cart, replacing
    /// any existing line for that book. `unit_price` is the catalog price
    /// the caller looked up; the subtotal is fixed at add time and does
    /// not track later price changes.
    pub async fn add_to_cart(
        &self,
        customer_id: i32,
        book_id: i32,
        quantity: i32,
        unit_price: f64,
    ) -> Result<(), AppError> {
        if quantity < 1 {
            return Err(AppError::Validation(
                "quantity must be at least 1".to_string(),
            ));
        }
        if !(unit_price > 0.0) {
            return Err(AppError::Validation(
                "unit price must be positive".to_string(),
            ));
        }

        let subtotal = money::to_storage(unit_price * quantity as f64)
            .map_err(|err| AppError::Validation(err.to_string()))?;

        let order_id = self.store.get_or_create_open_order(customer_id).await?;
        self.store
            .upsert_cart_line(order_id, book_id, quantity, subtotal)
            .await?;
        Ok(())
    }

    pub async fn remove_from_cart(&self, customer_id: i32, book_id: i32) -> Result<(), AppError> {
        let order_id = self.store.get_or_create_open_order(customer_id).await?;
        self.store.remove_cart_line(order_id, book_id).await?;
        Ok(())
    }

    /// A cart with no lines is a valid empty result, not an error.
    pub async fn view_cart(&self, customer_id: i32) -> Result<OrderAggregate, AppError> {
        let order_id = self.store.get_or_create_open_order(customer_id).await?;
        let cart = self.store.get_cart(order_id).await?;
        Ok(cart)
    }

    pub async fn pay_order(&self, customer_id: i32) -> Result<(), AppError> {
        self.store.pay_order(customer_id).await?;
        Ok(())
    }

    pub async fn view_history(
        &self,
        customer_id: i32,
        page: i64,
        limit: i64,
    ) -> Result<Vec<OrderAggregate>, AppError> {
        if page < 0 {
            return Err(AppError::Validation("page must not be negative".to_string()));
        }
        if limit < 0 {
            return Err(AppError::Validation(
                "limit must not be negative".to_string(),
            ));
        }
        let limit = if limit == 0 { DEFAULT_HISTORY_LIMIT } else { limit };

        let orders = self
            .store
            .get_order_history(customer_id, limit, page)
            .await?;
        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::store::StoreError;

    #[derive(Debug, PartialEq)]
    enum Call {
        GetOrCreateOpenOrder {
            customer_id: i32,
        },
        UpsertCartLine {
            order_id: i32,
            book_id: i32,
            quantity: i32,
            subtotal: i64,
        },
        RemoveCartLine {
            order_id: i32,
            book_id: i32,
        },
        GetCart {
            order_id: i32,
        },
        GetOrderHistory {
            customer_id: i32,
            limit: i64,
            page: i64,
        },
        PayOrder {
            customer_id: i32,
        },
    }

    #[derive(Default)]
    struct MockStore {
        calls: Mutex<Vec<Call>>,
        open_order_id: i32,
        cart: Option<OrderAggregate>,
        history: Vec<OrderAggregate>,
        pay_fails_not_found: bool,
    }

    impl MockStore {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().drain(..).collect()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl OrderStore for MockStore {
        async fn get_or_create_open_order(&self, customer_id: i32) -> Result<i32, StoreError> {
            self.record(Call::GetOrCreateOpenOrder { customer_id });
            Ok(self.open_order_id)
        }

        async fn upsert_cart_line(
            &self,
            order_id: i32,
            book_id: i32,
            quantity: i32,
            subtotal: i64,
        ) -> Result<(), StoreError> {
            self.record(Call::UpsertCartLine {
                order_id,
                book_id,
                quantity,
                subtotal,
            });
            Ok(())
        }

        async fn remove_cart_line(&self, order_id: i32, book_id: i32) -> Result<(), StoreError> {
            self.record(Call::RemoveCartLine { order_id, book_id });
            Ok(())
        }

        async fn get_cart(&self, order_id: i32) -> Result<OrderAggregate, StoreError> {
            self.record(Call::GetCart { order_id });
            Ok(self
                .cart
                .clone()
                .unwrap_or_else(|| OrderAggregate::empty(order_id, 0)))
        }

        async fn get_order_history(
            &self,
            customer_id: i32,
            limit: i64,
            page: i64,
        ) -> Result<Vec<OrderAggregate>, StoreError> {
            self.record(Call::GetOrderHistory {
                customer_id,
                limit,
                page,
            });
            Ok(self.history.clone())
        }

        async fn pay_order(&self, customer_id: i32) -> Result<(), StoreError> {
            self.record(Call::PayOrder { customer_id });
            if self.pay_fails_not_found {
                return Err(StoreError::NotFound);
            }
            Ok(())
        }
    }

    fn service_with(store: MockStore) -> (OrderService<Arc<MockStore>>, Arc<MockStore>) {
        let store = Arc::new(store);
        (OrderService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn add_to_cart_resolves_open_order_then_upserts() {
        let (service, store) = service_with(MockStore {
            open_order_id: 7,
            ..Default::default()
        });

        service.add_to_cart(1, 2, 2, 9.99).await.unwrap();

        assert_eq!(
            store.calls(),
            vec![
                Call::GetOrCreateOpenOrder { customer_id: 1 },
                Call::UpsertCartLine {
                    order_id: 7,
                    book_id: 2,
                    quantity: 2,
                    subtotal: 1998,
                },
            ]
        );
    }

    #[tokio::test]
    async fn add_to_cart_rejects_zero_quantity() {
        let (service, store) = service_with(MockStore::default());

        let err = service.add_to_cart(1, 2, 0, 9.99).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn add_to_cart_rejects_nonpositive_price() {
        let (service, store) = service_with(MockStore::default());

        let err = service.add_to_cart(1, 2, 1, 0.0).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn remove_from_cart_targets_the_open_order() {
        let (service, store) = service_with(MockStore {
            open_order_id: 9,
            ..Default::default()
        });

        service.remove_from_cart(4, 2).await.unwrap();

        assert_eq!(
            store.calls(),
            vec![
                Call::GetOrCreateOpenOrder { customer_id: 4 },
                Call::RemoveCartLine {
                    order_id: 9,
                    book_id: 2,
                },
            ]
        );
    }

    #[tokio::test]
    async fn view_cart_returns_empty_cart_without_error() {
        let (service, store) = service_with(MockStore {
            open_order_id: 5,
            ..Default::default()
        });

        let cart = service.view_cart(3).await.unwrap();
        assert_eq!(cart.id, 5);
        assert_eq!(cart.total, 0.0);
        assert!(cart.lines.is_empty());
        assert_eq!(
            store.calls(),
            vec![
                Call::GetOrCreateOpenOrder { customer_id: 3 },
                Call::GetCart { order_id: 5 },
            ]
        );
    }

    #[tokio::test]
    async fn pay_order_passes_not_found_through() {
        let (service, _store) = service_with(MockStore {
            pay_fails_not_found: true,
            ..Default::default()
        });

        let err = service.pay_order(1).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn view_history_defaults_limit_to_ten() {
        let (service, store) = service_with(MockStore::default());

        service.view_history(1, 2, 0).await.unwrap();

        assert_eq!(
            store.calls(),
            vec![Call::GetOrderHistory {
                customer_id: 1,
                limit: DEFAULT_HISTORY_LIMIT,
                page: 2,
            }]
        );
    }

    #[tokio::test]
    async fn view_history_keeps_explicit_limit() {
        let (service, store) = service_with(MockStore::default());

        service.view_history(1, 0, 25).await.unwrap();

        assert_eq!(
            store.calls(),
            vec![Call::GetOrderHistory {
                customer_id: 1,
                limit: 25,
                page: 0,
            }]
        );
    }

    #[tokio::test]
    async fn view_history_rejects_negative_page() {
        let (service, store) = service_with(MockStore::default());

        let err = service.view_history(1, -1, 10).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.calls().is_empty());
    }
}
