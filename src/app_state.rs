use crate::service::OrderService;
use crate::store::PgOrderStore;

/// Shared state handed to every route.
#[derive(Clone)]
pub struct AppState {
    pub orders: OrderService<PgOrderStore>,
}
