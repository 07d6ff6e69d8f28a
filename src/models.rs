use chrono::{DateTime, Utc};
use diesel::{
    Selectable,
    prelude::{Identifiable, Insertable, Queryable},
};

/// Order lifecycle state. An open order is the customer's cart; a paid
/// order is an immutable historical record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderState {
    Open = 1,
    Paid = 2,
}

impl OrderState {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

#[derive(Queryable, Selectable, Identifiable, Debug)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderEntity {
    pub id: i32,
    pub customer_id: i32,
    pub updated_at: DateTime<Utc>,
    pub order_state: i32,
    /// Minor units (cents).
    pub total: i64,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::orders)]
pub struct CreateOrderEntity {
    pub customer_id: i32,
    pub order_state: i32,
    pub total: i64,
}
