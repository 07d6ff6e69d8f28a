//! Reconstruction of nested order aggregates from the flat result set of
//! the orders / order_details / books join.

use std::collections::HashMap;

use diesel::prelude::Queryable;
use serde::Serialize;
use utoipa::ToSchema;

use crate::money;

/// One row of the three-way join, as selected by the order store.
#[derive(Queryable, Debug, Clone)]
pub struct OrderRow {
    pub order_id: i32,
    pub order_total: i64,
    pub line_id: i32,
    pub book_id: i32,
    pub quantity: i32,
    pub subtotal: i64,
    pub book_title: String,
    pub book_author: String,
    pub book_price: i64,
}

/// Snapshot of the book referenced by an order line, priced as of the read.
#[derive(Serialize, Debug, Clone, PartialEq, ToSchema)]
pub struct BookSnapshot {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub price: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq, ToSchema)]
pub struct OrderLineAggregate {
    pub id: i32,
    pub book: BookSnapshot,
    pub quantity: i32,
    pub subtotal: f64,
}

/// Read model for one order with its nested lines. Assembled fresh on
/// every read; never persisted.
#[derive(Serialize, Debug, Clone, PartialEq, ToSchema)]
pub struct OrderAggregate {
    pub id: i32,
    pub total: f64,
    pub lines: Vec<OrderLineAggregate>,
}

impl OrderAggregate {
    /// The aggregate for an order with no lines, which an inner join can
    /// never produce.
    pub fn empty(order_id: i32, total_minor: i64) -> Self {
        Self {
            id: order_id,
            total: money::to_display(total_minor),
            lines: Vec::new(),
        }
    }
}

/// Group flat join rows into one aggregate per order, in a single pass.
///
/// Output order is stable: aggregates appear in the order their id was
/// first seen in the input. Monetary columns are converted from minor
/// units as they are copied out.
pub fn group_rows(rows: Vec<OrderRow>) -> Vec<OrderAggregate> {
    let mut slots: HashMap<i32, usize> = HashMap::new();
    let mut aggregates: Vec<OrderAggregate> = Vec::new();

    for row in rows {
        let slot = *slots.entry(row.order_id).or_insert_with(|| {
            aggregates.push(OrderAggregate {
                id: row.order_id,
                total: money::to_display(row.order_total),
                lines: Vec::new(),
            });
            aggregates.len() - 1
        });
        aggregates[slot].lines.push(OrderLineAggregate {
            id: row.line_id,
            quantity: row.quantity,
            subtotal: money::to_display(row.subtotal),
            book: BookSnapshot {
                id: row.book_id,
                title: row.book_title,
                author: row.book_author,
                price: money::to_display(row.book_price),
            },
        });
    }

    aggregates
}
