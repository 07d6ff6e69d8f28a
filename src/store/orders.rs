use async_trait::async_trait;
use diesel::result::DatabaseErrorKind;
use diesel::sql_types::Integer;
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::aggregate::{self, OrderAggregate, OrderRow};
use crate::db::DbPool;
use crate::models::{CreateOrderEntity, OrderEntity, OrderState};
use crate::schema::{books, order_details, orders};
use crate::store::{OrderStore, StoreError};

/// Columns of the orders / order_details / books join, in `OrderRow` order.
const JOIN_COLUMNS: (
    orders::columns::id,
    orders::columns::total,
    order_details::columns::id,
    order_details::columns::book_id,
    order_details::columns::quantity,
    order_details::columns::subtotal,
    books::columns::title,
    books::columns::author,
    books::columns::price,
) = (
    orders::id,
    orders::total,
    order_details::id,
    order_details::book_id,
    order_details::quantity,
    order_details::subtotal,
    books::title,
    books::author,
    books::price,
);

/// SQL-backed order store over the shared Postgres pool.
#[derive(Clone)]
pub struct PgOrderStore {
    pool: DbPool,
}

impl PgOrderStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, StoreError> {
        self.pool
            .get()
            .await
            .map_err(|err| StoreError::Pool(err.to_string()))
    }
}

/// Recompute `orders.total` from the current line set and stamp
/// `updated_at`, inside the caller's transaction.
async fn recalculate_total(
    conn: &mut AsyncPgConnection,
    order_id: i32,
) -> Result<(), diesel::result::Error> {
    diesel::sql_query(
        "UPDATE orders \
         SET total = (SELECT COALESCE(SUM(subtotal), 0) FROM order_details WHERE order_id = $1), \
             updated_at = NOW() \
         WHERE id = $1",
    )
    .bind::<Integer, _>(order_id)
    .execute(conn)
    .await?;
    Ok(())
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn get_or_create_open_order(&self, customer_id: i32) -> Result<i32, StoreError> {
        let conn = &mut self.conn().await?;

        let existing: Option<i32> = orders::table
            .filter(orders::customer_id.eq(customer_id))
            .filter(orders::order_state.eq(OrderState::Open.as_i32()))
            .select(orders::id)
            .first(conn)
            .await
            .optional()
            .map_err(StoreError::from)?;

        if let Some(id) = existing {
            return Ok(id);
        }

        let inserted = diesel::insert_into(orders::table)
            .values(CreateOrderEntity {
                customer_id,
                order_state: OrderState::Open.as_i32(),
                total: 0,
            })
            .returning(orders::id)
            .get_result::<i32>(conn)
            .await;

        match inserted {
            Ok(id) => Ok(id),
            // Lost the race on the partial unique index; the winner's open
            // order exists now, so return that one.
            Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                orders::table
                    .filter(orders::customer_id.eq(customer_id))
                    .filter(orders::order_state.eq(OrderState::Open.as_i32()))
                    .select(orders::id)
                    .first(conn)
                    .await
                    .map_err(StoreError::from)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn upsert_cart_line(
        &self,
        order_id: i32,
        book_id: i32,
        quantity: i32,
        subtotal: i64,
    ) -> Result<(), StoreError> {
        let conn = &mut self.conn().await?;

        conn.transaction::<_, StoreError, _>(|conn| {
            Box::pin(async move {
                diesel::insert_into(order_details::table)
                    .values((
                        order_details::order_id.eq(order_id),
                        order_details::book_id.eq(book_id),
                        order_details::quantity.eq(quantity),
                        order_details::subtotal.eq(subtotal),
                    ))
                    .on_conflict((order_details::order_id, order_details::book_id))
                    .do_update()
                    .set((
                        order_details::quantity.eq(quantity),
                        order_details::subtotal.eq(subtotal),
                    ))
                    .execute(conn)
                    .await?;

                recalculate_total(conn, order_id).await?;
                Ok(())
            })
        })
        .await
    }

    async fn remove_cart_line(&self, order_id: i32, book_id: i32) -> Result<(), StoreError> {
        let conn = &mut self.conn().await?;

        conn.transaction::<_, StoreError, _>(|conn| {
            Box::pin(async move {
                // Zero rows affected is fine; the recompute still runs so
                // the commit leaves a consistent total.
                diesel::delete(
                    order_details::table
                        .filter(order_details::order_id.eq(order_id))
                        .filter(order_details::book_id.eq(book_id)),
                )
                .execute(conn)
                .await?;

                recalculate_total(conn, order_id).await?;
                Ok(())
            })
        })
        .await
    }

    async fn get_cart(&self, order_id: i32) -> Result<OrderAggregate, StoreError> {
        let conn = &mut self.conn().await?;

        // Fetch the order row first: a missing order and an order with no
        // lines must be distinguishable, and the inner join drops both.
        let order: OrderEntity = orders::table
            .find(order_id)
            .select(OrderEntity::as_select())
            .first(conn)
            .await
            .map_err(StoreError::from)?;

        let rows: Vec<OrderRow> = orders::table
            .inner_join(order_details::table.inner_join(books::table))
            .filter(orders::id.eq(order_id))
            .select(JOIN_COLUMNS)
            .load(conn)
            .await
            .map_err(StoreError::from)?;

        if rows.is_empty() {
            return Ok(OrderAggregate::empty(order.id, order.total));
        }

        let mut aggregates = aggregate::group_rows(rows);
        Ok(aggregates.remove(0))
    }

    async fn get_order_history(
        &self,
        customer_id: i32,
        limit: i64,
        page: i64,
    ) -> Result<Vec<OrderAggregate>, StoreError> {
        let conn = &mut self.conn().await?;

        // Window over orders, not joined rows, so a page never truncates
        // an order's lines.
        let ids: Vec<i32> = orders::table
            .filter(orders::customer_id.eq(customer_id))
            .filter(orders::order_state.ne(OrderState::Open.as_i32()))
            .order(orders::updated_at.asc())
            .limit(limit)
            .offset(page * limit)
            .select(orders::id)
            .load(conn)
            .await
            .map_err(StoreError::from)?;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<OrderRow> = orders::table
            .inner_join(order_details::table.inner_join(books::table))
            .filter(orders::id.eq_any(&ids))
            .order(orders::updated_at.asc())
            .select(JOIN_COLUMNS)
            .load(conn)
            .await
            .map_err(StoreError::from)?;

        Ok(aggregate::group_rows(rows))
    }

    async fn pay_order(&self, customer_id: i32) -> Result<(), StoreError> {
        let conn = &mut self.conn().await?;

        let affected = diesel::update(
            orders::table
                .filter(orders::customer_id.eq(customer_id))
                .filter(orders::order_state.eq(OrderState::Open.as_i32())),
        )
        .set((
            orders::order_state.eq(OrderState::Paid.as_i32()),
            orders::updated_at.eq(diesel::dsl::now),
        ))
        .execute(conn)
        .await
        .map_err(StoreError::from)?;

        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
