use axum::{
    Extension,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::IntoParams;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    aggregate::OrderAggregate,
    app_error::{AppError, StdResponse},
    app_state::AppState,
    middleware,
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    utoipa_axum::router::OpenApiRouter::new().nest(
        "/customers/orders",
        OpenApiRouter::new()
            .routes(utoipa_axum::routes!(get_order_history))
            .route_layer(axum::middleware::from_fn(
                middleware::customers_authorization,
            )),
    )
}

#[derive(Deserialize, Debug, IntoParams)]
pub struct HistoryQuery {
    /// Zero-based page index.
    #[serde(default)]
    pub page: i64,
    /// Orders per page; 0 means the default of 10.
    #[serde(default)]
    pub limit: i64,
}

/// Fetch the customer's paid orders, oldest first.
#[utoipa::path(
    get,
    path = "/history",
    tags = ["Orders"],
    params(HistoryQuery),
    responses(
        (status = 200, description = "Order history page", body = StdResponse<Vec<OrderAggregate>, String>)
    )
)]
async fn get_order_history(
    Query(query): Query<HistoryQuery>,
    State(state): State<AppState>,
    Extension(customer_id): Extension<i32>,
) -> Result<impl IntoResponse, AppError> {
    let orders = state
        .orders
        .view_history(customer_id, query.page, query.limit)
        .await?;

    Ok(StdResponse {
        data: Some(orders),
        message: Some("Order history retrieved successfully"),
    })
}
