use axum::{Extension, extract::State, response::IntoResponse};
use utoipa_axum::router::OpenApiRouter;

use crate::{
    app_error::{AppError, StdResponse},
    app_state::AppState,
    middleware,
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    utoipa_axum::router::OpenApiRouter::new().nest(
        "/payments",
        OpenApiRouter::new()
            .routes(utoipa_axum::routes!(pay_order))
            .route_layer(axum::middleware::from_fn(
                middleware::customers_authorization,
            )),
    )
}

/// Pay the customer's open order, turning the cart into an immutable paid
/// record. Payment here is a local state transition, not gateway
/// settlement. 404 when there is nothing to pay.
#[utoipa::path(
    post,
    path = "/pay",
    tags = ["Payments"],
    responses(
        (status = 200, description = "Order paid successfully", body = StdResponse<String, String>),
        (status = 404, description = "No open order to pay")
    )
)]
async fn pay_order(
    State(state): State<AppState>,
    Extension(customer_id): Extension<i32>,
) -> Result<impl IntoResponse, AppError> {
    state.orders.pay_order(customer_id).await?;

    Ok(StdResponse::<String, _> {
        data: None,
        message: Some("Order paid successfully"),
    })
}
