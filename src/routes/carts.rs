use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    aggregate::OrderAggregate,
    app_error::{AppError, StdResponse},
    app_state::AppState,
    middleware,
};

/// Cart routes for the authenticated customer. The cart is the customer's
/// open order, created on first touch.
pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    utoipa_axum::router::OpenApiRouter::new().nest(
        "/customers/cart",
        OpenApiRouter::new()
            .routes(utoipa_axum::routes!(get_cart))
            .routes(utoipa_axum::routes!(add_to_cart))
            .routes(utoipa_axum::routes!(remove_from_cart))
            .route_layer(axum::middleware::from_fn(
                middleware::customers_authorization,
            )),
    )
}

/// Fetch the customer's current cart. An empty cart is a valid response.
#[utoipa::path(
    get,
    path = "/",
    tags = ["Cart"],
    responses(
        (status = 200, description = "Current cart", body = StdResponse<OrderAggregate, String>)
    )
)]
async fn get_cart(
    State(state): State<AppState>,
    Extension(customer_id): Extension<i32>,
) -> Result<impl IntoResponse, AppError> {
    let cart = state.orders.view_cart(customer_id).await?;

    Ok(StdResponse {
        data: Some(cart),
        message: Some("Cart retrieved successfully"),
    })
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct AddToCartReq {
    pub book_id: i32,
    pub quantity: i32,
    /// Catalog unit price at add time, in decimal currency.
    pub unit_price: f64,
}

/// Add a book to the cart, replacing any existing line for that book.
#[utoipa::path(
    post,
    path = "/items",
    tags = ["Cart"],
    request_body = AddToCartReq,
    responses(
        (status = 200, description = "Cart updated", body = StdResponse<String, String>),
        (status = 400, description = "Invalid quantity or price")
    )
)]
async fn add_to_cart(
    State(state): State<AppState>,
    Extension(customer_id): Extension<i32>,
    Json(body): Json<AddToCartReq>,
) -> Result<impl IntoResponse, AppError> {
    state
        .orders
        .add_to_cart(customer_id, body.book_id, body.quantity, body.unit_price)
        .await?;

    Ok(StdResponse::<String, _> {
        data: None,
        message: Some("Cart updated"),
    })
}

/// Remove a book from the cart. Removing a book that is not in the cart
/// succeeds without effect.
#[utoipa::path(
    delete,
    path = "/items/{book_id}",
    tags = ["Cart"],
    params(
        ("book_id" = i32, Path, description = "Book to remove from the cart")
    ),
    responses(
        (status = 200, description = "Book removed from cart", body = StdResponse<String, String>)
    )
)]
async fn remove_from_cart(
    Path(book_id): Path<i32>,
    State(state): State<AppState>,
    Extension(customer_id): Extension<i32>,
) -> Result<impl IntoResponse, AppError> {
    state.orders.remove_from_cart(customer_id, book_id).await?;

    Ok(StdResponse::<String, _> {
        data: None,
        message: Some("Book removed from cart"),
    })
}
