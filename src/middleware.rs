use axum::{extract::Request, middleware::Next, response::Response};

use crate::app_error::AppError;

/// Header installed by the upstream gateway after credential verification.
/// This service trusts it as the resolved caller identity and never parses
/// credentials itself.
pub const CUSTOMER_ID_HEADER: &str = "x-customer-id";

pub async fn customers_authorization(
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let customer_id = req
        .headers()
        .get(CUSTOMER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<i32>().ok())
        .ok_or(AppError::Unauthorized)?;

    req.extensions_mut().insert(customer_id);
    Ok(next.run(req).await)
}
