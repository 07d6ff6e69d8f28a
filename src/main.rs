use std::time::Duration;

use anyhow::Result;
use axum::Router;
use bookstore_orderservice::{
    app_state::AppState, bootstrap, config, db, routes, service::OrderService,
    store::PgOrderStore,
};
use diesel_migrations::{EmbeddedMigrations, embed_migrations};
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use utoipa_swagger_ui::SwaggerUi;

/// Migrations embedded into the binary which helps with streamlining image building process
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[tokio::main]
async fn main() -> Result<()> {
    bootstrap::init_env();
    bootstrap::init_tracing();

    let config = config::load()?;

    tracing::info!("Running migrations...");
    let migrations_count = db::run_migrations_blocking(MIGRATIONS, &config.database.url).await?;
    tracing::info!("Run {} new migrations successfully", migrations_count);

    let db_pool = db::connect(&config.database.url).await?;
    let state = AppState {
        orders: OrderService::new(PgOrderStore::new(db_pool)),
    };

    let routes = routes::carts::routes_with_openapi()
        .merge(routes::orders::routes_with_openapi())
        .merge(routes::payments::routes_with_openapi());

    let mut openapi = routes.get_openapi().clone();
    openapi.info = utoipa::openapi::InfoBuilder::new()
        .title("Bookstore OrderService API")
        .version("1.0.0")
        .build();

    let app = Router::new()
        .merge(routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.server.request_timeout_secs,
                ))),
        )
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi));

    bootstrap::serve(
        "OrderService",
        app,
        &config.server.host,
        config.server.port,
    )
    .await
}
