use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

pub fn init_env() {
    // Missing .env is fine in deployed environments.
    dotenvy::dotenv().ok();
}

pub async fn serve(service_name: &str, app: Router, host: &str, port: u16) -> Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("{service_name} listening on {addr}");
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
