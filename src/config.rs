use anyhow::{Context, Result};

/// Service configuration, loaded once at startup and passed to whatever
/// needs it. No ambient globals.
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

/// Load configuration from the environment. `DATABASE_URL` is required;
/// everything else has a default.
pub fn load() -> Result<Config> {
    let url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT")
        .ok()
        .map(|value| value.parse())
        .transpose()
        .context("PORT must be a number")?
        .unwrap_or(3000);
    let request_timeout_secs = std::env::var("REQUEST_TIMEOUT_SECS")
        .ok()
        .map(|value| value.parse())
        .transpose()
        .context("REQUEST_TIMEOUT_SECS must be a number")?
        .unwrap_or(30);

    Ok(Config {
        database: DatabaseConfig { url },
        server: ServerConfig {
            host,
            port,
            request_timeout_secs,
        },
    })
}
