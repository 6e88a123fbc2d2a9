use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::config::AppConfig;

/// Shared per-process dependencies, injected into every handler through
/// axum state: the connection pool, the parsed configuration and the
/// outbound HTTP client used for webhook delivery.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub http: reqwest::Client,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        Self::with_config(config).await
    }

    pub async fn with_config(config: Arc<AppConfig>) -> anyhow::Result<Self> {
        let opts = SqliteConnectOptions::from_str(&config.database_url)
            .context("parse DATABASE_URL")?
            .create_if_missing(true)
            .foreign_keys(true);
        let db = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .context("connect to database")?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("build http client")?;
        Ok(Self { db, config, http })
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>, http: reqwest::Client) -> Self {
        Self { db, config, http }
    }
}
