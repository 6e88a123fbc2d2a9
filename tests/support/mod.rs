use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use subtrack::config::{AppConfig, JwtConfig};
use subtrack::state::AppState;

pub fn test_config(notify_webhook_url: Option<String>) -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        secret_key: "test-secret".into(),
        cors_origins: "*".into(),
        notify_webhook_url,
        jwt: JwtConfig {
            secret: "test-jwt-secret".into(),
            issuer: "subtrack-test".into(),
            audience: "subtrack-test-users".into(),
            ttl_minutes: 5,
            refresh_ttl_minutes: 60,
        },
    }
}

/// Builds an AppState over a fresh in-memory SQLite database with the
/// migrations applied. The pool is pinned to a single connection so the
/// in-memory database survives for the whole test.
pub async fn test_state(notify_webhook_url: Option<String>) -> AppState {
    let opts = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("parse sqlite url")
        .foreign_keys(true);
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect_with(opts)
        .await
        .expect("connect in-memory database");
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("run migrations");

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
        .expect("build http client");

    AppState::from_parts(db, Arc::new(test_config(notify_webhook_url)), http)
}
