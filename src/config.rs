use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub secret_key: String,
    pub cors_origins: String,
    pub notify_webhook_url: Option<String>,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let secret_key =
            std::env::var("SECRET_KEY").unwrap_or_else(|_| "dev-secret-key-change-me".into());
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET_KEY").unwrap_or_else(|_| secret_key.clone()),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "subtrack".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "subtrack-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        Ok(Self {
            database_url,
            secret_key,
            cors_origins: std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".into()),
            notify_webhook_url: std::env::var("NOTIFY_WEBHOOK_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            jwt,
        })
    }
}
