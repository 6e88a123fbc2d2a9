use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use time::{Duration, OffsetDateTime};
use tracing::{info, instrument, warn};

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    state::AppState,
    subscriptions::{dto::SubscriptionResponse, repo},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reminders/upcoming", get(upcoming))
        .route("/reminders/notify", post(notify))
}

#[derive(Debug, Deserialize)]
pub struct HorizonQuery {
    #[serde(default = "default_days")]
    pub days: i64,
}

fn default_days() -> i64 {
    14
}

#[instrument(skip(state))]
pub async fn upcoming(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<HorizonQuery>,
) -> Result<Json<Vec<SubscriptionResponse>>, ApiError> {
    let today = OffsetDateTime::now_utc().date();
    let target = today + Duration::days(query.days);
    let subs = repo::due_by(&state.db, user_id, target).await?;
    let items = subs
        .iter()
        .map(|s| SubscriptionResponse::from_record(s, today))
        .collect();
    Ok(Json(items))
}

/// Forwards a minimal reminder event to the configured webhook. One
/// attempt, bounded by the shared client's timeout; the result is reported
/// to the caller synchronously.
#[instrument(skip(state))]
pub async fn notify(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Value>, ApiError> {
    let url = state
        .config
        .notify_webhook_url
        .clone()
        .ok_or_else(|| ApiError::Config("webhook not configured".into()))?;

    let payload = json!({
        "event": "subscription.reminder",
        "user_id": user_id,
    });

    let response = state
        .http
        .post(&url)
        .json(&payload)
        .send()
        .await
        .map_err(|e| {
            warn!(error = %e, "webhook delivery failed");
            ApiError::Upstream(e.to_string())
        })?;

    let status = response.status();
    if !status.is_success() {
        warn!(%status, "webhook rejected the event");
        return Err(ApiError::Upstream(format!(
            "webhook returned status {status}"
        )));
    }

    info!(user_id = %user_id, %status, "reminder event delivered");
    Ok(Json(json!({ "status": status.as_u16() })))
}
