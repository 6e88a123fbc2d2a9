use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use time::OffsetDateTime;
use tracing::{info, instrument};

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    state::AppState,
    subscriptions::{
        dto::{CreateSubscriptionRequest, SubscriptionResponse, UpdateSubscriptionRequest},
        repo,
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/subscriptions", get(list_subscriptions).post(create_subscription))
        .route(
            "/subscriptions/:id",
            put(update_subscription).delete(delete_subscription),
        )
        .route("/subscriptions/:id/pay", post(mark_paid))
}

#[instrument(skip(state))]
pub async fn list_subscriptions(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<SubscriptionResponse>>, ApiError> {
    let today = OffsetDateTime::now_utc().date();
    let subs = repo::list_for_user(&state.db, user_id).await?;
    let items = subs
        .iter()
        .map(|s| SubscriptionResponse::from_record(s, today))
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state, payload))]
pub async fn create_subscription(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateSubscriptionRequest>,
) -> Result<(StatusCode, Json<SubscriptionResponse>), ApiError> {
    let new = payload.validate()?;
    let sub = repo::insert(&state.db, user_id, &new).await?;
    info!(user_id = %user_id, sub_id = %sub.id, name = %sub.name, "subscription created");
    let today = OffsetDateTime::now_utc().date();
    Ok((
        StatusCode::CREATED,
        Json(SubscriptionResponse::from_record(&sub, today)),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_subscription(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(sub_id): Path<i64>,
    Json(payload): Json<UpdateSubscriptionRequest>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let mut sub = repo::find_owned(&state.db, user_id, sub_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("subscription not found".into()))?;

    payload.apply_to(&mut sub)?;
    repo::update(&state.db, &sub).await?;

    let today = OffsetDateTime::now_utc().date();
    Ok(Json(SubscriptionResponse::from_record(&sub, today)))
}

#[instrument(skip(state))]
pub async fn delete_subscription(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(sub_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    if !repo::delete(&state.db, user_id, sub_id).await? {
        return Err(ApiError::NotFound("subscription not found".into()));
    }
    info!(user_id = %user_id, sub_id = %sub_id, "subscription deleted");
    Ok(Json(json!({ "message": "deleted" })))
}

#[instrument(skip(state))]
pub async fn mark_paid(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(sub_id): Path<i64>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let mut sub = repo::find_owned(&state.db, user_id, sub_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("subscription not found".into()))?;

    let today = OffsetDateTime::now_utc().date();
    if sub.next_payment > today {
        return Err(ApiError::Validation(
            "Cannot mark a future payment as paid".into(),
        ));
    }

    sub.next_payment = sub.next_cycle_date();
    repo::update(&state.db, &sub).await?;
    info!(
        user_id = %user_id,
        sub_id = %sub_id,
        next_payment = %repo::format_date(sub.next_payment),
        "subscription marked paid"
    );

    Ok(Json(SubscriptionResponse::from_record(&sub, today)))
}
