use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::{
    analytics::service::{self, CategoryTotal, Summary},
    auth::jwt::AuthUser,
    error::ApiError,
    state::AppState,
    subscriptions::repo,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/analytics/summary", get(summary))
        .route("/analytics/category-breakdown", get(category_breakdown))
}

#[instrument(skip(state))]
pub async fn summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Summary>, ApiError> {
    let subs = repo::list_for_user(&state.db, user_id).await?;
    Ok(Json(service::summarize(&subs)))
}

#[instrument(skip(state))]
pub async fn category_breakdown(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<CategoryTotal>>, ApiError> {
    let subs = repo::list_for_user(&state.db, user_id).await?;
    Ok(Json(service::category_breakdown(&subs)))
}
