use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use time::OffsetDateTime;
use tracing::instrument;

use crate::{
    auth::jwt::AuthUser, error::ApiError, export::service, state::AppState, subscriptions::repo,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/export/csv", get(export_csv))
        .route("/export/pdf", get(export_pdf))
}

#[instrument(skip(state))]
pub async fn export_csv(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Response, ApiError> {
    let subs = repo::list_for_user(&state.db, user_id).await?;
    let today = OffsetDateTime::now_utc().date();
    let body = service::render_csv(&subs, today)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"subscriptions.csv\"",
            ),
        ],
        body,
    )
        .into_response())
}

#[instrument(skip(state))]
pub async fn export_pdf(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Response, ApiError> {
    let subs = repo::list_for_user(&state.db, user_id).await?;
    let body = service::render_pdf(&subs)?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"subscriptions.pdf\"",
            ),
        ],
        body,
    )
        .into_response())
}
