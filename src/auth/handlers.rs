use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AccessToken, LoginRequest, PublicUser, RegisterRequest, TokenPair},
        jwt::{AuthUser, JwtKeys, RefreshUser},
        password::{hash_password, verify_password},
        repo::User,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/me", get(me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation("email and password required".into()));
    }

    if User::find_by_email(&state.db, &email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::Conflict("email already registered".into()));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(&state.db, &email, &hash).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(json!({ "message": "registered" }))))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let email = payload.email.trim().to_lowercase();

    let user = match User::find_by_email(&state.db, &email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(ApiError::Auth("invalid credentials".into()));
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Auth("invalid credentials".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(user.id)?;
    let refresh_token = keys.sign_refresh(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(TokenPair {
        access_token,
        refresh_token,
    }))
}

#[instrument(skip(state))]
pub async fn refresh(
    State(state): State<AppState>,
    RefreshUser(user_id): RefreshUser,
) -> Result<Json<AccessToken>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(user_id)?;
    Ok(Json(AccessToken { access_token }))
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::Auth("user not found".into()))?;

    Ok(Json(PublicUser {
        id: user.id,
        email: user.email,
    }))
}
