use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest, UserUpdate},
        extractors::AuthUser,
        services::to_public_view,
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/users/login", post(login))
        .route("/users/logout", post(logout))
        .route("/users/logoutAll", post(logout_all))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/users/me", get(get_me).patch(update_me).delete(delete_me))
}

/// Registration also opens the first session.
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let user = state
        .accounts
        .register(&payload.name, &payload.email, &payload.password, payload.age)
        .await?;
    // Separate save: if it fails the account exists with no session, and the
    // client should log in rather than register again.
    let (user, token) = state.accounts.open_session(user).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: to_public_view(&user),
            token,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let (user, token) = state
        .accounts
        .login(&payload.email, &payload.password)
        .await?;
    Ok(Json(AuthResponse {
        user: to_public_view(&user),
        token,
    }))
}

#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    AuthUser { user, token }: AuthUser,
) -> Result<StatusCode, AppError> {
    state.accounts.logout(user, &token).await?;
    Ok(StatusCode::OK)
}

#[instrument(skip_all)]
pub async fn logout_all(
    State(state): State<AppState>,
    AuthUser { user, .. }: AuthUser,
) -> Result<StatusCode, AppError> {
    state.accounts.logout_all(user).await?;
    Ok(StatusCode::OK)
}

#[instrument(skip_all)]
pub async fn get_me(AuthUser { user, .. }: AuthUser) -> Json<PublicUser> {
    Json(to_public_view(&user))
}

#[instrument(skip_all)]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser { user, .. }: AuthUser,
    Json(update): Json<UserUpdate>,
) -> Result<Json<PublicUser>, AppError> {
    let user = state.accounts.update_profile(user, update).await?;
    Ok(Json(to_public_view(&user)))
}

#[instrument(skip_all)]
pub async fn delete_me(
    State(state): State<AppState>,
    AuthUser { user, .. }: AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    state.accounts.delete_account(&user).await?;
    Ok(Json(to_public_view(&user)))
}
