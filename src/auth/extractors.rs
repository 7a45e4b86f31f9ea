use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use crate::{auth::repo_types::User, error::AppError, state::AppState};

/// Caller proven by a bearer token that is still in their session list.
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Read Authorization header
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AppError::Malformed)?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::Malformed)?;

        let user = state.accounts.authenticate(token).await.inspect_err(|e| {
            if e.is_auth_failure() {
                warn!(error = %e, "request not authenticated");
            }
        })?;

        Ok(AuthUser {
            user,
            token: token.to_string(),
        })
    }
}
