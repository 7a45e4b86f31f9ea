use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser, error::AppError, state::AppState, tasks::repo_types::Task,
};

pub fn task_routes() -> Router<AppState> {
    Router::new().route("/users/me/tasks", get(list_my_tasks))
}

#[instrument(skip_all)]
pub async fn list_my_tasks(
    State(state): State<AppState>,
    AuthUser { user, .. }: AuthUser,
) -> Result<Json<Vec<Task>>, AppError> {
    let tasks = state.accounts.list_tasks(&user).await?;
    Ok(Json(tasks))
}
