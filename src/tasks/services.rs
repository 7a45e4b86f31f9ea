use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::{
    error::AppError,
    tasks::{repo::TaskStore, repo_types::Task},
};

/// Removes every task owned by `user_id`. Must complete before the user row
/// is deleted; an error here aborts the account deletion.
#[instrument(skip(tasks))]
pub async fn on_user_deleted(tasks: &dyn TaskStore, user_id: Uuid) -> Result<u64, AppError> {
    match tasks.delete_by_owner(user_id).await {
        Ok(removed) => {
            info!(%user_id, removed, "owned tasks removed");
            Ok(removed)
        }
        Err(e) => {
            error!(error = %e, %user_id, "ownership cascade failed");
            Err(e)
        }
    }
}

/// The user's `tasks` relation, computed by query.
pub async fn list_tasks_for_owner(
    tasks: &dyn TaskStore,
    owner: Uuid,
) -> Result<Vec<Task>, AppError> {
    tasks.list_by_owner(owner).await
}
