use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{error::AppError, tasks::repo_types::Task};

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert(&self, owner: Uuid, description: &str) -> Result<Task, AppError>;
    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Task>, AppError>;
    /// Returns how many tasks were removed.
    async fn delete_by_owner(&self, owner: Uuid) -> Result<u64, AppError>;
}

#[derive(Clone)]
pub struct PgTaskStore {
    db: PgPool,
}

impl PgTaskStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn insert(&self, owner: Uuid, description: &str) -> Result<Task, AppError> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (id, owner, description)
            VALUES ($1, $2, $3)
            RETURNING id, owner, description, completed, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(description)
        .fetch_one(&self.db)
        .await?;
        Ok(task)
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Task>, AppError> {
        let rows = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, owner, description, completed, created_at
            FROM tasks
            WHERE owner = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn delete_by_owner(&self, owner: Uuid) -> Result<u64, AppError> {
        let done = sqlx::query("DELETE FROM tasks WHERE owner = $1")
            .bind(owner)
            .execute(&self.db)
            .await?;
        Ok(done.rows_affected())
    }
}
