use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::{
    auth::repo_types::{NewUser, User},
    db::{is_foreign_key_violation, is_unique_violation},
    error::AppError,
};

/// Persistence for users. Implementations must enforce email uniqueness
/// atomically with the write, not with a prior lookup.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// `DuplicateEmail` if the normalized email is taken.
    async fn insert(&self, user: NewUser) -> Result<User, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<User, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<User, AppError>;
    /// Writes the full current state. Password hashing is the caller's job.
    async fn save(&self, user: &User) -> Result<User, AppError>;
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password_hash, age)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, password_hash, age, session_tokens, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.age)
        .fetch_one(&self.db)
        .await
        .map_err(map_email_conflict)
    }

    async fn find_by_email(&self, email: &str) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, age, session_tokens, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        user.ok_or(AppError::NotFound)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, age, session_tokens, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        user.ok_or(AppError::NotFound)
    }

    async fn save(&self, user: &User) -> Result<User, AppError> {
        let saved = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET name = $2, email = $3, password_hash = $4, age = $5, session_tokens = $6
             WHERE id = $1
            RETURNING id, name, email, password_hash, age, session_tokens, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.age)
        .bind(&user.session_tokens)
        .fetch_optional(&self.db)
        .await
        .map_err(map_email_conflict)?;
        saved.ok_or(AppError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await;
        match res {
            Ok(done) if done.rows_affected() == 0 => Err(AppError::NotFound),
            Ok(_) => Ok(()),
            Err(e) => Err(map_delete_error(id, e)),
        }
    }
}

fn map_delete_error(id: Uuid, e: sqlx::Error) -> AppError {
    if is_foreign_key_violation(&e) {
        // a task was attached after the cascade ran
        warn!(user_id = %id, "user delete blocked by owned tasks");
        AppError::Internal(anyhow::Error::new(e).context("user still owns tasks"))
    } else {
        e.into()
    }
}

fn map_email_conflict(e: sqlx::Error) -> AppError {
    if is_unique_violation(&e) {
        AppError::DuplicateEmail
    } else {
        e.into()
    }
}
