use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database. Not `Serialize`; it leaves the core only as
/// `PublicUser`.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,                     // assigned at creation, never changes
    pub name: String,
    pub email: String,                // normalized, unique
    pub password_hash: String,        // Argon2 hash
    pub age: i32,
    pub session_tokens: Vec<String>,  // live sessions, oldest first
    pub created_at: OffsetDateTime,
}

impl User {
    pub fn has_session(&self, token: &str) -> bool {
        self.session_tokens.iter().any(|t| t == token)
    }
}

/// Validated, already-hashed input for a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub age: i32,
}
