use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info, instrument, warn};

use crate::{
    auth::{
        dto::{PublicUser, UserUpdate},
        jwt::JwtKeys,
        password::CredentialHasher,
        repo::UserStore,
        repo_types::{NewUser, User},
        validation::{
            normalize_email, validate_age, validate_email, validate_name, validate_password,
        },
    },
    error::{AppError, ValidationError},
    tasks::{
        repo::TaskStore,
        repo_types::Task,
        services::{list_tasks_for_owner, on_user_deleted},
    },
};

/// The only way a user record is handed to anything outside the core.
pub fn to_public_view(user: &User) -> PublicUser {
    PublicUser::from(user)
}

/// Registration, sessions, profile edits and account removal.
pub struct AccountService {
    users: Arc<dyn UserStore>,
    tasks: Arc<dyn TaskStore>,
    hasher: CredentialHasher,
    keys: JwtKeys,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserStore>,
        tasks: Arc<dyn TaskStore>,
        hasher: CredentialHasher,
        keys: JwtKeys,
    ) -> Self {
        Self {
            users,
            tasks,
            hasher,
            keys,
        }
    }

    /// Validates every field, then hashes and inserts. Returns the stored user
    /// with an empty session list. The record still carries the password hash
    /// and session list; anything leaving the core goes through `to_public_view`.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        age: Option<i32>,
    ) -> Result<User, AppError> {
        let name = validate_name(name)?;
        let email = validate_email(email)?;
        let password = validate_password(password)?;
        let age = validate_age(age.unwrap_or(0))?;

        let password_hash = self.hash_password(password).await?;
        let user = self
            .users
            .insert(NewUser {
                name,
                email,
                password_hash,
                age,
            })
            .await
            .inspect_err(|e| {
                if matches!(e, AppError::DuplicateEmail) {
                    warn!("email already registered");
                }
            })?;

        info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(user)
    }

    /// Unknown email and wrong password fail identically.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AppError> {
        let email = normalize_email(email);
        let user = match self.users.find_by_email(&email).await {
            Ok(u) => u,
            Err(AppError::NotFound) => {
                self.verify_dummy_password(password).await?;
                warn!("login unknown email");
                return Err(AppError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        if !self.verify_password(password, &user.password_hash).await? {
            warn!(user_id = %user.id, "login invalid password");
            return Err(AppError::InvalidCredentials);
        }

        let (user, token) = self.open_session(user).await?;
        info!(user_id = %user.id, sessions = user.session_tokens.len(), "user logged in");
        Ok((user, token))
    }

    /// Mints a token and appends it to the user's session list.
    pub async fn open_session(&self, mut user: User) -> Result<(User, String), AppError> {
        let token = self.keys.issue(user.id)?;
        user.session_tokens.push(token.clone());
        let user = self.users.save(&user).await?;
        Ok((user, token))
    }

    /// Signature and expiry via the issuer, then session-list membership,
    /// which is what makes logout stick.
    pub async fn authenticate(&self, token: &str) -> Result<User, AppError> {
        let claims = self.keys.verify(token)?;
        let user = match self.users.find_by_id(claims.sub).await {
            Ok(u) => u,
            Err(AppError::NotFound) => {
                debug!(user_id = %claims.sub, "token for missing user");
                return Err(AppError::InvalidToken);
            }
            Err(e) => return Err(e),
        };
        if !user.has_session(token) {
            debug!(user_id = %user.id, "token not in session list");
            return Err(AppError::InvalidToken);
        }
        Ok(user)
    }

    #[instrument(skip_all, fields(user_id = %user.id))]
    pub async fn logout(&self, mut user: User, token: &str) -> Result<User, AppError> {
        user.session_tokens.retain(|t| t != token);
        let user = self.users.save(&user).await?;
        info!(sessions = user.session_tokens.len(), "session closed");
        Ok(user)
    }

    #[instrument(skip_all, fields(user_id = %user.id))]
    pub async fn logout_all(&self, mut user: User) -> Result<User, AppError> {
        user.session_tokens.clear();
        let user = self.users.save(&user).await?;
        info!("all sessions closed");
        Ok(user)
    }

    /// Applies only the supplied fields. The password is re-hashed only when
    /// a new one is given.
    #[instrument(skip_all, fields(user_id = %user.id))]
    pub async fn update_profile(&self, mut user: User, update: UserUpdate) -> Result<User, AppError> {
        if update.is_empty() {
            return Err(ValidationError::NoUpdatableFields.into());
        }

        let name = update.name.as_deref().map(validate_name).transpose()?;
        let email = update.email.as_deref().map(validate_email).transpose()?;
        let password = update.password.as_deref().map(validate_password).transpose()?;
        let age = update.age.map(validate_age).transpose()?;

        if let Some(name) = name {
            user.name = name;
        }
        if let Some(email) = email {
            user.email = email;
        }
        if let Some(age) = age {
            user.age = age;
        }
        if let Some(password) = password {
            user.password_hash = self.hash_password(password).await?;
            debug!("password re-hashed");
        }

        let user = self.users.save(&user).await?;
        info!("profile updated");
        Ok(user)
    }

    /// Cascade first; if it fails the user row stays.
    #[instrument(skip_all, fields(user_id = %user.id))]
    pub async fn delete_account(&self, user: &User) -> Result<(), AppError> {
        on_user_deleted(self.tasks.as_ref(), user.id).await?;
        self.users.delete(user.id).await?;
        info!("account deleted");
        Ok(())
    }

    pub async fn list_tasks(&self, user: &User) -> Result<Vec<Task>, AppError> {
        list_tasks_for_owner(self.tasks.as_ref(), user.id).await
    }

    async fn hash_password(&self, plain: String) -> Result<String, AppError> {
        let hasher = self.hasher.clone();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&plain))
            .await
            .context("password hashing task failed")??;
        Ok(hash)
    }

    async fn verify_dummy_password(&self, plain: &str) -> Result<(), AppError> {
        let hasher = self.hasher.clone();
        let plain = plain.to_string();
        tokio::task::spawn_blocking(move || hasher.verify_dummy(&plain))
            .await
            .context("password verify task failed")?;
        Ok(())
    }

    async fn verify_password(&self, plain: &str, hash: &str) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();
        let (plain, hash) = (plain.to_string(), hash.to_string());
        let ok = tokio::task::spawn_blocking(move || hasher.verify(&plain, &hash))
            .await
            .context("password verify task failed")??;
        Ok(ok)
    }
}
