use std::sync::Arc;

use crate::auth::{
    jwt::JwtKeys, password::CredentialHasher, repo::PgUserStore, repo::UserStore,
    services::AccountService,
};
use crate::config::AppConfig;
use crate::db;
use crate::tasks::repo::{PgTaskStore, TaskStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub accounts: Arc<AccountService>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = db::connect(&config.database).await?;

        let users = Arc::new(PgUserStore::new(db.clone())) as Arc<dyn UserStore>;
        let tasks = Arc::new(PgTaskStore::new(db)) as Arc<dyn TaskStore>;
        Self::from_parts(config, users, tasks)
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        tasks: Arc<dyn TaskStore>,
    ) -> anyhow::Result<Self> {
        let hasher = CredentialHasher::new(&config.hashing)?;
        let keys = JwtKeys::new(&config.jwt);
        let accounts = Arc::new(AccountService::new(users, tasks, hasher, keys));
        Ok(Self { config, accounts })
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::memory::{MemoryTaskStore, MemoryUserStore};

        Self::from_parts(
            Arc::new(AppConfig::for_tests()),
            Arc::new(MemoryUserStore::default()),
            Arc::new(MemoryTaskStore::default()),
        )
        .expect("test config is valid")
    }
}
