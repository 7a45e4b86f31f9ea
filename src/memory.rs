//! In-process stores backing `AppState::fake()` and the test suite.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    auth::{
        repo::UserStore,
        repo_types::{NewUser, User},
    },
    error::AppError,
    tasks::{repo::TaskStore, repo_types::Task},
};

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        // uniqueness check and insert share one write lock
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(AppError::DuplicateEmail);
        }
        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            age: user.age,
            session_tokens: Vec::new(),
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> Result<User, AppError> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<User, AppError> {
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    async fn save(&self, user: &User) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(AppError::NotFound);
        }
        if users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(AppError::DuplicateEmail);
        }
        users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.users
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(AppError::NotFound)
    }
}

#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<Vec<Task>>,
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn insert(&self, owner: Uuid, description: &str) -> Result<Task, AppError> {
        let task = Task {
            id: Uuid::new_v4(),
            owner,
            description: description.to_string(),
            completed: false,
            created_at: OffsetDateTime::now_utc(),
        };
        self.tasks.write().await.push(task.clone());
        Ok(task)
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Task>, AppError> {
        Ok(self
            .tasks
            .read()
            .await
            .iter()
            .filter(|t| t.owner == owner)
            .cloned()
            .collect())
    }

    async fn delete_by_owner(&self, owner: Uuid) -> Result<u64, AppError> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|t| t.owner != owner);
        Ok((before - tasks.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ada".into(),
            email: email.into(),
            password_hash: "$argon2id$fake".into(),
            age: 0,
        }
    }

    #[tokio::test]
    async fn concurrent_inserts_with_same_email_admit_one() {
        let store = std::sync::Arc::new(MemoryUserStore::default());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.insert(new_user("ada@example.com")).await })
            })
            .collect();

        let mut ok = 0;
        let mut dup = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(_) => ok += 1,
                Err(AppError::DuplicateEmail) => dup += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(dup, 7);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn save_rejects_taken_email() {
        let store = MemoryUserStore::default();
        store.insert(new_user("ada@example.com")).await.unwrap();
        let mut bob = store.insert(new_user("bob@example.com")).await.unwrap();
        bob.email = "ada@example.com".into();
        assert!(matches!(
            store.save(&bob).await,
            Err(AppError::DuplicateEmail)
        ));
    }

    #[tokio::test]
    async fn lookups_miss_with_not_found() {
        let store = MemoryUserStore::default();
        assert!(matches!(
            store.find_by_email("nobody@example.com").await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            store.find_by_id(Uuid::new_v4()).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            store.delete(Uuid::new_v4()).await,
            Err(AppError::NotFound)
        ));
    }
}
