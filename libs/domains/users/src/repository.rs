use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::UserResult;
use crate::models::{Email, User};

/// Persistence gateway for users
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> UserResult<Option<User>>;

    /// One page (newest first, `(page - 1) * limit` skipped) and the total count
    async fn find_all(&self, page: u64, limit: u64) -> UserResult<(Vec<User>, u64)>;

    /// Insert or replace by id
    async fn save(&self, user: User) -> UserResult<User>;

    /// `false` when nothing was deleted
    async fn delete(&self, id: Uuid) -> UserResult<bool>;
}

/// In-memory implementation (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| &u.email == email).cloned())
    }

    async fn find_all(&self, page: u64, limit: u64) -> UserResult<(Vec<User>, u64)> {
        let users = self.users.read().await;

        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = all.len() as u64;
        let skip = page.saturating_sub(1).saturating_mul(limit) as usize;
        let data = all.into_iter().skip(skip).take(limit as usize).collect();

        Ok((data, total))
    }

    async fn save(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let mut users = self.users.write().await;
        Ok(users.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn user(name: &str, email: &str, age_secs: i64) -> User {
        let mut user = User::new(name, Email::parse(email).unwrap());
        user.created_at = Utc::now() - Duration::seconds(age_secs);
        user.updated_at = user.created_at;
        user
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let repo = InMemoryUserRepository::new();
        let saved = repo.save(user("Ann", "ann@example.com", 0)).await.unwrap();

        let by_id = repo.find_by_id(saved.id).await.unwrap();
        assert_eq!(by_id.as_ref(), Some(&saved));

        let by_email = repo
            .find_by_email(&Email::parse("ANN@example.com").unwrap())
            .await
            .unwrap();
        assert_eq!(by_email, Some(saved));
    }

    #[tokio::test]
    async fn test_save_replaces_by_id() {
        let repo = InMemoryUserRepository::new();
        let mut saved = repo.save(user("Ann", "ann@example.com", 0)).await.unwrap();

        saved.name = "Annie".to_string();
        repo.save(saved.clone()).await.unwrap();

        let (all, total) = repo.find_all(1, 10).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(all[0].name, "Annie");
    }

    #[tokio::test]
    async fn test_find_all_pages_newest_first() {
        let repo = InMemoryUserRepository::new();
        for (i, age) in [30, 10, 20].into_iter().enumerate() {
            repo.save(user(&format!("u{i}"), &format!("u{i}@example.com"), age))
                .await
                .unwrap();
        }

        let (first, total) = repo.find_all(1, 2).await.unwrap();
        assert_eq!(total, 3);
        let names: Vec<_> = first.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["u1", "u2"]);

        let (second, _) = repo.find_all(2, 2).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].name, "u0");

        let (beyond, total) = repo.find_all(5, 2).await.unwrap();
        assert!(beyond.is_empty());
        assert_eq!(total, 3);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryUserRepository::new();
        let saved = repo.save(user("Ann", "ann@example.com", 0)).await.unwrap();

        assert!(repo.delete(saved.id).await.unwrap());
        assert!(!repo.delete(saved.id).await.unwrap());
        assert!(repo.find_by_id(saved.id).await.unwrap().is_none());
    }
}
