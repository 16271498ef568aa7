use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{NewUser, User};

/// User Directory: the lookups the marketplace needs from user records
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user. Emails are unique, compared case-insensitively.
    async fn create(&self, user: NewUser) -> UserResult<User>;

    async fn get_by_id(&self, user_id: i32) -> UserResult<Option<User>>;

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;
}

#[derive(Debug, Default)]
struct Directory {
    users: BTreeMap<i32, User>,
    last_id: i32,
}

/// In-memory implementation of UserRepository (for development/testing).
/// Clones share the same storage.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    inner: Arc<RwLock<Directory>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> UserResult<User> {
        let mut dir = self.inner.write().await;

        if dir
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(UserError::DuplicateEmail(user.email));
        }

        dir.last_id += 1;
        let now = Utc::now();
        let created = User {
            user_id: dir.last_id,
            name: user.name,
            email: user.email,
            contact_number: user.contact_number,
            password_hash: user.password_hash,
            is_admin: user.is_admin,
            created_at: now,
            updated_at: now,
        };
        dir.users.insert(created.user_id, created.clone());

        tracing::info!(user_id = created.user_id, email = %created.email, "Created user");
        Ok(created)
    }

    async fn get_by_id(&self, user_id: i32) -> UserResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&user_id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let dir = self.inner.read().await;
        Ok(dir
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ivo".into(),
            email: email.into(),
            contact_number: Some("555-0101".into()),
            password_hash: "hash".into(),
            is_admin: false,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repo = InMemoryUserRepository::new();
        let a = repo.create(new_user("a@example.com")).await.unwrap();
        let b = repo.create(new_user("b@example.com")).await.unwrap();
        assert_eq!(a.user_id, 1);
        assert_eq!(b.user_id, 2);
        assert_eq!(repo.get_by_id(2).await.unwrap(), Some(b));
    }

    #[tokio::test]
    async fn test_duplicate_email_case_insensitive() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("ivo@example.com")).await.unwrap();

        let result = repo.create(new_user("IVO@example.com")).await;
        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_get_by_email_and_missing_id() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(new_user("ivo@example.com")).await.unwrap();

        let found = repo.get_by_email("Ivo@Example.com").await.unwrap();
        assert_eq!(found.map(|u| u.user_id), Some(created.user_id));
        assert!(repo.get_by_id(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let repo = InMemoryUserRepository::new();
        let other = repo.clone();
        repo.create(new_user("ivo@example.com")).await.unwrap();
        assert!(other.get_by_id(1).await.unwrap().is_some());
    }
}
