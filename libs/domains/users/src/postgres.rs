use async_trait::async_trait;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, SqlErr,
};

use crate::{
    entity,
    error::{UserError, UserResult},
    models::{NewUser, User},
    repository::UserRepository,
};

/// PostgreSQL implementation of UserRepository using SeaORM
#[derive(Clone)]
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> UserResult<User> {
        let now = chrono::Utc::now();
        let active = entity::ActiveModel {
            user_id: NotSet,
            name: Set(user.name),
            email: Set(user.email.clone()),
            contact_number: Set(user.contact_number),
            password_hash: Set(user.password_hash),
            is_admin: Set(user.is_admin),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let model = active.insert(&self.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => UserError::DuplicateEmail(user.email),
            _ => UserError::from(e),
        })?;

        tracing::info!(user_id = model.user_id, "Created user");
        Ok(model.into())
    }

    async fn get_by_id(&self, user_id: i32) -> UserResult<Option<User>> {
        let model = entity::Entity::find_by_id(user_id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    /// Emails are stored lowercased by the service
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let model = entity::Entity::find()
            .filter(entity::Column::Email.eq(email.to_lowercase()))
            .one(&self.db)
            .await?;
        Ok(model.map(Into::into))
    }
}
