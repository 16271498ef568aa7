use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::models::{LoginRequest, NewUser, RegisterUser, User, UserResponse};
use crate::repository::UserRepository;

/// Registration, login and profile lookups
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub fn from_shared(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> Arc<R> {
        Arc::clone(&self.repository)
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterUser) -> UserResult<UserResponse> {
        input.validate()?;

        let user = NewUser {
            name: input.name.trim().to_string(),
            email: input.email.trim().to_lowercase(),
            contact_number: input.contact_number,
            password_hash: hash_password(&input.password)?,
            is_admin: false,
        };

        let created = self.repository.create(user).await?;
        Ok(created.into())
    }

    /// Verify credentials. Unknown emails and wrong passwords are indistinguishable.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginRequest) -> UserResult<User> {
        let user = self
            .repository
            .get_by_email(&input.email.trim().to_lowercase())
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !verify_password(&input.password, &user.password_hash)? {
            tracing::info!(user_id = user.user_id, "Rejected login with wrong password");
            return Err(UserError::InvalidCredentials);
        }
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: i32) -> UserResult<UserResponse> {
        self.repository
            .get_by_id(user_id)
            .await?
            .map(Into::into)
            .ok_or(UserError::NotFound(user_id))
    }

    /// Create the admin account unless a user with that email already exists
    #[instrument(skip(self, password))]
    pub async fn ensure_admin(&self, name: &str, email: &str, password: &str) -> UserResult<User> {
        let email = email.trim().to_lowercase();
        if let Some(existing) = self.repository.get_by_email(&email).await? {
            if !existing.is_admin {
                tracing::warn!(user_id = existing.user_id, "Bootstrap admin email belongs to a regular user");
            }
            return Ok(existing);
        }

        let admin = self
            .repository
            .create(NewUser {
                name: name.to_string(),
                email,
                contact_number: None,
                password_hash: hash_password(password)?,
                is_admin: true,
            })
            .await?;
        tracing::info!(user_id = admin.user_id, "Bootstrapped admin account");
        Ok(admin)
    }
}

fn hash_password(password: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> UserResult<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
