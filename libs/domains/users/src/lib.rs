//! Users Domain
//!
//! Marketplace accounts: self-registration, login and the user directory
//! that the products domain consults for owner contact details and
//! notification addresses.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints (register, login, me)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Password hashing, normalization, admin bootstrap
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← User Directory (trait + in-memory / Postgres)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_users::{handlers, InMemoryUserRepository, UserService};
//!
//! let service = UserService::new(InMemoryUserRepository::new());
//! let router = handlers::router(service, jwt_auth);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{UserError, UserResult};
pub use models::{LoginRequest, NewUser, RegisterUser, TokenResponse, User, UserResponse};
pub use postgres::PgUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;

#[cfg(any(test, feature = "mock"))]
pub use repository::MockUserRepository;
