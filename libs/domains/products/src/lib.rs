//! Products Domain
//!
//! Classified-ad listings: public browsing, owner-only edits, and deletes by
//! the owner or an admin that notify the owner in the background.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints (multipart create, JSON update)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐      ┌──────────────┐
//! │   Service   │ ───▶ │    Policy    │  ← can_mutate / can_delete
//! └──────┬──────┘      └──────────────┘
//!        │  ╲
//!        │   ╲──────▶ User Directory, Notification Dispatcher
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + in-memory / Postgres)
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
//! use domain_products::{handlers, InMemoryProductRepository, LocalImageStore, ProductService};
//!
//! let users = InMemoryUserRepository::new();
//! let service = ProductService::new(
//!     InMemoryProductRepository::new(users.clone()),
//!     Arc::new(users),
//!     dispatcher,
//! );
//! let router = handlers::router(service, Arc::new(LocalImageStore::new("uploads")), jwt_auth, 5 << 20);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod policy;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod uploads;

// Re-export commonly used types
pub use error::{ProductError, ProductResult};
pub use handlers::ApiDoc;
pub use models::{
    Actor, CreateProduct, MessageResponse, NewProduct, OwnerContact, Product, ProductListing,
    UpdateProduct,
};
pub use postgres::PgProductRepository;
pub use repository::{InMemoryProductRepository, ProductRepository};
pub use service::ProductService;
pub use uploads::{ImageStore, LocalImageStore};
