//! PostgreSQL connectivity for the marketplace services.
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::postgres::{self, PostgresConfig};
//! use migration::Migrator;
//!
//! let config = PostgresConfig::from_env()?;
//! let db = postgres::connect_from_config_with_retry(config, None).await?;
//! postgres::run_migrations::<Migrator>(&db, "marketplace_api").await?;
//! ```

pub mod common;
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult, RetryConfig};
