//! PostgreSQL persistence adapters.
//!
//! Repositories only translate between Diesel rows and domain types. Row
//! structs (`models`) and table definitions (`schema`) stay private.
//!
//! ```ignore
//! use pixbin::outbound::persistence::{DbPool, DieselMediaRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/pixbin")).await?;
//! let media = DieselMediaRepository::new(pool);
//! ```

mod diesel_account_repository;
mod diesel_media_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_account_repository::{DieselAccountRepository, DieselCredentialRepository};
pub use diesel_media_repository::DieselMediaRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
