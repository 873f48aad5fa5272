//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the post graph, engagement ledger, and user
//! repository ports backed by PostgreSQL through `diesel-async` and a `bb8`
//! connection pool.
//!
//! - Repositories only translate between Diesel rows and domain types.
//! - Row structs (`models.rs`) and table definitions (`schema.rs`) never leave
//!   this module.
//! - Every database error is mapped to the owning port's error enum.
//!
//! # Example
//!
//! ```ignore
//! use chirp_backend::outbound::persistence::{DbPool, DieselPostRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/chirp")).await?;
//! let posts = DieselPostRepository::new(pool.clone());
//! ```

mod diesel_basic_error_mapping;
mod diesel_engagement_repository;
mod diesel_post_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_engagement_repository::DieselEngagementRepository;
pub use diesel_post_repository::DieselPostRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
