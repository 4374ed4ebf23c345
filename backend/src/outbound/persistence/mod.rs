//! PostgreSQL persistence adapters using Diesel.
//!
//! Repository implementations only translate between Diesel rows and domain
//! entities. Row structs (`models.rs`) and table definitions (`schema.rs`)
//! stay private to this module. Connections come from a shared bb8 pool
//! built once by the server and injected into every adapter.
//!
//! # Example
//!
//! ```ignore
//! use backend::outbound::persistence::{DbPool, DieselPostRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/polkassembly")).await?;
//! let posts = DieselPostRepository::new(pool);
//! ```

mod diesel_post_repository;
mod diesel_user_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_post_repository::DieselPostRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
