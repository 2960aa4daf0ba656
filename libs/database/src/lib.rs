//! Connection helpers for the catalog's backing stores.
//!
//! - `postgres` (default): SeaORM connection pool, migrations, health probe
//! - `redis` (default): `ConnectionManager` for the response cache
//! - `mongodb`: document store client
//! - `config`: `core_config::FromEnv` implementations for every config type
//!
//! ```ignore
//! let db = database::postgres::connect_from_config_with_retry(config, None).await?;
//! database::postgres::run_migrations::<Migrator>(&db).await?;
//!
//! let cache = database::redis::connect("redis://127.0.0.1:6379").await?;
//! ```

pub mod common;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "redis")]
pub mod redis;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use common::{DatabaseError, DatabaseResult, HealthStatus};
