//! PostgreSQL through SeaORM

mod config;
mod connector;

pub use config::PostgresConfig;
pub use connector::{
    check_health, connect, connect_from_config, connect_from_config_with_retry, run_migrations,
};
pub use sea_orm::{DatabaseConnection, DbErr};
