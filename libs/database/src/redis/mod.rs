//! Redis connection management for the response cache

mod config;
mod connector;

pub use config::{DEFAULT_REDIS_URL, RedisConfig};
pub use connector::{check_health, connect, connect_from_config_with_retry};
pub use redis::aio::ConnectionManager;
