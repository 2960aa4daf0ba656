//! MongoDB client helpers

mod config;
mod connector;

pub use config::MongoConfig;
pub use connector::{MongoError, check_health, connect, connect_from_config_with_retry};
pub use mongodb::{Client, Database};
