//! Configuration for the Catalog API

use core_config::{ConfigError, FromEnv, env_flag, env_or_default, env_parse, server::ServerConfig};
use database::mongodb::MongoConfig;
use database::postgres::PostgresConfig;
use database::redis::RedisConfig;
use domain_catalog::CacheTtls;
use std::str::FromStr;
use std::time::Duration;
use strum::{Display, EnumString};

pub use core_config::Environment;

/// Store behind the catalog, selected with `CATALOG_BACKEND`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CatalogBackend {
    Mongodb,
    Postgres,
    Memory,
}

/// Where cached responses live, selected with `CACHE_BACKEND`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CacheBackend {
    Redis,
    Memory,
}

#[derive(Clone, Debug)]
pub struct CacheConfig {
    /// `false` swaps in the no-op cache
    pub enabled: bool,
    pub backend: CacheBackend,
    pub redis: RedisConfig,
    pub namespace: String,
    pub ttls: CacheTtls,
}

impl FromEnv for CacheConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            enabled: env_flag("CACHE_ENABLED", true)?,
            backend: env_choice("CACHE_BACKEND", CacheBackend::Redis)?,
            redis: RedisConfig::from_env()?,
            namespace: env_or_default("CACHE_NAMESPACE", "catalog"),
            ttls: ttls_from_env()?,
        })
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub environment: Environment,
    pub backend: CatalogBackend,
    pub mongodb: Option<MongoConfig>,
    pub postgres: Option<PostgresConfig>,
    pub run_migrations: bool,
    pub cache: CacheConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let backend = env_choice("CATALOG_BACKEND", CatalogBackend::Mongodb)?;

        // Connection settings are only required for the selected store
        let mongodb = match backend {
            CatalogBackend::Mongodb => Some(MongoConfig::from_env()?),
            _ => None,
        };
        let postgres = match backend {
            CatalogBackend::Postgres => Some(PostgresConfig::from_env()?),
            _ => None,
        };

        Ok(Self {
            server,
            environment,
            backend,
            mongodb,
            postgres,
            run_migrations: env_flag("RUN_MIGRATIONS", true)?,
            cache: CacheConfig::from_env()?,
        })
    }
}

fn env_choice<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::ParseError {
            key: key.to_string(),
            details: format!("unsupported value '{}'", raw),
        }),
        Err(_) => Ok(default),
    }
}

fn ttls_from_env() -> Result<CacheTtls, ConfigError> {
    let defaults = CacheTtls::default();
    let seconds = |key: &str, default: Duration| -> Result<Duration, ConfigError> {
        env_parse(key, default.as_secs()).map(Duration::from_secs)
    };

    Ok(CacheTtls {
        listing: seconds("CACHE_TTL_LISTING", defaults.listing)?,
        detail: seconds("CACHE_TTL_DETAIL", defaults.detail)?,
        variants: seconds("CACHE_TTL_VARIANTS", defaults.variants)?,
        flash_sales: seconds("CACHE_TTL_FLASH_SALES", defaults.flash_sales)?,
        featured: seconds("CACHE_TTL_FEATURED", defaults.featured)?,
        enumeration: seconds("CACHE_TTL_ENUMERATION", defaults.enumeration)?,
        stats: seconds("CACHE_TTL_STATS", defaults.stats)?,
    })
}
