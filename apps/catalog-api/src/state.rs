//! Application state management

use database::HealthStatus;
use database::mongodb::Client;
use database::postgres::DatabaseConnection;
use database::redis::ConnectionManager;
use domain_catalog::{
    CacheStore, CatalogRepository, CatalogService, InMemoryCacheStore, InMemoryCatalogRepository,
    MongoCatalogRepository, NoopCacheStore, PgCatalogRepository, RedisCacheStore,
};
use eyre::eyre;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{CacheBackend, CacheConfig, CatalogBackend, Config};

/// Service as composed at startup, with the backends erased
pub type SharedCatalogService = CatalogService<Arc<dyn CatalogRepository>, Arc<dyn CacheStore>>;

/// Connection kept for readiness probes and shutdown
#[derive(Clone)]
pub enum StoreHandle {
    Mongo { client: Client, database: String },
    Postgres(DatabaseConnection),
    Memory,
}

#[derive(Clone)]
pub enum CacheHandle {
    Redis(ConnectionManager),
    Memory,
    Disabled,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub service: SharedCatalogService,
    pub store: StoreHandle,
    pub cache: CacheHandle,
}

impl AppState {
    /// Connect the configured store and cache and compose the service.
    pub async fn connect(config: Config) -> eyre::Result<Self> {
        let (repository, store) = connect_store(&config).await?;
        let (cache_store, cache) = connect_cache(&config.cache).await?;

        let service = CatalogService::new(repository, cache_store).with_ttls(config.cache.ttls);
        info!(
            store = store.name(),
            cache = service.cache_backend(),
            "Catalog service composed"
        );

        Ok(Self {
            config,
            service,
            store,
            cache,
        })
    }
}

async fn connect_store(config: &Config) -> eyre::Result<(Arc<dyn CatalogRepository>, StoreHandle)> {
    match config.backend {
        CatalogBackend::Mongodb => {
            let mongo = config
                .mongodb
                .as_ref()
                .ok_or_else(|| eyre!("MongoDB settings missing for the mongodb backend"))?;

            info!(database = %mongo.database, "Connecting to MongoDB");
            let client = database::mongodb::connect_from_config_with_retry(mongo, None).await?;
            let repository = MongoCatalogRepository::new(&client.database(&mongo.database));
            repository.init_indexes().await?;

            let repository: Arc<dyn CatalogRepository> = Arc::new(repository);
            let handle = StoreHandle::Mongo {
                client,
                database: mongo.database.clone(),
            };
            Ok((repository, handle))
        }
        CatalogBackend::Postgres => {
            let postgres = config
                .postgres
                .clone()
                .ok_or_else(|| eyre!("PostgreSQL settings missing for the postgres backend"))?;

            info!("Connecting to PostgreSQL");
            let db = database::postgres::connect_from_config_with_retry(postgres, None).await?;
            if config.run_migrations {
                database::postgres::run_migrations::<migration::Migrator>(&db).await?;
            }

            let repository: Arc<dyn CatalogRepository> = Arc::new(PgCatalogRepository::new(db.clone()));
            Ok((repository, StoreHandle::Postgres(db)))
        }
        CatalogBackend::Memory => {
            warn!("Using the in-memory catalog store, data is lost on restart");
            let repository: Arc<dyn CatalogRepository> = Arc::new(InMemoryCatalogRepository::new());
            Ok((repository, StoreHandle::Memory))
        }
    }
}

async fn connect_cache(config: &CacheConfig) -> eyre::Result<(Arc<dyn CacheStore>, CacheHandle)> {
    if !config.enabled {
        warn!("Response cache disabled");
        let cache: Arc<dyn CacheStore> = Arc::new(NoopCacheStore);
        return Ok((cache, CacheHandle::Disabled));
    }

    match config.backend {
        CacheBackend::Redis => {
            info!(url = %config.redis.url, namespace = %config.namespace, "Connecting to Redis");
            let conn = database::redis::connect_from_config_with_retry(&config.redis, None).await?;
            let cache: Arc<dyn CacheStore> =
                Arc::new(RedisCacheStore::new(conn.clone(), config.namespace.clone()));
            Ok((cache, CacheHandle::Redis(conn)))
        }
        CacheBackend::Memory => {
            let cache: Arc<dyn CacheStore> = Arc::new(InMemoryCacheStore::new());
            Ok((cache, CacheHandle::Memory))
        }
    }
}

impl StoreHandle {
    pub fn name(&self) -> &'static str {
        match self {
            StoreHandle::Mongo { .. } => "mongodb",
            StoreHandle::Postgres(_) => "postgres",
            StoreHandle::Memory => "memory",
        }
    }

    pub async fn probe(&self) -> HealthStatus {
        match self {
            StoreHandle::Mongo { client, database } => {
                HealthStatus::measure(database::mongodb::check_health(client, database)).await
            }
            StoreHandle::Postgres(db) => {
                HealthStatus::measure(database::postgres::check_health(db)).await
            }
            StoreHandle::Memory => HealthStatus::measure(async { Ok(()) }).await,
        }
    }

    /// Release pooled connections during shutdown
    pub async fn close(self) {
        match self {
            StoreHandle::Mongo { client, .. } => {
                client.shutdown().await;
                info!("MongoDB connections closed");
            }
            StoreHandle::Postgres(db) => match db.close().await {
                Ok(()) => info!("PostgreSQL pool closed"),
                Err(e) => warn!(error = %e, "Failed to close PostgreSQL pool"),
            },
            StoreHandle::Memory => {}
        }
    }
}

impl CacheHandle {
    pub fn name(&self) -> &'static str {
        match self {
            CacheHandle::Redis(_) => "redis",
            CacheHandle::Memory => "memory",
            CacheHandle::Disabled => "disabled",
        }
    }

    pub async fn probe(&self) -> HealthStatus {
        match self {
            CacheHandle::Redis(conn) => {
                let mut conn = conn.clone();
                HealthStatus::measure(database::redis::check_health(&mut conn)).await
            }
            CacheHandle::Memory | CacheHandle::Disabled => {
                HealthStatus::measure(async { Ok(()) }).await
            }
        }
    }
}
