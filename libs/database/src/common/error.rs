use std::time::Instant;

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[cfg(feature = "postgres")]
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sea_orm::DbErr),

    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[cfg(feature = "mongodb")]
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Health check failed: {0}")]
    HealthCheckFailed(String),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Outcome of a readiness probe against one backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub healthy: bool,
    pub message: Option<String>,
    pub response_time_ms: u64,
}

impl HealthStatus {
    /// Time `probe` and fold its result into a status.
    pub async fn measure<F>(probe: F) -> Self
    where
        F: Future<Output = DatabaseResult<()>>,
    {
        let start = Instant::now();
        let result = probe.await;
        let response_time_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(()) => Self {
                healthy: true,
                message: None,
                response_time_ms,
            },
            Err(e) => Self {
                healthy: false,
                message: Some(e.to_string()),
                response_time_ms,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_measure_healthy_probe() {
        let status = HealthStatus::measure(async { Ok(()) }).await;
        assert!(status.healthy);
        assert!(status.message.is_none());
    }

    #[tokio::test]
    async fn test_measure_failing_probe() {
        let status = HealthStatus::measure(async {
            Err(DatabaseError::HealthCheckFailed("timed out".to_string()))
        })
        .await;
        assert!(!status.healthy);
        assert_eq!(
            status.message.as_deref(),
            Some("Health check failed: timed out")
        );
    }
}
