use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl CatalogError {
    pub fn product_not_found(product_id: &str) -> Self {
        CatalogError::NotFound(format!("Product {}", product_id))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            CatalogError::InvalidFilter(_) => StatusCode::BAD_REQUEST,
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CatalogError::CacheUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CatalogError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Numeric code for log correlation: 1xxx client errors, 2xxx backend errors.
    pub fn code(&self) -> i32 {
        match self {
            CatalogError::InvalidFilter(_) => 1001,
            CatalogError::NotFound(_) => 1004,
            CatalogError::StoreUnavailable(_) => 2001,
            CatalogError::CacheUnavailable(_) => 2002,
            CatalogError::Internal(_) => 2000,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::InvalidFilter(_) => "INVALID_FILTER",
            CatalogError::NotFound(_) => "NOT_FOUND",
            CatalogError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            CatalogError::CacheUnavailable(_) => "CACHE_UNAVAILABLE",
            CatalogError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// JSON body of every error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer code for logs and dashboards
    pub code: i32,
    /// Machine-readable identifier, e.g. `INVALID_FILTER`
    pub error: String,
    pub message: String,
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            CatalogError::StoreUnavailable(details) | CatalogError::Internal(details) => {
                tracing::error!(error_code = self.code(), details = %details, "Catalog request failed");
                "An internal server error occurred".to_string()
            }
            CatalogError::CacheUnavailable(details) => {
                tracing::warn!(error_code = self.code(), details = %details, "Cache administration failed");
                self.to_string()
            }
            _ => {
                tracing::info!(error_code = self.code(), "{}", self);
                self.to_string()
            }
        };

        let body = ErrorResponse {
            code: self.code(),
            error: self.kind().to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

impl From<mongodb::error::Error> for CatalogError {
    fn from(err: mongodb::error::Error) -> Self {
        CatalogError::StoreUnavailable(err.to_string())
    }
}

impl From<sea_orm::DbErr> for CatalogError {
    fn from(err: sea_orm::DbErr) -> Self {
        CatalogError::StoreUnavailable(err.to_string())
    }
}

impl From<redis::RedisError> for CatalogError {
    fn from(err: redis::RedisError) -> Self {
        CatalogError::CacheUnavailable(err.to_string())
    }
}

impl From<validator::ValidationErrors> for CatalogError {
    fn from(err: validator::ValidationErrors) -> Self {
        CatalogError::InvalidFilter(err.to_string())
    }
}
