use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, HttpResponseBuilder, ResponseError};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::repositories::StoreError;
use crate::services::blob_store::BlobError;
use crate::services::export::ExportError;

pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const RATE_LIMIT_RESET_HEADER: &str = "x-ratelimit-reset";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Errors returned by HTTP handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Too many requests, try again later")]
    RateLimited {
        remaining: u32,
        reset_time: DateTime<Utc>,
    },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(err: impl std::fmt::Display) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ApiError::Internal(e) => {
                log::error!("❌ Internal error: {:#}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let mut response =
            HttpResponseBuilder::new(self.status_code()).json(ErrorResponse { error: message });

        if let ApiError::RateLimited {
            remaining,
            reset_time,
        } = self
        {
            insert_rate_limit_headers(response.headers_mut(), *remaining, reset_time);
        }

        response
    }
}

/// `X-RateLimit-Remaining` and `X-RateLimit-Reset` (RFC 3339)
pub fn insert_rate_limit_headers(
    headers: &mut HeaderMap,
    remaining: u32,
    reset_time: &DateTime<Utc>,
) {
    headers.insert(
        HeaderName::from_static(RATE_LIMIT_REMAINING_HEADER),
        HeaderValue::from(remaining),
    );
    if let Ok(value) = HeaderValue::from_str(&reset_time.to_rfc3339()) {
        headers.insert(HeaderName::from_static(RATE_LIMIT_RESET_HEADER), value);
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(what) => ApiError::Conflict(what),
            StoreError::Database(e) => ApiError::Internal(anyhow::anyhow!("Database error: {}", e)),
        }
    }
}

impl From<BlobError> for ApiError {
    fn from(err: BlobError) -> Self {
        ApiError::Internal(anyhow::Error::new(err).context("Blob storage error"))
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        ApiError::Internal(anyhow::Error::new(err).context("Map export failed"))
    }
}
