use async_graphql::ErrorExtensions;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{error, warn};

use service::errors::ServiceError;

use crate::observability::GRAPHQL_ERRORS_TOTAL;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({"error": self.message}))).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("runtime check failed: {0}")]
    Runtime(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

/// GraphQL `extensions.code` for a service error.
pub fn graphql_code(e: &ServiceError) -> &'static str {
    match e {
        ServiceError::Unauthenticated(_) => "UNAUTHENTICATED",
        ServiceError::Forbidden(_) => "FORBIDDEN",
        ServiceError::NotFound(_) => "NOT_FOUND",
        ServiceError::Validation(_) => "BAD_USER_INPUT",
        ServiceError::Db(_) => "INTERNAL",
    }
}

/// Convert a service failure into a request-level GraphQL error.
/// Storage details stay in the log; the client sees a generic message.
pub fn to_graphql_error(e: ServiceError) -> async_graphql::Error {
    let code = graphql_code(&e);
    let errno = i32::from(e.code());
    GRAPHQL_ERRORS_TOTAL.with_label_values(&[code]).inc();
    let message = if e.is_client_error() {
        warn!(code, error = %e, "request rejected");
        e.to_string()
    } else {
        error!(code, error = %e, "service failure");
        "internal server error".to_string()
    };
    async_graphql::Error::new(message).extend_with(|_, ext| {
        ext.set("code", code);
        ext.set("errno", errno);
    })
}
