use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};
use visim_llm::error::GenerationError;

use crate::model::ErrorBody;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("rate limit exceeded (RATE_LIMIT_RPS={rps}): try again in ~{retry_after_ms}ms")]
    RateLimited { rps: u32, retry_after_ms: u64 },

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl AppError {
    pub fn missing(field: &str) -> Self {
        AppError::BadRequest(format!("Missing {field}"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Config(_) | AppError::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %message, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %message, "request rejected");
        }

        let mut response = (status, Json(ErrorBody { error: message })).into_response();
        if let AppError::RateLimited { retry_after_ms, .. } = self {
            let secs = retry_after_ms.div_ceil(1000).max(1);
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}
