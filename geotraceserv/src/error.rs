use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;

#[derive(Debug, Clone)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    Internal(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "{}", msg),
            ApiError::Unauthorized => write!(f, "Unauthorized"),
            ApiError::Internal(detail) => write!(f, "Server exception: {}", detail),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Wrap a store or I/O failure
    pub fn internal(e: impl std::fmt::Display) -> Self {
        ApiError::Internal(e.to_string())
    }

    /// Log and hand back, for use in `map_err`
    pub fn logged(self) -> Self {
        self.log_event();
        self
    }

    pub fn log_event(&self) {
        match self {
            ApiError::BadRequest(msg) => tracing::debug!("Rejected request: {}", msg),
            ApiError::Unauthorized => tracing::warn!("⚠️ Admin request rejected: bad or missing pin"),
            ApiError::Internal(detail) => tracing::error!("❌ Request failed: {}", detail),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "ok": false,
            "error": self.to_string(),
        }))
    }
}
