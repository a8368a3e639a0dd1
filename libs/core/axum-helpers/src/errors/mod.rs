pub mod codes;
pub mod handlers;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Non-standard status used by proxies when the client went away (nginx convention).
pub const CLIENT_CLOSED_REQUEST: u16 = 499;

/// Body of every error response.
///
/// ```json
/// {
///   "code": 1004,
///   "error": "NOT_FOUND",
///   "message": "ToDo with ID='7' is not found"
/// }
/// ```
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Errors a handler can return; each maps to one HTTP status.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Path parameter error: {0}")]
    PathRejection(#[from] PathRejection),

    #[error("Query parameter error: {0}")]
    QueryRejection(#[from] QueryRejection),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Client Closed Request: {0}")]
    ClientClosedRequest(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Not Implemented: {0}")]
    NotImplemented(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Gateway Timeout: {0}")]
    GatewayTimeout(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::JsonExtractorRejection(e) => e.status(),
            AppError::PathRejection(e) => e.status(),
            AppError::QueryRejection(e) => e.status(),
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ClientClosedRequest(_) => {
                StatusCode::from_u16(CLIENT_CLOSED_REQUEST).unwrap_or(StatusCode::BAD_REQUEST)
            }
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::JsonExtractorRejection(_) => ErrorCode::JsonExtraction,
            AppError::PathRejection(_) | AppError::QueryRejection(_) => ErrorCode::InvalidParameter,
            AppError::BadRequest(_) => ErrorCode::InvalidArgument,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::ClientClosedRequest(_) => ErrorCode::ClientClosedRequest,
            AppError::InternalServerError(_) => ErrorCode::InternalError,
            AppError::NotImplemented(_) => ErrorCode::NotImplemented,
            AppError::ServiceUnavailable(_) => ErrorCode::ServiceUnavailable,
            AppError::GatewayTimeout(_) => ErrorCode::GatewayTimeout,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.error_code();

        let message = match self {
            AppError::JsonExtractorRejection(e) => {
                tracing::warn!(error_code = code.code(), "JSON extraction error: {:?}", e);
                e.body_text()
            }
            AppError::PathRejection(e) => {
                tracing::info!(error_code = code.code(), "Path parameter error: {}", e);
                e.body_text()
            }
            AppError::QueryRejection(e) => {
                tracing::info!(error_code = code.code(), "Query parameter error: {}", e);
                e.body_text()
            }
            AppError::BadRequest(msg) | AppError::NotFound(msg) | AppError::ClientClosedRequest(msg) => {
                tracing::info!(error_code = code.code(), "{}: {}", code, msg);
                msg
            }
            AppError::ServiceUnavailable(msg) | AppError::GatewayTimeout(msg) => {
                tracing::warn!(error_code = code.code(), "{}: {}", code, msg);
                msg
            }
            AppError::InternalServerError(msg) | AppError::NotImplemented(msg) => {
                tracing::error!(error_code = code.code(), "{}: {}", code, msg);
                msg
            }
        };

        error_response(status, message, code)
    }
}

/// Build an [`ErrorResponse`] with the given status.
pub fn error_response(status: StatusCode, message: String, error_code: ErrorCode) -> Response {
    let body = Json(ErrorResponse {
        code: error_code.code(),
        error: error_code.as_str().to_string(),
        message,
        details: None,
    });

    (status, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(response: Response) -> ErrorResponse {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_response() {
        let response = AppError::NotFound("ToDo with ID='3' is not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_of(response).await;
        assert_eq!(body.code, 1004);
        assert_eq!(body.error, "NOT_FOUND");
        assert_eq!(body.message, "ToDo with ID='3' is not found");
        assert!(body.details.is_none());
    }

    #[tokio::test]
    async fn test_client_closed_request_uses_499() {
        let response = AppError::ClientClosedRequest("cancelled".into()).into_response();
        assert_eq!(response.status().as_u16(), 499);
        assert_eq!(body_of(response).await.error, "CLIENT_CLOSED_REQUEST");
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::BadRequest(String::new()), StatusCode::BAD_REQUEST),
            (AppError::NotImplemented(String::new()), StatusCode::NOT_IMPLEMENTED),
            (AppError::ServiceUnavailable(String::new()), StatusCode::SERVICE_UNAVAILABLE),
            (AppError::GatewayTimeout(String::new()), StatusCode::GATEWAY_TIMEOUT),
            (AppError::InternalServerError(String::new()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(error.status(), status);
        }
    }
}
