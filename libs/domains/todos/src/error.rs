use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use tonic::{Code, Status};

/// Every way a ToDo operation can fail.
///
/// The message is the whole display text, so it travels unchanged into a
/// `tonic::Status` or an HTTP `ErrorResponse`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToDoError {
    /// The caller asked for an API version this service does not implement
    #[error("{0}")]
    Unimplemented(String),

    /// Malformed timestamp input or a missing entity
    #[error("{0}")]
    InvalidArgument(String),

    /// No connection could be obtained from the store
    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    NotFound(String),

    /// Store failure, ambiguous read or an unrepresentable stored timestamp
    #[error("{0}")]
    Internal(String),

    #[error("{0}")]
    Cancelled(String),

    #[error("{0}")]
    DeadlineExceeded(String),
}

pub type ToDoResult<T> = Result<T, ToDoError>;

impl ToDoError {
    pub fn code(&self) -> Code {
        match self {
            ToDoError::Unimplemented(_) => Code::Unimplemented,
            ToDoError::InvalidArgument(_) => Code::InvalidArgument,
            ToDoError::Unavailable(_) => Code::Unavailable,
            ToDoError::NotFound(_) => Code::NotFound,
            ToDoError::Internal(_) => Code::Internal,
            ToDoError::Cancelled(_) => Code::Cancelled,
            ToDoError::DeadlineExceeded(_) => Code::DeadlineExceeded,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ToDoError::Unimplemented(msg)
            | ToDoError::InvalidArgument(msg)
            | ToDoError::Unavailable(msg)
            | ToDoError::NotFound(msg)
            | ToDoError::Internal(msg)
            | ToDoError::Cancelled(msg)
            | ToDoError::DeadlineExceeded(msg) => msg,
        }
    }
}

impl From<ToDoError> for Status {
    fn from(err: ToDoError) -> Self {
        Status::new(err.code(), err.message())
    }
}

/// Recover the taxonomy from a status returned by the gRPC endpoint.
///
/// Codes the service never produces collapse into `Internal`.
impl From<Status> for ToDoError {
    fn from(status: Status) -> Self {
        let msg = status.message().to_string();
        match status.code() {
            Code::Unimplemented => ToDoError::Unimplemented(msg),
            Code::InvalidArgument => ToDoError::InvalidArgument(msg),
            Code::Unavailable => ToDoError::Unavailable(msg),
            Code::NotFound => ToDoError::NotFound(msg),
            Code::Cancelled => ToDoError::Cancelled(msg),
            Code::DeadlineExceeded => ToDoError::DeadlineExceeded(msg),
            _ => ToDoError::Internal(msg),
        }
    }
}

/// Convert ToDoError to AppError for standardized error responses
impl From<ToDoError> for AppError {
    fn from(err: ToDoError) -> Self {
        match err {
            ToDoError::Unimplemented(msg) => AppError::NotImplemented(msg),
            ToDoError::InvalidArgument(msg) => AppError::BadRequest(msg),
            ToDoError::Unavailable(msg) => AppError::ServiceUnavailable(msg),
            ToDoError::NotFound(msg) => AppError::NotFound(msg),
            ToDoError::Internal(msg) => AppError::InternalServerError(msg),
            ToDoError::Cancelled(msg) => AppError::ClientClosedRequest(msg),
            ToDoError::DeadlineExceeded(msg) => AppError::GatewayTimeout(msg),
        }
    }
}

impl IntoResponse for ToDoError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
