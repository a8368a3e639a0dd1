//! # Axum Helpers
//!
//! Shared pieces of the HTTP gateway.
//!
//! - **[`errors`]**: `AppError` → JSON [`ErrorResponse`] with stable [`ErrorCode`]s
//! - **[`server`]**: router assembly with OpenAPI docs, health endpoints, graceful shutdown

pub mod errors;
pub mod server;

pub use errors::{AppError, ErrorCode, ErrorResponse};
pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_router,
    health_router, run_health_checks, serve, shutdown_signal,
};
