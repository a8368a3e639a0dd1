//! HTTP server plumbing: router assembly, health endpoints and graceful shutdown.
//!
//! ```ignore
//! use axum_helpers::server::{ShutdownCoordinator, create_router, health_router, serve};
//! use core_config::app_info;
//! use tokio::net::TcpListener;
//!
//! let router = create_router::<ApiDoc>(api_routes.merge(health_router(app_info!())))?;
//! let shutdown = ShutdownCoordinator::new();
//! serve(TcpListener::bind("0.0.0.0:8080").await?, router, shutdown.clone()).await?;
//! ```

pub mod app;
pub mod health;
pub mod shutdown;

pub use app::{create_router, serve};
pub use health::{HealthCheckFuture, HealthResponse, health_router, run_health_checks};
pub use shutdown::{ShutdownCoordinator, shutdown_signal};
