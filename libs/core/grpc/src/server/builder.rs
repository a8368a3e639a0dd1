//! gRPC server startup helpers.

use super::config::ServerConfig;
use tonic_health::ServingStatus;
use tonic_health::server::HealthReporter;
use tracing::info;

/// Helpers shared by every gRPC server binary.
///
/// # Example
///
/// ```ignore
/// use grpc_client::server::{GrpcServer, ServerConfig, create_health_service};
/// use rpc::todo::v1::to_do_service_server::{ToDoServiceServer, SERVICE_NAME};
///
/// let config = ServerConfig::from_env()?;
/// let (health_reporter, health_service) = create_health_service();
/// GrpcServer::setup_health(&health_reporter, SERVICE_NAME).await;
/// GrpcServer::log_startup(&config, SERVICE_NAME);
///
/// Server::builder()
///     .add_service(health_service)
///     .add_service(ToDoServiceServer::new(my_impl))
///     .serve(config.socket_addr()?)
///     .await?;
/// ```
pub struct GrpcServer;

impl GrpcServer {
    /// Log server startup information.
    pub fn log_startup(config: &ServerConfig, service_name: &str) {
        info!(
            addr = %config.addr_string(),
            service = service_name,
            compression = config.enable_compression,
            max_message_size = config.max_decoding_message_size,
            "gRPC server starting"
        );
        info!("Health check service enabled (grpc.health.v1.Health)");
    }

    /// Mark `service_name` and the empty service name (used by generic
    /// probes) as serving.
    pub async fn setup_health(health_reporter: &HealthReporter, service_name: &str) {
        for name in [service_name, ""] {
            health_reporter
                .set_service_status(name, ServingStatus::Serving)
                .await;
        }
        info!(service = service_name, "Service marked as serving");
    }

    /// Flip every reported service to NOT_SERVING ahead of shutdown so load
    /// balancers stop routing new calls.
    pub async fn mark_not_serving(health_reporter: &HealthReporter, service_name: &str) {
        for name in [service_name, ""] {
            health_reporter
                .set_service_status(name, ServingStatus::NotServing)
                .await;
        }
        info!(service = service_name, "Service marked as not serving");
    }
}

pub use tonic_health::server::health_reporter as create_health_service;
