//! Process bootstrap: configuration, database, the gRPC server and the
//! HTTP/JSON gateway in front of it.
//!
//! Both listeners share one [`ShutdownCoordinator`]. A termination signal or
//! a failing listener stops both, then the pool is closed.

use axum::{Router, extract::State, response::IntoResponse, routing::get};
use axum_helpers::server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_router, health_router,
    run_health_checks, serve,
};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::postgres::{
    DatabaseConnection, check_health, connect_from_config_with_retry, run_migrations,
};
use domain_todos::{ConnectionProvider, PgConnectionProvider, ToDoApiDoc, ToDoService, gateway_router};
use eyre::{Result, WrapErr};
use grpc_client::{ChannelConfig, create_channel_lazy_with_config};
use grpc_client::server::{GrpcServer, ServerConfig as GrpcServerConfig, create_health_service};
use migration::Migrator;
use rpc::todo::v1::to_do_service_server::{SERVICE_NAME, ToDoServiceServer};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::codec::CompressionEncoding;
use tonic::transport::Server;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use utoipa::OpenApi;

use crate::config::Config;
use crate::service::ToDoServiceImpl;

#[derive(OpenApi)]
#[openapi(
    paths(axum_helpers::server::health::health_handler),
    components(schemas(HealthResponse)),
    tags((name = "health", description = "Liveness and readiness probes"))
)]
struct HealthApiDoc;

/// Gateway routes plus the health endpoints.
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        let mut doc = ToDoApiDoc::openapi();
        doc.merge(HealthApiDoc::openapi());
        doc.info.title = "ToDo API".to_string();
        doc.info.description = Some("HTTP/JSON gateway for v1.ToDoService".to_string());
        doc
    }
}

/// `v1.ToDoService` with the message limits and compression from `config`.
pub fn todo_grpc_service<P: ConnectionProvider>(
    service: ToDoService<P>,
    config: &GrpcServerConfig,
) -> ToDoServiceServer<ToDoServiceImpl<P>> {
    let server = ToDoServiceServer::new(ToDoServiceImpl::new(service))
        .max_decoding_message_size(config.max_decoding_message_size)
        .max_encoding_message_size(config.max_encoding_message_size);

    if config.enable_compression {
        server
            .accept_compressed(CompressionEncoding::Zstd)
            .send_compressed(CompressionEncoding::Zstd)
    } else {
        server
    }
}

/// `GET /ready`: 200 while the database answers, 503 otherwise.
pub fn ready_router(db: DatabaseConnection) -> Router {
    Router::new().route("/ready", get(ready_handler)).with_state(db)
}

async fn ready_handler(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    let database: HealthCheckFuture =
        Box::pin(async move { check_health(&db).await.map_err(|e| e.to_string()) });
    run_health_checks(vec![("database", database)]).await
}

/// Run the gRPC server and the HTTP gateway until shutdown.
///
/// 1. Installs error reporting and tracing
/// 2. Connects to PostgreSQL with retry and applies migrations
/// 3. Binds both listeners before serving, so address errors surface early
/// 4. Waits for a signal (or a listener failure), drains both servers
///    within `SHUTDOWN_TIMEOUT_SECS` and closes the pool
pub async fn run() -> Result<()> {
    install_color_eyre();
    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!(
        app = config.app.name,
        version = config.app.version,
        environment = ?config.environment,
        "Starting ToDo server"
    );

    info!("Connecting to database...");
    let db = connect_from_config_with_retry(config.database.clone(), None)
        .await
        .wrap_err("Failed to connect to database")?;

    if config.run_migrations {
        run_migrations::<Migrator>(&db, config.app.name)
            .await
            .wrap_err("Failed to run database migrations")?;
    } else {
        info!("RUN_MIGRATIONS=false, skipping migrations");
    }

    let service = ToDoService::new(PgConnectionProvider::new(db.clone()));

    let shutdown = ShutdownCoordinator::new();
    let signal = shutdown.clone();
    tokio::spawn(async move { signal.wait_for_signal().await });

    let grpc_listener = TcpListener::bind(config.grpc.socket_addr()?)
        .await
        .wrap_err_with(|| format!("Failed to bind gRPC listener on {}", config.grpc.addr_string()))?;
    let http_listener = TcpListener::bind(config.http.address())
        .await
        .wrap_err_with(|| format!("Failed to bind HTTP listener on {}", config.http.address()))?;

    let grpc_task = spawn_grpc(grpc_listener, service, &config.grpc, shutdown.clone()).await;

    let channel = create_channel_lazy_with_config(
        config.gateway.grpc_endpoint.clone(),
        ChannelConfig::new().with_request_timeout(config.gateway.request_timeout),
    )
    .wrap_err("Invalid GATEWAY_GRPC_ENDPOINT")?;
    let apis = gateway_router(channel, config.gateway.request_timeout)
        .merge(health_router(config.app))
        .merge(ready_router(db.clone()));
    let router = create_router::<ApiDoc>(apis).wrap_err("Failed to build HTTP router")?;
    info!(
        endpoint = %config.gateway.grpc_endpoint,
        timeout = ?config.gateway.request_timeout,
        "HTTP gateway forwarding to gRPC"
    );
    let http_task = spawn_http(http_listener, router, shutdown.clone());

    shutdown.wait().await;
    info!(timeout = ?config.shutdown_timeout, "Shutting down");

    let outcome = tokio::time::timeout(config.shutdown_timeout, async {
        tokio::join!(grpc_task, http_task)
    })
    .await;

    if let Err(e) = db.close().await {
        warn!(error = %e, "Failed to close database pool");
    }

    match outcome {
        Ok((grpc, http)) => {
            grpc.wrap_err("gRPC server task panicked")??;
            http.wrap_err("HTTP server task panicked")??;
            info!("Shutdown complete");
            Ok(())
        }
        Err(_) => {
            warn!("Servers did not stop within the shutdown timeout");
            Ok(())
        }
    }
}

async fn spawn_grpc<P: ConnectionProvider>(
    listener: TcpListener,
    service: ToDoService<P>,
    config: &GrpcServerConfig,
    shutdown: ShutdownCoordinator,
) -> JoinHandle<Result<()>> {
    let (health_reporter, health_service) = create_health_service();
    GrpcServer::setup_health(&health_reporter, SERVICE_NAME).await;
    GrpcServer::log_startup(config, SERVICE_NAME);

    let todo_service = todo_grpc_service(service, config);
    let signal = shutdown.clone();

    tokio::spawn(async move {
        let result = Server::builder()
            .layer(TraceLayer::new_for_grpc())
            .add_service(health_service)
            .add_service(todo_service)
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async move {
                signal.wait().await;
                GrpcServer::mark_not_serving(&health_reporter, SERVICE_NAME).await;
            })
            .await;

        if let Err(e) = &result {
            error!(error = ?e, "gRPC server failed");
            shutdown.shutdown();
        }
        result.wrap_err("gRPC server failed")
    })
}

fn spawn_http(listener: TcpListener, router: Router, shutdown: ShutdownCoordinator) -> JoinHandle<Result<()>> {
    tokio::spawn(async move {
        let result = serve(listener, router, shutdown.clone()).await;
        if result.is_err() {
            shutdown.shutdown();
        }
        result.wrap_err("HTTP server failed")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_todos::InMemoryProvider;

    #[test]
    fn test_api_doc_merges_gateway_and_health() {
        let doc = ApiDoc::openapi();
        assert_eq!(doc.info.title, "ToDo API");
        assert!(doc.paths.paths.contains_key("/v1/entities"));
        assert!(doc.paths.paths.contains_key("/v1/entities/{id}"));
        assert!(doc.paths.paths.contains_key("/health"));
    }

    #[test]
    fn test_todo_grpc_service_builds_with_and_without_compression() {
        let service = ToDoService::new(InMemoryProvider::new());
        let _ = todo_grpc_service(service.clone(), &GrpcServerConfig::default());
        let _ = todo_grpc_service(service, &GrpcServerConfig::new().with_compression(false));
    }
}
