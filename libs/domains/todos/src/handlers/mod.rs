pub mod gateway;
pub mod json;

use std::time::Duration;

use axum::{
    Router,
    routing::{get, post},
};
use grpc_client::TracingInterceptor;
use rpc::todo::v1::to_do_service_client::ToDoServiceClient;
use tonic::service::interceptor::InterceptedService;
use tonic::transport::Channel;
use utoipa::OpenApi;

pub use json::{
    ApiVersionQuery, CreateToDoRequest, CreateToDoResponse, DeleteToDoResponse,
    ReadAllToDoResponse, ReadToDoResponse, ToDoJson, UpdateToDoRequest, UpdateToDoResponse,
};

/// OpenAPI documentation for the HTTP/JSON gateway
#[derive(OpenApi)]
#[openapi(
    paths(
        gateway::create,
        gateway::read,
        gateway::update,
        gateway::delete,
        gateway::read_all,
    ),
    components(
        schemas(
            ToDoJson,
            CreateToDoRequest,
            CreateToDoResponse,
            ReadToDoResponse,
            UpdateToDoRequest,
            UpdateToDoResponse,
            DeleteToDoResponse,
            ReadAllToDoResponse,
            axum_helpers::ErrorResponse,
        )
    ),
    tags(
        (name = "todos", description = "ToDo entities, forwarded to the gRPC ToDoService")
    )
)]
pub struct ToDoApiDoc;

/// Client the gateway uses to reach `v1.ToDoService`.
pub type GatewayClient = ToDoServiceClient<InterceptedService<Channel, TracingInterceptor>>;

#[derive(Clone)]
pub struct GatewayState {
    client: GatewayClient,
    request_timeout: Duration,
}

impl GatewayState {
    pub fn new(client: GatewayClient, request_timeout: Duration) -> Self {
        Self {
            client,
            request_timeout,
        }
    }
}

/// HTTP/JSON routes that translate to gRPC calls on `channel`.
///
/// ```ignore
/// let channel = grpc_client::create_channel_lazy("http://127.0.0.1:50051")?;
/// let app = gateway_router(channel, Duration::from_secs(30));
/// ```
pub fn gateway_router(channel: Channel, request_timeout: Duration) -> Router {
    let client = ToDoServiceClient::with_interceptor(channel, TracingInterceptor::new());
    let state = GatewayState::new(client, request_timeout);

    Router::new()
        .route("/v1/entities", post(gateway::create))
        .route("/v1/entities/all", get(gateway::read_all))
        .route(
            "/v1/entities/{id}",
            get(gateway::read).put(gateway::update).delete(gateway::delete),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_gateway_routes() {
        let doc = ToDoApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| *p == "/v1/entities"));
        assert!(paths.iter().any(|p| *p == "/v1/entities/all"));
        assert!(paths.iter().any(|p| *p == "/v1/entities/{id}"));
    }
}
