use tonic::metadata::MetadataMap;
use tonic::{Request, Status};

/// Metadata key carrying the correlation id between gateway, clients and server.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Client interceptor that stamps every outgoing call with an `x-request-id`.
///
/// A request that already carries an id keeps it, so the gateway can forward
/// the id it received over HTTP.
///
/// # Example
/// ```ignore
/// use grpc_client::TracingInterceptor;
/// use rpc::todo::v1::to_do_service_client::ToDoServiceClient;
///
/// let channel = grpc_client::create_channel_lazy("http://127.0.0.1:50051")?;
/// let client = ToDoServiceClient::with_interceptor(channel, TracingInterceptor::new());
/// ```
#[derive(Clone, Debug, Default)]
pub struct TracingInterceptor;

impl TracingInterceptor {
    pub fn new() -> Self {
        Self
    }
}

impl tonic::service::Interceptor for TracingInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        let request_id = match request_id(request.metadata()) {
            Some(existing) => existing.to_string(),
            None => {
                let generated = uuid::Uuid::new_v4().to_string();
                let value = generated
                    .parse()
                    .map_err(|_| Status::internal("Failed to create request ID"))?;
                request.metadata_mut().insert(REQUEST_ID_HEADER, value);
                generated
            }
        };

        tracing::debug!(
            target: "grpc_client",
            request_id = %request_id,
            "Outgoing gRPC request"
        );

        Ok(request)
    }
}

/// Read the correlation id from request metadata, if present and ASCII.
pub fn request_id(metadata: &MetadataMap) -> Option<&str> {
    metadata
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
}
