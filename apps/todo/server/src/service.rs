//! gRPC binding of [`ToDoService`].
//!
//! Each method decodes the request, derives a [`CallContext`] from the
//! caller's `grpc-timeout`, calls the domain service and logs the outcome
//! with a level chosen by status code.

use std::time::{Duration, Instant};

use domain_todos::{
    API_VERSION, CallContext, ConnectionProvider, ToDoError, ToDoResult, ToDoService,
};
use grpc_client::{interceptors::request_id, server::request_timeout};
use rpc::todo::v1::{
    CreateRequest, CreateResponse, DeleteRequest, DeleteResponse, ReadAllRequest, ReadAllResponse,
    ReadRequest, ReadResponse, UpdateRequest, UpdateResponse, to_do_service_server::ToDoService as ToDoRpc,
};
use tonic::{Code, Request, Response, Status};
use tracing::{debug, error, info, warn};

pub struct ToDoServiceImpl<P: ConnectionProvider> {
    service: ToDoService<P>,
}

impl<P: ConnectionProvider> ToDoServiceImpl<P> {
    pub fn new(service: ToDoService<P>) -> Self {
        Self { service }
    }
}

/// Bookkeeping for one inbound call.
struct Call {
    method: &'static str,
    request_id: Option<String>,
    started: Instant,
}

/// Upper bound on how early the service gives up ahead of `grpc-timeout`.
const MAX_DEADLINE_MARGIN: Duration = Duration::from_millis(50);

/// Budget for the service itself: the caller's timeout minus a margin, so the
/// handler returns DEADLINE_EXCEEDED before the transport's own timer answers
/// CANCELLED.
fn service_budget(timeout: Duration) -> Duration {
    let margin = (timeout / 10).min(MAX_DEADLINE_MARGIN);
    timeout.saturating_sub(margin)
}

impl Call {
    fn begin<T>(method: &'static str, request: &Request<T>) -> (Self, CallContext) {
        let ctx = match request_timeout(request.metadata()) {
            Some(timeout) => CallContext::new().with_timeout(service_budget(timeout)),
            None => CallContext::new(),
        };
        let call = Self {
            method,
            request_id: request_id(request.metadata()).map(str::to_owned),
            started: Instant::now(),
        };
        (call, ctx)
    }

    fn finish<T>(self, result: ToDoResult<T>) -> Result<Response<T>, Status> {
        match result {
            Ok(body) => {
                log_outcome(&self, Code::Ok, "");
                Ok(Response::new(body))
            }
            Err(err) => {
                let status = Status::from(err);
                log_outcome(&self, status.code(), status.message());
                Err(status)
            }
        }
    }
}

fn log_outcome(call: &Call, code: Code, message: &str) {
    let method = call.method;
    let request_id = call.request_id.as_deref().unwrap_or("-");
    let elapsed_ms = call.started.elapsed().as_millis() as u64;

    match code {
        Code::Ok => debug!(method, request_id, elapsed_ms, code = ?code, "gRPC call finished"),
        Code::Cancelled
        | Code::InvalidArgument
        | Code::NotFound
        | Code::AlreadyExists
        | Code::Unauthenticated => {
            info!(method, request_id, elapsed_ms, code = ?code, message, "gRPC call finished")
        }
        Code::DeadlineExceeded
        | Code::Unavailable
        | Code::PermissionDenied
        | Code::ResourceExhausted
        | Code::FailedPrecondition
        | Code::Aborted
        | Code::OutOfRange => {
            warn!(method, request_id, elapsed_ms, code = ?code, message, "gRPC call finished")
        }
        Code::Unknown | Code::Unimplemented | Code::Internal | Code::DataLoss => {
            error!(method, request_id, elapsed_ms, code = ?code, message, "gRPC call finished")
        }
    }
}

/// Row counts travel as int64.
fn row_count(rows: u64) -> i64 {
    i64::try_from(rows).unwrap_or(i64::MAX)
}

#[tonic::async_trait]
impl<P: ConnectionProvider> ToDoRpc for ToDoServiceImpl<P> {
    async fn create(&self, request: Request<CreateRequest>) -> Result<Response<CreateResponse>, Status> {
        let (call, ctx) = Call::begin("Create", &request);
        let req = request.into_inner();

        let result = self
            .service
            .create(&ctx, &req.api, req.to_do.map(Into::into))
            .await
            .map(|id| CreateResponse {
                api: API_VERSION.to_string(),
                id,
            });
        call.finish(result)
    }

    async fn read(&self, request: Request<ReadRequest>) -> Result<Response<ReadResponse>, Status> {
        let (call, ctx) = Call::begin("Read", &request);
        let req = request.into_inner();

        let result = self
            .service
            .read(&ctx, &req.api, req.id)
            .await
            .map(|todo| ReadResponse {
                api: API_VERSION.to_string(),
                to_do: Some(todo.into()),
            });
        call.finish(result)
    }

    async fn update(&self, request: Request<UpdateRequest>) -> Result<Response<UpdateResponse>, Status> {
        let (call, ctx) = Call::begin("Update", &request);
        let req = request.into_inner();

        let result = self
            .service
            .update(&ctx, &req.api, req.to_do.map(Into::into))
            .await
            .map(|rows| UpdateResponse {
                api: API_VERSION.to_string(),
                updated: row_count(rows),
            });
        call.finish(result)
    }

    async fn delete(&self, request: Request<DeleteRequest>) -> Result<Response<DeleteResponse>, Status> {
        let (call, ctx) = Call::begin("Delete", &request);
        let req = request.into_inner();

        let result = self
            .service
            .delete(&ctx, &req.api, req.id)
            .await
            .map(|rows| DeleteResponse {
                api: API_VERSION.to_string(),
                deleted: row_count(rows),
            });
        call.finish(result)
    }

    async fn read_all(&self, request: Request<ReadAllRequest>) -> Result<Response<ReadAllResponse>, Status> {
        let (call, ctx) = Call::begin("ReadAll", &request);
        let req = request.into_inner();

        let result: Result<ReadAllResponse, ToDoError> = self
            .service
            .read_all(&ctx, &req.api)
            .await
            .map(|todos| ReadAllResponse {
                api: API_VERSION.to_string(),
                to_dos: todos.into_iter().map(Into::into).collect(),
            });
        call.finish(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_todos::InMemoryProvider;
    use prost_types::Timestamp;
    use rpc::todo::v1::ToDo;

    fn rpc() -> (ToDoServiceImpl<InMemoryProvider>, InMemoryProvider) {
        let provider = InMemoryProvider::new();
        (ToDoServiceImpl::new(ToDoService::new(provider.clone())), provider)
    }

    fn todo(status: &str) -> ToDo {
        let ts = Timestamp {
            seconds: 1_650_000_000,
            nanos: 0,
        };
        ToDo {
            id: 0,
            title: "title".into(),
            description: "description".into(),
            reminder: Some(ts),
            status: status.into(),
            estimated_time_of_completion: Some(ts),
            actual_time_of_completion: None,
        }
    }

    fn create_request(api: &str, to_do: Option<ToDo>) -> Request<CreateRequest> {
        Request::new(CreateRequest {
            api: api.into(),
            to_do,
        })
    }

    #[tokio::test]
    async fn test_create_and_read_carry_api_version() {
        let (rpc, _) = rpc();

        let created = rpc
            .create(create_request("", Some(todo("Started"))))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(created.api, "v1");
        assert_eq!(created.id, 1);

        let read = rpc
            .read(Request::new(ReadRequest {
                api: "v1".into(),
                id: created.id,
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(read.api, "v1");
        let read = read.to_do.unwrap();
        assert_eq!(read.title, "title");
        assert_eq!(read.actual_time_of_completion, read.estimated_time_of_completion);
    }

    #[tokio::test]
    async fn test_update_delete_and_read_all_counts() {
        let (rpc, _) = rpc();
        let id = rpc
            .create(create_request("v1", Some(todo("Started"))))
            .await
            .unwrap()
            .into_inner()
            .id;

        let mut completed = todo("Completed");
        completed.id = id;
        let updated = rpc
            .update(Request::new(UpdateRequest {
                api: "v1".into(),
                to_do: Some(completed),
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(updated.updated, 1);

        let all = rpc
            .read_all(Request::new(ReadAllRequest { api: "v1".into() }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(all.to_dos.len(), 1);
        assert_eq!(
            all.to_dos[0].actual_time_of_completion,
            Some(Timestamp {
                seconds: 1_582_773_345,
                nanos: 34_567
            })
        );

        let deleted = rpc
            .delete(Request::new(DeleteRequest {
                api: "v1".into(),
                id,
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(deleted.deleted, 1);
    }

    #[tokio::test]
    async fn test_errors_map_to_status_codes() {
        let (rpc, provider) = rpc();

        let status = rpc.create(create_request("v2", Some(todo("x")))).await.unwrap_err();
        assert_eq!(status.code(), Code::Unimplemented);
        assert_eq!(
            status.message(),
            "unsupported API version: service implements API version 'v1', but asked for 'v2'"
        );

        let status = rpc.create(create_request("v1", None)).await.unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);

        let status = rpc
            .read(Request::new(ReadRequest {
                api: "v1".into(),
                id: 5,
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::NotFound);
        assert_eq!(status.message(), "ToDo with ID='5' is not found");

        provider.fail_acquire("too many clients");
        let status = rpc
            .read_all(Request::new(ReadAllRequest { api: "v1".into() }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::Unavailable);
    }

    #[tokio::test]
    async fn test_empty_read_all_is_empty_list() {
        let (rpc, _) = rpc();
        let all = rpc
            .read_all(Request::new(ReadAllRequest::default()))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(all.api, "v1");
        assert!(all.to_dos.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_grpc_timeout_header_bounds_the_call() {
        let (rpc, provider) = rpc();
        provider.with_latency(Duration::from_secs(10));

        let mut request = Request::new(ReadAllRequest { api: "v1".into() });
        request
            .metadata_mut()
            .insert(grpc_client::server::GRPC_TIMEOUT_HEADER, "100m".parse().unwrap());

        let status = rpc.read_all(request).await.unwrap_err();
        assert_eq!(status.code(), Code::DeadlineExceeded);
    }

    #[test]
    fn test_service_budget_ends_before_caller_timeout() {
        assert_eq!(service_budget(Duration::from_millis(100)), Duration::from_millis(90));
        assert_eq!(service_budget(Duration::from_secs(5)), Duration::from_millis(4_950));
        assert_eq!(service_budget(Duration::ZERO), Duration::ZERO);
        assert!(service_budget(Duration::from_millis(1)) < Duration::from_millis(1));
    }
}
