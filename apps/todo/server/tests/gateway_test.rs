//! HTTP gateway in front of a real gRPC server backed by the in-memory store.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use domain_todos::{InMemoryProvider, ToDoService, gateway_router};
use grpc_client::create_channel_lazy;
use grpc_client::server::ServerConfig;
use http_body_util::BodyExt;
use rpc::todo::v1::{ReadAllRequest, to_do_service_client::ToDoServiceClient};
use serde_json::{Value, json};
use todo_server::todo_grpc_service;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::Code;
use tonic::transport::Server;
use tower::ServiceExt;

async fn spawn_server(provider: InMemoryProvider) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let service = todo_grpc_service(ToDoService::new(provider), &ServerConfig::default());

    tokio::spawn(async move {
        Server::builder()
            .add_service(service)
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .unwrap();
    });
    addr
}

async fn gateway(provider: InMemoryProvider) -> Router {
    let addr = spawn_server(provider).await;
    let channel = create_channel_lazy(format!("http://{addr}")).unwrap();
    gateway_router(channel, Duration::from_secs(5))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn todo_body(status: &str) -> Value {
    json!({
        "title": "title",
        "description": "description",
        "reminder": "2022-04-15T08:00:00Z",
        "status": status,
        "estimatedTimeOfCompletion": "2022-04-16T08:00:00.123456789Z",
        "actualTimeOfCompletion": "2022-04-16T09:00:00Z"
    })
}

#[tokio::test]
async fn test_lifecycle_over_http() {
    let app = gateway(InMemoryProvider::new()).await;

    let (status, created) = send(
        &app,
        "POST",
        "/v1/entities",
        Some(json!({ "api": "v1", "toDo": todo_body("Started") })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["api"], "v1");
    assert_eq!(created["id"], "1");

    let (status, read) = send(&app, "GET", "/v1/entities/1?api=v1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read["toDo"]["id"], "1");
    assert_eq!(read["toDo"]["title"], "title");
    assert_eq!(read["toDo"]["status"], "Started");

    let (status, updated) = send(
        &app,
        "PUT",
        "/v1/entities/1",
        Some(json!({ "api": "v1", "toDo": todo_body("Completed") })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["updated"], "1");

    let (status, all) = send(&app, "GET", "/v1/entities/all?api=v1", None).await;
    assert_eq!(status, StatusCode::OK);
    let todos = all["toDos"].as_array().unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0]["status"], "Completed");
    assert_eq!(
        todos[0]["actualTimeOfCompletion"].as_str().unwrap(),
        "2020-02-27T03:15:45.000034567Z"
    );

    let (status, deleted) = send(&app, "DELETE", "/v1/entities/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["deleted"], "1");

    let (status, missing) = send(&app, "GET", "/v1/entities/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing["message"], "ToDo with ID='1' is not found");
}

#[tokio::test]
async fn test_unsupported_version_is_501_without_store_access() {
    let provider = InMemoryProvider::new();
    let app = gateway(provider.clone()).await;

    let (status, body) = send(&app, "GET", "/v1/entities/all?api=v2", None).await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(
        body["message"],
        "unsupported API version: service implements API version 'v1', but asked for 'v2'"
    );
    assert_eq!(provider.stats().acquired, 0);
}

#[tokio::test]
async fn test_bad_input_is_400() {
    let app = gateway(InMemoryProvider::new()).await;

    let (status, _) = send(&app, "GET", "/v1/entities/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method("POST")
        .uri("/v1/entities")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "POST", "/v1/entities", Some(json!({ "api": "v1" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "missing ToDo entity");
}

#[tokio::test]
async fn test_database_unavailable_is_503() {
    let provider = InMemoryProvider::new();
    provider.fail_acquire("connection refused");
    let app = gateway(provider).await;

    let (status, body) = send(&app, "GET", "/v1/entities/all", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .starts_with("failed to connect to database -> ")
    );
}

#[tokio::test]
async fn test_put_path_id_overrides_body_id() {
    let provider = InMemoryProvider::new();
    let app = gateway(provider.clone()).await;

    let (status, _) = send(
        &app,
        "POST",
        "/v1/entities",
        Some(json!({ "toDo": todo_body("Started") })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let mut body = todo_body("Started");
    body["id"] = json!("42");
    body["title"] = json!("renamed");
    let (status, updated) = send(
        &app,
        "PUT",
        "/v1/entities/1",
        Some(json!({ "api": "v1", "toDo": body })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["updated"], "1");
    assert_eq!(provider.rows()[0].title, "renamed");
}

#[tokio::test]
async fn test_empty_store_lists_no_todos() {
    let app = gateway(InMemoryProvider::new()).await;

    let (status, body) = send(&app, "GET", "/v1/entities/all", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["api"], "v1");
    assert_eq!(body["toDos"], json!([]));
}

#[tokio::test]
async fn test_expired_grpc_timeout_is_deadline_exceeded() {
    let provider = InMemoryProvider::new();
    provider.with_latency(Duration::from_secs(2));
    let addr = spawn_server(provider).await;

    let channel = create_channel_lazy(format!("http://{addr}")).unwrap();
    let mut client = ToDoServiceClient::new(channel);
    let mut request = tonic::Request::new(ReadAllRequest { api: "v1".into() });
    request.set_timeout(Duration::from_millis(300));

    let status = client.read_all(request).await.unwrap_err();
    assert_eq!(status.code(), Code::DeadlineExceeded);
}
