use std::future::Future;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::HeaderMap,
};
use axum_helpers::{AppError, ErrorResponse};
use grpc_client::REQUEST_ID_HEADER;
use rpc::todo::v1 as proto;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::{Response, Status};

use super::GatewayState;
use super::json::{
    ApiVersionQuery, CreateToDoRequest, CreateToDoResponse, DeleteToDoResponse,
    ReadAllToDoResponse, ReadToDoResponse, ToDoJson, UpdateToDoRequest, UpdateToDoResponse,
};
use crate::error::ToDoError;

impl GatewayState {
    /// Forward one call upstream, bounded by the gateway timeout.
    ///
    /// The timeout also travels as `grpc-timeout`, so the server abandons the
    /// call on its side too.
    async fn forward<Req, Resp, F, Fut>(
        &self,
        headers: &HeaderMap,
        message: Req,
        method: F,
    ) -> Result<Resp, AppError>
    where
        F: FnOnce(super::GatewayClient, tonic::Request<Req>) -> Fut,
        Fut: Future<Output = Result<Response<Resp>, Status>>,
    {
        let mut request = tonic::Request::new(message);
        request.set_timeout(self.request_timeout);

        let request_id: Option<MetadataValue<Ascii>> = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok());
        if let Some(request_id) = request_id {
            request.metadata_mut().insert(REQUEST_ID_HEADER, request_id);
        }

        match tokio::time::timeout(self.request_timeout, method(self.client.clone(), request)).await
        {
            Ok(Ok(response)) => Ok(response.into_inner()),
            Ok(Err(status)) => {
                tracing::debug!(code = ?status.code(), message = status.message(), "Upstream call failed");
                Err(ToDoError::from(status).into())
            }
            Err(_) => Err(AppError::GatewayTimeout(format!(
                "no response from the ToDo service within {}s",
                self.request_timeout.as_secs()
            ))),
        }
    }
}

fn optional_wire(todo: Option<ToDoJson>) -> Result<Option<proto::ToDo>, AppError> {
    todo.map(proto::ToDo::try_from).transpose()
}

/// Create a ToDo
#[utoipa::path(
    post,
    path = "/v1/entities",
    tag = "todos",
    request_body = CreateToDoRequest,
    responses(
        (status = 200, description = "ToDo created", body = CreateToDoResponse),
        (status = 400, description = "Malformed timestamp or missing toDo", body = ErrorResponse),
        (status = 501, description = "Unsupported API version", body = ErrorResponse),
        (status = 503, description = "Database unavailable", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn create(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Result<Json<CreateToDoRequest>, JsonRejection>,
) -> Result<Json<CreateToDoResponse>, AppError> {
    let Json(body) = body?;
    let message = proto::CreateRequest {
        api: body.api,
        to_do: optional_wire(body.to_do)?,
    };

    let response = state
        .forward(&headers, message, |mut client, request| async move {
            client.create(request).await
        })
        .await?;

    Ok(Json(CreateToDoResponse {
        api: response.api,
        id: response.id,
    }))
}

/// Read a ToDo by id
#[utoipa::path(
    get,
    path = "/v1/entities/{id}",
    tag = "todos",
    params(
        ("id" = String, Path, description = "ToDo ID"),
        ApiVersionQuery
    ),
    responses(
        (status = 200, description = "ToDo found", body = ReadToDoResponse),
        (status = 404, description = "ToDo not found", body = ErrorResponse),
        (status = 501, description = "Unsupported API version", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn read(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    id: Result<Path<i64>, PathRejection>,
    query: Result<Query<ApiVersionQuery>, QueryRejection>,
) -> Result<Json<ReadToDoResponse>, AppError> {
    let Path(id) = id?;
    let Query(query) = query?;
    let message = proto::ReadRequest { api: query.api, id };

    let response = state
        .forward(&headers, message, |mut client, request| async move {
            client.read(request).await
        })
        .await?;

    Ok(Json(ReadToDoResponse {
        api: response.api,
        to_do: response.to_do.map(ToDoJson::try_from).transpose()?,
    }))
}

/// Replace a ToDo
///
/// A status of `Completed` stamps the fixed completion time.
#[utoipa::path(
    put,
    path = "/v1/entities/{id}",
    tag = "todos",
    params(
        ("id" = String, Path, description = "ToDo ID")
    ),
    request_body = UpdateToDoRequest,
    responses(
        (status = 200, description = "ToDo updated", body = UpdateToDoResponse),
        (status = 400, description = "Malformed timestamp or missing toDo", body = ErrorResponse),
        (status = 404, description = "ToDo not found", body = ErrorResponse),
        (status = 501, description = "Unsupported API version", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn update(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateToDoRequest>, JsonRejection>,
) -> Result<Json<UpdateToDoResponse>, AppError> {
    let Path(id) = id?;
    let Json(body) = body?;
    let to_do = optional_wire(body.to_do)?.map(|todo| proto::ToDo { id, ..todo });
    let message = proto::UpdateRequest {
        api: body.api,
        to_do,
    };

    let response = state
        .forward(&headers, message, |mut client, request| async move {
            client.update(request).await
        })
        .await?;

    Ok(Json(UpdateToDoResponse {
        api: response.api,
        updated: response.updated,
    }))
}

/// Delete a ToDo
#[utoipa::path(
    delete,
    path = "/v1/entities/{id}",
    tag = "todos",
    params(
        ("id" = String, Path, description = "ToDo ID"),
        ApiVersionQuery
    ),
    responses(
        (status = 200, description = "ToDo deleted", body = DeleteToDoResponse),
        (status = 404, description = "ToDo not found", body = ErrorResponse),
        (status = 501, description = "Unsupported API version", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn delete(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    id: Result<Path<i64>, PathRejection>,
    query: Result<Query<ApiVersionQuery>, QueryRejection>,
) -> Result<Json<DeleteToDoResponse>, AppError> {
    let Path(id) = id?;
    let Query(query) = query?;
    let message = proto::DeleteRequest { api: query.api, id };

    let response = state
        .forward(&headers, message, |mut client, request| async move {
            client.delete(request).await
        })
        .await?;

    Ok(Json(DeleteToDoResponse {
        api: response.api,
        deleted: response.deleted,
    }))
}

/// List every ToDo
#[utoipa::path(
    get,
    path = "/v1/entities/all",
    tag = "todos",
    params(ApiVersionQuery),
    responses(
        (status = 200, description = "All ToDos", body = ReadAllToDoResponse),
        (status = 501, description = "Unsupported API version", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn read_all(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    query: Result<Query<ApiVersionQuery>, QueryRejection>,
) -> Result<Json<ReadAllToDoResponse>, AppError> {
    let Query(query) = query?;
    let message = proto::ReadAllRequest { api: query.api };

    let response = state
        .forward(&headers, message, |mut client, request| async move {
            client.read_all(request).await
        })
        .await?;

    let to_dos = response
        .to_dos
        .into_iter()
        .map(ToDoJson::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(ReadAllToDoResponse {
        api: response.api,
        to_dos,
    }))
}
