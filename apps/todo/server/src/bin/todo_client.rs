//! Walks one ToDo through its lifecycle against a running server:
//! create, read, complete, list, delete.
//!
//! ```text
//! todo-client --server http://127.0.0.1:50051
//! ```

use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use core_config::{Environment, tracing::init_tracing};
use eyre::{Result, WrapErr, eyre};
use grpc_client::{ChannelConfig, TracingInterceptor, create_channel_with_config, datetime_to_timestamp};
use rpc::todo::v1::{
    CreateRequest, DeleteRequest, ReadAllRequest, ReadRequest, ToDo, UpdateRequest,
    to_do_service_client::ToDoServiceClient,
};
use tonic::Request;
use tracing::info;

const API_VERSION: &str = "v1";
const CALL_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(name = "todo-client", about = "Exercise v1.ToDoService end to end")]
struct Args {
    /// gRPC endpoint of the ToDo server
    #[arg(long, default_value = "http://127.0.0.1:50051")]
    server: String,
}

fn with_timeout<T>(message: T) -> Request<T> {
    let mut request = Request::new(message);
    request.set_timeout(CALL_TIMEOUT);
    request
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&Environment::Development);

    let channel_config = ChannelConfig::new().with_request_timeout(CALL_TIMEOUT);
    let channel = create_channel_with_config(args.server.clone(), channel_config)
        .await
        .wrap_err_with(|| format!("Failed to connect to {}", args.server))?;
    let mut client = ToDoServiceClient::with_interceptor(channel, TracingInterceptor::new());

    let now = datetime_to_timestamp(Utc::now())?;
    let reminder = datetime_to_timestamp(Utc::now() + chrono::Duration::hours(1))?;
    let todo = ToDo {
        id: 0,
        title: "title".to_string(),
        description: "description".to_string(),
        reminder: Some(reminder),
        status: "Started".to_string(),
        estimated_time_of_completion: Some(now),
        actual_time_of_completion: Some(now),
    };

    let created = client
        .create(with_timeout(CreateRequest {
            api: API_VERSION.to_string(),
            to_do: Some(todo),
        }))
        .await
        .wrap_err("Create failed")?
        .into_inner();
    info!(id = created.id, "Create result");
    let id = created.id;

    let read = client
        .read(with_timeout(ReadRequest {
            api: API_VERSION.to_string(),
            id,
        }))
        .await
        .wrap_err("Read failed")?
        .into_inner();
    info!(todo = ?read.to_do, "Read result");

    let mut completed = read.to_do.ok_or_else(|| eyre!("Read returned no ToDo"))?;
    completed.status = "Completed".to_string();
    completed.description = format!("{} (updated)", completed.description);

    let updated = client
        .update(with_timeout(UpdateRequest {
            api: API_VERSION.to_string(),
            to_do: Some(completed),
        }))
        .await
        .wrap_err("Update failed")?
        .into_inner();
    info!(updated = updated.updated, "Update result");

    let all = client
        .read_all(with_timeout(ReadAllRequest {
            api: API_VERSION.to_string(),
        }))
        .await
        .wrap_err("ReadAll failed")?
        .into_inner();
    info!(count = all.to_dos.len(), "ReadAll result");
    for todo in &all.to_dos {
        info!(id = todo.id, title = %todo.title, status = %todo.status, "ToDo");
    }

    let deleted = client
        .delete(with_timeout(DeleteRequest {
            api: API_VERSION.to_string(),
            id,
        }))
        .await
        .wrap_err("Delete failed")?
        .into_inner();
    info!(deleted = deleted.deleted, "Delete result");

    Ok(())
}
