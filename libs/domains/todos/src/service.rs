use std::sync::Arc;

use chrono::{DateTime, Utc};
use grpc_client::conversions::{datetime_to_timestamp, required_timestamp_to_datetime};
use prost_types::Timestamp;
use tracing::instrument;

use crate::context::CallContext;
use crate::error::{ToDoError, ToDoResult};
use crate::models::{
    API_VERSION, COMPLETED_STATUS, NewToDoRecord, ToDo, ToDoRecord, completion_time,
};
use crate::store::{ConnectionProvider, StoreConnection};

/// Stateless ToDo operations over a [`ConnectionProvider`].
///
/// Every operation checks the API version, acquires one connection, and
/// releases it before returning. Errors leave the connection to be dropped,
/// which rolls back whatever it did.
pub struct ToDoService<P: ConnectionProvider> {
    provider: Arc<P>,
}

impl<P: ConnectionProvider> Clone for ToDoService<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<P: ConnectionProvider> ToDoService<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Store a new ToDo and return its id.
    ///
    /// `actualTimeOfCompletion` starts out equal to `estimatedTimeOfCompletion`.
    #[instrument(skip(self, ctx, todo), fields(todo_id = tracing::field::Empty))]
    pub async fn create(&self, ctx: &CallContext, api: &str, todo: Option<ToDo>) -> ToDoResult<i64> {
        check_api(api)?;
        let todo = required(todo)?;
        let conn = self.connect(ctx).await?;

        let reminder = required_timestamp_to_datetime(todo.reminder.as_ref()).map_err(|e| {
            ToDoError::InvalidArgument(format!("reminder field has invalid format -> {e}"))
        })?;
        let estimated = required_timestamp_to_datetime(todo.estimated_time_of_completion.as_ref())
            .map_err(|e| {
                ToDoError::InvalidArgument(format!(
                    "estimatedTimeOfCompletion has invalid format -> {e}"
                ))
            })?;

        let record = NewToDoRecord {
            title: todo.title,
            description: todo.description,
            status: todo.status,
            estimated_time_of_completion: estimated,
            actual_time_of_completion: estimated,
            reminder,
        };

        let outcome = ctx
            .run(conn.insert(record))
            .await?
            .map_err(|e| ToDoError::Internal(format!("failed to insert into ToDo -> {e}")))?;
        let id = outcome.last_insert_id.ok_or_else(|| {
            ToDoError::Internal(
                "failed to retrieve id for created ToDo -> store reported no generated id".into(),
            )
        })?;

        tracing::Span::current().record("todo_id", id);
        finish(ctx, conn, id).await
    }

    #[instrument(skip(self, ctx), fields(todo_id = id))]
    pub async fn read(&self, ctx: &CallContext, api: &str, id: i64) -> ToDoResult<ToDo> {
        check_api(api)?;
        let conn = self.connect(ctx).await?;

        let rows = ctx
            .run(conn.find_by_id(id))
            .await?
            .map_err(|e| ToDoError::Internal(format!("failed to select from ToDo -> {e}")))?;

        let record = match <[ToDoRecord; 1]>::try_from(rows) {
            Ok([record]) => record,
            Err(rows) if rows.is_empty() => return Err(not_found(id)),
            Err(_) => {
                return Err(ToDoError::Internal(format!(
                    "found multiple ToDo rows with ID='{id}'"
                )));
            }
        };

        let todo = to_wire(record)?;
        finish(ctx, conn, todo).await
    }

    /// Replace every field of an existing ToDo and return the number of rows
    /// updated.
    ///
    /// When the status is `"Completed"` the caller's `actualTimeOfCompletion`
    /// is ignored and [`completion_time`] is stored instead.
    #[instrument(skip(self, ctx, todo), fields(todo_id = todo.as_ref().map(|t| t.id)))]
    pub async fn update(&self, ctx: &CallContext, api: &str, todo: Option<ToDo>) -> ToDoResult<u64> {
        check_api(api)?;
        let todo = required(todo)?;
        let conn = self.connect(ctx).await?;

        let estimated = required_timestamp_to_datetime(todo.estimated_time_of_completion.as_ref())
            .map_err(|e| {
                ToDoError::InvalidArgument(format!(
                    "estimatedTimeOfCompletion field has invalid format -> {e}"
                ))
            })?;
        let reminder = required_timestamp_to_datetime(todo.reminder.as_ref()).map_err(|e| {
            ToDoError::InvalidArgument(format!("reminder field has invalid format -> {e}"))
        })?;
        let actual = if todo.status == COMPLETED_STATUS {
            completion_time()
        } else {
            required_timestamp_to_datetime(todo.actual_time_of_completion.as_ref()).map_err(
                |e| {
                    ToDoError::InvalidArgument(format!(
                        "actualTimeOfCompletion field has invalid format -> {e}"
                    ))
                },
            )?
        };

        let id = todo.id;
        let record = ToDoRecord {
            id,
            title: todo.title,
            description: todo.description,
            status: todo.status,
            estimated_time_of_completion: estimated,
            actual_time_of_completion: actual,
            reminder,
        };

        let outcome = ctx
            .run(conn.update(record))
            .await?
            .map_err(|e| ToDoError::Internal(format!("failed to update ToDo -> {e}")))?;
        if outcome.rows_affected == 0 {
            return Err(not_found(id));
        }

        finish(ctx, conn, outcome.rows_affected).await
    }

    /// Remove a ToDo and return the number of rows deleted.
    #[instrument(skip(self, ctx), fields(todo_id = id))]
    pub async fn delete(&self, ctx: &CallContext, api: &str, id: i64) -> ToDoResult<u64> {
        check_api(api)?;
        let conn = self.connect(ctx).await?;

        let outcome = ctx
            .run(conn.delete(id))
            .await?
            .map_err(|e| ToDoError::Internal(format!("failed to delete ToDo -> {e}")))?;
        if outcome.rows_affected == 0 {
            return Err(not_found(id));
        }

        finish(ctx, conn, outcome.rows_affected).await
    }

    /// Every ToDo, ordered by the store. Empty when there are none.
    #[instrument(skip(self, ctx))]
    pub async fn read_all(&self, ctx: &CallContext, api: &str) -> ToDoResult<Vec<ToDo>> {
        check_api(api)?;
        let conn = self.connect(ctx).await?;

        let rows = ctx
            .run(conn.find_all())
            .await?
            .map_err(|e| ToDoError::Internal(format!("failed to select from ToDo -> {e}")))?;
        let todos = rows.into_iter().map(to_wire).collect::<ToDoResult<Vec<_>>>()?;

        finish(ctx, conn, todos).await
    }

    async fn connect(&self, ctx: &CallContext) -> ToDoResult<P::Connection> {
        ctx.run(self.provider.acquire())
            .await?
            .map_err(|e| ToDoError::Unavailable(format!("failed to connect to database -> {e}")))
    }
}

/// Commit the connection and pass `value` through.
async fn finish<C: StoreConnection, T>(ctx: &CallContext, mut conn: C, value: T) -> ToDoResult<T> {
    ctx.run(conn.release())
        .await?
        .map_err(|e| ToDoError::Internal(format!("failed to release database connection -> {e}")))?;
    Ok(value)
}

fn check_api(api: &str) -> ToDoResult<()> {
    if !api.is_empty() && api != API_VERSION {
        return Err(ToDoError::Unimplemented(format!(
            "unsupported API version: service implements API version '{API_VERSION}', but asked for '{api}'"
        )));
    }
    Ok(())
}

fn required(todo: Option<ToDo>) -> ToDoResult<ToDo> {
    todo.ok_or_else(|| ToDoError::InvalidArgument("missing ToDo entity".into()))
}

fn not_found(id: i64) -> ToDoError {
    ToDoError::NotFound(format!("ToDo with ID='{id}' is not found"))
}

fn to_wire(record: ToDoRecord) -> ToDoResult<ToDo> {
    Ok(ToDo {
        id: record.id,
        reminder: Some(wire_timestamp(record.reminder, "reminder")?),
        estimated_time_of_completion: Some(wire_timestamp(
            record.estimated_time_of_completion,
            "estimatedTimeOfCompletion",
        )?),
        actual_time_of_completion: Some(wire_timestamp(
            record.actual_time_of_completion,
            "actualTimeOfCompletion",
        )?),
        title: record.title,
        description: record.description,
        status: record.status,
    })
}

fn wire_timestamp(value: DateTime<Utc>, field: &str) -> ToDoResult<Timestamp> {
    datetime_to_timestamp(value)
        .map_err(|e| ToDoError::Internal(format!("{field} field has invalid format -> {e}")))
}
