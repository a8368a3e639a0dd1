use chrono::{DateTime, Utc};
use prost_types::Timestamp;

/// API version implemented by this service.
pub const API_VERSION: &str = "v1";

/// Status that makes Update stamp [`completion_time`] into `actualTimeOfCompletion`.
pub const COMPLETED_STATUS: &str = "Completed";

const COMPLETION_SECONDS: i64 = 1_582_773_345;
const COMPLETION_NANOS: u32 = 34_567;

/// Fixed completion instant, `2020-02-27T03:15:45.000034567Z`.
///
/// Update writes this value, not the current time, whenever the incoming
/// status is [`COMPLETED_STATUS`].
pub fn completion_time() -> DateTime<Utc> {
    DateTime::from_timestamp(COMPLETION_SECONDS, COMPLETION_NANOS).unwrap_or(DateTime::UNIX_EPOCH)
}

/// A ToDo as callers see it: timestamps stay in wire form until the
/// service validates them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToDo {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: String,
    pub reminder: Option<Timestamp>,
    pub estimated_time_of_completion: Option<Timestamp>,
    pub actual_time_of_completion: Option<Timestamp>,
}

/// A persisted row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToDoRecord {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: String,
    pub estimated_time_of_completion: DateTime<Utc>,
    pub actual_time_of_completion: DateTime<Utc>,
    pub reminder: DateTime<Utc>,
}

/// A row to insert; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewToDoRecord {
    pub title: String,
    pub description: String,
    pub status: String,
    pub estimated_time_of_completion: DateTime<Utc>,
    pub actual_time_of_completion: DateTime<Utc>,
    pub reminder: DateTime<Utc>,
}

impl NewToDoRecord {
    pub fn with_id(self, id: i64) -> ToDoRecord {
        ToDoRecord {
            id,
            title: self.title,
            description: self.description,
            status: self.status,
            estimated_time_of_completion: self.estimated_time_of_completion,
            actual_time_of_completion: self.actual_time_of_completion,
            reminder: self.reminder,
        }
    }
}

impl From<rpc::todo::v1::ToDo> for ToDo {
    fn from(proto: rpc::todo::v1::ToDo) -> Self {
        Self {
            id: proto.id,
            title: proto.title,
            description: proto.description,
            status: proto.status,
            reminder: proto.reminder,
            estimated_time_of_completion: proto.estimated_time_of_completion,
            actual_time_of_completion: proto.actual_time_of_completion,
        }
    }
}

impl From<ToDo> for rpc::todo::v1::ToDo {
    fn from(todo: ToDo) -> Self {
        Self {
            id: todo.id,
            title: todo.title,
            description: todo.description,
            reminder: todo.reminder,
            status: todo.status,
            estimated_time_of_completion: todo.estimated_time_of_completion,
            actual_time_of_completion: todo.actual_time_of_completion,
        }
    }
}
