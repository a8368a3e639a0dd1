//! JSON bodies of the HTTP gateway.
//!
//! They follow the protobuf JSON mapping of the `v1` messages: camelCase
//! names, 64-bit integers as strings and timestamps as RFC 3339.

use axum_helpers::AppError;
use chrono::{DateTime, Utc};
use grpc_client::conversions::{datetime_to_timestamp, timestamp_to_datetime};
use prost_types::Timestamp;
use rpc::todo::v1 as proto;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// int64 written as a string, read from either a string or a number.
pub mod int64_string {
    use serde::{Deserialize, Deserializer, Serializer, de};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(i64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Ok(n),
            Repr::Text(s) => s.trim().parse().map_err(de::Error::custom),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ToDoJson {
    #[serde(with = "int64_string")]
    #[schema(value_type = String, example = "1")]
    pub id: i64,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder: Option<DateTime<Utc>>,
    #[schema(example = "Started")]
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_time_of_completion: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_time_of_completion: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateToDoRequest {
    #[schema(example = "v1")]
    pub api: String,
    pub to_do: Option<ToDoJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateToDoResponse {
    pub api: String,
    #[serde(with = "int64_string")]
    #[schema(value_type = String, example = "1")]
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadToDoResponse {
    pub api: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_do: Option<ToDoJson>,
}

/// Body of `PUT /v1/entities/{id}`; the path id replaces `toDo.id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateToDoRequest {
    #[schema(example = "v1")]
    pub api: String,
    pub to_do: Option<ToDoJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateToDoResponse {
    pub api: String,
    #[serde(with = "int64_string")]
    #[schema(value_type = String, example = "1")]
    pub updated: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteToDoResponse {
    pub api: String,
    #[serde(with = "int64_string")]
    #[schema(value_type = String, example = "1")]
    pub deleted: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadAllToDoResponse {
    pub api: String,
    #[serde(default)]
    pub to_dos: Vec<ToDoJson>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ApiVersionQuery {
    /// API version; empty means the current one
    #[serde(default)]
    #[param(example = "v1")]
    pub api: String,
}

impl TryFrom<ToDoJson> for proto::ToDo {
    type Error = AppError;

    fn try_from(json: ToDoJson) -> Result<Self, Self::Error> {
        Ok(Self {
            id: json.id,
            title: json.title,
            description: json.description,
            reminder: to_wire(json.reminder, "reminder")?,
            status: json.status,
            estimated_time_of_completion: to_wire(
                json.estimated_time_of_completion,
                "estimatedTimeOfCompletion",
            )?,
            actual_time_of_completion: to_wire(
                json.actual_time_of_completion,
                "actualTimeOfCompletion",
            )?,
        })
    }
}

impl TryFrom<proto::ToDo> for ToDoJson {
    type Error = AppError;

    fn try_from(todo: proto::ToDo) -> Result<Self, Self::Error> {
        Ok(Self {
            id: todo.id,
            title: todo.title,
            description: todo.description,
            reminder: from_wire(todo.reminder, "reminder")?,
            status: todo.status,
            estimated_time_of_completion: from_wire(
                todo.estimated_time_of_completion,
                "estimatedTimeOfCompletion",
            )?,
            actual_time_of_completion: from_wire(
                todo.actual_time_of_completion,
                "actualTimeOfCompletion",
            )?,
        })
    }
}

fn to_wire(value: Option<DateTime<Utc>>, field: &str) -> Result<Option<Timestamp>, AppError> {
    value
        .map(datetime_to_timestamp)
        .transpose()
        .map_err(|e| AppError::BadRequest(format!("{field} field has invalid format -> {e}")))
}

fn from_wire(value: Option<Timestamp>, field: &str) -> Result<Option<DateTime<Utc>>, AppError> {
    value
        .as_ref()
        .map(timestamp_to_datetime)
        .transpose()
        .map_err(|e| {
            AppError::InternalServerError(format!("{field} in upstream response is invalid -> {e}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_todo_uses_protobuf_json_names() {
        let todo = ToDoJson {
            id: 12,
            title: "t".into(),
            description: "d".into(),
            reminder: Some(DateTime::from_timestamp(1_582_773_345, 34_567).unwrap()),
            status: "Completed".into(),
            estimated_time_of_completion: None,
            actual_time_of_completion: None,
        };

        let value = serde_json::to_value(&todo).unwrap();
        assert_eq!(value["id"], json!("12"));
        assert_eq!(value["reminder"], json!("2020-02-27T03:15:45.000034567Z"));
        assert!(value.get("estimatedTimeOfCompletion").is_none());
    }

    #[test]
    fn test_int64_accepts_string_or_number() {
        let from_string: ToDoJson = serde_json::from_value(json!({"id": "7"})).unwrap();
        let from_number: ToDoJson = serde_json::from_value(json!({"id": 7})).unwrap();
        assert_eq!(from_string.id, 7);
        assert_eq!(from_number.id, 7);

        assert!(serde_json::from_value::<ToDoJson>(json!({"id": "seven"})).is_err());
    }

    #[test]
    fn test_create_request_reads_camel_case() {
        let body: CreateToDoRequest = serde_json::from_value(json!({
            "api": "v1",
            "toDo": {
                "title": "title",
                "estimatedTimeOfCompletion": "2024-05-01T10:00:00.5Z"
            }
        }))
        .unwrap();

        let todo = proto::ToDo::try_from(body.to_do.unwrap()).unwrap();
        assert_eq!(
            todo.estimated_time_of_completion,
            Some(Timestamp {
                seconds: 1_714_557_600,
                nanos: 500_000_000
            })
        );
        assert_eq!(todo.reminder, None);
    }

    #[test]
    fn test_read_all_serializes_empty_list() {
        let body = ReadAllToDoResponse {
            api: "v1".into(),
            to_dos: Vec::new(),
        };
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({"api": "v1", "toDos": []}));
    }

    #[test]
    fn test_invalid_upstream_timestamp_is_internal() {
        let todo = proto::ToDo {
            reminder: Some(Timestamp {
                seconds: 0,
                nanos: -5,
            }),
            ..Default::default()
        };
        let err = ToDoJson::try_from(todo).unwrap_err();
        assert!(matches!(err, AppError::InternalServerError(_)));
    }
}
