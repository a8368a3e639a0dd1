//! Connection provider capability the service is written against.
//!
//! A provider hands out one [`StoreConnection`] per call. A connection is a
//! unit of work: [`StoreConnection::release`] commits it and returns it to the
//! pool, and dropping it without releasing rolls the work back.

use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;

use crate::models::{NewToDoRecord, ToDoRecord};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No connection could be obtained, or it was lost
    #[error("{0}")]
    Connection(String),

    #[error("{0}")]
    Query(String),
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => StoreError::Connection(err.to_string()),
            other => StoreError::Query(other.to_string()),
        }
    }
}

/// Result of a statement that changes rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecOutcome {
    pub rows_affected: u64,
    /// Id generated by an insert, when the store reported one
    pub last_insert_id: Option<i64>,
}

impl ExecOutcome {
    pub fn affected(rows_affected: u64) -> Self {
        Self {
            rows_affected,
            last_insert_id: None,
        }
    }
}

#[async_trait]
pub trait ConnectionProvider: Send + Sync + 'static {
    type Connection: StoreConnection;

    async fn acquire(&self) -> Result<Self::Connection, StoreError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoreConnection: Send + Sync {
    async fn insert(&self, record: NewToDoRecord) -> Result<ExecOutcome, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Vec<ToDoRecord>, StoreError>;

    /// Replace every column except the id of the row with `record.id`.
    async fn update(&self, record: ToDoRecord) -> Result<ExecOutcome, StoreError>;

    async fn delete(&self, id: i64) -> Result<ExecOutcome, StoreError>;

    async fn find_all(&self) -> Result<Vec<ToDoRecord>, StoreError>;

    /// Commit and hand the connection back. Calling it again is a no-op.
    async fn release(&mut self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_errors_are_classified() {
        let query = StoreError::from(DbErr::Custom("syntax error".into()));
        assert!(matches!(query, StoreError::Query(ref msg) if msg.contains("syntax error")));

        let record = StoreError::from(DbErr::RecordNotFound("todo".into()));
        assert!(matches!(record, StoreError::Query(_)));
    }
}
