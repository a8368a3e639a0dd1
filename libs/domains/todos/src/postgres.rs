use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};

use crate::{
    entity,
    models::{NewToDoRecord, ToDoRecord},
    store::{ConnectionProvider, ExecOutcome, StoreConnection, StoreError},
};

/// Hands out one PostgreSQL transaction per call from the sea-orm pool.
#[derive(Clone)]
pub struct PgConnectionProvider {
    db: DatabaseConnection,
}

impl PgConnectionProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl ConnectionProvider for PgConnectionProvider {
    type Connection = PgStoreConnection;

    async fn acquire(&self) -> Result<PgStoreConnection, StoreError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(PgStoreConnection { txn: Some(txn) })
    }
}

/// A pooled connection inside an open transaction.
///
/// Dropping it before [`StoreConnection::release`] rolls the transaction back.
pub struct PgStoreConnection {
    txn: Option<DatabaseTransaction>,
}

impl PgStoreConnection {
    fn txn(&self) -> Result<&DatabaseTransaction, StoreError> {
        self.txn
            .as_ref()
            .ok_or_else(|| StoreError::Connection("connection already released".into()))
    }
}

#[async_trait]
impl StoreConnection for PgStoreConnection {
    async fn insert(&self, record: NewToDoRecord) -> Result<ExecOutcome, StoreError> {
        let active_model: entity::ActiveModel = record.into();
        let result = entity::Entity::insert(active_model).exec(self.txn()?).await?;

        tracing::debug!(todo_id = result.last_insert_id, "Inserted ToDo row");
        Ok(ExecOutcome {
            rows_affected: 1,
            last_insert_id: Some(result.last_insert_id),
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Vec<ToDoRecord>, StoreError> {
        let models = entity::Entity::find()
            .filter(entity::Column::Id.eq(id))
            .all(self.txn()?)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(&self, record: ToDoRecord) -> Result<ExecOutcome, StoreError> {
        let id = record.id;
        let active_model: entity::ActiveModel = record.into();
        let result = entity::Entity::update_many()
            .set(active_model)
            .filter(entity::Column::Id.eq(id))
            .exec(self.txn()?)
            .await?;

        Ok(ExecOutcome::affected(result.rows_affected))
    }

    async fn delete(&self, id: i64) -> Result<ExecOutcome, StoreError> {
        let result = entity::Entity::delete_by_id(id).exec(self.txn()?).await?;
        Ok(ExecOutcome::affected(result.rows_affected))
    }

    async fn find_all(&self) -> Result<Vec<ToDoRecord>, StoreError> {
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::Id)
            .all(self.txn()?)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn release(&mut self) -> Result<(), StoreError> {
        if let Some(txn) = self.txn.take() {
            txn.commit().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn at(seconds: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(seconds, 0).unwrap()
    }

    fn model(id: i64) -> entity::Model {
        entity::Model {
            id,
            title: "title".into(),
            description: "description".into(),
            status: "Started".into(),
            estimated_time_of_completion: at(1_700_000_000),
            actual_time_of_completion: at(1_700_000_000),
            reminder: at(1_699_999_000),
        }
    }

    #[tokio::test]
    async fn test_find_by_id_maps_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(3)]])
            .into_connection();
        let provider = PgConnectionProvider::new(db);

        let mut conn = provider.acquire().await.unwrap();
        let rows = conn.find_by_id(3).await.unwrap();
        conn.release().await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 3);
        assert_eq!(rows[0].reminder, at(1_699_999_000));
    }

    #[tokio::test]
    async fn test_delete_reports_rows_affected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let provider = PgConnectionProvider::new(db);

        let mut conn = provider.acquire().await.unwrap();
        let outcome = conn.delete(42).await.unwrap();
        conn.release().await.unwrap();

        assert_eq!(outcome, ExecOutcome::affected(0));
    }

    #[tokio::test]
    async fn test_release_twice_is_noop() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let provider = PgConnectionProvider::new(db);

        let mut conn = provider.acquire().await.unwrap();
        conn.release().await.unwrap();
        conn.release().await.unwrap();

        let err = conn.find_all().await.unwrap_err();
        assert!(matches!(err, StoreError::Connection(_)));
    }
}
