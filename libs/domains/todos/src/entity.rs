use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

use crate::models::{NewToDoRecord, ToDoRecord};

/// Sea-ORM Entity for the `todo` table
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "todo")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_type = "Text")]
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Text")]
    pub status: String,
    pub estimated_time_of_completion: DateTimeUtc,
    pub actual_time_of_completion: DateTimeUtc,
    pub reminder: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ToDoRecord {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            status: model.status,
            estimated_time_of_completion: model.estimated_time_of_completion,
            actual_time_of_completion: model.actual_time_of_completion,
            reminder: model.reminder,
        }
    }
}

impl From<NewToDoRecord> for ActiveModel {
    fn from(record: NewToDoRecord) -> Self {
        ActiveModel {
            id: NotSet,
            title: Set(record.title),
            description: Set(record.description),
            status: Set(record.status),
            estimated_time_of_completion: Set(record.estimated_time_of_completion),
            actual_time_of_completion: Set(record.actual_time_of_completion),
            reminder: Set(record.reminder),
        }
    }
}

/// Every column but the id, for `update_many().set(..)`.
impl From<ToDoRecord> for ActiveModel {
    fn from(record: ToDoRecord) -> Self {
        ActiveModel {
            id: NotSet,
            title: Set(record.title),
            description: Set(record.description),
            status: Set(record.status),
            estimated_time_of_completion: Set(record.estimated_time_of_completion),
            actual_time_of_completion: Set(record.actual_time_of_completion),
            reminder: Set(record.reminder),
        }
    }
}
