use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ToDo::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ToDo::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(text(ToDo::Title).default(""))
                    .col(text(ToDo::Description).default(""))
                    .col(text(ToDo::Status).default(""))
                    .col(timestamp_with_time_zone(ToDo::EstimatedTimeOfCompletion))
                    .col(timestamp_with_time_zone(ToDo::ActualTimeOfCompletion))
                    .col(timestamp_with_time_zone(ToDo::Reminder))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ToDo::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ToDo {
    #[sea_orm(iden = "todo")]
    Table,
    Id,
    Title,
    Description,
    Status,
    EstimatedTimeOfCompletion,
    ActualTimeOfCompletion,
    Reminder,
}
