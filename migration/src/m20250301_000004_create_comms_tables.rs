use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_core_tables::{Students, Users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Parent-teacher threads
        manager
            .create_table(
                Table::create()
                    .table(Threads::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Threads::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Threads::StudentId).big_integer().not_null())
                    .col(ColumnDef::new(Threads::TeacherId).big_integer().not_null())
                    .col(ColumnDef::new(Threads::ParentId).big_integer().not_null())
                    .col(ColumnDef::new(Threads::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Threads::LastMessageAt).big_integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Threads::Table, Threads::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Threads::Table, Threads::TeacherId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Threads::Table, Threads::ParentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_threads_student_teacher_parent")
                    .table(Threads::Table)
                    .col(Threads::StudentId)
                    .col(Threads::TeacherId)
                    .col(Threads::ParentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Messages
        manager
            .create_table(
                Table::create()
                    .table(Messages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Messages::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Messages::ThreadId).big_integer().not_null())
                    .col(ColumnDef::new(Messages::SenderId).big_integer().not_null())
                    .col(ColumnDef::new(Messages::Body).text().not_null())
                    .col(ColumnDef::new(Messages::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Messages::Table, Messages::ThreadId)
                            .to(Threads::Table, Threads::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Messages::Table, Messages::SenderId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_messages_thread_created")
                    .table(Messages::Table)
                    .col(Messages::ThreadId)
                    .col(Messages::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Read markers
        manager
            .create_table(
                Table::create()
                    .table(ThreadReadStates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ThreadReadStates::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ThreadReadStates::ThreadId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ThreadReadStates::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ThreadReadStates::LastReadAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ThreadReadStates::Table, ThreadReadStates::ThreadId)
                            .to(Threads::Table, Threads::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ThreadReadStates::Table, ThreadReadStates::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_thread_read_states_thread_user")
                    .table(ThreadReadStates::Table)
                    .col(ThreadReadStates::ThreadId)
                    .col(ThreadReadStates::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Notification log
        manager
            .create_table(
                Table::create()
                    .table(NotificationLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NotificationLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(NotificationLogs::UserId).big_integer().null())
                    .col(ColumnDef::new(NotificationLogs::Channel).string().not_null())
                    .col(
                        ColumnDef::new(NotificationLogs::Recipient)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NotificationLogs::Subject)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(NotificationLogs::Body).text().not_null())
                    .col(ColumnDef::new(NotificationLogs::Status).string().not_null())
                    .col(ColumnDef::new(NotificationLogs::Error).text().null())
                    .col(
                        ColumnDef::new(NotificationLogs::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(NotificationLogs::SentAt).big_integer().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_notification_logs_created_at")
                    .table(NotificationLogs::Table)
                    .col(NotificationLogs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Notification preferences
        manager
            .create_table(
                Table::create()
                    .table(NotificationPreferences::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NotificationPreferences::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(NotificationPreferences::UserId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(NotificationPreferences::EnableEmail)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(NotificationPreferences::EnableSms)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(NotificationPreferences::EnableInApp)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(NotificationPreferences::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                NotificationPreferences::Table,
                                NotificationPreferences::UserId,
                            )
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Performance notes
        manager
            .create_table(
                Table::create()
                    .table(PerformanceNotes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PerformanceNotes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PerformanceNotes::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PerformanceNotes::TeacherId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PerformanceNotes::TermMonth).date().not_null())
                    .col(ColumnDef::new(PerformanceNotes::Summary).text().not_null())
                    .col(
                        ColumnDef::new(PerformanceNotes::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(PerformanceNotes::Table, PerformanceNotes::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(PerformanceNotes::Table, PerformanceNotes::TeacherId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Behaviour records
        manager
            .create_table(
                Table::create()
                    .table(BehaviourRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BehaviourRecords::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BehaviourRecords::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BehaviourRecords::TeacherId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BehaviourRecords::OccurredOn).date().not_null())
                    .col(ColumnDef::new(BehaviourRecords::Note).text().not_null())
                    .col(
                        ColumnDef::new(BehaviourRecords::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(BehaviourRecords::Table, BehaviourRecords::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(BehaviourRecords::Table, BehaviourRecords::TeacherId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BehaviourRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PerformanceNotes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(NotificationPreferences::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(NotificationLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ThreadReadStates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Messages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Threads::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Threads {
    #[sea_orm(iden = "threads")]
    Table,
    Id,
    StudentId,
    TeacherId,
    ParentId,
    CreatedAt,
    LastMessageAt,
}

#[derive(DeriveIden)]
enum Messages {
    #[sea_orm(iden = "messages")]
    Table,
    Id,
    ThreadId,
    SenderId,
    Body,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ThreadReadStates {
    #[sea_orm(iden = "thread_read_states")]
    Table,
    Id,
    ThreadId,
    UserId,
    LastReadAt,
}

#[derive(DeriveIden)]
enum NotificationLogs {
    #[sea_orm(iden = "notification_logs")]
    Table,
    Id,
    UserId,
    Channel,
    Recipient,
    Subject,
    Body,
    Status,
    Error,
    CreatedAt,
    SentAt,
}

#[derive(DeriveIden)]
enum NotificationPreferences {
    #[sea_orm(iden = "notification_preferences")]
    Table,
    Id,
    UserId,
    EnableEmail,
    EnableSms,
    EnableInApp,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PerformanceNotes {
    #[sea_orm(iden = "performance_notes")]
    Table,
    Id,
    StudentId,
    TeacherId,
    TermMonth,
    Summary,
    CreatedAt,
}

#[derive(DeriveIden)]
enum BehaviourRecords {
    #[sea_orm(iden = "behaviour_records")]
    Table,
    Id,
    StudentId,
    TeacherId,
    OccurredOn,
    Note,
    CreatedAt,
}
