use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_core_tables::{Students, Users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Fee structures, amounts in cents
        manager
            .create_table(
                Table::create()
                    .table(FeeStructures::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FeeStructures::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FeeStructures::Name).string().not_null())
                    .col(
                        ColumnDef::new(FeeStructures::Grade)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(FeeStructures::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(FeeStructures::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Invoices
        manager
            .create_table(
                Table::create()
                    .table(FeeInvoices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FeeInvoices::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FeeInvoices::StudentId).big_integer().not_null())
                    .col(ColumnDef::new(FeeInvoices::ParentId).big_integer().null())
                    .col(
                        ColumnDef::new(FeeInvoices::FeeStructureId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FeeInvoices::IssueDate).date().not_null())
                    .col(ColumnDef::new(FeeInvoices::DueDate).date().not_null())
                    .col(
                        ColumnDef::new(FeeInvoices::TotalAmount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FeeInvoices::Status).string().not_null())
                    .col(ColumnDef::new(FeeInvoices::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(FeeInvoices::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(FeeInvoices::Table, FeeInvoices::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(FeeInvoices::Table, FeeInvoices::ParentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(FeeInvoices::Table, FeeInvoices::FeeStructureId)
                            .to(FeeStructures::Table, FeeStructures::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_fee_invoices_status_due")
                    .table(FeeInvoices::Table)
                    .col(FeeInvoices::Status)
                    .col(FeeInvoices::DueDate)
                    .to_owned(),
            )
            .await?;

        // Payments
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Payments::InvoiceId).big_integer().not_null())
                    .col(ColumnDef::new(Payments::PaymentDate).date().not_null())
                    .col(ColumnDef::new(Payments::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(Payments::Method)
                            .string()
                            .not_null()
                            .default("bank/mobile"),
                    )
                    .col(
                        ColumnDef::new(Payments::Reference)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Payments::RecordedBy).big_integer().null())
                    .col(ColumnDef::new(Payments::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Payments::Table, Payments::InvoiceId)
                            .to(FeeInvoices::Table, FeeInvoices::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Proofs of payment
        manager
            .create_table(
                Table::create()
                    .table(PaymentProofs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PaymentProofs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PaymentProofs::InvoiceId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PaymentProofs::UploadedBy)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PaymentProofs::UploadedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PaymentProofs::StoredName).string().not_null())
                    .col(
                        ColumnDef::new(PaymentProofs::OriginalName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PaymentProofs::ContentType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PaymentProofs::FileSize).big_integer().not_null())
                    .col(
                        ColumnDef::new(PaymentProofs::Note)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(PaymentProofs::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(PaymentProofs::VerifiedAt).big_integer().null())
                    .col(ColumnDef::new(PaymentProofs::VerifiedBy).big_integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(PaymentProofs::Table, PaymentProofs::InvoiceId)
                            .to(FeeInvoices::Table, FeeInvoices::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(PaymentProofs::Table, PaymentProofs::UploadedBy)
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
                    .name("idx_payment_proofs_verified")
                    .table(PaymentProofs::Table)
                    .col(PaymentProofs::Verified)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PaymentProofs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FeeInvoices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FeeStructures::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum FeeStructures {
    #[sea_orm(iden = "fee_structures")]
    Table,
    Id,
    Name,
    Grade,
    Amount,
    CreatedAt,
}

#[derive(DeriveIden)]
enum FeeInvoices {
    #[sea_orm(iden = "fee_invoices")]
    Table,
    Id,
    StudentId,
    ParentId,
    FeeStructureId,
    IssueDate,
    DueDate,
    TotalAmount,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Payments {
    #[sea_orm(iden = "payments")]
    Table,
    Id,
    InvoiceId,
    PaymentDate,
    Amount,
    Method,
    Reference,
    RecordedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PaymentProofs {
    #[sea_orm(iden = "payment_proofs")]
    Table,
    Id,
    InvoiceId,
    UploadedBy,
    UploadedAt,
    StoredName,
    OriginalName,
    ContentType,
    FileSize,
    Note,
    Verified,
    VerifiedAt,
    VerifiedBy,
}
