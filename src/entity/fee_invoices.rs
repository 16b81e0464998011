//! Fee invoices; amounts in cents

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "fee_invoices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    pub parent_id: Option<i64>,
    pub fee_structure_id: i64,
    pub issue_date: chrono::NaiveDate,
    pub due_date: chrono::NaiveDate,
    pub total_amount: i64,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::students::Entity",
        from = "Column::StudentId",
        to = "super::students::Column::Id"
    )]
    Student,
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
    #[sea_orm(has_many = "super::payment_proofs::Entity")]
    PaymentProofs,
}

impl Related<super::students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::payment_proofs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentProofs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_invoice(self) -> crate::models::finance::entities::FeeInvoice {
        use crate::models::finance::entities::{FeeInvoice, InvoiceStatus};
        use crate::utils::money::Money;
        use chrono::{DateTime, Utc};

        FeeInvoice {
            id: self.id,
            student_id: self.student_id,
            parent_id: self.parent_id,
            fee_structure_id: self.fee_structure_id,
            issue_date: self.issue_date,
            due_date: self.due_date,
            total_amount: Money::from_cents(self.total_amount),
            status: self
                .status
                .parse::<InvoiceStatus>()
                .unwrap_or(InvoiceStatus::Unpaid),
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
