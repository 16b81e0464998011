//! Uploaded proof-of-payment files

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payment_proofs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub invoice_id: i64,
    pub uploaded_by: i64,
    pub uploaded_at: i64,
    /// File name under the upload directory
    pub stored_name: String,
    pub original_name: String,
    pub content_type: String,
    pub file_size: i64,
    pub note: String,
    pub verified: bool,
    pub verified_at: Option<i64>,
    pub verified_by: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::fee_invoices::Entity",
        from = "Column::InvoiceId",
        to = "super::fee_invoices::Column::Id"
    )]
    Invoice,
}

impl Related<super::fee_invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoice.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_proof(self) -> crate::models::finance::entities::PaymentProof {
        use chrono::{DateTime, Utc};

        crate::models::finance::entities::PaymentProof {
            id: self.id,
            invoice_id: self.invoice_id,
            uploaded_by: self.uploaded_by,
            uploaded_at: DateTime::<Utc>::from_timestamp(self.uploaded_at, 0).unwrap_or_default(),
            stored_name: self.stored_name,
            original_name: self.original_name,
            content_type: self.content_type,
            file_size: self.file_size,
            note: self.note,
            verified: self.verified,
            verified_at: self
                .verified_at
                .map(|ts| DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()),
            verified_by: self.verified_by,
        }
    }
}
