use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub invoice_id: i64,
    pub payment_date: chrono::NaiveDate,
    pub amount: i64,
    pub method: String,
    pub reference: String,
    pub recorded_by: Option<i64>,
    pub created_at: i64,
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
    pub fn into_payment(self) -> crate::models::finance::entities::Payment {
        use crate::utils::money::Money;
        use chrono::{DateTime, Utc};

        crate::models::finance::entities::Payment {
            id: self.id,
            invoice_id: self.invoice_id,
            payment_date: self.payment_date,
            amount: Money::from_cents(self.amount),
            method: self.method,
            reference: self.reference,
            recorded_by: self.recorded_by,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        }
    }
}
