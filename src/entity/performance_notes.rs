use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "performance_notes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    pub teacher_id: i64,
    pub term_month: chrono::NaiveDate,
    #[sea_orm(column_type = "Text")]
    pub summary: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_note(self) -> crate::models::comms::entities::PerformanceNote {
        use chrono::{DateTime, Utc};

        crate::models::comms::entities::PerformanceNote {
            id: self.id,
            student_id: self.student_id,
            teacher_id: self.teacher_id,
            term_month: self.term_month,
            summary: self.summary,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        }
    }
}
