//! Daily attendance, unique per student, class and date

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "attendance_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    pub class_group_id: i64,
    pub date: chrono::NaiveDate,
    pub status: String,
    pub recorded_by: Option<i64>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::students::Entity",
        from = "Column::StudentId",
        to = "super::students::Column::Id"
    )]
    Student,
    #[sea_orm(
        belongs_to = "super::class_groups::Entity",
        from = "Column::ClassGroupId",
        to = "super::class_groups::Column::Id"
    )]
    ClassGroup,
}

impl Related<super::students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::class_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassGroup.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn attendance_status(&self) -> crate::models::academics::entities::AttendanceStatus {
        crate::models::academics::entities::AttendanceStatus::parse_or_present(&self.status)
    }

    pub fn into_record(self) -> crate::models::academics::entities::AttendanceRecord {
        use chrono::{DateTime, Utc};

        crate::models::academics::entities::AttendanceRecord {
            id: self.id,
            student_id: self.student_id,
            class_group_id: self.class_group_id,
            date: self.date,
            status: self.attendance_status(),
            recorded_by: self.recorded_by,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        }
    }
}
