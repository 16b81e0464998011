//! Admission applications

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "admission_applications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub status: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<chrono::NaiveDate>,
    pub requested_grade: String,
    pub guardian_name: String,
    pub guardian_phone: String,
    pub guardian_email: String,
    pub guardian_relationship: String,
    #[sea_orm(column_type = "Text")]
    pub notes: String,
    /// Student code once admitted
    pub admitted_student_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_application(self) -> crate::models::registrar::entities::AdmissionApplication {
        use crate::models::registrar::entities::{AdmissionApplication, ApplicationStatus};
        use chrono::{DateTime, Utc};

        AdmissionApplication {
            id: self.id,
            status: self
                .status
                .parse::<ApplicationStatus>()
                .unwrap_or(ApplicationStatus::New),
            first_name: self.first_name,
            last_name: self.last_name,
            date_of_birth: self.date_of_birth,
            requested_grade: self.requested_grade,
            guardian_name: self.guardian_name,
            guardian_phone: self.guardian_phone,
            guardian_email: self.guardian_email,
            guardian_relationship: self.guardian_relationship,
            notes: self.notes,
            admitted_student_id: self.admitted_student_id,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
