use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "assessments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub class_group_id: i64,
    pub subject_id: i64,
    pub teacher_id: i64,
    pub title: String,
    pub assessment_type: String,
    pub max_score: f64,
    pub weight: f64,
    pub date: chrono::NaiveDate,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::class_groups::Entity",
        from = "Column::ClassGroupId",
        to = "super::class_groups::Column::Id"
    )]
    ClassGroup,
    #[sea_orm(
        belongs_to = "super::subjects::Entity",
        from = "Column::SubjectId",
        to = "super::subjects::Column::Id"
    )]
    Subject,
    #[sea_orm(has_many = "super::grades::Entity")]
    Grades,
}

impl Related<super::class_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassGroup.def()
    }
}

impl Related<super::subjects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subject.def()
    }
}

impl Related<super::grades::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Grades.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_assessment(self) -> crate::models::academics::entities::Assessment {
        use crate::models::academics::entities::{Assessment, AssessmentType};
        use chrono::{DateTime, Utc};

        Assessment {
            id: self.id,
            class_group_id: self.class_group_id,
            subject_id: self.subject_id,
            teacher_id: self.teacher_id,
            title: self.title,
            assessment_type: self
                .assessment_type
                .parse::<AssessmentType>()
                .unwrap_or(AssessmentType::Test),
            max_score: self.max_score,
            weight: self.weight,
            date: self.date,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        }
    }
}
