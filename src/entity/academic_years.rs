use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "academic_years")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    pub is_current: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::class_groups::Entity")]
    ClassGroups,
}

impl Related<super::class_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassGroups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_academic_year(self) -> crate::models::system::entities::AcademicYear {
        crate::models::system::entities::AcademicYear {
            id: self.id,
            name: self.name,
            start_date: self.start_date,
            end_date: self.end_date,
            is_current: self.is_current,
        }
    }
}
