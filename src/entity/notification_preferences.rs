use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "notification_preferences")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub user_id: i64,
    pub enable_email: bool,
    pub enable_sms: bool,
    pub enable_in_app: bool,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_preference(self) -> crate::models::comms::entities::NotificationPreference {
        use chrono::{DateTime, Utc};

        crate::models::comms::entities::NotificationPreference {
            user_id: self.user_id,
            enable_email: self.enable_email,
            enable_sms: self.enable_sms,
            enable_in_app: self.enable_in_app,
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
