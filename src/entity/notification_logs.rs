//! Outbound notification log

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "notification_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: Option<i64>,
    pub channel: String,
    pub recipient: String,
    pub subject: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub error: Option<String>,
    pub created_at: i64,
    pub sent_at: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_log(self) -> crate::models::comms::entities::NotificationLog {
        use crate::models::comms::entities::{
            NotificationChannel, NotificationLog, NotificationStatus,
        };
        use chrono::{DateTime, Utc};

        NotificationLog {
            id: self.id,
            user_id: self.user_id,
            channel: self
                .channel
                .parse::<NotificationChannel>()
                .unwrap_or(NotificationChannel::InApp),
            recipient: self.recipient,
            subject: self.subject,
            body: self.body,
            status: self
                .status
                .parse::<NotificationStatus>()
                .unwrap_or(NotificationStatus::Queued),
            error: self.error,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            sent_at: self
                .sent_at
                .map(|ts| DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()),
        }
    }
}
