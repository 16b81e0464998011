use chrono::NaiveDate;
use serde::Deserialize;

use super::entities::NotificationChannel;

#[derive(Debug, Default, Deserialize)]
pub struct InboxQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StartThreadRequest {
    /// Student code.
    pub student_id: String,
    pub parent_username: String,
}

#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub body: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePreferencesRequest {
    pub enable_email: Option<bool>,
    pub enable_sms: Option<bool>,
    pub enable_in_app: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePerformanceNoteRequest {
    pub student_id: i64,
    /// Any day in the month; stored as the first of the month.
    pub term_month: NaiveDate,
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateBehaviourRecordRequest {
    pub student_id: i64,
    pub occurred_on: Option<NaiveDate>,
    pub note: String,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Option<i64>,
    pub channel: NotificationChannel,
    pub recipient: String,
    pub subject: String,
    pub body: String,
}
