use serde::Serialize;

use super::entities::{
    BehaviourRecord, InboxRow, Message, MessageRow, NotificationLog, NotificationPreference,
    PerformanceNote,
};

#[derive(Debug, Serialize)]
pub struct InboxResponse {
    pub items: Vec<InboxRow>,
}

#[derive(Debug, Serialize)]
pub struct StartThreadResponse {
    pub thread: InboxRow,
    pub created: bool,
}

#[derive(Debug, Serialize)]
pub struct ThreadDetailResponse {
    pub thread: InboxRow,
    pub messages: Vec<MessageRow>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: Message,
    pub notifications_sent: usize,
}

#[derive(Debug, Serialize)]
pub struct PreferenceResponse {
    pub preference: NotificationPreference,
}

#[derive(Debug, Serialize)]
pub struct NotificationListResponse {
    pub items: Vec<NotificationLog>,
}

#[derive(Debug, Serialize)]
pub struct StudentNotesResponse {
    pub performance_notes: Vec<PerformanceNote>,
    pub behaviour_records: Vec<BehaviourRecord>,
}
