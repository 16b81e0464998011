use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const MAX_MESSAGE_LEN: usize = 5000;
/// Message bodies are cut to this many characters in notifications.
pub const NOTIFY_PREVIEW_LEN: usize = 300;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Thread {
    pub id: i64,
    pub student_id: i64,
    pub teacher_id: i64,
    pub parent_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_message_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Thread {
    pub fn is_participant(&self, user_id: i64) -> bool {
        self.teacher_id == user_id || self.parent_id == user_id
    }

    /// The participant who is not `user_id`.
    pub fn counterpart(&self, user_id: i64) -> i64 {
        if self.teacher_id == user_id {
            self.parent_id
        } else {
            self.teacher_id
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: i64,
    pub thread_id: i64,
    pub sender_id: i64,
    pub body: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageRow {
    #[serde(flatten)]
    pub message: Message,
    pub sender_username: String,
    pub sender_name: String,
}

/// Thread with participant names, last message and unread count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InboxRow {
    #[serde(flatten)]
    pub thread: Thread,
    pub student_code: String,
    pub student_name: String,
    pub teacher_username: String,
    pub teacher_name: String,
    pub parent_username: String,
    pub parent_name: String,
    pub last_message: Option<Message>,
    pub unread_count: u64,
}

/// Which threads an inbox covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboxScope {
    Teacher(i64),
    Parent(i64),
    All,
}

crate::string_enum! {
    pub enum NotificationChannel {
        Sms => "sms",
        Email => "email",
        InApp => "in_app",
    }
}

crate::string_enum! {
    pub enum NotificationStatus {
        Queued => "queued",
        Sent => "sent",
        Failed => "failed",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationLog {
    pub id: i64,
    pub user_id: Option<i64>,
    pub channel: NotificationChannel,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub status: NotificationStatus,
    pub error: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub sent_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationPreference {
    pub user_id: i64,
    pub enable_email: bool,
    pub enable_sms: bool,
    pub enable_in_app: bool,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceNote {
    pub id: i64,
    pub student_id: i64,
    pub teacher_id: i64,
    /// First day of the month the note covers.
    pub term_month: NaiveDate,
    pub summary: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BehaviourRecord {
    pub id: i64,
    pub student_id: i64,
    pub teacher_id: i64,
    pub occurred_on: NaiveDate,
    pub note: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Cuts `text` to at most `max` characters.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counterpart() {
        let thread = Thread {
            id: 1,
            student_id: 2,
            teacher_id: 10,
            parent_id: 20,
            created_at: chrono::Utc::now(),
            last_message_at: None,
        };
        assert_eq!(thread.counterpart(10), 20);
        assert_eq!(thread.counterpart(20), 10);
        assert!(thread.is_participant(20));
        assert!(!thread.is_participant(30));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 300), "short");
    }
}
