use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

use super::{SeaOrmStorage, db_err, joins, now_ts, write_err};
use crate::entity::{
    behaviour_records, messages, notification_logs, notification_preferences, performance_notes,
    thread_read_states, threads,
};
use crate::errors::{BusyBeeError, Result};
use crate::models::comms::{
    entities::{
        BehaviourRecord, InboxRow, InboxScope, Message, MessageRow, NotificationLog,
        NotificationPreference, NotificationStatus, PerformanceNote, Thread,
    },
    requests::{NewNotification, UpdatePreferencesRequest},
};
use crate::storage::DateRange;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};

fn scoped(scope: InboxScope) -> Select<threads::Entity> {
    match scope {
        InboxScope::Teacher(id) => {
            threads::Entity::find().filter(threads::Column::TeacherId.eq(id))
        }
        InboxScope::Parent(id) => threads::Entity::find().filter(threads::Column::ParentId.eq(id)),
        InboxScope::All => threads::Entity::find(),
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Builds inbox rows for `viewer_id`, newest activity first.
async fn inbox_rows<C: ConnectionTrait>(
    db: &C,
    rows: Vec<threads::Model>,
    viewer_id: i64,
) -> Result<Vec<InboxRow>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let thread_ids: Vec<i64> = rows.iter().map(|t| t.id).collect();

    let students = joins::students_by_ids(db, rows.iter().map(|t| t.student_id)).await?;
    let users = joins::users_by_ids(
        db,
        rows.iter().flat_map(|t| [t.teacher_id, t.parent_id]),
    )
    .await?;

    let read_at: HashMap<i64, i64> = thread_read_states::Entity::find()
        .filter(thread_read_states::Column::UserId.eq(viewer_id))
        .filter(thread_read_states::Column::ThreadId.is_in(thread_ids.clone()))
        .all(db)
        .await
        .map_err(db_err("Failed to load read states"))?
        .into_iter()
        .map(|r| (r.thread_id, r.last_read_at))
        .collect();

    let all_messages = messages::Entity::find()
        .filter(messages::Column::ThreadId.is_in(thread_ids))
        .order_by_desc(messages::Column::CreatedAt)
        .order_by_desc(messages::Column::Id)
        .all(db)
        .await
        .map_err(db_err("Failed to load messages"))?;

    let mut last: HashMap<i64, Message> = HashMap::new();
    let mut unread: HashMap<i64, u64> = HashMap::new();
    for m in all_messages {
        if m.sender_id != viewer_id
            && read_at
                .get(&m.thread_id)
                .is_none_or(|seen| m.created_at > *seen)
        {
            *unread.entry(m.thread_id).or_default() += 1;
        }
        if !last.contains_key(&m.thread_id) {
            last.insert(m.thread_id, m.into_message());
        }
    }

    let mut out: Vec<InboxRow> = rows
        .into_iter()
        .map(|t| {
            let student = students.get(&t.student_id);
            let teacher = users.get(&t.teacher_id);
            let parent = users.get(&t.parent_id);
            InboxRow {
                student_code: student.map(|s| s.student_id.clone()).unwrap_or_default(),
                student_name: student.map(|s| s.full_name()).unwrap_or_default(),
                teacher_username: teacher.map(|u| u.username.clone()).unwrap_or_default(),
                teacher_name: teacher.map(|u| u.display_name()).unwrap_or_default(),
                parent_username: parent.map(|u| u.username.clone()).unwrap_or_default(),
                parent_name: parent.map(|u| u.display_name()).unwrap_or_default(),
                last_message: last.remove(&t.id),
                unread_count: unread.get(&t.id).copied().unwrap_or(0),
                thread: t.into_thread(),
            }
        })
        .collect();

    // Threads without messages sort after active ones.
    out.sort_by(|a, b| {
        b.thread
            .last_message_at
            .cmp(&a.thread.last_message_at)
            .then(b.thread.created_at.cmp(&a.thread.created_at))
            .then(b.thread.id.cmp(&a.thread.id))
    });
    Ok(out)
}

impl SeaOrmStorage {
    pub async fn list_inbox_impl(
        &self,
        viewer_id: i64,
        scope: InboxScope,
        search: Option<String>,
    ) -> Result<Vec<InboxRow>> {
        let rows = scoped(scope)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list threads"))?;
        let mut inbox = inbox_rows(&self.db, rows, viewer_id).await?;

        if let Some(needle) = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
        {
            inbox.retain(|row| {
                [
                    &row.student_code,
                    &row.student_name,
                    &row.teacher_username,
                    &row.parent_username,
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
            });
        }
        Ok(inbox)
    }

    pub async fn get_inbox_row_impl(&self, thread_id: i64, viewer_id: i64) -> Result<Option<InboxRow>> {
        let Some(row) = threads::Entity::find_by_id(thread_id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query thread"))?
        else {
            return Ok(None);
        };

        Ok(inbox_rows(&self.db, vec![row], viewer_id).await?.pop())
    }

    pub async fn get_thread_impl(&self, id: i64) -> Result<Option<Thread>> {
        let row = threads::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query thread"))?;

        Ok(row.map(|m| m.into_thread()))
    }

    pub async fn get_or_create_thread_impl(
        &self,
        student_id: i64,
        teacher_id: i64,
        parent_id: i64,
    ) -> Result<(Thread, bool)> {
        let existing = threads::Entity::find()
            .filter(threads::Column::StudentId.eq(student_id))
            .filter(threads::Column::TeacherId.eq(teacher_id))
            .filter(threads::Column::ParentId.eq(parent_id))
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query thread"))?;
        if let Some(thread) = existing {
            return Ok((thread.into_thread(), false));
        }

        let created = threads::ActiveModel {
            student_id: Set(student_id),
            teacher_id: Set(teacher_id),
            parent_id: Set(parent_id),
            created_at: Set(now_ts()),
            last_message_at: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(write_err("Failed to create thread"))?;

        Ok((created.into_thread(), true))
    }

    pub async fn list_messages_impl(&self, thread_id: i64) -> Result<Vec<MessageRow>> {
        let rows = messages::Entity::find()
            .filter(messages::Column::ThreadId.eq(thread_id))
            .order_by_asc(messages::Column::CreatedAt)
            .order_by_asc(messages::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list messages"))?;
        let senders = joins::users_by_ids(&self.db, rows.iter().map(|m| m.sender_id)).await?;

        Ok(rows
            .into_iter()
            .map(|m| {
                let sender = senders.get(&m.sender_id);
                MessageRow {
                    sender_username: sender.map(|u| u.username.clone()).unwrap_or_default(),
                    sender_name: sender.map(|u| u.display_name()).unwrap_or_default(),
                    message: m.into_message(),
                }
            })
            .collect())
    }

    pub async fn create_message_impl(
        &self,
        thread_id: i64,
        sender_id: i64,
        body: &str,
    ) -> Result<Message> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let thread = threads::Entity::find_by_id(thread_id)
            .one(&txn)
            .await
            .map_err(db_err("Failed to query thread"))?
            .ok_or_else(|| BusyBeeError::not_found("Thread not found"))?;

        let now = now_ts();
        let created = messages::ActiveModel {
            thread_id: Set(thread_id),
            sender_id: Set(sender_id),
            body: Set(body.to_string()),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(write_err("Failed to create message"))?;

        let mut model: threads::ActiveModel = thread.into();
        model.last_message_at = Set(Some(now));
        model
            .update(&txn)
            .await
            .map_err(db_err("Failed to update thread"))?;

        upsert_read_state(&txn, thread_id, sender_id, now).await?;

        txn.commit()
            .await
            .map_err(db_err("Failed to commit message"))?;

        Ok(created.into_message())
    }

    pub async fn mark_thread_read_impl(&self, thread_id: i64, user_id: i64) -> Result<()> {
        upsert_read_state(&self.db, thread_id, user_id, now_ts()).await
    }

    pub async fn count_threads_impl(&self, scope: InboxScope) -> Result<u64> {
        scoped(scope)
            .count(&self.db)
            .await
            .map_err(db_err("Failed to count threads"))
    }

    pub async fn count_messages_sent_impl(&self, user_id: i64) -> Result<u64> {
        messages::Entity::find()
            .filter(messages::Column::SenderId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(db_err("Failed to count messages"))
    }

    pub async fn create_notification_impl(
        &self,
        notification: NewNotification,
    ) -> Result<NotificationLog> {
        let created = notification_logs::ActiveModel {
            user_id: Set(notification.user_id),
            channel: Set(notification.channel.to_string()),
            recipient: Set(notification.recipient),
            subject: Set(notification.subject),
            body: Set(notification.body),
            status: Set(NotificationStatus::Queued.to_string()),
            error: Set(None),
            created_at: Set(now_ts()),
            sent_at: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(write_err("Failed to log notification"))?;

        Ok(created.into_log())
    }

    pub async fn update_notification_status_impl(
        &self,
        id: i64,
        status: NotificationStatus,
        error: Option<String>,
    ) -> Result<()> {
        let log = notification_logs::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query notification"))?
            .ok_or_else(|| BusyBeeError::not_found("Notification not found"))?;

        let mut model: notification_logs::ActiveModel = log.into();
        model.status = Set(status.to_string());
        model.error = Set(error);
        if status == NotificationStatus::Sent {
            model.sent_at = Set(Some(now_ts()));
        }
        model
            .update(&self.db)
            .await
            .map_err(db_err("Failed to update notification"))?;
        Ok(())
    }

    pub async fn list_recent_notifications_impl(&self, limit: u64) -> Result<Vec<NotificationLog>> {
        let rows = notification_logs::Entity::find()
            .order_by_desc(notification_logs::Column::CreatedAt)
            .order_by_desc(notification_logs::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list notifications"))?;

        Ok(rows.into_iter().map(|m| m.into_log()).collect())
    }

    pub async fn get_or_create_preference_impl(
        &self,
        user_id: i64,
    ) -> Result<NotificationPreference> {
        Ok(preference_model(&self.db, user_id).await?.into_preference())
    }

    pub async fn update_preference_impl(
        &self,
        user_id: i64,
        req: UpdatePreferencesRequest,
    ) -> Result<NotificationPreference> {
        let current = preference_model(&self.db, user_id).await?;

        let mut model: notification_preferences::ActiveModel = current.into();
        if let Some(v) = req.enable_email {
            model.enable_email = Set(v);
        }
        if let Some(v) = req.enable_sms {
            model.enable_sms = Set(v);
        }
        if let Some(v) = req.enable_in_app {
            model.enable_in_app = Set(v);
        }
        model.updated_at = Set(now_ts());
        let updated = model
            .update(&self.db)
            .await
            .map_err(db_err("Failed to update preferences"))?;

        Ok(updated.into_preference())
    }

    pub async fn create_performance_note_impl(
        &self,
        student_id: i64,
        teacher_id: i64,
        term_month: NaiveDate,
        summary: &str,
    ) -> Result<PerformanceNote> {
        let created = performance_notes::ActiveModel {
            student_id: Set(student_id),
            teacher_id: Set(teacher_id),
            term_month: Set(first_of_month(term_month)),
            summary: Set(summary.trim().to_string()),
            created_at: Set(now_ts()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(write_err("Failed to create performance note"))?;

        Ok(created.into_note())
    }

    pub async fn create_behaviour_record_impl(
        &self,
        student_id: i64,
        teacher_id: i64,
        occurred_on: NaiveDate,
        note: &str,
    ) -> Result<BehaviourRecord> {
        let created = behaviour_records::ActiveModel {
            student_id: Set(student_id),
            teacher_id: Set(teacher_id),
            occurred_on: Set(occurred_on),
            note: Set(note.trim().to_string()),
            created_at: Set(now_ts()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(write_err("Failed to create behaviour record"))?;

        Ok(created.into_record())
    }

    pub async fn list_performance_notes_impl(
        &self,
        student_id: i64,
        month: Option<NaiveDate>,
    ) -> Result<Vec<PerformanceNote>> {
        let mut select = performance_notes::Entity::find()
            .filter(performance_notes::Column::StudentId.eq(student_id));
        if let Some(month) = month {
            select = select.filter(performance_notes::Column::TermMonth.eq(first_of_month(month)));
        }
        let rows = select
            .order_by_desc(performance_notes::Column::TermMonth)
            .order_by_desc(performance_notes::Column::CreatedAt)
            .order_by_desc(performance_notes::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list performance notes"))?;

        Ok(rows.into_iter().map(|m| m.into_note()).collect())
    }

    pub async fn list_behaviour_records_impl(
        &self,
        student_id: i64,
        range: Option<DateRange>,
    ) -> Result<Vec<BehaviourRecord>> {
        let mut select = behaviour_records::Entity::find()
            .filter(behaviour_records::Column::StudentId.eq(student_id));
        if let Some((start, end)) = range {
            select = select.filter(behaviour_records::Column::OccurredOn.between(start, end));
        }
        let rows = select
            .order_by_desc(behaviour_records::Column::OccurredOn)
            .order_by_desc(behaviour_records::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list behaviour records"))?;

        Ok(rows.into_iter().map(|m| m.into_record()).collect())
    }
}

async fn upsert_read_state<C: ConnectionTrait>(
    db: &C,
    thread_id: i64,
    user_id: i64,
    at: i64,
) -> Result<()> {
    let existing = thread_read_states::Entity::find()
        .filter(thread_read_states::Column::ThreadId.eq(thread_id))
        .filter(thread_read_states::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(db_err("Failed to query read state"))?;

    match existing {
        Some(state) => {
            let mut model: thread_read_states::ActiveModel = state.into();
            model.last_read_at = Set(at);
            model
                .update(db)
                .await
                .map_err(db_err("Failed to update read state"))?;
        }
        None => {
            thread_read_states::ActiveModel {
                thread_id: Set(thread_id),
                user_id: Set(user_id),
                last_read_at: Set(at),
                ..Default::default()
            }
            .insert(db)
            .await
            .map_err(write_err("Failed to create read state"))?;
        }
    }
    Ok(())
}

/// Fetches the preference row, inserting the defaults on first use.
async fn preference_model<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
) -> Result<notification_preferences::Model> {
    let existing = notification_preferences::Entity::find()
        .filter(notification_preferences::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(db_err("Failed to query preferences"))?;
    if let Some(pref) = existing {
        return Ok(pref);
    }

    notification_preferences::ActiveModel {
        user_id: Set(user_id),
        enable_email: Set(true),
        enable_sms: Set(false),
        enable_in_app: Set(true),
        updated_at: Set(now_ts()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(write_err("Failed to create preferences"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::comms::entities::NotificationChannel;
    use crate::models::users::entities::UserRole;
    use crate::storage::Storage;
    use crate::storage::sea_orm_storage::academics::tests::d;
    use crate::storage::sea_orm_storage::people::tests::new_student;
    use crate::storage::sea_orm_storage::users::tests::new_user;

    async fn thread_fixture(storage: &SeaOrmStorage) -> (Thread, i64, i64) {
        let teacher = storage
            .create_user(new_user("mrsmoyo", UserRole::Teacher))
            .await
            .unwrap();
        let parent = storage
            .create_user(new_user("tendai", UserRole::Parent))
            .await
            .unwrap();
        let student = storage
            .create_student(new_student("BB010", "Nyasha", "Moyo"))
            .await
            .unwrap();
        let (thread, created) = storage
            .get_or_create_thread(student.id, teacher.id, parent.id)
            .await
            .unwrap();
        assert!(created);
        (thread, teacher.id, parent.id)
    }

    #[tokio::test]
    async fn test_thread_is_reused() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let (thread, teacher, parent) = thread_fixture(&storage).await;
        let (again, created) = storage
            .get_or_create_thread(thread.student_id, teacher, parent)
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(again.id, thread.id);
        assert_eq!(storage.count_threads(InboxScope::Teacher(teacher)).await.unwrap(), 1);
        assert_eq!(storage.count_threads(InboxScope::Parent(teacher)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unread_counts_follow_read_state() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let (thread, teacher, parent) = thread_fixture(&storage).await;

        storage.create_message(thread.id, teacher, "Homework is due").await.unwrap();
        storage.create_message(thread.id, teacher, "Please sign").await.unwrap();

        let inbox = storage
            .list_inbox(parent, InboxScope::Parent(parent), None)
            .await
            .unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].unread_count, 2);
        assert_eq!(inbox[0].teacher_username, "mrsmoyo");
        assert!(inbox[0].last_message.is_some());
        assert!(inbox[0].thread.last_message_at.is_some());

        // The sender never sees their own messages as unread.
        let teacher_view = storage.get_inbox_row(thread.id, teacher).await.unwrap().unwrap();
        assert_eq!(teacher_view.unread_count, 0);

        storage.mark_thread_read(thread.id, parent).await.unwrap();
        let row = storage.get_inbox_row(thread.id, parent).await.unwrap().unwrap();
        assert_eq!(row.unread_count, 0);

        let messages = storage.list_messages(thread.id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].message.body, "Homework is due");
        assert_eq!(storage.count_messages_sent(teacher).await.unwrap(), 2);

        let searched = storage
            .list_inbox(parent, InboxScope::All, Some("bb010".to_string()))
            .await
            .unwrap();
        assert_eq!(searched.len(), 1);
        let none = storage
            .list_inbox(parent, InboxScope::All, Some("nobody".to_string()))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_message_to_missing_thread() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let res = storage.create_message(404, 1, "hello").await;
        assert!(matches!(res, Err(BusyBeeError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_preferences_default_and_update() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let parent = storage
            .create_user(new_user("rudo", UserRole::Parent))
            .await
            .unwrap();

        let pref = storage.get_or_create_preference(parent.id).await.unwrap();
        assert!(pref.enable_email);
        assert!(!pref.enable_sms);
        assert!(pref.enable_in_app);

        let updated = storage
            .update_preference(
                parent.id,
                UpdatePreferencesRequest {
                    enable_sms: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.enable_sms);
        assert!(updated.enable_email);
    }

    #[tokio::test]
    async fn test_notification_log_lifecycle() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let log = storage
            .create_notification(NewNotification {
                user_id: None,
                channel: NotificationChannel::Sms,
                recipient: "+263770000000".to_string(),
                subject: String::new(),
                body: "Fees due".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(log.status, NotificationStatus::Queued);

        storage
            .update_notification_status(log.id, NotificationStatus::Sent, None)
            .await
            .unwrap();
        let recent = storage.list_recent_notifications(10).await.unwrap();
        assert_eq!(recent[0].status, NotificationStatus::Sent);
        assert!(recent[0].sent_at.is_some());
    }

    #[tokio::test]
    async fn test_notes_and_records() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let (thread, teacher, _) = thread_fixture(&storage).await;
        let student = thread.student_id;

        let note = storage
            .create_performance_note(student, teacher, d(2025, 3, 17), " Reading well ")
            .await
            .unwrap();
        assert_eq!(note.term_month, d(2025, 3, 1));
        assert_eq!(note.summary, "Reading well");
        storage
            .create_performance_note(student, teacher, d(2025, 4, 2), "Improving")
            .await
            .unwrap();

        let march = storage
            .list_performance_notes(student, Some(d(2025, 3, 1)))
            .await
            .unwrap();
        assert_eq!(march.len(), 1);
        let all = storage.list_performance_notes(student, None).await.unwrap();
        assert_eq!(all[0].summary, "Improving");

        storage
            .create_behaviour_record(student, teacher, d(2025, 3, 3), "Helped a classmate")
            .await
            .unwrap();
        storage
            .create_behaviour_record(student, teacher, d(2025, 5, 3), "Late")
            .await
            .unwrap();
        let in_march = storage
            .list_behaviour_records(student, Some((d(2025, 3, 1), d(2025, 3, 31))))
            .await
            .unwrap();
        assert_eq!(in_march.len(), 1);
        assert_eq!(in_march[0].note, "Helped a classmate");
    }
}
