//! Outbound notifications.
//!
//! Every delivery attempt is logged as a `notification_logs` row that starts
//! `queued` and ends `sent` or `failed`. Delivery itself goes through a
//! [`NotificationProvider`]; the only shipped provider writes to the log.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::comms::entities::{
    NOTIFY_PREVIEW_LEN, NotificationChannel, NotificationLog, NotificationStatus, truncate_chars,
};
use crate::models::comms::requests::NewNotification;
use crate::models::users::entities::User;
use crate::storage::Storage;

#[async_trait]
pub trait NotificationProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(
        &self,
        channel: NotificationChannel,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> std::result::Result<(), String>;
}

/// Writes deliveries to the application log.
pub struct ConsoleProvider;

#[async_trait]
impl NotificationProvider for ConsoleProvider {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn send(
        &self,
        channel: NotificationChannel,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> std::result::Result<(), String> {
        info!(
            target: "busybee_sms::notify",
            "[{}] to {}: {} | {}",
            channel, recipient, subject, body
        );
        Ok(())
    }
}

static PROVIDER: Lazy<Box<dyn NotificationProvider>> = Lazy::new(|| {
    let configured = AppConfig::get().notify.provider.as_str();
    if configured != "console" {
        warn!("Unknown notification provider '{configured}', using console");
    }
    Box::new(ConsoleProvider)
});

/// Logs and delivers one notification through `provider`.
pub async fn deliver_with(
    storage: &dyn Storage,
    provider: &dyn NotificationProvider,
    notification: NewNotification,
) -> Result<NotificationLog> {
    let mut log = storage.create_notification(notification).await?;

    let (status, error) = match provider
        .send(log.channel, &log.recipient, &log.subject, &log.body)
        .await
    {
        Ok(()) => (NotificationStatus::Sent, None),
        Err(e) => {
            warn!("Notification {} via {} failed: {}", log.id, provider.name(), e);
            (NotificationStatus::Failed, Some(e))
        }
    };
    storage
        .update_notification_status(log.id, status, error.clone())
        .await?;

    log.status = status;
    log.error = error;
    Ok(log)
}

pub async fn deliver(storage: &dyn Storage, notification: NewNotification) -> Result<NotificationLog> {
    deliver_with(storage, PROVIDER.as_ref(), notification).await
}

/// Notifies `user` by email and SMS as their preferences allow and their
/// account can receive. In-app delivery is the inbox itself. Returns how many
/// deliveries were attempted.
pub async fn notify_user(
    storage: &dyn Storage,
    user: &User,
    subject: &str,
    body: &str,
) -> Result<usize> {
    let preference = storage.get_or_create_preference(user.id).await?;
    let body = truncate_chars(body, NOTIFY_PREVIEW_LEN);

    let mut targets = Vec::new();
    if preference.enable_email && !user.email.trim().is_empty() {
        targets.push((NotificationChannel::Email, user.email.clone()));
    }
    if preference.enable_sms
        && let Some(phone) = user.phone.as_deref().filter(|p| !p.trim().is_empty())
    {
        targets.push((NotificationChannel::Sms, phone.to_string()));
    }

    let sent = targets.len();
    for (channel, recipient) in targets {
        deliver(
            storage,
            NewNotification {
                user_id: Some(user.id),
                channel,
                recipient,
                subject: subject.to_string(),
                body: body.clone(),
            },
        )
        .await?;
    }
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::users::tests::new_user;

    struct FailingProvider;

    #[async_trait]
    impl NotificationProvider for FailingProvider {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn send(
            &self,
            _channel: NotificationChannel,
            _recipient: &str,
            _subject: &str,
            _body: &str,
        ) -> std::result::Result<(), String> {
            Err("gateway unreachable".to_string())
        }
    }

    fn sms(body: &str) -> NewNotification {
        NewNotification {
            user_id: None,
            channel: NotificationChannel::Sms,
            recipient: "UNKNOWN_PHONE".to_string(),
            subject: "Fee reminder".to_string(),
            body: body.to_string(),
        }
    }

    #[tokio::test]
    async fn test_delivery_outcome_is_logged() {
        let storage = SeaOrmStorage::new_in_memory().await;

        let sent = deliver_with(&storage, &ConsoleProvider, sms("hello")).await.unwrap();
        assert_eq!(sent.status, NotificationStatus::Sent);

        let failed = deliver_with(&storage, &FailingProvider, sms("again")).await.unwrap();
        assert_eq!(failed.status, NotificationStatus::Failed);
        assert_eq!(failed.error.as_deref(), Some("gateway unreachable"));

        let logs = storage.list_recent_notifications(10).await.unwrap();
        assert_eq!(logs.len(), 2);
        assert!(logs.iter().any(|l| l.status == NotificationStatus::Failed));
    }

    #[tokio::test]
    async fn test_notify_user_follows_preferences() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let parent = storage
            .create_user(new_user("mum", UserRole::Parent))
            .await
            .unwrap();

        // Defaults: email on, SMS off.
        let sent = notify_user(&storage, &parent, "New message", "Hi").await.unwrap();
        assert_eq!(sent, 1);

        storage
            .update_preference(
                parent.id,
                crate::models::comms::requests::UpdatePreferencesRequest {
                    enable_email: Some(false),
                    enable_sms: Some(true),
                    enable_in_app: Some(false),
                },
            )
            .await
            .unwrap();
        // SMS enabled but the account has no phone.
        let sent = notify_user(&storage, &parent, "New message", "Hi").await.unwrap();
        assert_eq!(sent, 0);
    }
}
