use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Duration;

use super::FinanceService;
use crate::config::AppConfig;
use crate::models::{
    ApiResponse, ErrorCode,
    comms::{entities::NotificationChannel, requests::NewNotification},
    finance::{entities::ReminderTarget, requests::FeeReminderRequest, responses::FeeReminderResponse},
};
use crate::services::access::bad_request;
use crate::services::comms::notify;
use crate::services::system::DynamicConfig;
use crate::utils::dates::today;

const REMINDER_SUBJECT: &str = "School Fees Reminder";

/// Email when the parent has one, otherwise SMS to their phone or the
/// configured placeholder number.
pub(crate) fn reminder_notification(target: &ReminderTarget, fallback_phone: &str) -> NewNotification {
    let email = target.parent_email.as_deref().map(str::trim).filter(|e| !e.is_empty());
    let phone = target.parent_phone.as_deref().map(str::trim).filter(|p| !p.is_empty());
    let (channel, recipient) = match (email, phone) {
        (Some(email), _) => (NotificationChannel::Email, email.to_string()),
        (None, Some(phone)) => (NotificationChannel::Sms, phone.to_string()),
        (None, None) => (NotificationChannel::Sms, fallback_phone.to_string()),
    };
    NewNotification {
        user_id: target.parent_id,
        channel,
        recipient,
        subject: REMINDER_SUBJECT.to_string(),
        body: target.message(),
    }
}

pub async fn send_fee_reminders(
    service: &FinanceService,
    body: FeeReminderRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let days_overdue = match body.days_overdue {
        Some(days) => days,
        None => DynamicConfig::reminder_days_overdue().await,
    };
    if days_overdue < 0 {
        return Ok(bad_request(ErrorCode::BadRequest, "Days overdue cannot be negative"));
    }

    let storage = service.get_storage(request);
    let cutoff = today() - Duration::days(days_overdue);
    let fallback_phone = &AppConfig::get().notify.fallback_phone;

    let targets = storage.reminder_targets(cutoff).await?;
    let mut queued = 0;
    for target in &targets {
        notify::deliver(storage.as_ref(), reminder_notification(target, fallback_phone)).await?;
        queued += 1;
    }
    tracing::info!("Queued {} fee reminders for invoices due on or before {}", queued, cutoff);

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        FeeReminderResponse {
            queued,
            days_overdue,
            cutoff,
        },
        "Fee reminders queued",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Money;
    use chrono::NaiveDate;

    fn target(email: Option<&str>, phone: Option<&str>) -> ReminderTarget {
        ReminderTarget {
            invoice_id: 12,
            total: Money::from_cents(45_000),
            due_date: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            student_code: "BB001".to_string(),
            student_first_name: "Rudo".to_string(),
            student_last_name: "Ncube".to_string(),
            parent_id: Some(3),
            parent_email: email.map(str::to_string),
            parent_phone: phone.map(str::to_string),
        }
    }

    #[test]
    fn test_reminder_channel_choice() {
        let by_email = reminder_notification(&target(Some("mum@example.com"), Some("0771")), "UNKNOWN_PHONE");
        assert_eq!(by_email.channel, NotificationChannel::Email);
        assert_eq!(by_email.recipient, "mum@example.com");

        let by_sms = reminder_notification(&target(Some(" "), Some("0771")), "UNKNOWN_PHONE");
        assert_eq!(by_sms.channel, NotificationChannel::Sms);
        assert_eq!(by_sms.recipient, "0771");

        let fallback = reminder_notification(&target(None, None), "UNKNOWN_PHONE");
        assert_eq!(fallback.recipient, "UNKNOWN_PHONE");
        assert_eq!(
            fallback.body,
            "School Fees Reminder: Rudo Ncube (ID BB001) outstanding invoice #12. Amount 450.00. Due 2025-01-31."
        );
    }
}
