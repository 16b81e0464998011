use std::collections::BTreeMap;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Duration;

use crate::errors::Result;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    academics::entities::AttendanceCounts,
    auth::responses::{DashboardResponse, ManagementDashboard, ParentDashboard, TeacherDashboard},
    comms::entities::InboxScope,
    users::entities::{User, UserRole},
};
use crate::storage::Storage;
use crate::utils::dates::today;

use super::AuthService;

const RECENT_NOTIFICATIONS: u64 = 10;
const RECENT_ABSENCES: u64 = 5;
const ATTENDANCE_WINDOW_DAYS: i64 = 30;

pub async fn handle_dashboard(
    service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    if !user.has_accepted_terms() {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::TermsNotAccepted,
            "Please accept the terms of use to continue.",
        )));
    }

    let storage = service.get_storage(request);
    let dashboard = match user.role {
        UserRole::Principal | UserRole::Admin => {
            DashboardResponse::Management(management_dashboard(storage.as_ref()).await?)
        }
        UserRole::Teacher => DashboardResponse::Teacher(teacher_dashboard(storage.as_ref(), &user).await?),
        UserRole::Parent => DashboardResponse::Parent(parent_dashboard(storage.as_ref(), &user).await?),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        dashboard,
        "Dashboard retrieved successfully",
    )))
}

fn attendance_by_status(counts: &AttendanceCounts) -> BTreeMap<String, u64> {
    BTreeMap::from([
        ("present".to_string(), counts.present),
        ("late".to_string(), counts.late),
        ("absent".to_string(), counts.absent),
    ])
}

async fn management_dashboard(storage: &dyn Storage) -> Result<ManagementDashboard> {
    let today = today();
    let since = today - Duration::days(ATTENDANCE_WINDOW_DAYS);

    let finance = storage.finance_stats(today).await?;
    let admissions = storage.application_counts().await?;
    let attendance = storage.attendance_summary_since(since).await?;

    Ok(ManagementDashboard {
        students_count: storage.count_students(None).await?,
        teachers_count: storage.count_users_by_roles(&[UserRole::Teacher]).await?,
        employees_count: storage
            .count_users_by_roles(&[UserRole::Principal, UserRole::Admin, UserRole::Teacher])
            .await?,
        subjects_count: storage.count_subjects().await?,
        unpaid_invoices: finance.outstanding,
        finance_invoices_total: finance.invoices_total,
        finance_pending_verification: finance.pending_verification,
        finance_overdue: finance.overdue,
        finance_outstanding: finance.outstanding_sum,
        threads_count: storage.count_threads(InboxScope::All).await?,
        recent_notifications: storage.list_recent_notifications(RECENT_NOTIFICATIONS).await?,
        admissions_total: admissions.total,
        admissions_new: admissions.new,
        admissions_accepted: admissions.accepted,
        attendance_summary: attendance_by_status(&attendance),
        recent_absences: storage.recent_absences(since, RECENT_ABSENCES).await?,
    })
}

async fn teacher_dashboard(storage: &dyn Storage, user: &User) -> Result<TeacherDashboard> {
    Ok(TeacherDashboard {
        my_threads: storage.count_threads(InboxScope::Teacher(user.id)).await?,
        my_sent_messages: storage.count_messages_sent(user.id).await?,
        class_groups_count: storage.teacher_class_groups(user.id).await?.len() as u64,
    })
}

async fn parent_dashboard(storage: &dyn Storage, user: &User) -> Result<ParentDashboard> {
    let children: Vec<i64> = storage
        .list_children(user.id)
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect();

    Ok(ParentDashboard {
        linked_students: children.len() as u64,
        my_invoices: storage.count_invoices(Some(&children)).await?,
        my_threads: storage.count_threads(InboxScope::Parent(user.id)).await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::users::tests::new_user;

    #[test]
    fn test_attendance_keys() {
        let counts = AttendanceCounts {
            present: 4,
            late: 1,
            absent: 2,
            total: 7,
            last_date: None,
        };
        let map = attendance_by_status(&counts);
        assert_eq!(map.get("present"), Some(&4));
        assert_eq!(map.get("absent"), Some(&2));
        assert_eq!(map.len(), 3);
    }

    #[tokio::test]
    async fn test_management_counts_staff() {
        let storage = SeaOrmStorage::new_in_memory().await;
        storage.create_user(new_user("head", UserRole::Principal)).await.unwrap();
        storage.create_user(new_user("teach", UserRole::Teacher)).await.unwrap();
        storage.create_user(new_user("mum", UserRole::Parent)).await.unwrap();

        let dashboard = management_dashboard(&storage).await.unwrap();
        assert_eq!(dashboard.teachers_count, 1);
        assert_eq!(dashboard.employees_count, 2);
        assert_eq!(dashboard.students_count, 0);
        assert_eq!(dashboard.unpaid_invoices, 0);
    }

    #[tokio::test]
    async fn test_parent_without_children() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let parent = storage.create_user(new_user("dad", UserRole::Parent)).await.unwrap();
        let dashboard = parent_dashboard(&storage, &parent).await.unwrap();
        assert_eq!(dashboard.linked_students, 0);
        assert_eq!(dashboard.my_invoices, 0);
    }
}
