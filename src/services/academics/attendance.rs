use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashMap;

use super::{AcademicsService, can_access_class, classes::not_assigned};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    academics::{
        entities::{AttendanceCounts, AttendanceStatus, RosterEntry},
        requests::{AttendanceMark, AttendanceSheetQuery, MarkAttendanceRequest},
        responses::{
            AttendanceListResponse, AttendanceSheetResponse, AttendanceSheetRow,
            MarkAttendanceResponse,
        },
    },
    users::entities::UserRole,
};
use crate::services::access::{ACCESS_DENIED, forbidden, not_found};
use crate::utils::dates::today;

const MY_ATTENDANCE_LIMIT: u64 = 60;

/// One mark per rostered student; ids outside the roster are ignored.
pub(crate) fn build_marks(
    roster: &[RosterEntry],
    submitted: &HashMap<i64, String>,
) -> Vec<AttendanceMark> {
    roster
        .iter()
        .map(|entry| AttendanceMark {
            student_id: entry.student_id,
            status: submitted
                .get(&entry.student_id)
                .map(|raw| AttendanceStatus::parse_or_present(raw.trim()))
                .unwrap_or(AttendanceStatus::Present),
        })
        .collect()
}

pub async fn attendance_sheet(
    service: &AcademicsService,
    class_group_id: i64,
    query: AttendanceSheetQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request);

    let Some(class_group) = storage.get_class_group(class_group_id).await? else {
        return Ok(not_found(ErrorCode::ClassGroupNotFound, "Class group not found"));
    };
    if !can_access_class(storage.as_ref(), &user, class_group_id).await? {
        return Ok(not_assigned());
    }

    let date = query.date.unwrap_or_else(today);
    let roster = storage.list_roster(class_group_id).await?;
    let mut existing = storage
        .attendance_for_class_date(class_group_id, date)
        .await?;

    let rows = roster
        .into_iter()
        .map(|student| AttendanceSheetRow {
            status: existing.remove(&student.student_id),
            student,
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        AttendanceSheetResponse {
            class_group,
            date,
            rows,
        },
        "Attendance sheet retrieved successfully",
    )))
}

pub async fn mark_attendance(
    service: &AcademicsService,
    class_group_id: i64,
    body: MarkAttendanceRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request);

    if storage.get_class_group(class_group_id).await?.is_none() {
        return Ok(not_found(ErrorCode::ClassGroupNotFound, "Class group not found"));
    }
    if !can_access_class(storage.as_ref(), &user, class_group_id).await? {
        return Ok(not_assigned());
    }

    let date = body.date.unwrap_or_else(today);
    let roster = storage.list_roster(class_group_id).await?;
    let marks = build_marks(&roster, &body.marks);

    let mut counts = AttendanceCounts::default();
    for mark in &marks {
        counts.add(mark.status, date);
    }

    let marked = storage
        .mark_attendance(class_group_id, date, marks, user.id)
        .await?;
    tracing::info!(
        "Attendance for class {} on {} marked by user {} ({} students)",
        class_group_id,
        date,
        user.id,
        marked
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        MarkAttendanceResponse {
            date,
            marked,
            counts,
        },
        "Attendance saved",
    )))
}

pub async fn my_attendance(
    service: &AcademicsService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    if user.role != UserRole::Parent {
        return Ok(forbidden(ACCESS_DENIED));
    }
    let storage = service.get_storage(request);

    let ids: Vec<i64> = storage
        .list_children(user.id)
        .await?
        .iter()
        .map(|s| s.id)
        .collect();
    let items = storage
        .list_attendance(&ids, None, MY_ATTENDANCE_LIMIT)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        AttendanceListResponse { items },
        "Attendance retrieved successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<RosterEntry> {
        (1..=4)
            .map(|id| RosterEntry {
                student_id: id,
                student_code: format!("BB00{id}"),
                first_name: "Kid".to_string(),
                last_name: format!("Number{id}"),
            })
            .collect()
    }

    #[test]
    fn test_every_rostered_student_gets_a_mark() {
        let submitted = HashMap::from([
            (1, "absent".to_string()),
            (2, " late ".to_string()),
            (3, "sick".to_string()),
            (99, "absent".to_string()),
        ]);
        let marks = build_marks(&roster(), &submitted);

        let statuses: Vec<(i64, AttendanceStatus)> =
            marks.iter().map(|m| (m.student_id, m.status)).collect();
        assert_eq!(
            statuses,
            vec![
                (1, AttendanceStatus::Absent),
                (2, AttendanceStatus::Late),
                (3, AttendanceStatus::Present),
                (4, AttendanceStatus::Present),
            ]
        );
    }
}
