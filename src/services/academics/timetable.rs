use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AcademicsService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    academics::{
        entities::day_name,
        requests::{
            ChildQuery, CreateTimetableEntryRequest, NewTimetableEntry, TimetableFilter,
        },
        responses::{TeacherTodayResponse, TimetableResponse},
    },
    users::entities::UserRole,
};
use crate::services::access::{ACCESS_DENIED, bad_request, forbidden, not_found, select_child};
use crate::utils::dates::{today, weekday_index};

pub(crate) fn validate_entry(body: &CreateTimetableEntryRequest) -> Result<(), &'static str> {
    if day_name(body.day_of_week).is_none() {
        return Err("Day of week must be between 0 (Monday) and 6 (Sunday)");
    }
    if body.start_time >= body.end_time {
        return Err("Start time must be before end time");
    }
    Ok(())
}

pub async fn create_entry(
    service: &AcademicsService,
    body: CreateTimetableEntryRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_entry(&body) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }
    let storage = service.get_storage(request);

    if storage.get_class_group(body.class_group_id).await?.is_none() {
        return Ok(not_found(ErrorCode::ClassGroupNotFound, "Class group not found"));
    }
    if storage.get_subject(body.subject_id).await?.is_none() {
        return Ok(not_found(ErrorCode::NotFound, "Subject not found"));
    }
    if let Some(teacher_id) = body.teacher_id {
        let is_teacher = storage
            .get_user_by_id(teacher_id)
            .await?
            .is_some_and(|u| u.role == UserRole::Teacher);
        if !is_teacher {
            return Ok(bad_request(
                ErrorCode::BadRequest,
                "The selected teacher does not exist",
            ));
        }
    }

    let entry = storage
        .create_timetable_entry(NewTimetableEntry {
            class_group_id: body.class_group_id,
            subject_id: body.subject_id,
            teacher_id: body.teacher_id,
            day_of_week: body.day_of_week,
            start_time: body.start_time,
            end_time: body.end_time,
            room: body.room.trim().to_string(),
        })
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(entry, "Timetable entry created")))
}

pub async fn delete_entry(
    service: &AcademicsService,
    entry_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    if storage.delete_timetable_entry(entry_id).await? {
        Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Timetable entry deleted")))
    } else {
        Ok(not_found(ErrorCode::NotFound, "Timetable entry not found"))
    }
}

/// Teachers get their own slots, parents the class of the selected child,
/// principal and admin the whole school.
pub async fn my_timetable(
    service: &AcademicsService,
    query: ChildQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request);

    let response = match user.role {
        UserRole::Teacher => TimetableResponse {
            items: storage
                .list_timetable(TimetableFilter {
                    teacher_id: Some(user.id),
                    ..Default::default()
                })
                .await?,
            student: None,
        },
        UserRole::Parent => {
            let Some(student) = select_child(storage.as_ref(), user.id, query.student_id).await?
            else {
                return Ok(HttpResponse::Ok().json(ApiResponse::success(
                    TimetableResponse {
                        items: Vec::new(),
                        student: None,
                    },
                    "No linked students",
                )));
            };
            let items = match storage.get_current_enrollment(student.id).await? {
                Some(enrollment) => {
                    storage
                        .list_timetable(TimetableFilter {
                            class_group_id: Some(enrollment.class_group_id),
                            ..Default::default()
                        })
                        .await?
                }
                None => Vec::new(),
            };
            TimetableResponse {
                items,
                student: Some(student),
            }
        }
        UserRole::Principal | UserRole::Admin => TimetableResponse {
            items: storage.list_timetable(TimetableFilter::default()).await?,
            student: None,
        },
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        response,
        "Timetable retrieved successfully",
    )))
}

pub async fn teacher_today(
    service: &AcademicsService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    if user.role != UserRole::Teacher {
        return Ok(forbidden(ACCESS_DENIED));
    }
    let storage = service.get_storage(request);

    let date = today();
    let day_of_week = weekday_index(date);
    let entries = storage
        .list_timetable(TimetableFilter {
            teacher_id: Some(user.id),
            day_of_week: Some(day_of_week),
            ..Default::default()
        })
        .await?;
    let classes = storage.teacher_class_groups(user.id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        TeacherTodayResponse {
            date,
            day_of_week,
            entries,
            classes,
        },
        "Today's schedule retrieved successfully",
    )))
}

pub async fn teacher_classes(
    service: &AcademicsService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    if user.role != UserRole::Teacher {
        return Ok(forbidden(ACCESS_DENIED));
    }
    let storage = service.get_storage(request);
    let classes = storage.teacher_class_groups(user.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        classes,
        "Classes retrieved successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn entry(day: i32, start: (u32, u32), end: (u32, u32)) -> CreateTimetableEntryRequest {
        CreateTimetableEntryRequest {
            class_group_id: 1,
            subject_id: 1,
            teacher_id: None,
            day_of_week: day,
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            room: String::new(),
        }
    }

    #[test]
    fn test_entry_validation() {
        assert!(validate_entry(&entry(0, (8, 0), (8, 40))).is_ok());
        assert!(validate_entry(&entry(6, (13, 0), (14, 0))).is_ok());
        assert!(validate_entry(&entry(7, (8, 0), (9, 0))).is_err());
        assert!(validate_entry(&entry(-1, (8, 0), (9, 0))).is_err());
        assert!(validate_entry(&entry(2, (9, 0), (9, 0))).is_err());
        assert!(validate_entry(&entry(2, (10, 0), (9, 0))).is_err());
    }
}
