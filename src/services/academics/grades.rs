use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use serde_json::Value;
use std::collections::HashSet;

use super::{AcademicsService, can_access_class, classes::not_assigned};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    academics::{
        entities::AssessmentDetail,
        requests::{
            AssessmentSearchQuery, CreateAssessmentRequest, EnterGradesRequest, GradeEntryInput,
            GradeUpsert, NewAssessment,
        },
        responses::{
            AssessmentListResponse, EnterGradesResponse, GradeListResponse, GradeSheetResponse,
            GradeSheetRow,
        },
    },
    users::entities::{User, UserRole},
};
use crate::services::access::{ACCESS_DENIED, bad_request, forbidden, not_found};
use crate::utils::validate::validate_required;

const TEACHER_ASSESSMENT_LIMIT: u64 = 200;
const MY_GRADES_LIMIT: u64 = 80;

/// `Ok(None)` for a blank score, which leaves any stored grade untouched.
pub(crate) fn parse_score(value: Option<&Value>, max_score: f64) -> Result<Option<f64>, String> {
    let score = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(raw)) if raw.trim().is_empty() => return Ok(None),
        Some(Value::String(raw)) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("'{}' is not a number", raw.trim()))?,
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| format!("'{n}' is not a number"))?,
        Some(other) => return Err(format!("'{other}' is not a number")),
    };
    if !score.is_finite() || score < 0.0 || score > max_score {
        return Err(format!("Score {score} must be between 0 and {max_score}"));
    }
    Ok(Some(score))
}

/// Splits submitted entries into upserts and a skipped count, or fails the
/// whole batch on the first invalid score.
pub(crate) fn collect_grades(
    entries: Vec<GradeEntryInput>,
    max_score: f64,
    roster: &HashSet<i64>,
) -> Result<(Vec<GradeUpsert>, usize), String> {
    let mut upserts = Vec::new();
    let mut skipped = 0;
    for entry in entries {
        if !roster.contains(&entry.student_id) {
            skipped += 1;
            continue;
        }
        match parse_score(entry.score.as_ref(), max_score) {
            Ok(Some(score)) => upserts.push(GradeUpsert {
                student_id: entry.student_id,
                score,
                comment: entry.comment.unwrap_or_default().trim().to_string(),
            }),
            Ok(None) => skipped += 1,
            Err(msg) => return Err(format!("Student {}: {}", entry.student_id, msg)),
        }
    }
    Ok((upserts, skipped))
}

fn validate_assessment(body: &CreateAssessmentRequest) -> Result<(), String> {
    validate_required(&body.title, "Title", 200)?;
    if !body.max_score.is_finite() || body.max_score <= 0.0 {
        return Err("Max score must be greater than zero".to_string());
    }
    if !body.weight.is_finite() || body.weight < 0.0 {
        return Err("Weight cannot be negative".to_string());
    }
    Ok(())
}

/// The assessment, when `user` is the teacher who set it.
async fn owned_assessment(
    service: &AcademicsService,
    user: &User,
    assessment_id: i64,
    request: &HttpRequest,
) -> ActixResult<Result<AssessmentDetail, HttpResponse>> {
    let storage = service.get_storage(request);
    let Some(assessment) = storage.get_assessment(assessment_id).await? else {
        return Ok(Err(not_found(
            ErrorCode::AssessmentNotFound,
            "Assessment not found",
        )));
    };
    if assessment.assessment.teacher_id != user.id {
        return Ok(Err(forbidden(ACCESS_DENIED)));
    }
    Ok(Ok(assessment))
}

pub async fn teacher_assessments(
    service: &AcademicsService,
    query: AssessmentSearchQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    if user.role != UserRole::Teacher {
        return Ok(forbidden(ACCESS_DENIED));
    }
    let storage = service.get_storage(request);
    let items = storage
        .list_teacher_assessments(user.id, query.q, TEACHER_ASSESSMENT_LIMIT)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        AssessmentListResponse { items },
        "Assessments retrieved successfully",
    )))
}

pub async fn create_assessment(
    service: &AcademicsService,
    body: CreateAssessmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    if user.role != UserRole::Teacher {
        return Ok(forbidden(ACCESS_DENIED));
    }
    if let Err(msg) = validate_assessment(&body) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }
    let storage = service.get_storage(request);

    if storage.get_class_group(body.class_group_id).await?.is_none() {
        return Ok(not_found(ErrorCode::ClassGroupNotFound, "Class group not found"));
    }
    if storage.get_subject(body.subject_id).await?.is_none() {
        return Ok(not_found(ErrorCode::NotFound, "Subject not found"));
    }
    if !can_access_class(storage.as_ref(), &user, body.class_group_id).await? {
        return Ok(not_assigned());
    }

    let assessment = storage
        .create_assessment(NewAssessment {
            class_group_id: body.class_group_id,
            subject_id: body.subject_id,
            teacher_id: user.id,
            title: body.title.trim().to_string(),
            assessment_type: body.assessment_type,
            max_score: body.max_score,
            weight: body.weight,
            date: body.date,
        })
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(assessment, "Assessment created")))
}

pub async fn grade_sheet(
    service: &AcademicsService,
    assessment_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    let assessment = match owned_assessment(service, &user, assessment_id, request).await? {
        Ok(assessment) => assessment,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    let roster = storage
        .list_roster(assessment.assessment.class_group_id)
        .await?;
    let mut grades = storage.grades_for_assessment(assessment_id).await?;

    let rows = roster
        .into_iter()
        .map(|student| {
            let grade = grades.remove(&student.student_id);
            GradeSheetRow {
                score: grade.as_ref().map(|g| g.score),
                comment: grade.map(|g| g.comment).unwrap_or_default(),
                student,
            }
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        GradeSheetResponse { assessment, rows },
        "Grade sheet retrieved successfully",
    )))
}

pub async fn enter_grades(
    service: &AcademicsService,
    assessment_id: i64,
    body: EnterGradesRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    let assessment = match owned_assessment(service, &user, assessment_id, request).await? {
        Ok(assessment) => assessment,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    let roster: HashSet<i64> = storage
        .list_roster(assessment.assessment.class_group_id)
        .await?
        .into_iter()
        .map(|entry| entry.student_id)
        .collect();

    let (upserts, skipped) =
        match collect_grades(body.entries, assessment.assessment.max_score, &roster) {
            Ok(collected) => collected,
            Err(msg) => return Ok(bad_request(ErrorCode::GradeInvalid, msg)),
        };

    let saved = storage.upsert_grades(assessment_id, upserts).await?;
    tracing::info!(
        "Grades for assessment {} saved by user {} ({} saved, {} skipped)",
        assessment_id,
        user.id,
        saved,
        skipped
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        EnterGradesResponse { saved, skipped },
        "Grades saved",
    )))
}

pub async fn my_grades(
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
    let items = storage.list_grades(&ids, None, MY_GRADES_LIMIT).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        GradeListResponse { items },
        "Grades retrieved successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(student_id: i64, score: Value) -> GradeEntryInput {
        GradeEntryInput {
            student_id,
            score: Some(score),
            comment: Some(" well done ".to_string()),
        }
    }

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score(None, 50.0), Ok(None));
        assert_eq!(parse_score(Some(&json!(null)), 50.0), Ok(None));
        assert_eq!(parse_score(Some(&json!("  ")), 50.0), Ok(None));
        assert_eq!(parse_score(Some(&json!("42.5")), 50.0), Ok(Some(42.5)));
        assert_eq!(parse_score(Some(&json!(50)), 50.0), Ok(Some(50.0)));
        assert!(parse_score(Some(&json!("abc")), 50.0).is_err());
        assert!(parse_score(Some(&json!(51)), 50.0).is_err());
        assert!(parse_score(Some(&json!(-1)), 50.0).is_err());
        assert!(parse_score(Some(&json!(true)), 50.0).is_err());
    }

    #[test]
    fn test_blank_and_foreign_entries_are_skipped() {
        let roster = HashSet::from([1, 2, 3]);
        let (upserts, skipped) = collect_grades(
            vec![entry(1, json!(40)), entry(2, json!("")), entry(9, json!(10))],
            50.0,
            &roster,
        )
        .unwrap();
        assert_eq!(skipped, 2);
        assert_eq!(upserts.len(), 1);
        assert_eq!(upserts[0].comment, "well done");
    }

    #[test]
    fn test_one_bad_score_rejects_the_batch() {
        let roster = HashSet::from([1, 2]);
        let result = collect_grades(
            vec![entry(1, json!(40)), entry(2, json!("forty"))],
            50.0,
            &roster,
        );
        assert!(result.is_err());
    }
}
