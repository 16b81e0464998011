use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::academics::requests::{
    AssessmentSearchQuery, AttendanceSheetQuery, ChildQuery, ClassGroupListParams,
    CreateAssessmentRequest, CreateClassGroupRequest, CreateEnrollmentRequest,
    CreateSubjectRequest, CreateTimetableEntryRequest, EnterGradesRequest, MarkAttendanceRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::AcademicsService;
use crate::utils::SafeIDI64;

static ACADEMICS_SERVICE: Lazy<AcademicsService> = Lazy::new(AcademicsService::new_lazy);

pub async fn list_subjects(req: HttpRequest) -> ActixResult<HttpResponse> {
    ACADEMICS_SERVICE.list_subjects(&req).await
}

pub async fn create_subject(
    req: HttpRequest,
    body: web::Json<CreateSubjectRequest>,
) -> ActixResult<HttpResponse> {
    ACADEMICS_SERVICE.create_subject(body.into_inner(), &req).await
}

pub async fn list_class_groups(
    req: HttpRequest,
    query: web::Query<ClassGroupListParams>,
) -> ActixResult<HttpResponse> {
    ACADEMICS_SERVICE
        .list_class_groups(query.into_inner(), &req)
        .await
}

pub async fn create_class_group(
    req: HttpRequest,
    body: web::Json<CreateClassGroupRequest>,
) -> ActixResult<HttpResponse> {
    ACADEMICS_SERVICE
        .create_class_group(body.into_inner(), &req)
        .await
}

pub async fn roster(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ACADEMICS_SERVICE.roster(id.0, &req).await
}

pub async fn create_enrollment(
    req: HttpRequest,
    body: web::Json<CreateEnrollmentRequest>,
) -> ActixResult<HttpResponse> {
    ACADEMICS_SERVICE
        .create_enrollment(body.into_inner(), &req)
        .await
}

pub async fn delete_enrollment(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ACADEMICS_SERVICE.delete_enrollment(id.0, &req).await
}

pub async fn create_timetable_entry(
    req: HttpRequest,
    body: web::Json<CreateTimetableEntryRequest>,
) -> ActixResult<HttpResponse> {
    ACADEMICS_SERVICE
        .create_timetable_entry(body.into_inner(), &req)
        .await
}

pub async fn delete_timetable_entry(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ACADEMICS_SERVICE.delete_timetable_entry(id.0, &req).await
}

pub async fn my_timetable(
    req: HttpRequest,
    query: web::Query<ChildQuery>,
) -> ActixResult<HttpResponse> {
    ACADEMICS_SERVICE.my_timetable(query.into_inner(), &req).await
}

pub async fn teacher_today(req: HttpRequest) -> ActixResult<HttpResponse> {
    ACADEMICS_SERVICE.teacher_today(&req).await
}

pub async fn teacher_classes(req: HttpRequest) -> ActixResult<HttpResponse> {
    ACADEMICS_SERVICE.teacher_classes(&req).await
}

pub async fn attendance_sheet(
    req: HttpRequest,
    id: SafeIDI64,
    query: web::Query<AttendanceSheetQuery>,
) -> ActixResult<HttpResponse> {
    ACADEMICS_SERVICE
        .attendance_sheet(id.0, query.into_inner(), &req)
        .await
}

pub async fn mark_attendance(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<MarkAttendanceRequest>,
) -> ActixResult<HttpResponse> {
    ACADEMICS_SERVICE
        .mark_attendance(id.0, body.into_inner(), &req)
        .await
}

pub async fn my_attendance(req: HttpRequest) -> ActixResult<HttpResponse> {
    ACADEMICS_SERVICE.my_attendance(&req).await
}

pub async fn teacher_assessments(
    req: HttpRequest,
    query: web::Query<AssessmentSearchQuery>,
) -> ActixResult<HttpResponse> {
    ACADEMICS_SERVICE
        .teacher_assessments(query.into_inner(), &req)
        .await
}

pub async fn create_assessment(
    req: HttpRequest,
    body: web::Json<CreateAssessmentRequest>,
) -> ActixResult<HttpResponse> {
    ACADEMICS_SERVICE
        .create_assessment(body.into_inner(), &req)
        .await
}

pub async fn grade_sheet(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ACADEMICS_SERVICE.grade_sheet(id.0, &req).await
}

pub async fn enter_grades(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<EnterGradesRequest>,
) -> ActixResult<HttpResponse> {
    ACADEMICS_SERVICE
        .enter_grades(id.0, body.into_inner(), &req)
        .await
}

pub async fn my_grades(req: HttpRequest) -> ActixResult<HttpResponse> {
    ACADEMICS_SERVICE.my_grades(&req).await
}

pub async fn parent_hub(
    req: HttpRequest,
    query: web::Query<ChildQuery>,
) -> ActixResult<HttpResponse> {
    ACADEMICS_SERVICE.parent_hub(query.into_inner(), &req).await
}

pub fn configure_academics_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/academics")
            .wrap(middlewares::RequireJWT)
            .route("/subjects", web::get().to(list_subjects))
            .route("/class-groups", web::get().to(list_class_groups))
            .route("/class-groups/{id}/roster", web::get().to(roster))
            .route("/class-groups/{id}/attendance", web::get().to(attendance_sheet))
            .route("/class-groups/{id}/attendance", web::post().to(mark_attendance))
            .route("/timetable/mine", web::get().to(my_timetable))
            .route("/teacher/today", web::get().to(teacher_today))
            .route("/teacher/classes", web::get().to(teacher_classes))
            .route("/assessments", web::get().to(teacher_assessments))
            .route("/assessments", web::post().to(create_assessment))
            .route("/assessments/{id}/grades", web::get().to(grade_sheet))
            .route("/assessments/{id}/grades", web::post().to(enter_grades))
            .route("/my/attendance", web::get().to(my_attendance))
            .route("/my/grades", web::get().to(my_grades))
            .route("/parent-hub", web::get().to(parent_hub))
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                    .route("/subjects", web::post().to(create_subject))
                    .route("/class-groups", web::post().to(create_class_group))
                    .route("/enrollments", web::post().to(create_enrollment))
                    .route("/enrollments/{id}", web::delete().to(delete_enrollment))
                    .route("/timetable", web::post().to(create_timetable_entry))
                    .route("/timetable/{id}", web::delete().to(delete_timetable_entry)),
            ),
    );
}
