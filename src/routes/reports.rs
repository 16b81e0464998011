use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, middleware, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequirePermission};
use crate::models::rbac::entities::perms;
use crate::models::reports::requests::{MonthlyQuery, ReportQuery};
use crate::services::ReportsService;
use crate::utils::SafeStudentIdI64;

static REPORTS_SERVICE: Lazy<ReportsService> = Lazy::new(ReportsService::new_lazy);

pub async fn student_report(
    req: HttpRequest,
    student_id: SafeStudentIdI64,
    query: web::Query<ReportQuery>,
) -> ActixResult<HttpResponse> {
    REPORTS_SERVICE
        .student_report(student_id.0, query.into_inner(), &req)
        .await
}

pub async fn student_report_pdf(
    req: HttpRequest,
    student_id: SafeStudentIdI64,
    query: web::Query<ReportQuery>,
) -> ActixResult<HttpResponse> {
    REPORTS_SERVICE
        .student_report_pdf(student_id.0, query.into_inner(), &req)
        .await
}

pub async fn monthly_report_pdf(
    req: HttpRequest,
    student_id: SafeStudentIdI64,
    query: web::Query<MonthlyQuery>,
) -> ActixResult<HttpResponse> {
    REPORTS_SERVICE
        .monthly_report_pdf(student_id.0, query.into_inner(), &req)
        .await
}

pub async fn dashboard(req: HttpRequest) -> ActixResult<HttpResponse> {
    REPORTS_SERVICE.dashboard(&req).await
}

pub fn configure_reports_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/reports")
            .wrap(middleware::Compress::default())
            .wrap(middlewares::RequireJWT)
            .route("/students/{student_id}", web::get().to(student_report))
            .route("/students/{student_id}/pdf", web::get().to(student_report_pdf))
            .route("/students/{student_id}/monthly", web::get().to(monthly_report_pdf))
            .service(
                web::resource("/dashboard")
                    .wrap(RequirePermission::new(perms::VIEW_DASHBOARD))
                    .route(web::get().to(dashboard)),
            ),
    );
}
