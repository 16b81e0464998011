use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::comms::requests::{
    CreateBehaviourRecordRequest, CreatePerformanceNoteRequest, InboxQuery, PostMessageRequest,
    StartThreadRequest, UpdatePreferencesRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::CommsService;
use crate::utils::{SafeIDI64, SafeStudentIdI64};

static COMMS_SERVICE: Lazy<CommsService> = Lazy::new(CommsService::new_lazy);

pub async fn inbox(req: HttpRequest, query: web::Query<InboxQuery>) -> ActixResult<HttpResponse> {
    COMMS_SERVICE.inbox(query.into_inner(), &req).await
}

pub async fn start_thread(
    req: HttpRequest,
    body: web::Json<StartThreadRequest>,
) -> ActixResult<HttpResponse> {
    COMMS_SERVICE.start_thread(body.into_inner(), &req).await
}

pub async fn thread_detail(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    COMMS_SERVICE.thread_detail(id.0, &req).await
}

pub async fn post_message(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<PostMessageRequest>,
) -> ActixResult<HttpResponse> {
    COMMS_SERVICE
        .post_message(id.0, body.into_inner(), &req)
        .await
}

pub async fn get_preferences(req: HttpRequest) -> ActixResult<HttpResponse> {
    COMMS_SERVICE.get_preferences(&req).await
}

pub async fn update_preferences(
    req: HttpRequest,
    body: web::Json<UpdatePreferencesRequest>,
) -> ActixResult<HttpResponse> {
    COMMS_SERVICE
        .update_preferences(body.into_inner(), &req)
        .await
}

pub async fn recent_notifications(req: HttpRequest) -> ActixResult<HttpResponse> {
    COMMS_SERVICE.recent_notifications(&req).await
}

pub async fn create_performance_note(
    req: HttpRequest,
    body: web::Json<CreatePerformanceNoteRequest>,
) -> ActixResult<HttpResponse> {
    COMMS_SERVICE
        .create_performance_note(body.into_inner(), &req)
        .await
}

pub async fn create_behaviour_record(
    req: HttpRequest,
    body: web::Json<CreateBehaviourRecordRequest>,
) -> ActixResult<HttpResponse> {
    COMMS_SERVICE
        .create_behaviour_record(body.into_inner(), &req)
        .await
}

pub async fn student_notes(
    req: HttpRequest,
    student_id: SafeStudentIdI64,
) -> ActixResult<HttpResponse> {
    COMMS_SERVICE.student_notes(student_id.0, &req).await
}

pub fn configure_comms_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/comms")
            .wrap(middlewares::RequireJWT)
            .route("/threads", web::get().to(inbox))
            .route("/threads", web::post().to(start_thread))
            .route("/threads/{id}", web::get().to(thread_detail))
            .route("/threads/{id}/messages", web::post().to(post_message))
            .route("/preferences", web::get().to(get_preferences))
            .route("/preferences", web::put().to(update_preferences))
            .route("/performance-notes", web::post().to(create_performance_note))
            .route("/behaviour-records", web::post().to(create_behaviour_record))
            .route("/students/{student_id}/notes", web::get().to(student_notes))
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                    .route("/notifications", web::get().to(recent_notifications)),
            ),
    );
}
