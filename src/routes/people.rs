use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::people::requests::{
    AddGuardianRequest, CreateStudentRequest, LinkStudentRequest, SearchQuery, StudentListParams,
    UpdateStudentRequest,
};
use crate::services::PeopleService;
use crate::utils::SafeIDI64;

static PEOPLE_SERVICE: Lazy<PeopleService> = Lazy::new(PeopleService::new_lazy);

pub async fn list_students(
    req: HttpRequest,
    query: web::Query<StudentListParams>,
) -> ActixResult<HttpResponse> {
    PEOPLE_SERVICE.list_students(query.into_inner(), &req).await
}

pub async fn students_dashboard(
    req: HttpRequest,
    query: web::Query<SearchQuery>,
) -> ActixResult<HttpResponse> {
    PEOPLE_SERVICE
        .students_dashboard(query.into_inner().search, &req)
        .await
}

pub async fn create_student(
    req: HttpRequest,
    body: web::Json<CreateStudentRequest>,
) -> ActixResult<HttpResponse> {
    PEOPLE_SERVICE.create_student(body.into_inner(), &req).await
}

pub async fn get_student(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    PEOPLE_SERVICE.get_student(id.0, &req).await
}

pub async fn update_student(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateStudentRequest>,
) -> ActixResult<HttpResponse> {
    PEOPLE_SERVICE
        .update_student(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_student(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    PEOPLE_SERVICE.delete_student(id.0, &req).await
}

pub async fn add_guardian(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<AddGuardianRequest>,
) -> ActixResult<HttpResponse> {
    PEOPLE_SERVICE.add_guardian(id.0, body.into_inner(), &req).await
}

pub async fn remove_guardian(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
) -> ActixResult<HttpResponse> {
    let (student_id, user_id) = path.into_inner();
    PEOPLE_SERVICE
        .remove_guardian(student_id, user_id, &req)
        .await
}

pub async fn my_children(req: HttpRequest) -> ActixResult<HttpResponse> {
    PEOPLE_SERVICE.my_children(&req).await
}

pub async fn link_student(
    req: HttpRequest,
    body: web::Json<LinkStudentRequest>,
) -> ActixResult<HttpResponse> {
    PEOPLE_SERVICE.link_student(body.into_inner(), &req).await
}

pub fn configure_people_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/people")
            .wrap(middlewares::RequireJWT)
            .route("/students", web::get().to(list_students))
            .route("/students", web::post().to(create_student))
            .route("/students/dashboard", web::get().to(students_dashboard))
            .route("/students/{id}", web::get().to(get_student))
            .route("/students/{id}", web::put().to(update_student))
            .route("/students/{id}", web::delete().to(delete_student))
            .route("/students/{id}/guardians", web::post().to(add_guardian))
            .route(
                "/students/{student_id}/guardians/{user_id}",
                web::delete().to(remove_guardian),
            )
            .route("/my-children", web::get().to(my_children))
            .route("/my-children/link", web::post().to(link_student)),
    );
}
