pub mod create;
pub mod dashboard;
pub mod delete;
pub mod get;
pub mod guardians;
pub mod list;
pub mod parents;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::Result;
use crate::middlewares::require_permission::user_has_perm;
use crate::models::people::requests::{
    AddGuardianRequest, CreateStudentRequest, LinkStudentRequest, StudentListParams,
    UpdateStudentRequest,
};
use crate::models::users::entities::{User, UserRole};
use crate::storage::Storage;

pub struct PeopleService {
    storage: Option<Arc<dyn Storage>>,
}

/// Student management rights. Parents never hold them, whatever their roles say.
pub(crate) async fn has_student_perm(
    storage: &dyn Storage,
    user: &User,
    code: &str,
) -> Result<bool> {
    if user.role == UserRole::Parent {
        return Ok(false);
    }
    user_has_perm(storage, user, code).await
}

impl PeopleService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub async fn list_students(
        &self,
        query: StudentListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_students(self, query, request).await
    }

    pub async fn students_dashboard(
        &self,
        search: Option<String>,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        dashboard::students_dashboard(self, search, request).await
    }

    pub async fn get_student(
        &self,
        student_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        get::get_student(self, student_id, request).await
    }

    pub async fn create_student(
        &self,
        body: CreateStudentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_student(self, body, request).await
    }

    pub async fn update_student(
        &self,
        student_id: i64,
        body: UpdateStudentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_student(self, student_id, body, request).await
    }

    pub async fn delete_student(
        &self,
        student_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_student(self, student_id, request).await
    }

    pub async fn add_guardian(
        &self,
        student_id: i64,
        body: AddGuardianRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        guardians::add_guardian(self, student_id, body, request).await
    }

    pub async fn remove_guardian(
        &self,
        student_id: i64,
        user_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        guardians::remove_guardian(self, student_id, user_id, request).await
    }

    pub async fn my_children(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        parents::my_children(self, request).await
    }

    pub async fn link_student(
        &self,
        body: LinkStudentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        parents::link_student(self, body, request).await
    }
}
