pub mod attendance;
pub mod classes;
pub mod enrollments;
pub mod grades;
pub mod hub;
pub mod subjects;
pub mod timetable;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::Result;
use crate::models::academics::requests::{
    AssessmentSearchQuery, AttendanceSheetQuery, ChildQuery, ClassGroupListParams,
    CreateAssessmentRequest, CreateClassGroupRequest, CreateEnrollmentRequest,
    CreateSubjectRequest, CreateTimetableEntryRequest, EnterGradesRequest, MarkAttendanceRequest,
};
use crate::models::users::entities::{User, UserRole};
use crate::storage::Storage;

pub struct AcademicsService {
    storage: Option<Arc<dyn Storage>>,
}

/// Principal and admin see every class; a teacher only the classes on their timetable.
pub(crate) async fn can_access_class(
    storage: &dyn Storage,
    user: &User,
    class_group_id: i64,
) -> Result<bool> {
    match user.role {
        UserRole::Principal | UserRole::Admin => Ok(true),
        UserRole::Teacher => storage.teacher_teaches_class(user.id, class_group_id).await,
        UserRole::Parent => Ok(false),
    }
}

impl AcademicsService {
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

    pub async fn list_subjects(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        subjects::list_subjects(self, request).await
    }

    pub async fn create_subject(
        &self,
        body: CreateSubjectRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        subjects::create_subject(self, body, request).await
    }

    pub async fn list_class_groups(
        &self,
        query: ClassGroupListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        classes::list_class_groups(self, query, request).await
    }

    pub async fn create_class_group(
        &self,
        body: CreateClassGroupRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        classes::create_class_group(self, body, request).await
    }

    pub async fn roster(
        &self,
        class_group_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        classes::roster(self, class_group_id, request).await
    }

    pub async fn create_enrollment(
        &self,
        body: CreateEnrollmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        enrollments::create_enrollment(self, body, request).await
    }

    pub async fn delete_enrollment(
        &self,
        enrollment_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        enrollments::delete_enrollment(self, enrollment_id, request).await
    }

    pub async fn create_timetable_entry(
        &self,
        body: CreateTimetableEntryRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        timetable::create_entry(self, body, request).await
    }

    pub async fn delete_timetable_entry(
        &self,
        entry_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        timetable::delete_entry(self, entry_id, request).await
    }

    pub async fn my_timetable(
        &self,
        query: ChildQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        timetable::my_timetable(self, query, request).await
    }

    pub async fn teacher_today(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        timetable::teacher_today(self, request).await
    }

    pub async fn teacher_classes(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        timetable::teacher_classes(self, request).await
    }

    pub async fn attendance_sheet(
        &self,
        class_group_id: i64,
        query: AttendanceSheetQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        attendance::attendance_sheet(self, class_group_id, query, request).await
    }

    pub async fn mark_attendance(
        &self,
        class_group_id: i64,
        body: MarkAttendanceRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        attendance::mark_attendance(self, class_group_id, body, request).await
    }

    pub async fn my_attendance(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        attendance::my_attendance(self, request).await
    }

    pub async fn teacher_assessments(
        &self,
        query: AssessmentSearchQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        grades::teacher_assessments(self, query, request).await
    }

    pub async fn create_assessment(
        &self,
        body: CreateAssessmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        grades::create_assessment(self, body, request).await
    }

    pub async fn grade_sheet(
        &self,
        assessment_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        grades::grade_sheet(self, assessment_id, request).await
    }

    pub async fn enter_grades(
        &self,
        assessment_id: i64,
        body: EnterGradesRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        grades::enter_grades(self, assessment_id, body, request).await
    }

    pub async fn my_grades(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        grades::my_grades(self, request).await
    }

    pub async fn parent_hub(
        &self,
        query: ChildQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        hub::parent_hub(self, query, request).await
    }
}
