pub mod dashboard;
pub mod monthly;
pub mod student;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::reports::requests::{MonthlyQuery, ReportQuery};
use crate::storage::Storage;

pub struct ReportsService {
    storage: Option<Arc<dyn Storage>>,
}

impl ReportsService {
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

    pub async fn student_report(
        &self,
        student_id: i64,
        query: ReportQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        student::student_report(self, student_id, query, request).await
    }

    pub async fn student_report_pdf(
        &self,
        student_id: i64,
        query: ReportQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        student::student_report_pdf(self, student_id, query, request).await
    }

    pub async fn monthly_report_pdf(
        &self,
        student_id: i64,
        query: MonthlyQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        monthly::monthly_report_pdf(self, student_id, query, request).await
    }

    pub async fn dashboard(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        dashboard::dashboard(self, request).await
    }
}
