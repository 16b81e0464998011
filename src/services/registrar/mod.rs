pub mod admit;
pub mod applications;
pub mod bulk;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::registrar::requests::{
    AdmitRequest, ApplicationListQuery, CreateApplicationRequest, MarkStatusRequest,
};
use crate::storage::Storage;

pub struct RegistrarService {
    storage: Option<Arc<dyn Storage>>,
}

impl RegistrarService {
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

    pub async fn list_applications(
        &self,
        query: ApplicationListQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        applications::list_applications(self, query, request).await
    }

    pub async fn apply(
        &self,
        body: CreateApplicationRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        applications::apply(self, body, request).await
    }

    pub async fn application_detail(
        &self,
        application_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        applications::application_detail(self, application_id, request).await
    }

    pub async fn mark_status(
        &self,
        application_id: i64,
        body: MarkStatusRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        applications::mark_status(self, application_id, body, request).await
    }

    pub async fn admit(
        &self,
        application_id: i64,
        body: AdmitRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        admit::admit(self, application_id, body, request).await
    }

    pub async fn bulk_admission(
        &self,
        payload: Multipart,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        bulk::bulk_admission(self, payload, request).await
    }
}
