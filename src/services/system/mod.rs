pub mod academic_years;
pub mod settings;
pub mod settings_cache;

pub use settings_cache::DynamicConfig;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::system::requests::{CreateAcademicYearRequest, UpdateSettingRequest};
use crate::storage::Storage;

pub struct SystemService {
    storage: Option<Arc<dyn Storage>>,
}

impl SystemService {
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

    pub(crate) fn get_config(&self) -> &AppConfig {
        AppConfig::get()
    }

    pub async fn school_info(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        settings::school_info(self, request).await
    }

    pub async fn list_settings(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        settings::list_settings(self, request).await
    }

    pub async fn update_setting(
        &self,
        request: &HttpRequest,
        key: String,
        body: UpdateSettingRequest,
    ) -> ActixResult<HttpResponse> {
        settings::update_setting(self, request, key, body).await
    }

    pub async fn list_academic_years(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        academic_years::list_academic_years(self, request).await
    }

    pub async fn create_academic_year(
        &self,
        request: &HttpRequest,
        body: CreateAcademicYearRequest,
    ) -> ActixResult<HttpResponse> {
        academic_years::create_academic_year(self, request, body).await
    }

    pub async fn set_current_academic_year(
        &self,
        request: &HttpRequest,
        id: i64,
    ) -> ActixResult<HttpResponse> {
        academic_years::set_current_academic_year(self, request, id).await
    }
}
