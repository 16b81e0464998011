pub mod messages;
pub mod notes;
pub mod notify;
pub mod preferences;
pub mod threads;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::comms::requests::{
    CreateBehaviourRecordRequest, CreatePerformanceNoteRequest, InboxQuery, PostMessageRequest,
    StartThreadRequest, UpdatePreferencesRequest,
};
use crate::storage::Storage;

pub struct CommsService {
    storage: Option<Arc<dyn Storage>>,
}

impl CommsService {
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

    pub async fn inbox(&self, query: InboxQuery, request: &HttpRequest) -> ActixResult<HttpResponse> {
        threads::inbox(self, query, request).await
    }

    pub async fn start_thread(
        &self,
        body: StartThreadRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        threads::start_thread(self, body, request).await
    }

    pub async fn thread_detail(
        &self,
        thread_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        threads::thread_detail(self, thread_id, request).await
    }

    pub async fn post_message(
        &self,
        thread_id: i64,
        body: PostMessageRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        messages::post_message(self, thread_id, body, request).await
    }

    pub async fn get_preferences(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        preferences::get_preferences(self, request).await
    }

    pub async fn update_preferences(
        &self,
        body: UpdatePreferencesRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        preferences::update_preferences(self, body, request).await
    }

    pub async fn recent_notifications(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        preferences::recent_notifications(self, request).await
    }

    pub async fn create_performance_note(
        &self,
        body: CreatePerformanceNoteRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        notes::create_performance_note(self, body, request).await
    }

    pub async fn create_behaviour_record(
        &self,
        body: CreateBehaviourRecordRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        notes::create_behaviour_record(self, body, request).await
    }

    pub async fn student_notes(
        &self,
        student_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        notes::student_notes(self, student_id, request).await
    }
}
