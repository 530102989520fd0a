#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use property_desk::api::{
    ApiError, InquiryRequest, ListQuery, ListResponse, PropertyApi, PropertyPayload,
};
use property_desk::model::{PropertyRecord, ViewingSchedule};

pub fn record(id: &str) -> PropertyRecord {
    serde_json::from_value(json!({
        "id": id,
        "title": format!("Listing {}", id),
        "price": 1000,
        "type": "House",
    }))
    .unwrap()
}

pub fn records(ids: &[&str]) -> Vec<PropertyRecord> {
    ids.iter().map(|id| record(id)).collect()
}

pub fn status_error(status: u16, message: &str) -> ApiError {
    ApiError::Status {
        status,
        message: message.to_string(),
    }
}

/// Fake backend: canned responses popped in order, every call recorded.
/// List responses can be keyed by page and delayed to force reordering.
#[derive(Clone, Default)]
pub struct RecordingApi {
    list_responses: Arc<Mutex<VecDeque<Result<ListResponse, ApiError>>>>,
    list_by_page: Arc<Mutex<HashMap<u32, (Duration, ListResponse)>>>,
    save_responses: Arc<Mutex<VecDeque<Result<Option<PropertyRecord>, ApiError>>>>,
    archive_responses: Arc<Mutex<VecDeque<Result<(), ApiError>>>>,
    inquiry_responses: Arc<Mutex<VecDeque<Result<(), ApiError>>>>,
    schedules: Arc<Mutex<Vec<ViewingSchedule>>>,
    list_calls: Arc<Mutex<Vec<ListQuery>>>,
    create_calls: Arc<Mutex<Vec<PropertyPayload>>>,
    update_calls: Arc<Mutex<Vec<(String, PropertyPayload)>>>,
    archive_calls: Arc<Mutex<Vec<String>>>,
    inquiry_calls: Arc<Mutex<Vec<InquiryRequest>>>,
    schedule_calls: Arc<Mutex<Vec<DateTime<Utc>>>>,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push_list(&self, response: Result<ListResponse, ApiError>) {
        self.list_responses.lock().await.push_back(response);
    }

    pub async fn page_after(&self, page: u32, delay: Duration, response: ListResponse) {
        self.list_by_page.lock().await.insert(page, (delay, response));
    }

    pub async fn push_save(&self, response: Result<Option<PropertyRecord>, ApiError>) {
        self.save_responses.lock().await.push_back(response);
    }

    pub async fn push_archive(&self, response: Result<(), ApiError>) {
        self.archive_responses.lock().await.push_back(response);
    }

    pub async fn push_inquiry(&self, response: Result<(), ApiError>) {
        self.inquiry_responses.lock().await.push_back(response);
    }

    pub async fn set_schedules(&self, schedules: Vec<ViewingSchedule>) {
        *self.schedules.lock().await = schedules;
    }

    pub async fn list_calls(&self) -> Vec<ListQuery> {
        self.list_calls.lock().await.clone()
    }

    pub async fn create_calls(&self) -> Vec<PropertyPayload> {
        self.create_calls.lock().await.clone()
    }

    pub async fn update_calls(&self) -> Vec<(String, PropertyPayload)> {
        self.update_calls.lock().await.clone()
    }

    pub async fn archive_calls(&self) -> Vec<String> {
        self.archive_calls.lock().await.clone()
    }

    pub async fn inquiry_calls(&self) -> Vec<InquiryRequest> {
        self.inquiry_calls.lock().await.clone()
    }

    pub async fn schedule_calls(&self) -> Vec<DateTime<Utc>> {
        self.schedule_calls.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl PropertyApi for RecordingApi {
    async fn list_properties(&self, query: &ListQuery) -> Result<ListResponse, ApiError> {
        self.list_calls.lock().await.push(query.clone());
        let keyed = self.list_by_page.lock().await.get(&query.page).cloned();
        if let Some((delay, response)) = keyed {
            tokio::time::sleep(delay).await;
            return Ok(response);
        }
        self.list_responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(ListResponse::Page(Vec::new())))
    }

    async fn create_property(
        &self,
        payload: &PropertyPayload,
    ) -> Result<Option<PropertyRecord>, ApiError> {
        self.create_calls.lock().await.push(payload.clone());
        self.save_responses
            .lock()
            .await
            .pop_front()
            .unwrap_or(Ok(None))
    }

    async fn update_property(
        &self,
        id: &str,
        payload: &PropertyPayload,
    ) -> Result<Option<PropertyRecord>, ApiError> {
        self.update_calls
            .lock()
            .await
            .push((id.to_string(), payload.clone()));
        self.save_responses
            .lock()
            .await
            .pop_front()
            .unwrap_or(Ok(None))
    }

    async fn archive_property(&self, id: &str) -> Result<(), ApiError> {
        self.archive_calls.lock().await.push(id.to_string());
        self.archive_responses
            .lock()
            .await
            .pop_front()
            .unwrap_or(Ok(()))
    }

    async fn amenities(&self) -> Result<Vec<String>, ApiError> {
        Ok(vec!["Pool".into(), "Garage".into(), "Garden".into()])
    }

    async fn create_inquiry(&self, inquiry: &InquiryRequest) -> Result<(), ApiError> {
        self.inquiry_calls.lock().await.push(inquiry.clone());
        self.inquiry_responses
            .lock()
            .await
            .pop_front()
            .unwrap_or(Ok(()))
    }

    async fn schedules(&self, date: DateTime<Utc>) -> Result<Vec<ViewingSchedule>, ApiError> {
        self.schedule_calls.lock().await.push(date);
        Ok(self.schedules.lock().await.clone())
    }
}
