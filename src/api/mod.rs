use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, Client, Method, Url};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::model::{PropertyRecord, ViewingSchedule};

pub mod model;

pub use model::{
    InquiryRequest, ListQuery, ListResponse, LocationPayload, PropertyPayload, ScheduleQuery,
};

const LIST_PATH: &str = "api/agent/properties";
const CREATE_PATH: &str = "api/agent/create-property";
const AMENITIES_PATH: &str = "api/agent/properties/amenities";
const INQUIRY_PATH: &str = "api/inquiry/create";
const SCHEDULES_PATH: &str = "api/inquiry/schedules";

/// Failure talking to the backend. Never retried automatically.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to reach backend: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Operations the listing backend exposes.
#[async_trait]
pub trait PropertyApi: Send + Sync {
    async fn list_properties(&self, query: &ListQuery) -> Result<ListResponse, ApiError>;

    /// Returns the created record when the backend echoes one back.
    async fn create_property(
        &self,
        payload: &PropertyPayload,
    ) -> Result<Option<PropertyRecord>, ApiError>;

    async fn update_property(
        &self,
        id: &str,
        payload: &PropertyPayload,
    ) -> Result<Option<PropertyRecord>, ApiError>;

    async fn archive_property(&self, id: &str) -> Result<(), ApiError>;

    /// Selectable amenity names. Empty when the backend answers with anything
    /// other than an array of strings.
    async fn amenities(&self) -> Result<Vec<String>, ApiError>;

    async fn create_inquiry(&self, inquiry: &InquiryRequest) -> Result<(), ApiError>;

    async fn schedules(&self, date: DateTime<Utc>) -> Result<Vec<ViewingSchedule>, ApiError>;
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(base_url: Url, timeout: Duration, user_agent: &str) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { http, base_url })
    }

    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        let base_url = cfg.base_url()?;
        Self::new(
            base_url,
            Duration::from_secs(cfg.api.timeout_seconds),
            &cfg.api.user_agent,
        )
        .context("failed to build HTTP client")
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn build_request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Request, ApiError> {
        let endpoint = self.base_url.join(path)?;
        let mut builder = self
            .http
            .request(method, endpoint)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json");
        if let Some(body) = body {
            builder = builder.json(body);
        }
        Ok(builder.build()?)
    }

    /// Sends one request and returns the body as JSON. Non-JSON bodies come
    /// back as `Value::String`; an empty body as `Value::Null`.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let request = self.build_request(method, path, body.as_ref())?;
        debug!(method=%request.method(), url=%request.url(), "sending backend request");

        let res = self.http.execute(request).await?;
        let status = res.status();
        let is_json = res
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("application/json"))
            .unwrap_or(false);
        let text = res.text().await?;
        let payload = decode_body(&text, is_json)?;

        if !status.is_success() {
            let message = error_message(&payload, status.canonical_reason());
            warn!(status = status.as_u16(), %message, "backend returned error");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        debug!(status = status.as_u16(), "backend request succeeded");
        Ok(payload)
    }

    async fn send_property(
        &self,
        method: Method,
        path: &str,
        payload: &PropertyPayload,
    ) -> Result<Option<PropertyRecord>, ApiError> {
        let body = serde_json::to_value(payload)?;
        let value = self.execute(method, path, Some(body)).await?;
        match serde_json::from_value::<PropertyRecord>(value) {
            Ok(record) => Ok(Some(record)),
            Err(err) => {
                debug!(?err, "saved property was not echoed back as a record");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl PropertyApi for ApiClient {
    #[instrument(skip_all, fields(page = query.page, page_size = query.page_size))]
    async fn list_properties(&self, query: &ListQuery) -> Result<ListResponse, ApiError> {
        let body = serde_json::to_value(query)?;
        let value = self.execute(Method::POST, LIST_PATH, Some(body)).await?;
        Ok(ListResponse::from_value(value))
    }

    #[instrument(skip_all)]
    async fn create_property(
        &self,
        payload: &PropertyPayload,
    ) -> Result<Option<PropertyRecord>, ApiError> {
        let record = self.send_property(Method::POST, CREATE_PATH, payload).await?;
        info!(title = %payload.title, "property created");
        Ok(record)
    }

    #[instrument(skip_all, fields(id = %id))]
    async fn update_property(
        &self,
        id: &str,
        payload: &PropertyPayload,
    ) -> Result<Option<PropertyRecord>, ApiError> {
        let path = format!("{}/{}", LIST_PATH, id);
        let record = self.send_property(Method::PUT, &path, payload).await?;
        info!(id, "property updated");
        Ok(record)
    }

    #[instrument(skip_all, fields(id = %id))]
    async fn archive_property(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("{}/{}/archive", LIST_PATH, id);
        self.execute(Method::PATCH, &path, None).await?;
        info!(id, "property archived");
        Ok(())
    }

    #[instrument(skip_all)]
    async fn amenities(&self) -> Result<Vec<String>, ApiError> {
        let value = self.execute(Method::GET, AMENITIES_PATH, None).await?;
        let names = amenity_names(value);
        debug!(count = names.len(), "amenity catalogue loaded");
        Ok(names)
    }

    #[instrument(skip_all, fields(property_id = %inquiry.property_id))]
    async fn create_inquiry(&self, inquiry: &InquiryRequest) -> Result<(), ApiError> {
        let body = serde_json::to_value(inquiry)?;
        self.execute(Method::POST, INQUIRY_PATH, Some(body)).await?;
        info!("inquiry submitted");
        Ok(())
    }

    #[instrument(skip_all, fields(date = %date))]
    async fn schedules(&self, date: DateTime<Utc>) -> Result<Vec<ViewingSchedule>, ApiError> {
        let body = serde_json::to_value(ScheduleQuery { date })?;
        let value = self.execute(Method::POST, SCHEDULES_PATH, Some(body)).await?;
        if !value.is_array() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// Names from the catalogue endpoint; anything but an array of strings is empty.
fn amenity_names(value: Value) -> Vec<String> {
    serde_json::from_value(value).unwrap_or_default()
}

fn decode_body(text: &str, is_json: bool) -> Result<Value, ApiError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    if is_json {
        return Ok(serde_json::from_str(text)?);
    }
    Ok(Value::String(text.to_string()))
}

/// `message` from a JSON error body, else the reason phrase, else a generic
/// fallback.
fn error_message(payload: &Value, reason: Option<&str>) -> String {
    payload
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
        .or_else(|| reason.map(str::to_string))
        .unwrap_or_else(|| "Request failed".to_string())
}
