//! Wire shapes exchanged with the listing backend.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::filter::FilterCriteria;
use crate::model::{null_as_default, Coordinates, PropertyRecord};

/// Body of the list request: one page of properties under a filter.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: u32,
    pub page_size: u32,
    pub filter: FilterCriteria,
}

/// List response, resolved once from the raw JSON body.
#[derive(Debug, Clone, PartialEq)]
pub enum ListResponse {
    /// Bare array: the full result, no authoritative total.
    Page(Vec<PropertyRecord>),
    /// `{properties|items, total}` envelope. A missing or `null` list is
    /// empty and a missing or `null` total is 0.
    Envelope {
        records: Vec<PropertyRecord>,
        total: u64,
    },
    /// Anything else. The caller clears its cache.
    Unrecognized,
}

const ENVELOPE_KEYS: [&str; 3] = ["properties", "items", "total"];

#[derive(Deserialize)]
struct Envelope {
    #[serde(alias = "items", default, deserialize_with = "null_as_default")]
    properties: Vec<PropertyRecord>,
    #[serde(default)]
    total: Option<u64>,
}

impl ListResponse {
    pub fn from_value(value: Value) -> Self {
        let is_envelope = value
            .as_object()
            .map_or(false, |map| ENVELOPE_KEYS.iter().any(|k| map.contains_key(*k)));
        match value {
            Value::Array(_) => match serde_json::from_value::<Vec<PropertyRecord>>(value) {
                Ok(records) => ListResponse::Page(records),
                Err(err) => {
                    debug!(?err, "list array did not decode as property records");
                    ListResponse::Unrecognized
                }
            },
            Value::Object(_) if is_envelope => {
                match serde_json::from_value::<Envelope>(value) {
                    Ok(env) => ListResponse::Envelope {
                        records: env.properties,
                        total: env.total.unwrap_or(0),
                    },
                    Err(err) => {
                        debug!(?err, "list envelope did not decode as property records");
                        ListResponse::Unrecognized
                    }
                }
            }
            _ => {
                debug!("list response is neither an array nor an envelope");
                ListResponse::Unrecognized
            }
        }
    }
}

/// Location section of a create/update payload.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LocationPayload {
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub coordinates: Coordinates,
}

/// Full property payload for create and update requests.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyPayload {
    pub title: String,
    pub description: String,
    pub price: f64,
    #[serde(rename = "type")]
    pub property_type: String,
    pub status: String,
    pub bedrooms: f64,
    pub bathrooms: f64,
    pub area_sq_ft: f64,
    pub amenities: Vec<String>,
    /// `null` when no images were attached.
    pub images: Option<Vec<String>>,
    pub location: LocationPayload,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inquiry about a property sent by a prospective client.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InquiryRequest {
    pub property_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

/// Body of the schedules lookup.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ScheduleQuery {
    pub date: DateTime<Utc>,
}
