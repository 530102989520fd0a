use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Property types offered by the listing form.
pub const PROPERTY_TYPES: &[&str] = &[
    "House",
    "Apartment",
    "Condo",
    "Townhouse",
    "Villa",
    "Cottage",
    "Studio",
    "Loft",
    "Penthouse",
    "Duplex",
];

/// Listing statuses offered by the listing form.
pub const PROPERTY_STATUSES: &[&str] = &[
    "For Sale",
    "For Rent",
    "Sold",
    "Rented",
    "Under Contract",
    "Pending",
    "Archived",
    "Available",
];

/// Geographic position of a property.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    #[serde(default, deserialize_with = "null_as_default")]
    pub lat: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lng: f64,
}

/// Postal location plus coordinates.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PropertyLocation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub country: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub coordinates: Coordinates,
}

impl PropertyLocation {
    /// "address, city, state, country" with empty parts skipped.
    pub fn one_line(&self) -> String {
        [&self.address, &self.city, &self.state, &self.country]
            .iter()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Property read model returned by the backend. Immutable once received.
/// Missing or `null` fields fall back to their defaults; only `id` is required.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "number_or_string")]
    pub price: f64,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub property_type: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bedrooms: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bathrooms: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub area_sq_ft: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub amenities: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: PropertyLocation,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Client identity embedded in a viewing schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientContact {
    pub id: String,
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// Lifecycle of a property viewing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewingStatus {
    Scheduled,
    Completed,
    Cancelled,
    Pending,
    Other(String),
}

impl ViewingStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "scheduled" => ViewingStatus::Scheduled,
            "completed" => ViewingStatus::Completed,
            "cancelled" | "canceled" => ViewingStatus::Cancelled,
            "pending" => ViewingStatus::Pending,
            _ => ViewingStatus::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ViewingStatus::Scheduled => "scheduled",
            ViewingStatus::Completed => "completed",
            ViewingStatus::Cancelled => "cancelled",
            ViewingStatus::Pending => "pending",
            ViewingStatus::Other(raw) => raw,
        }
    }
}

/// A scheduled property viewing with the requesting client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ViewingSchedule {
    pub id: String,
    pub client_id: String,
    pub property_id: String,
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
    pub viewing_date: DateTime<Utc>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub client: ClientContact,
}

impl ViewingSchedule {
    pub fn viewing_status(&self) -> ViewingStatus {
        ViewingStatus::parse(&self.status)
    }
}

fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Null,
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid price '{}'", s))),
        Raw::Null => Ok(0.0),
    }
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
