//! Client inquiries about a property and the agent's viewing schedule.
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::api::{ApiError, InquiryRequest, PropertyApi};
use crate::model::ViewingSchedule;
use crate::validation::{self, FieldErrors, InquiryField};

#[derive(Debug, Error)]
pub enum InquiryError {
    #[error("validation failed: {0}")]
    Invalid(FieldErrors<InquiryField>),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Contact form shown on a property's detail view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InquiryForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

impl InquiryForm {
    pub fn validate(&self) -> Result<(), FieldErrors<InquiryField>> {
        validation::validate_inquiry(&self.name, &self.email, &self.phone)
    }

    pub fn to_request(&self, property_id: &str) -> InquiryRequest {
        InquiryRequest {
            property_id: property_id.to_string(),
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            message: self.message.trim().to_string(),
        }
    }

    /// Validate, then send. Nothing is sent when validation fails.
    #[instrument(skip_all, fields(property_id = %property_id))]
    pub async fn submit(&self, api: &dyn PropertyApi, property_id: &str) -> Result<(), InquiryError> {
        self.validate().map_err(InquiryError::Invalid)?;
        api.create_inquiry(&self.to_request(property_id)).await?;
        Ok(())
    }
}

/// Viewings for one selected calendar day.
#[derive(Debug)]
pub struct ScheduleBoard {
    selected: NaiveDate,
    schedules: Vec<ViewingSchedule>,
    error: Option<String>,
}

impl ScheduleBoard {
    pub fn new(selected: NaiveDate) -> Self {
        Self {
            selected,
            schedules: Vec::new(),
            error: None,
        }
    }

    pub fn today() -> Self {
        Self::new(Utc::now().date_naive())
    }

    pub fn selected(&self) -> NaiveDate {
        self.selected
    }

    /// Change the day. Cached viewings are dropped until the next `load`.
    pub fn select(&mut self, date: NaiveDate) {
        if date != self.selected {
            self.selected = date;
            self.schedules.clear();
        }
    }

    /// Viewings on the selected day (UTC), earliest first.
    pub fn schedules(&self) -> &[ViewingSchedule] {
        &self.schedules
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Fetch viewings for the selected day. Entries for other days are
    /// dropped. On failure the previous list is kept and the error surfaced.
    #[instrument(skip_all, fields(date = %self.selected))]
    pub async fn load(&mut self, api: &dyn PropertyApi) -> Result<usize, ApiError> {
        let day = self.selected;
        let start = Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN));
        match api.schedules(start).await {
            Ok(all) => {
                let fetched = all.len();
                let mut schedules: Vec<ViewingSchedule> = all
                    .into_iter()
                    .filter(|s| s.viewing_date.date_naive() == day)
                    .collect();
                schedules.sort_by_key(|s| s.viewing_date);
                debug!(fetched, kept = schedules.len(), "schedules loaded");
                self.schedules = schedules;
                self.error = None;
                Ok(self.schedules.len())
            }
            Err(err) => {
                warn!(%err, "failed to load schedules");
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }
}
