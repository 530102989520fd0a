//! Four-step property form: draft ownership, step gating and submission.
//!
//! A step only advances when every field it collects is valid. Going back is
//! always allowed and never drops entered values. Submitting validates the
//! whole draft; a failed request leaves the session open with the draft intact.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiError, LocationPayload, PropertyApi, PropertyPayload};
use crate::model::{PropertyLocation, PropertyRecord};
use crate::validation::{self, FieldErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WizardStep {
    BasicInfo = 1,
    Specifications = 2,
    Location = 3,
    Amenities = 4,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::BasicInfo,
        WizardStep::Specifications,
        WizardStep::Location,
        WizardStep::Amenities,
    ];

    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(WizardStep::BasicInfo),
            2 => Some(WizardStep::Specifications),
            3 => Some(WizardStep::Location),
            4 => Some(WizardStep::Amenities),
            _ => None,
        }
    }

    pub fn next(&self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(&self) -> Option<Self> {
        Self::from_number(self.number().saturating_sub(1))
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::BasicInfo => "Basic Information",
            WizardStep::Specifications => "Property Details",
            WizardStep::Location => "Location",
            WizardStep::Amenities => "Amenities",
        }
    }
}

/// Selected amenities: an ordered set, the only copy of the selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct AmenitySelection(Vec<String>);

impl From<Vec<String>> for AmenitySelection {
    fn from(names: Vec<String>) -> Self {
        Self::from_names(names)
    }
}

impl From<AmenitySelection> for Vec<String> {
    fn from(selection: AmenitySelection) -> Self {
        selection.0
    }
}

impl AmenitySelection {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selection = Self::default();
        for name in names {
            selection.insert(name);
        }
        selection
    }

    /// Returns false if already selected.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.0.push(name);
        true
    }

    /// Returns false if it was not selected.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|a| a != name);
        before != self.0.len()
    }

    pub fn set(&mut self, name: &str, checked: bool) {
        if checked {
            self.insert(name);
        } else {
            self.remove(name);
        }
    }

    pub fn toggle(&mut self, name: &str) {
        if !self.remove(name) {
            self.insert(name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|a| a == name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// Everything the user has entered in the wizard so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormDraft {
    pub title: String,
    pub description: String,
    pub price: f64,
    #[serde(rename = "type")]
    pub property_type: String,
    pub status: String,
    pub bedrooms: f64,
    pub bathrooms: f64,
    pub area_sq_ft: f64,
    pub images: Vec<String>,
    pub location: PropertyLocation,
    pub amenities: AmenitySelection,
}

impl FormDraft {
    /// Draft pre-filled from an existing record (edit mode).
    pub fn from_record(record: &PropertyRecord) -> Self {
        Self {
            title: record.title.clone(),
            description: record.description.clone(),
            price: record.price,
            property_type: record.property_type.clone(),
            status: record.status.clone().unwrap_or_default(),
            bedrooms: record.bedrooms,
            bathrooms: record.bathrooms,
            area_sq_ft: record.area_sq_ft,
            images: record.images.clone(),
            location: record.location.clone(),
            amenities: AmenitySelection::from_names(record.amenities.iter().cloned()),
        }
    }

    /// Package the draft for the backend. Counts are clamped at zero; callers
    /// validate first.
    pub fn to_payload(&self, now: DateTime<Utc>) -> PropertyPayload {
        PropertyPayload {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            price: self.price,
            property_type: self.property_type.clone(),
            status: self.status.clone(),
            bedrooms: self.bedrooms.max(0.0),
            bathrooms: self.bathrooms.max(0.0),
            area_sq_ft: self.area_sq_ft,
            amenities: self.amenities.as_slice().to_vec(),
            images: (!self.images.is_empty()).then(|| self.images.clone()),
            location: LocationPayload {
                address: self.location.address.trim().to_string(),
                city: self.location.city.trim().to_string(),
                state: self.location.state.trim().to_string(),
                country: self.location.country.trim().to_string(),
                coordinates: self.location.coordinates,
            },
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("the property form is not open")]
    Closed,
    #[error("already on the first step")]
    FirstStep,
    #[error("already on the last step; submit instead")]
    LastStep,
    #[error("the form can only be submitted from the amenities step")]
    NotFinalStep,
    #[error("validation failed: {0}")]
    Invalid(FieldErrors),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Submitted {
    Created(Option<PropertyRecord>),
    Updated {
        id: String,
        record: Option<PropertyRecord>,
    },
}

#[derive(Debug, Clone)]
struct Session {
    step: WizardStep,
    draft: FormDraft,
    editing_id: Option<String>,
    errors: FieldErrors,
}

/// The wizard. Closed until `open` is called.
#[derive(Debug, Default)]
pub struct Wizard {
    session: Option<Session>,
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session on the first step. With a seed the draft (amenity
    /// selection included) is taken from the record and submission updates
    /// it; otherwise the draft is empty and submission creates.
    pub fn open(&mut self, seed: Option<&PropertyRecord>) {
        let (draft, editing_id) = match seed {
            Some(record) => (FormDraft::from_record(record), Some(record.id.clone())),
            None => (FormDraft::default(), None),
        };
        debug!(editing = ?editing_id, "property form opened");
        self.session = Some(Session {
            step: WizardStep::BasicInfo,
            draft,
            editing_id,
            errors: FieldErrors::new(),
        });
    }

    /// Discard the draft. Safe from any step and when already closed.
    pub fn close(&mut self) {
        if self.session.take().is_some() {
            debug!("property form closed");
        }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Current step; `BasicInfo` while closed.
    pub fn step(&self) -> WizardStep {
        self.session
            .as_ref()
            .map(|s| s.step)
            .unwrap_or(WizardStep::BasicInfo)
    }

    pub fn draft(&self) -> Option<&FormDraft> {
        self.session.as_ref().map(|s| &s.draft)
    }

    pub fn draft_mut(&mut self) -> Result<&mut FormDraft, WizardError> {
        Ok(&mut self.session_mut()?.draft)
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.session.as_ref().and_then(|s| s.editing_id.as_deref())
    }

    pub fn is_editing(&self) -> bool {
        self.editing_id().is_some()
    }

    /// Errors from the last failed transition, if any.
    pub fn errors(&self) -> Option<&FieldErrors> {
        self.session.as_ref().map(|s| &s.errors)
    }

    pub fn toggle_amenity(&mut self, name: &str) -> Result<(), WizardError> {
        self.session_mut()?.draft.amenities.toggle(name);
        Ok(())
    }

    pub fn set_amenity(&mut self, name: &str, checked: bool) -> Result<(), WizardError> {
        self.session_mut()?.draft.amenities.set(name, checked);
        Ok(())
    }

    /// Validate the current step's fields and move forward. On failure the
    /// step is unchanged and the failing fields are returned.
    pub fn advance(&mut self) -> Result<WizardStep, WizardError> {
        let session = self.session_mut()?;
        let next = session.step.next().ok_or(WizardError::LastStep)?;
        let fields = validation::fields_for(session.step);
        if let Err(errors) = validation::validate_fields(&session.draft, fields) {
            debug!(step = session.step.number(), failing = errors.len(), "step blocked");
            session.errors = errors.clone();
            return Err(WizardError::Invalid(errors));
        }
        session.errors.clear_fields(fields);
        session.step = next;
        debug!(step = next.number(), "advanced");
        Ok(next)
    }

    /// Move back one step without validating.
    pub fn retreat(&mut self) -> Result<WizardStep, WizardError> {
        let session = self.session_mut()?;
        let previous = session.step.previous().ok_or(WizardError::FirstStep)?;
        session.step = previous;
        debug!(step = previous.number(), "retreated");
        Ok(previous)
    }

    /// Validate the whole draft and send it. Success closes the session.
    #[instrument(skip_all)]
    pub async fn submit(&mut self, api: &dyn PropertyApi) -> Result<Submitted, WizardError> {
        let session = self.session_mut()?;
        if session.step != WizardStep::Amenities {
            return Err(WizardError::NotFinalStep);
        }
        if let Err(errors) = validation::validate_all(&session.draft) {
            warn!(failing = %errors, "property form rejected");
            session.errors = errors.clone();
            return Err(WizardError::Invalid(errors));
        }
        session.errors.clear();

        let payload = session.draft.to_payload(Utc::now());
        let outcome = match session.editing_id.clone() {
            Some(id) => api
                .update_property(&id, &payload)
                .await
                .map(|record| Submitted::Updated { id, record }),
            None => api.create_property(&payload).await.map(Submitted::Created),
        };

        match outcome {
            Ok(submitted) => {
                info!(title = %payload.title, "property form submitted");
                self.close();
                Ok(submitted)
            }
            Err(err) => {
                warn!(%err, "property submission failed; draft kept");
                Err(WizardError::Api(err))
            }
        }
    }

    fn session_mut(&mut self) -> Result<&mut Session, WizardError> {
        self.session.as_mut().ok_or(WizardError::Closed)
    }
}
