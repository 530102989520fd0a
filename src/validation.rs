//! Declarative field rules for the property wizard and the inquiry form.
//!
//! Everything here is a pure function of its input. Callers decide what to do
//! with the resulting [`FieldErrors`].
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

use crate::wizard::{FormDraft, WizardStep};

/// A validated field of the property form, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Title,
    Description,
    Price,
    PropertyType,
    Status,
    Bedrooms,
    Bathrooms,
    AreaSqFt,
    Address,
    City,
    State,
    Country,
    Latitude,
    Longitude,
    Amenities,
}

impl Field {
    /// Dotted path as used in the request payload.
    pub fn name(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Description => "description",
            Field::Price => "price",
            Field::PropertyType => "type",
            Field::Status => "status",
            Field::Bedrooms => "bedrooms",
            Field::Bathrooms => "bathrooms",
            Field::AreaSqFt => "areaSqFt",
            Field::Address => "location.address",
            Field::City => "location.city",
            Field::State => "location.state",
            Field::Country => "location.country",
            Field::Latitude => "location.coordinates.lat",
            Field::Longitude => "location.coordinates.lng",
            Field::Amenities => "amenities",
        }
    }

    /// The wizard step that collects this field.
    pub fn step(&self) -> WizardStep {
        match self {
            Field::Title | Field::Description | Field::Price | Field::PropertyType | Field::Status => {
                WizardStep::BasicInfo
            }
            Field::Bedrooms | Field::Bathrooms | Field::AreaSqFt => WizardStep::Specifications,
            Field::Address
            | Field::City
            | Field::State
            | Field::Country
            | Field::Latitude
            | Field::Longitude => WizardStep::Location,
            Field::Amenities => WizardStep::Amenities,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fields of the inquiry form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InquiryField {
    Name,
    Email,
    Phone,
}

impl fmt::Display for InquiryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InquiryField::Name => "name",
            InquiryField::Email => "email",
            InquiryField::Phone => "phone",
        })
    }
}

/// Field -> human-readable message, ordered by field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors<F: Ord = Field>(BTreeMap<F, String>);

impl<F: Ord> Default for FieldErrors<F> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<F: Ord + Copy> FieldErrors<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: F, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: F) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: F) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> Vec<F> {
        self.0.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (F, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    fn into_result(self) -> Result<(), Self> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl FieldErrors<Field> {
    /// Drop errors for the given fields.
    pub fn clear_fields(&mut self, fields: &[Field]) {
        self.0.retain(|f, _| !fields.contains(f));
    }

    /// Errors grouped under the step that owns each field.
    pub fn by_step(&self) -> BTreeMap<WizardStep, Vec<(Field, &str)>> {
        let mut grouped: BTreeMap<WizardStep, Vec<(Field, &str)>> = BTreeMap::new();
        for (field, message) in self.iter() {
            grouped.entry(field.step()).or_default().push((field, message));
        }
        grouped
    }
}

impl<F: Ord + Copy + fmt::Display> fmt::Display for FieldErrors<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

const BASIC_INFO: &[Field] = &[
    Field::Title,
    Field::Description,
    Field::Price,
    Field::PropertyType,
    Field::Status,
];
const SPECIFICATIONS: &[Field] = &[Field::Bedrooms, Field::Bathrooms, Field::AreaSqFt];
const LOCATION: &[Field] = &[
    Field::Address,
    Field::City,
    Field::State,
    Field::Country,
    Field::Latitude,
    Field::Longitude,
];
const AMENITIES: &[Field] = &[Field::Amenities];

const MIN_DESCRIPTION_CHARS: usize = 10;

/// Fields collected by `step`.
pub fn fields_for(step: WizardStep) -> &'static [Field] {
    match step {
        WizardStep::BasicInfo => BASIC_INFO,
        WizardStep::Specifications => SPECIFICATIONS,
        WizardStep::Location => LOCATION,
        WizardStep::Amenities => AMENITIES,
    }
}

/// Check a single field of the draft. `None` means valid.
pub fn check(draft: &FormDraft, field: Field) -> Option<&'static str> {
    let loc = &draft.location;
    match field {
        Field::Title => blank(&draft.title).then_some("Title is required"),
        Field::Description => (draft.description.trim().chars().count() < MIN_DESCRIPTION_CHARS)
            .then_some("Description must be at least 10 characters"),
        Field::Price => (!(draft.price >= 1.0)).then_some("Price must be greater than 0"),
        Field::PropertyType => blank(&draft.property_type).then_some("Property type is required"),
        Field::Status => blank(&draft.status).then_some("Status is required"),
        Field::Bedrooms => (!(draft.bedrooms >= 0.0)).then_some("Bedrooms must be 0 or more"),
        Field::Bathrooms => (!(draft.bathrooms >= 0.0)).then_some("Bathrooms must be 0 or more"),
        Field::AreaSqFt => (!(draft.area_sq_ft >= 1.0)).then_some("Area is required"),
        Field::Address => blank(&loc.address).then_some("Address is required"),
        Field::City => blank(&loc.city).then_some("City is required"),
        Field::State => blank(&loc.state).then_some("State is required"),
        Field::Country => blank(&loc.country).then_some("Country is required"),
        Field::Latitude => (!(-90.0..=90.0).contains(&loc.coordinates.lat))
            .then_some("Latitude must be between -90 and 90"),
        Field::Longitude => (!(-180.0..=180.0).contains(&loc.coordinates.lng))
            .then_some("Longitude must be between -180 and 180"),
        Field::Amenities => draft
            .amenities
            .is_empty()
            .then_some("At least one amenity is required"),
    }
}

/// Validate exactly `fields`, reporting every failing one.
pub fn validate_fields(draft: &FormDraft, fields: &[Field]) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    for &field in fields {
        if let Some(message) = check(draft, field) {
            errors.insert(field, message);
        }
    }
    errors.into_result()
}

pub fn validate_step(draft: &FormDraft, step: WizardStep) -> Result<(), FieldErrors> {
    validate_fields(draft, fields_for(step))
}

/// Validate every step of the draft.
pub fn validate_all(draft: &FormDraft) -> Result<(), FieldErrors> {
    let all: Vec<Field> = WizardStep::ALL
        .iter()
        .flat_map(|step| fields_for(*step).iter().copied())
        .collect();
    validate_fields(draft, &all)
}

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("valid email regex")
});

pub fn is_valid_email(raw: &str) -> bool {
    EMAIL_RE.is_match(raw.trim())
}

/// Validate the contact fields of an inquiry. The message is optional.
pub fn validate_inquiry(name: &str, email: &str, phone: &str) -> Result<(), FieldErrors<InquiryField>> {
    let mut errors = FieldErrors::new();
    if blank(name) {
        errors.insert(InquiryField::Name, "Name is required");
    }
    if !is_valid_email(email) {
        errors.insert(InquiryField::Email, "Invalid email address");
    }
    if blank(phone) {
        errors.insert(InquiryField::Phone, "Phone is required");
    }
    errors.into_result()
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}
