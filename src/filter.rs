//! Draft and applied filter criteria for the property list.
//!
//! Edits land in the draft only. The list always queries with the applied
//! criteria, which are replaced wholesale on `commit`.
use serde::{Deserialize, Serialize};

/// Property search criteria. Unset fields mean "any".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub property_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bedrooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bathrooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub min_price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub max_price: Option<u64>,
    #[serde(default)]
    pub amenities: Vec<String>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        *self == FilterCriteria::default()
    }

    /// Adds `name` if absent, removes it if present. Keeps selection order.
    pub fn toggle_amenity(&mut self, name: &str) {
        if let Some(pos) = self.amenities.iter().position(|a| a == name) {
            self.amenities.remove(pos);
        } else {
            self.amenities.push(name.to_string());
        }
    }

    pub fn has_amenity(&self, name: &str) -> bool {
        self.amenities.iter().any(|a| a == name)
    }
}

/// Two live copies of the criteria: what the user is editing and what the
/// list currently shows.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    draft: FilterCriteria,
    applied: FilterCriteria,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &FilterCriteria {
        &self.draft
    }

    pub fn applied(&self) -> &FilterCriteria {
        &self.applied
    }

    /// Merge a partial change into the draft. Applied criteria are untouched.
    pub fn update_draft(&mut self, edit: impl FnOnce(&mut FilterCriteria)) {
        edit(&mut self.draft);
    }

    pub fn toggle_amenity(&mut self, name: &str) {
        self.draft.toggle_amenity(name);
    }

    /// Copy the draft into the applied criteria. Returns the applied value.
    pub fn commit(&mut self) -> &FilterCriteria {
        self.applied = self.draft.clone();
        &self.applied
    }

    /// Clear both copies back to the empty criteria.
    pub fn reset(&mut self) {
        self.draft = FilterCriteria::default();
        self.applied = FilterCriteria::default();
    }

    /// True when the draft differs from what is applied.
    pub fn is_dirty(&self) -> bool {
        self.draft != self.applied
    }
}
