//! Tenant preference selection for a draft.

use serde::{Deserialize, Serialize};

use crate::types::{ListingPreference, PreferencePayload, VocabularyToken};

/// At most one dietary, gender and smoking preference plus free-text notes.
///
/// Blank input clears a slot, matching an "any" option in a select control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferenceSelection {
    pub dietary_preference: Option<VocabularyToken>,
    pub gender_preference: Option<VocabularyToken>,
    pub smoking_preference: Option<VocabularyToken>,
    pub additional_notes: String,
}

impl PreferenceSelection {
    pub fn set_dietary(&mut self, value: &str) {
        self.dietary_preference = VocabularyToken::new(value).ok();
    }

    pub fn set_gender(&mut self, value: &str) {
        self.gender_preference = VocabularyToken::new(value).ok();
    }

    pub fn set_smoking(&mut self, value: &str) {
        self.smoking_preference = VocabularyToken::new(value).ok();
    }

    pub fn set_notes(&mut self, value: &str) {
        value.trim().clone_into(&mut self.additional_notes);
    }

    /// True when nothing would be sent to the preferences endpoint.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_payload().is_empty()
    }

    /// Payload carrying only the non-empty subfields.
    #[must_use]
    pub fn to_payload(&self) -> PreferencePayload {
        let notes = self.additional_notes.trim();
        PreferencePayload {
            dietary_preference: self.dietary_preference.clone(),
            gender_preference: self.gender_preference.clone(),
            smoking_preference: self.smoking_preference.clone(),
            additional_notes: (!notes.is_empty()).then(|| notes.to_owned()),
        }
    }
}

impl From<&ListingPreference> for PreferenceSelection {
    fn from(stored: &ListingPreference) -> Self {
        Self {
            dietary_preference: stored.dietary_preference.clone(),
            gender_preference: stored.gender_preference.clone(),
            smoking_preference: stored.smoking_preference.clone(),
            additional_notes: stored.additional_notes.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        assert!(PreferenceSelection::default().is_empty());
    }

    #[test]
    fn test_blank_values_clear_slots() {
        let mut prefs = PreferenceSelection::default();
        prefs.set_dietary("VEGETARIAN");
        assert!(!prefs.is_empty());
        prefs.set_dietary("  ");
        assert!(prefs.is_empty());
    }

    #[test]
    fn test_payload_only_carries_non_empty_fields() {
        let mut prefs = PreferenceSelection::default();
        prefs.set_smoking("NON_SMOKER");
        prefs.set_notes("  quiet household ");

        let payload = prefs.to_payload();
        assert_eq!(payload.smoking_preference.unwrap().as_str(), "NON_SMOKER");
        assert_eq!(payload.additional_notes.as_deref(), Some("quiet household"));
        assert!(payload.dietary_preference.is_none());
        assert!(payload.gender_preference.is_none());
    }

    #[test]
    fn test_notes_alone_are_not_empty() {
        let mut prefs = PreferenceSelection::default();
        prefs.set_notes("grad students preferred");
        assert!(!prefs.is_empty());
    }
}
