//! The listing draft: a client-held, not yet persisted listing under
//! construction or edit.
//!
//! A view owns exactly one draft and mutates it in response to input.
//! Nothing here touches the network; the submission orchestrator in the
//! client crate turns a validated draft into a sequence of API calls.

mod photo;
mod preferences;
mod validation;

pub use photo::{
    IntakeReport, MAX_PHOTO_BYTES, PendingPhoto, PhotoHandle, PhotoPreview, RejectedPhoto,
};
pub use preferences::PreferenceSelection;
pub use validation::{
    BATHROOMS, BEDROOMS, DESCRIPTION_LENGTH, FieldError, LEASE_DURATION_MONTHS, TITLE_LENGTH,
    ValidationErrors, validate,
};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{
    CurrencyCode, LeaseType, Listing, ListingId, ListingPayload, Money, Photo, PhotoId,
    PropertyType, VocabularyToken,
};

/// Errors raised while mutating a draft.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    /// A picked file is not an image.
    #[error("{file_name}: please upload only image files")]
    NotAnImage {
        file_name: String,
        content_type: String,
    },
    /// A picked file exceeds the upload limit.
    #[error("{file_name}: image size should be less than 10MB")]
    PhotoTooLarge { file_name: String, size: usize },
    /// No pending photo at the given position.
    #[error("no pending photo at position {0}")]
    NoSuchPhoto(usize),
    /// The form field name is not part of a draft.
    #[error("unknown field: {0}")]
    UnknownField(String),
    /// The input could not be converted to the field's type.
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// In-memory listing draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingDraft {
    /// Set when the draft edits an existing listing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_id: Option<ListingId>,
    pub title: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub rent: Option<Decimal>,
    pub security_deposit: Option<Decimal>,
    pub currency: CurrencyCode,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub square_feet: Option<Decimal>,
    pub property_type: PropertyType,
    pub lease_type: LeaseType,
    pub lease_duration_months: u32,
    pub available_from: Option<NaiveDate>,
    pub available_until: Option<NaiveDate>,
    pub furnished: bool,
    pub utilities_included: bool,
    pub pets_allowed: bool,
    pub smoking_allowed: bool,
    pub contact_email: String,
    pub contact_phone: String,
    pub nearest_university: String,
    pub distance_to_campus_km: Option<f64>,
    #[serde(deserialize_with = "deserialize_token_set")]
    amenities: Vec<VocabularyToken>,
    pub preferences: PreferenceSelection,
    #[serde(skip)]
    photos: Vec<PendingPhoto>,
    #[serde(skip)]
    previews: Vec<PhotoPreview>,
    #[serde(skip)]
    existing_photos: Vec<Photo>,
}

impl Default for ListingDraft {
    fn default() -> Self {
        Self {
            listing_id: None,
            title: String::new(),
            description: String::new(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            rent: None,
            security_deposit: None,
            currency: CurrencyCode::default(),
            bedrooms: 1,
            bathrooms: 1,
            square_feet: None,
            property_type: PropertyType::default(),
            lease_type: LeaseType::default(),
            lease_duration_months: 6,
            available_from: None,
            available_until: None,
            furnished: false,
            utilities_included: false,
            pets_allowed: false,
            smoking_allowed: false,
            contact_email: String::new(),
            contact_phone: String::new(),
            nearest_university: String::new(),
            distance_to_campus_km: None,
            amenities: Vec::new(),
            preferences: PreferenceSelection::default(),
            photos: Vec::new(),
            previews: Vec::new(),
            existing_photos: Vec::new(),
        }
    }
}

fn deserialize_token_set<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<VocabularyToken>, D::Error> {
    let raw = Vec::<VocabularyToken>::deserialize(deserializer)?;
    let mut set = Vec::with_capacity(raw.len());
    for token in raw {
        if !set.contains(&token) {
            set.push(token);
        }
    }
    Ok(set)
}

fn optional_text(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn invalid(field: &str, message: impl ToString) -> DraftError {
    DraftError::InvalidValue {
        field: field.to_owned(),
        message: message.to_string(),
    }
}

fn parse_count(field: &str, value: &str) -> Result<u32, DraftError> {
    value.trim().parse().map_err(|e| invalid(field, e))
}

fn parse_flag(field: &str, value: &str) -> Result<bool, DraftError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" | "" => Ok(false),
        other => Err(invalid(field, format!("'{other}' is not a yes/no value"))),
    }
}

fn parse_optional_amount(field: &str, value: &str) -> Result<Option<Decimal>, DraftError> {
    optional_text(value)
        .map(|v| Money::parse_amount(v).map_err(|e| invalid(field, e)))
        .transpose()
}

fn parse_optional_date(field: &str, value: &str) -> Result<Option<NaiveDate>, DraftError> {
    optional_text(value)
        .map(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").map_err(|e| invalid(field, e)))
        .transpose()
}

impl ListingDraft {
    /// A blank draft with the defaults of the new-listing form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A draft pre-populated from an existing listing (edit flow).
    ///
    /// The listing's photos become read-only existing photos; only photos
    /// added afterwards are uploaded on submission.
    #[must_use]
    pub fn for_listing(listing: &Listing) -> Self {
        let defaults = Self::default();
        Self {
            listing_id: Some(listing.id),
            title: listing.title.clone(),
            description: listing.description.clone(),
            address: listing.address.clone(),
            city: listing.city.clone(),
            state: listing.state.clone().unwrap_or_default(),
            zip_code: listing.zip_code.clone().unwrap_or_default(),
            rent: listing.rent,
            security_deposit: listing.security_deposit,
            currency: listing.currency.unwrap_or_default(),
            bedrooms: listing.bedrooms.unwrap_or(defaults.bedrooms),
            bathrooms: listing.bathrooms.unwrap_or(defaults.bathrooms),
            square_feet: listing.square_feet,
            property_type: listing.property_type.unwrap_or_default(),
            lease_type: listing.lease_type.unwrap_or_default(),
            lease_duration_months: listing
                .lease_duration_months
                .unwrap_or(defaults.lease_duration_months),
            available_from: listing.available_from,
            available_until: listing.available_until,
            furnished: listing.furnished.unwrap_or_default(),
            utilities_included: listing.utilities_included.unwrap_or_default(),
            pets_allowed: listing.pets_allowed.unwrap_or_default(),
            smoking_allowed: listing.smoking_allowed.unwrap_or_default(),
            contact_email: listing.contact_email.clone().unwrap_or_default(),
            contact_phone: listing.contact_phone.clone().unwrap_or_default(),
            nearest_university: listing.nearest_university.clone().unwrap_or_default(),
            distance_to_campus_km: listing.distance_to_campus_km,
            amenities: listing.amenity_types(),
            existing_photos: listing.photos.clone(),
            ..defaults
        }
    }

    /// Bind the draft to an existing listing so submission updates it.
    pub const fn bind_to(&mut self, listing_id: ListingId) {
        self.listing_id = Some(listing_id);
    }

    #[must_use]
    pub const fn is_edit(&self) -> bool {
        self.listing_id.is_some()
    }

    /// Set a field from raw form input, keyed by its wire name.
    ///
    /// Blank input clears optional fields.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::UnknownField`] for names that are not part of a
    /// draft and [`DraftError::InvalidValue`] when the input does not parse.
    pub fn apply_input(&mut self, field: &str, value: &str) -> Result<(), DraftError> {
        let text = value.trim().to_owned();
        match field {
            "title" => self.title = text,
            "description" => self.description = text,
            "address" => self.address = text,
            "city" => self.city = text,
            "state" => self.state = text,
            "zipCode" => self.zip_code = text,
            "contactEmail" => self.contact_email = text,
            "contactPhone" => self.contact_phone = text,
            "nearestUniversity" => self.nearest_university = text,
            "rent" => self.rent = parse_optional_amount(field, value)?,
            "securityDeposit" => self.security_deposit = parse_optional_amount(field, value)?,
            "squareFeet" => self.square_feet = parse_optional_amount(field, value)?,
            "bedrooms" => self.bedrooms = parse_count(field, value)?,
            "bathrooms" => self.bathrooms = parse_count(field, value)?,
            "leaseDurationMonths" => self.lease_duration_months = parse_count(field, value)?,
            "propertyType" => self.property_type = value.parse().map_err(|e| invalid(field, e))?,
            "leaseType" => self.lease_type = value.parse().map_err(|e| invalid(field, e))?,
            "currency" => {
                self.currency = serde_json::from_value(serde_json::Value::String(
                    value.trim().to_ascii_uppercase(),
                ))
                .map_err(|e| invalid(field, e))?;
            }
            "availableFrom" => self.available_from = parse_optional_date(field, value)?,
            "availableUntil" => self.available_until = parse_optional_date(field, value)?,
            "furnished" => self.furnished = parse_flag(field, value)?,
            "utilitiesIncluded" => self.utilities_included = parse_flag(field, value)?,
            "petsAllowed" => self.pets_allowed = parse_flag(field, value)?,
            "smokingAllowed" => self.smoking_allowed = parse_flag(field, value)?,
            "distanceToCampusKm" => {
                self.distance_to_campus_km = optional_text(value)
                    .map(|v| v.parse::<f64>().map_err(|e| invalid(field, e)))
                    .transpose()?;
            }
            "dietaryPreference" => self.preferences.set_dietary(value),
            "genderPreference" => self.preferences.set_gender(value),
            "smokingPreference" => self.preferences.set_smoking(value),
            "additionalNotes" => self.preferences.set_notes(value),
            other => return Err(DraftError::UnknownField(other.to_owned())),
        }
        Ok(())
    }

    // =========================================================================
    // Amenities
    // =========================================================================

    /// Add the amenity if absent, remove it if present. Returns whether it
    /// is selected afterwards.
    pub fn toggle_amenity(&mut self, amenity: &VocabularyToken) -> bool {
        if let Some(pos) = self.amenities.iter().position(|a| a == amenity) {
            self.amenities.remove(pos);
            false
        } else {
            self.amenities.push(amenity.clone());
            true
        }
    }

    #[must_use]
    pub fn is_amenity_selected(&self, amenity: &VocabularyToken) -> bool {
        self.amenities.contains(amenity)
    }

    /// Selected amenities in the order they were picked.
    #[must_use]
    pub fn amenities(&self) -> &[VocabularyToken] {
        &self.amenities
    }

    // =========================================================================
    // Photos
    // =========================================================================

    /// Queue a single photo after checking type and size.
    ///
    /// # Errors
    ///
    /// Returns the [`DraftError`] from [`PendingPhoto::check`].
    pub fn add_photo(&mut self, photo: PendingPhoto) -> Result<PhotoHandle, DraftError> {
        photo.check()?;
        let handle = photo.handle();
        self.previews.push(photo.preview());
        self.photos.push(photo);
        Ok(handle)
    }

    /// Take in a batch of picked or dropped files.
    ///
    /// Files failing the image-type or size check are rejected with a
    /// message; the remaining files are still queued.
    pub fn intake(&mut self, files: impl IntoIterator<Item = PendingPhoto>) -> IntakeReport {
        let mut report = IntakeReport::default();
        for file in files {
            let file_name = file.file_name().to_owned();
            match self.add_photo(file) {
                Ok(handle) => report.accepted.push(handle),
                Err(reason) => report.rejected.push(RejectedPhoto { file_name, reason }),
            }
        }
        report
    }

    /// Remove the pending photo at `index` together with its preview.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::NoSuchPhoto`] when `index` is out of range.
    pub fn remove_photo(&mut self, index: usize) -> Result<PendingPhoto, DraftError> {
        if index >= self.photos.len() {
            return Err(DraftError::NoSuchPhoto(index));
        }
        self.previews.remove(index);
        Ok(self.photos.remove(index))
    }

    /// Pending photos in upload order. The first one becomes primary.
    #[must_use]
    pub fn photos(&self) -> &[PendingPhoto] {
        &self.photos
    }

    /// Previews, index-aligned with [`ListingDraft::photos`].
    #[must_use]
    pub fn previews(&self) -> &[PhotoPreview] {
        &self.previews
    }

    /// Photos already stored on the server (edit flow).
    #[must_use]
    pub fn existing_photos(&self) -> &[Photo] {
        &self.existing_photos
    }

    /// Forget a stored photo after it was deleted server-side.
    pub fn forget_existing_photo(&mut self, photo_id: PhotoId) -> bool {
        let before = self.existing_photos.len();
        self.existing_photos.retain(|p| p.id != photo_id);
        self.existing_photos.len() != before
    }

    #[cfg(test)]
    pub(crate) fn push_unchecked_photo(&mut self, photo: PendingPhoto) {
        self.previews.push(photo.preview());
        self.photos.push(photo);
    }

    // =========================================================================
    // Validation and payloads
    // =========================================================================

    /// Check every length, range and required-field constraint.
    ///
    /// # Errors
    ///
    /// Returns all violations at once.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate(self)
    }

    /// Body for the create call. Coordinates are sent as zero until
    /// geocoding exists.
    #[must_use]
    pub fn create_payload(&self) -> ListingPayload {
        ListingPayload {
            latitude: Some(0.0),
            longitude: Some(0.0),
            ..self.update_payload()
        }
    }

    /// Body for the update call.
    #[must_use]
    pub fn update_payload(&self) -> ListingPayload {
        ListingPayload {
            title: self.title.trim().to_owned(),
            description: self.description.trim().to_owned(),
            address: self.address.trim().to_owned(),
            city: self.city.trim().to_owned(),
            state: self.state.trim().to_owned(),
            zip_code: self.zip_code.trim().to_owned(),
            rent: self.rent.unwrap_or(Decimal::ZERO),
            security_deposit: self.security_deposit.unwrap_or(Decimal::ZERO),
            currency: self.currency,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            square_feet: self.square_feet,
            property_type: self.property_type,
            lease_type: self.lease_type,
            lease_duration_months: self.lease_duration_months,
            available_from: self.available_from,
            available_until: self.available_until,
            furnished: self.furnished,
            utilities_included: self.utilities_included,
            pets_allowed: self.pets_allowed,
            smoking_allowed: self.smoking_allowed,
            contact_email: self.contact_email.trim().to_owned(),
            contact_phone: self.contact_phone.trim().to_owned(),
            nearest_university: self.nearest_university.trim().to_owned(),
            distance_to_campus_km: self.distance_to_campus_km,
            latitude: None,
            longitude: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn token(s: &str) -> VocabularyToken {
        VocabularyToken::new(s).unwrap()
    }

    fn jpeg(name: &str, size: usize) -> PendingPhoto {
        PendingPhoto::new(name, "image/jpeg", vec![0; size])
    }

    #[test]
    fn test_new_draft_uses_form_defaults() {
        let draft = ListingDraft::new();
        assert_eq!(draft.bedrooms, 1);
        assert_eq!(draft.bathrooms, 1);
        assert_eq!(draft.lease_duration_months, 6);
        assert_eq!(draft.property_type, PropertyType::Apartment);
        assert_eq!(draft.lease_type, LeaseType::Semester);
        assert!(!draft.is_edit());
    }

    #[test]
    fn test_toggle_amenity_has_set_semantics() {
        let mut draft = ListingDraft::new();
        assert!(draft.toggle_amenity(&token("WIFI")));
        assert!(draft.toggle_amenity(&token("PARKING")));
        assert!(!draft.toggle_amenity(&token("WIFI")));
        assert!(draft.toggle_amenity(&token("WIFI")));
        assert_eq!(draft.amenities(), &[token("PARKING"), token("WIFI")]);
    }

    #[test]
    fn test_intake_accepts_valid_files_and_reports_the_rest() {
        let mut draft = ListingDraft::new();
        let report = draft.intake(vec![
            jpeg("kitchen.jpg", 1024),
            PendingPhoto::new("lease.pdf", "application/pdf", vec![0; 10]),
            jpeg("huge.jpg", MAX_PHOTO_BYTES + 1),
            jpeg("bedroom.jpg", 2048),
        ]);

        assert_eq!(report.accepted.len(), 2);
        assert_eq!(report.rejected.len(), 2);
        assert_eq!(draft.photos().len(), 2);
        assert_eq!(draft.previews().len(), 2);
        assert_eq!(draft.photos()[0].file_name(), "kitchen.jpg");
        assert_eq!(draft.photos()[1].file_name(), "bedroom.jpg");
        assert!(report.message().unwrap().starts_with("2 files were skipped"));
    }

    #[test]
    fn test_remove_photo_removes_its_preview() {
        let mut draft = ListingDraft::new();
        draft.intake(vec![jpeg("a.jpg", 1), jpeg("b.jpg", 1), jpeg("c.jpg", 1)]);

        let removed = draft.remove_photo(1).unwrap();
        assert_eq!(removed.file_name(), "b.jpg");
        assert_eq!(draft.photos().len(), 2);
        assert_eq!(draft.previews().len(), 2);
        assert!(draft.previews().iter().all(|p| p.handle != removed.handle()));
        assert_eq!(draft.previews()[1].handle, draft.photos()[1].handle());

        assert_eq!(draft.remove_photo(5), Err(DraftError::NoSuchPhoto(5)));
    }

    #[test]
    fn test_remove_photo_keeps_previews_aligned_for_repeated_photo() {
        let mut draft = ListingDraft::new();
        let front = jpeg("front.jpg", 1);
        draft.add_photo(front.clone()).unwrap();
        draft.add_photo(jpeg("back.jpg", 1)).unwrap();
        draft.add_photo(front).unwrap();

        draft.remove_photo(0).unwrap();

        assert_eq!(draft.photos().len(), 2);
        assert_eq!(draft.previews().len(), 2);
        assert_eq!(draft.photos()[0].file_name(), "back.jpg");
        for (preview, photo) in draft.previews().iter().zip(draft.photos()) {
            assert_eq!(preview.handle, photo.handle());
        }
    }

    #[test]
    fn test_apply_input_parses_form_values() {
        let mut draft = ListingDraft::new();
        draft.apply_input("rent", "$1,200").unwrap();
        draft.apply_input("bedrooms", "2").unwrap();
        draft.apply_input("propertyType", "shared_room").unwrap();
        draft.apply_input("furnished", "yes").unwrap();
        draft.apply_input("availableFrom", "2025-08-15").unwrap();
        draft.apply_input("genderPreference", "FEMALE_ONLY").unwrap();

        assert_eq!(draft.rent, Some(Decimal::new(1200, 0)));
        assert_eq!(draft.bedrooms, 2);
        assert_eq!(draft.property_type, PropertyType::SharedRoom);
        assert!(draft.furnished);
        assert_eq!(
            draft.available_from,
            NaiveDate::from_ymd_opt(2025, 8, 15)
        );
        assert!(!draft.preferences.is_empty());

        draft.apply_input("rent", "").unwrap();
        assert_eq!(draft.rent, None);
    }

    #[test]
    fn test_apply_input_errors() {
        let mut draft = ListingDraft::new();
        assert!(matches!(
            draft.apply_input("bedrooms", "two"),
            Err(DraftError::InvalidValue { .. })
        ));
        assert!(matches!(
            draft.apply_input("balcony", "yes"),
            Err(DraftError::UnknownField(_))
        ));
    }

    #[test]
    fn test_create_payload_fills_service_defaults() {
        let mut draft = ListingDraft::new();
        draft.rent = Some(Decimal::new(950, 0));
        let json = serde_json::to_value(draft.create_payload()).unwrap();

        assert_eq!(json["rent"], serde_json::json!(950.0));
        assert_eq!(json["securityDeposit"], serde_json::json!(0.0));
        assert_eq!(json["squareFeet"], serde_json::Value::Null);
        assert_eq!(json["distanceToCampusKm"], serde_json::Value::Null);
        assert_eq!(json["latitude"], serde_json::json!(0.0));
        assert_eq!(json["currency"], "USD");
        assert_eq!(json["propertyType"], "APARTMENT");
    }

    #[test]
    fn test_update_payload_has_no_coordinates() {
        let json = serde_json::to_value(ListingDraft::new().update_payload()).unwrap();
        assert!(json.get("latitude").is_none());
        assert!(json.get("longitude").is_none());
    }

    #[test]
    fn test_for_listing_seeds_edit_draft() {
        let listing: Listing = serde_json::from_str(
            r#"{
                "id": 31,
                "title": "Studio by North Campus",
                "city": "Amherst",
                "rent": 875,
                "bedrooms": 0,
                "leaseType": "ACADEMIC_YEAR",
                "photos": [{"id": 4, "photoUrl": "https://cdn/4.jpg", "isPrimary": true}],
                "amenities": [{"amenityType": "WIFI"}, {"amenityType": "GYM_FITNESS_CENTER"}]
            }"#,
        )
        .unwrap();

        let draft = ListingDraft::for_listing(&listing);
        assert_eq!(draft.listing_id, Some(ListingId::new(31)));
        assert_eq!(draft.bedrooms, 0);
        assert_eq!(draft.bathrooms, 1);
        assert_eq!(draft.lease_type, LeaseType::AcademicYear);
        assert_eq!(draft.amenities().len(), 2);
        assert_eq!(draft.existing_photos().len(), 1);
        assert!(draft.photos().is_empty());
    }

    #[test]
    fn test_forget_existing_photo() {
        let listing: Listing = serde_json::from_str(
            r#"{"id": 1, "photos": [{"id": 4, "photoUrl": "a"}, {"id": 5, "photoUrl": "b"}]}"#,
        )
        .unwrap();
        let mut draft = ListingDraft::for_listing(&listing);
        assert!(draft.forget_existing_photo(PhotoId::new(4)));
        assert!(!draft.forget_existing_photo(PhotoId::new(4)));
        assert_eq!(draft.existing_photos().len(), 1);
    }

    #[test]
    fn test_yaml_draft_deduplicates_amenities() {
        let draft: ListingDraft = serde_json::from_str(
            r#"{"title": "Quiet room", "amenities": ["WIFI", "WIFI", "HEATING"]}"#,
        )
        .unwrap();
        assert_eq!(draft.amenities(), &[token("WIFI"), token("HEATING")]);
        assert_eq!(draft.lease_duration_months, 6);
    }
}
