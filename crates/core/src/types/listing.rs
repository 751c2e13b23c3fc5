//! Listing resources as the listing service returns them, and the payloads
//! the client sends back.
//!
//! Response types are deliberately lenient (`#[serde(default)]` on anything
//! the service may omit); payload types are strict and only carry what the
//! service accepts.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CurrencyCode, ListingId, ListingStatus, LeaseType, PhotoId, PreferenceId, PropertyType, UserId, VocabularyToken};

/// A rental listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    #[serde(default)]
    pub landlord_id: Option<UserId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rent: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<CurrencyCode>,
    #[serde(default)]
    pub security_deposit: Option<Decimal>,
    #[serde(default)]
    pub utilities_included: Option<bool>,
    #[serde(default)]
    pub bedrooms: Option<u32>,
    #[serde(default)]
    pub bathrooms: Option<u32>,
    #[serde(default)]
    pub square_feet: Option<Decimal>,
    #[serde(default)]
    pub property_type: Option<PropertyType>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub distance_to_campus_km: Option<f64>,
    #[serde(default)]
    pub nearest_university: Option<String>,
    #[serde(default)]
    pub lease_type: Option<LeaseType>,
    #[serde(default)]
    pub lease_duration_months: Option<u32>,
    #[serde(default)]
    pub available_from: Option<NaiveDate>,
    #[serde(default)]
    pub available_until: Option<NaiveDate>,
    #[serde(default)]
    pub pets_allowed: Option<bool>,
    #[serde(default)]
    pub smoking_allowed: Option<bool>,
    #[serde(default)]
    pub furnished: Option<bool>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub status: Option<ListingStatus>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub photos: Vec<Photo>,
    #[serde(default)]
    pub amenities: Vec<Amenity>,
    #[serde(default)]
    pub primary_photo_url: Option<String>,
}

impl Listing {
    /// The representative photo: the one flagged primary, else the first.
    #[must_use]
    pub fn primary_photo(&self) -> Option<&Photo> {
        self.photos
            .iter()
            .find(|p| p.is_primary)
            .or_else(|| self.photos.first())
    }

    /// Amenity tokens attached to the listing, in server order.
    #[must_use]
    pub fn amenity_types(&self) -> Vec<VocabularyToken> {
        self.amenities
            .iter()
            .map(|a| a.amenity_type.clone())
            .collect()
    }
}

/// A photo attached to a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: PhotoId,
    pub photo_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub display_order: Option<i32>,
    #[serde(default)]
    pub is_primary: bool,
}

/// An amenity attached to a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Amenity {
    pub amenity_type: VocabularyToken,
}

/// Tenant preferences recorded for a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPreference {
    #[serde(default)]
    pub id: Option<PreferenceId>,
    #[serde(default)]
    pub dietary_preference: Option<VocabularyToken>,
    #[serde(default)]
    pub gender_preference: Option<VocabularyToken>,
    #[serde(default)]
    pub smoking_preference: Option<VocabularyToken>,
    #[serde(default)]
    pub additional_notes: Option<String>,
}

/// Body of the create (`POST /api/listings`) and update
/// (`PUT /api/listings/{id}`) calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPayload {
    pub title: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub rent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub security_deposit: Decimal,
    pub currency: CurrencyCode,
    pub bedrooms: u32,
    pub bathrooms: u32,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub square_feet: Option<Decimal>,
    pub property_type: PropertyType,
    pub lease_type: LeaseType,
    pub lease_duration_months: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_until: Option<NaiveDate>,
    pub furnished: bool,
    pub utilities_included: bool,
    pub pets_allowed: bool,
    pub smoking_allowed: bool,
    pub contact_email: String,
    pub contact_phone: String,
    pub nearest_university: String,
    pub distance_to_campus_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// Body of `POST /api/listings/{id}/preferences`. Only non-empty
/// subfields are serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dietary_preference: Option<VocabularyToken>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender_preference: Option<VocabularyToken>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smoking_preference: Option<VocabularyToken>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
}

impl PreferencePayload {
    /// True when no subfield would be sent.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.dietary_preference.is_none()
            && self.gender_preference.is_none()
            && self.smoking_preference.is_none()
            && self.additional_notes.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_deserializes_sparse_response() {
        let json = r#"{
            "id": 12,
            "title": "Cozy 2BR near UB",
            "rent": 1200.00,
            "propertyType": "APARTMENT",
            "status": "ACTIVE",
            "createdAt": "2024-09-01T10:15:00",
            "photos": [
                {"id": 1, "photoUrl": "https://cdn/1.jpg", "isPrimary": false},
                {"id": 2, "photoUrl": "https://cdn/2.jpg", "isPrimary": true}
            ],
            "amenities": [{"id": 5, "amenityType": "WIFI"}]
        }"#;

        let listing: Listing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.id, ListingId::new(12));
        assert_eq!(listing.rent, Some(Decimal::new(1200, 0)));
        assert_eq!(listing.primary_photo().unwrap().id, PhotoId::new(2));
        assert_eq!(listing.amenity_types()[0].as_str(), "WIFI");
        assert!(listing.description.is_empty());
    }

    #[test]
    fn test_primary_photo_falls_back_to_first() {
        let listing: Listing = serde_json::from_str(
            r#"{"id": 1, "photos": [{"id": 8, "photoUrl": "a"}, {"id": 9, "photoUrl": "b"}]}"#,
        )
        .unwrap();
        assert_eq!(listing.primary_photo().unwrap().id, PhotoId::new(8));
    }

    #[test]
    fn test_preference_payload_skips_absent_fields() {
        let payload = PreferencePayload {
            gender_preference: Some(VocabularyToken::new("FEMALE_ONLY").unwrap()),
            ..PreferencePayload::default()
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!({"genderPreference": "FEMALE_ONLY"}));
        assert!(PreferencePayload::default().is_empty());
    }
}
