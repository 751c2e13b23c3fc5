//! Wire models for the auth and listing services that do not belong in the
//! core crate: request bodies, response envelopes and pages.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use studentbnb_core::{
    LeaseType, Listing, ListingId, ListingPreference, PropertyType, UserId, UserRole,
    VocabularyToken,
};

// =============================================================================
// Auth
// =============================================================================

fn serialize_secret<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// Body of `POST /api/auth/register`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    #[serde(serialize_with = "serialize_secret")]
    pub password: SecretString,
    pub role: UserRole,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

/// Body of `POST /api/auth/login`.
#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of `POST /api/auth/google`.
#[derive(Serialize)]
pub(crate) struct GoogleLoginRequest<'a> {
    pub credential: &'a str,
}

/// Body of `POST /api/auth/refresh`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Response of register, login and Google login.
///
/// Registration answers without tokens; the session is only established
/// when `access_token` is present.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub user_id: UserId,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub(crate) access_token: Option<String>,
    #[serde(default)]
    pub(crate) refresh_token: Option<String>,
}

impl AuthResponse {
    /// True when the response carried an access token.
    #[must_use]
    pub const fn has_token(&self) -> bool {
        self.access_token.is_some()
    }
}

impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("message", &self.message)
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Response of `POST /api/auth/refresh`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshResponse {
    pub access_token: String,
}

/// Profile returned by `GET /api/auth/profile/details`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub id: Option<UserId>,
    pub email: String,
    pub role: UserRole,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub profile_picture_url: Option<String>,
    pub bio: Option<String>,
    pub university: Option<String>,
    pub graduation_year: Option<i32>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub zipcode: Option<String>,
    pub email_verified: Option<bool>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl UserProfile {
    /// "First Last", or the email when no name is set.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            self.email.clone()
        } else {
            name
        }
    }
}

/// Body of `PUT /api/auth/profile`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graduation_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
}

impl From<&UserProfile> for UpdateProfileRequest {
    fn from(profile: &UserProfile) -> Self {
        Self {
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            phone_number: profile.phone_number.clone(),
            bio: profile.bio.clone(),
            university: profile.university.clone(),
            graduation_year: profile.graduation_year,
            city: profile.city.clone(),
            state: profile.state.clone(),
            country: profile.country.clone(),
            zipcode: profile.zipcode.clone(),
        }
    }
}

// =============================================================================
// Listings
// =============================================================================

/// `{message, data}` envelope around mutation results.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

/// Just the id of a created resource.
#[derive(Debug, Deserialize)]
pub(crate) struct CreatedListing {
    pub id: ListingId,
}

/// A page of listings, as returned by browse and search.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage {
    #[serde(default)]
    pub content: Vec<Listing>,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub last: bool,
}

/// The shapes `GET /api/listings/my-listings` has been seen to answer with.
///
/// The bare array is the contract; the wrapped forms are accepted and
/// reported.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum MyListingsBody {
    Bare(Vec<Listing>),
    Data { data: Vec<Listing> },
    Listings { listings: Vec<Listing> },
}

impl MyListingsBody {
    pub(crate) const fn shape(&self) -> &'static str {
        match self {
            Self::Bare(_) => "array",
            Self::Data { .. } => "{data}",
            Self::Listings { .. } => "{listings}",
        }
    }

    pub(crate) fn into_listings(self) -> Vec<Listing> {
        match self {
            Self::Bare(listings)
            | Self::Data { data: listings }
            | Self::Listings { listings } => listings,
        }
    }
}

/// Body of `POST /api/listings/{id}/amenities/bulk`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BulkAmenities<'a> {
    pub amenity_types: &'a [VocabularyToken],
}

/// Preference vocabulary served by `GET /api/listings/{id}/preferences/types`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferenceVocabulary {
    pub dietary_preferences: Vec<VocabularyToken>,
    pub gender_preferences: Vec<VocabularyToken>,
    pub smoking_preferences: Vec<VocabularyToken>,
}

/// A listing with its stored preferences (empty when none exist).
#[derive(Debug, Clone)]
pub struct ListingDetail {
    pub listing: Listing,
    pub preferences: Vec<ListingPreference>,
}

/// Sort column for search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    CreatedAt,
    Rent,
    ViewCount,
    FavoriteCount,
    DistanceToCampus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Body of `POST /api/listings/search`. Unset filters are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingSearchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearest_university: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_distance_to_campus: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_type: Option<PropertyType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_bedrooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_bedrooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_bathrooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_bathrooms: Option<u32>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_rent: Option<Decimal>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_rent: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utilities_included: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lease_type: Option<LeaseType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_lease_duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_lease_duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_until: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pets_allowed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smoking_allowed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub furnished: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required_amenities: Vec<VocabularyToken>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    pub sort_by: SortField,
    pub sort_direction: SortDirection,
}
