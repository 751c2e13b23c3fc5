//! Listing service client: listings, photos, amenities and preferences.
//!
//! One method per endpoint, no retries and no caching. Protected endpoints
//! carry the session's bearer token; public ones never require a session.

use std::sync::Arc;

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use studentbnb_core::{
    Amenity, Listing, ListingId, ListingPayload, ListingPreference, PendingPhoto, Photo, PhotoId,
    PreferencePayload, VocabularyToken,
};
use tracing::instrument;
use url::Url;

use crate::error::ApiError;
use crate::http::{Access, HttpCore};
use crate::models::{
    BulkAmenities, CreatedListing, Envelope, ListingPage, ListingSearchRequest, MyListingsBody,
    PreferenceVocabulary,
};
use crate::session::SessionStore;

/// Default page size of the browse endpoint.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Client for `/api/listings/*`.
#[derive(Debug, Clone)]
pub struct ListingsClient {
    http: HttpCore,
    preference_types_anchor: ListingId,
}

fn photo_part(photo: &PendingPhoto) -> Result<Part, ApiError> {
    Part::bytes(photo.bytes().to_vec())
        .file_name(photo.file_name().to_owned())
        .mime_str(photo.content_type())
        .map_err(|e| ApiError::Transport(format!("{}: {e}", photo.file_name())))
}

impl ListingsClient {
    #[must_use]
    pub const fn new(http: HttpCore, preference_types_anchor: ListingId) -> Self {
        Self {
            http,
            preference_types_anchor,
        }
    }

    #[must_use]
    pub fn session(&self) -> &Arc<dyn SessionStore> {
        self.http.session()
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.http.url(path)
    }

    fn paged_url(&self, path: &str, page: u32, size: u32) -> Result<Url, ApiError> {
        let mut url = self.url(path)?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("size", &size.to_string());
        Ok(url)
    }

    // =========================================================================
    // Listings
    // =========================================================================

    /// Create a listing and return its id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Decode` if the response envelope carries no id.
    #[instrument(skip(self, payload), fields(title = %payload.title))]
    pub async fn create(&self, payload: &ListingPayload) -> Result<ListingId, ApiError> {
        let url = self.url("/api/listings")?;
        let envelope: Envelope<CreatedListing> = self
            .http
            .send_json(
                self.http
                    .request(Method::POST, url, Access::Protected)?
                    .json(payload),
            )
            .await?;
        let id = envelope
            .data
            .map(|created| created.id)
            .ok_or_else(|| ApiError::Decode("create response carried no listing id".into()))?;
        tracing::debug!(listing_id = %id, "Listing created");
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, payload))]
    pub async fn update(&self, id: ListingId, payload: &ListingPayload) -> Result<(), ApiError> {
        let url = self.url(&format!("/api/listings/{id}"))?;
        self.http
            .send_unit(
                self.http
                    .request(Method::PUT, url, Access::Protected)?
                    .json(payload),
            )
            .await?;
        tracing::debug!(listing_id = %id, "Listing updated");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ListingId) -> Result<(), ApiError> {
        let url = self.url(&format!("/api/listings/{id}"))?;
        self.http
            .send_unit(self.http.request(Method::DELETE, url, Access::Protected)?)
            .await
    }

    /// The signed-in user's listings, in server order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Decode` if the body matches none of the known shapes.
    #[instrument(skip(self))]
    pub async fn my_listings(&self) -> Result<Vec<Listing>, ApiError> {
        let url = self.url("/api/listings/my-listings")?;
        let body: MyListingsBody = self
            .http
            .send_json(self.http.request(Method::GET, url, Access::Protected)?)
            .await?;
        if !matches!(body, MyListingsBody::Bare(_)) {
            tracing::warn!(
                shape = body.shape(),
                "my-listings answered with a wrapped body instead of a bare array"
            );
        }
        Ok(body.into_listings())
    }

    /// Active listings, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn list(&self, page: u32, size: u32) -> Result<ListingPage, ApiError> {
        let url = self.paged_url("/api/listings", page, size)?;
        self.http
            .send_json(self.http.request(Method::GET, url, Access::Public)?)
            .await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, request))]
    pub async fn search(
        &self,
        request: &ListingSearchRequest,
        page: u32,
        size: u32,
    ) -> Result<ListingPage, ApiError> {
        let url = self.paged_url("/api/listings/search", page, size)?;
        self.http
            .send_json(
                self.http
                    .request(Method::POST, url, Access::Public)?
                    .json(request),
            )
            .await
    }

    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown id.
    #[instrument(skip(self))]
    pub async fn get(&self, id: ListingId) -> Result<Listing, ApiError> {
        let url = self.url(&format!("/api/listings/{id}"))?;
        self.http
            .send_json(self.http.request(Method::GET, url, Access::Public)?)
            .await
    }

    // =========================================================================
    // Photos
    // =========================================================================

    /// Upload a single photo with an optional caption.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, photo, description), fields(file = %photo.file_name()))]
    pub async fn upload_photo(
        &self,
        id: ListingId,
        photo: &PendingPhoto,
        description: &str,
        is_primary: bool,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("/api/listings/{id}/photos/upload"))?;
        let form = Form::new()
            .part("file", photo_part(photo)?)
            .text("description", description.to_owned())
            .text("isPrimary", is_primary.to_string());
        self.http
            .send_unit(
                self.http
                    .request(Method::POST, url, Access::Protected)?
                    .multipart(form),
            )
            .await
    }

    /// Upload every photo in one multipart request, in order. The service
    /// makes the first one primary.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the batch is rejected.
    #[instrument(skip(self, photos), fields(count = photos.len()))]
    pub async fn upload_photos(&self, id: ListingId, photos: &[PendingPhoto]) -> Result<(), ApiError> {
        let url = self.url(&format!("/api/listings/{id}/photos/upload-multiple"))?;
        let mut form = Form::new();
        for photo in photos {
            form = form.part("files", photo_part(photo)?);
        }
        self.http
            .send_unit(
                self.http
                    .request(Method::POST, url, Access::Protected)?
                    .multipart(form),
            )
            .await?;
        tracing::debug!(listing_id = %id, count = photos.len(), "Photos uploaded");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn photos(&self, id: ListingId) -> Result<Vec<Photo>, ApiError> {
        let url = self.url(&format!("/api/listings/{id}/photos"))?;
        self.http
            .send_json(self.http.request(Method::GET, url, Access::Public)?)
            .await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_photo(&self, photo_id: PhotoId) -> Result<(), ApiError> {
        let url = self.url(&format!("/api/listings/photos/{photo_id}"))?;
        self.http
            .send_unit(self.http.request(Method::DELETE, url, Access::Protected)?)
            .await
    }

    // =========================================================================
    // Amenities
    // =========================================================================

    /// Amenity vocabulary.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn amenity_types(&self) -> Result<Vec<VocabularyToken>, ApiError> {
        let url = self.url("/api/listings/amenities/types")?;
        self.http
            .send_json(self.http.request(Method::GET, url, Access::Public)?)
            .await
    }

    /// Attach amenities in one bulk call. Tokens already attached are
    /// ignored by the service.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, amenities), fields(count = amenities.len()))]
    pub async fn add_amenities(
        &self,
        id: ListingId,
        amenities: &[VocabularyToken],
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("/api/listings/{id}/amenities/bulk"))?;
        let body = BulkAmenities {
            amenity_types: amenities,
        };
        self.http
            .send_unit(
                self.http
                    .request(Method::POST, url, Access::Protected)?
                    .json(&body),
            )
            .await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn amenities(&self, id: ListingId) -> Result<Vec<Amenity>, ApiError> {
        let url = self.url(&format!("/api/listings/{id}/amenities"))?;
        self.http
            .send_json(self.http.request(Method::GET, url, Access::Public)?)
            .await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_amenity(
        &self,
        id: ListingId,
        amenity: &VocabularyToken,
    ) -> Result<(), ApiError> {
        let mut url = self.url(&format!("/api/listings/{id}/amenities"))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl("base URL cannot carry a path".into()))?
            .push(amenity.as_str());
        self.http
            .send_unit(self.http.request(Method::DELETE, url, Access::Protected)?)
            .await
    }

    // =========================================================================
    // Preferences
    // =========================================================================

    /// Preference vocabulary.
    ///
    /// The service only serves it below a listing path; the anchor id is
    /// configurable and ignored by the server.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn preference_types(&self) -> Result<PreferenceVocabulary, ApiError> {
        let anchor = self.preference_types_anchor;
        let url = self.url(&format!("/api/listings/{anchor}/preferences/types"))?;
        self.http
            .send_json(self.http.request(Method::GET, url, Access::Public)?)
            .await
    }

    /// Replace the listing's preferences.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, preferences))]
    pub async fn set_preferences(
        &self,
        id: ListingId,
        preferences: &PreferencePayload,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("/api/listings/{id}/preferences"))?;
        self.http
            .send_unit(
                self.http
                    .request(Method::POST, url, Access::Protected)?
                    .json(preferences),
            )
            .await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn preferences(&self, id: ListingId) -> Result<Vec<ListingPreference>, ApiError> {
        let url = self.url(&format!("/api/listings/{id}/preferences"))?;
        self.http
            .send_json(self.http.request(Method::GET, url, Access::Public)?)
            .await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_preferences(&self, id: ListingId) -> Result<(), ApiError> {
        let url = self.url(&format!("/api/listings/{id}/preferences"))?;
        self.http
            .send_unit(self.http.request(Method::DELETE, url, Access::Protected)?)
            .await
    }
}
