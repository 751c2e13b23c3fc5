//! Read views: what the detail, "my listings", browse, edit and profile
//! screens load.

use studentbnb_core::{Listing, ListingDraft, ListingId, PreferenceSelection, VocabularyToken};
use tracing::instrument;

use crate::auth::AuthClient;
use crate::error::ApiError;
use crate::listings::ListingsClient;
use crate::models::{
    ListingDetail, ListingPage, ListingSearchRequest, PreferenceVocabulary, UpdateProfileRequest,
    UserProfile,
};

/// Amenity and preference vocabularies, loaded independently: one failing
/// leaves the other usable.
#[derive(Debug)]
pub struct Vocabulary {
    pub amenities: Result<Vec<VocabularyToken>, ApiError>,
    pub preferences: Result<PreferenceVocabulary, ApiError>,
}

/// Read-side operations over both services.
#[derive(Debug, Clone)]
pub struct Views {
    auth: AuthClient,
    listings: ListingsClient,
}

impl Views {
    #[must_use]
    pub const fn new(auth: AuthClient, listings: ListingsClient) -> Self {
        Self { auth, listings }
    }

    /// One listing plus its preferences.
    ///
    /// Preferences are best-effort: a listing without any (404) or a failed
    /// preference fetch yields an empty list, never an error.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the listing itself cannot be fetched.
    #[instrument(skip(self))]
    pub async fn fetch_one(&self, id: ListingId) -> Result<ListingDetail, ApiError> {
        let listing = self.listings.get(id).await?;
        let preferences = match self.listings.preferences(id).await {
            Ok(preferences) => preferences,
            Err(e) if e.is_not_found() => {
                tracing::debug!(listing_id = %id, "No preferences stored");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(listing_id = %id, "Ignoring preference fetch failure: {e}");
                Vec::new()
            }
        };
        Ok(ListingDetail {
            listing,
            preferences,
        })
    }

    /// The signed-in user's listings.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn fetch_mine(&self) -> Result<Vec<Listing>, ApiError> {
        self.listings.my_listings().await
    }

    /// Both vocabularies, fetched concurrently.
    pub async fn fetch_vocabulary(&self) -> Vocabulary {
        let (amenities, preferences) = tokio::join!(
            self.listings.amenity_types(),
            self.listings.preference_types()
        );
        if let Err(e) = &amenities {
            tracing::warn!("Amenity vocabulary unavailable: {e}");
        }
        if let Err(e) = &preferences {
            tracing::warn!("Preference vocabulary unavailable: {e}");
        }
        Vocabulary {
            amenities,
            preferences,
        }
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn fetch_page(&self, page: u32, size: u32) -> Result<ListingPage, ApiError> {
        self.listings.list(page, size).await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn search(
        &self,
        request: &ListingSearchRequest,
        page: u32,
        size: u32,
    ) -> Result<ListingPage, ApiError> {
        self.listings.search(request, page, size).await
    }

    /// Delete a listing from the "my listings" view and return what is left
    /// of `shown`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the delete fails; `shown` is then unchanged.
    #[instrument(skip(self, shown))]
    pub async fn delete_listing(
        &self,
        id: ListingId,
        shown: Vec<Listing>,
    ) -> Result<Vec<Listing>, ApiError> {
        self.listings.delete(id).await?;
        Ok(shown.into_iter().filter(|l| l.id != id).collect())
    }

    /// A draft seeded from an existing listing, for the edit screen.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the listing cannot be fetched.
    pub async fn edit_draft(&self, id: ListingId) -> Result<ListingDraft, ApiError> {
        let detail = self.fetch_one(id).await?;
        let mut draft = ListingDraft::for_listing(&detail.listing);
        if let Some(stored) = detail.preferences.first() {
            draft.preferences = PreferenceSelection::from(stored);
        }
        Ok(draft)
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn fetch_profile(&self) -> Result<UserProfile, ApiError> {
        self.auth.profile().await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn save_profile(
        &self,
        update: &UpdateProfileRequest,
    ) -> Result<UserProfile, ApiError> {
        self.auth.update_profile(update).await
    }
}
