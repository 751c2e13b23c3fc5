//! Submission orchestrator: turns a validated draft into the sequence of
//! calls that saves a listing.
//!
//! ```text
//! Idle -> Validating -> CreatingOrUpdating -> UploadingPhotos
//!      -> AttachingAmenities -> SettingPreferences -> Done
//! ```
//!
//! Any failing step moves to `Failed` and stops the sequence. Nothing is
//! rolled back: a listing may exist with only some of its photos,
//! amenities or preferences attached. The [`SubmissionReport`] returned
//! with the failure records what did complete, and [`Orchestrator::resume`]
//! picks up from there using update instead of a second create.
//!
//! Steps with nothing to send (no pending photos, no amenities, empty
//! preferences) are skipped without a call.

use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use studentbnb_core::{ListingDraft, ListingId, ValidationErrors};
use thiserror::Error;

use crate::error::ApiError;
use crate::listings::ListingsClient;

/// Where a submission currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Validating,
    CreatingOrUpdating,
    UploadingPhotos,
    AttachingAmenities,
    SettingPreferences,
    Done,
    Failed,
}

/// A network step of the save sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubmitStep {
    /// Create or update the listing itself.
    SaveListing,
    UploadPhotos,
    AttachAmenities,
    SetPreferences,
}

impl SubmitStep {
    const fn state(self) -> SubmissionState {
        match self {
            Self::SaveListing => SubmissionState::CreatingOrUpdating,
            Self::UploadPhotos => SubmissionState::UploadingPhotos,
            Self::AttachAmenities => SubmissionState::AttachingAmenities,
            Self::SetPreferences => SubmissionState::SettingPreferences,
        }
    }
}

impl std::fmt::Display for SubmitStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::SaveListing => "save listing",
            Self::UploadPhotos => "upload photos",
            Self::AttachAmenities => "attach amenities",
            Self::SetPreferences => "set preferences",
        })
    }
}

/// What a submission got done.
///
/// Serializable so a caller can keep it across runs and hand it back to
/// [`Orchestrator::resume`] later.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReport {
    /// Set once the listing exists server-side.
    #[serde(default)]
    pub listing_id: Option<ListingId>,
    /// Steps that succeeded, in order.
    #[serde(default)]
    pub completed: Vec<SubmitStep>,
    /// The step that failed, if any.
    #[serde(default)]
    pub failed: Option<SubmitStep>,
}

impl SubmissionReport {
    #[must_use]
    pub fn has_completed(&self, step: SubmitStep) -> bool {
        self.completed.contains(&step)
    }

    /// True when the listing was saved but a later step failed.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.listing_id.is_some() && self.failed.is_some()
    }
}

/// A successful submission.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub listing_id: ListingId,
    pub report: SubmissionReport,
    /// How long to show the success message before navigating away.
    pub success_delay: Duration,
}

/// Why a submission did not reach `Done`.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The draft failed client-side validation. No call was made.
    #[error("{0}")]
    Invalid(ValidationErrors),

    /// Another submission on this orchestrator has not finished.
    #[error("A submission is already in progress")]
    InFlight,

    /// A network step failed; later steps did not run.
    #[error("{source}")]
    Step {
        step: SubmitStep,
        report: SubmissionReport,
        #[source]
        source: ApiError,
    },
}

impl SubmitError {
    /// The single message shown for a failed attempt.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Invalid(errors) => errors.banner(),
            Self::InFlight => self.to_string(),
            Self::Step { source, .. } => source.user_message(),
        }
    }

    /// Partial-completion state, for [`Orchestrator::resume`].
    #[must_use]
    pub const fn report(&self) -> Option<&SubmissionReport> {
        match self {
            Self::Step { report, .. } => Some(report),
            _ => None,
        }
    }
}

/// Clears the in-flight flag however the submission ends.
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Sequences the calls that save a listing draft.
///
/// One submission at a time: a second call while one is running fails
/// immediately with [`SubmitError::InFlight`].
#[derive(Debug)]
pub struct Orchestrator {
    listings: ListingsClient,
    success_delay: Duration,
    state: Mutex<SubmissionState>,
    in_flight: AtomicBool,
}

impl Orchestrator {
    #[must_use]
    pub fn new(listings: ListingsClient, success_delay: Duration) -> Self {
        Self {
            listings,
            success_delay,
            state: Mutex::new(SubmissionState::Idle),
            in_flight: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn state(&self) -> SubmissionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn transition(&self, next: SubmissionState, listing_id: Option<ListingId>) {
        let previous = std::mem::replace(
            &mut *self.state.lock().unwrap_or_else(PoisonError::into_inner),
            next,
        );
        match next {
            SubmissionState::Done => {
                tracing::info!(?previous, state = ?next, ?listing_id, "Listing saved");
            }
            SubmissionState::Failed => {
                tracing::warn!(?previous, state = ?next, ?listing_id, "Listing submission failed");
            }
            _ => tracing::debug!(?previous, state = ?next, ?listing_id, "Submission state changed"),
        }
    }

    /// Validate and save `draft`: create (or update, when the draft is
    /// bound to a listing), then photos, amenities and preferences.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::Invalid` before any call for a bad draft,
    /// `SubmitError::InFlight` while another submission runs, and
    /// `SubmitError::Step` when a call fails.
    pub async fn submit(&self, draft: &ListingDraft) -> Result<SubmitOutcome, SubmitError> {
        self.run(draft, SubmissionReport::default()).await
    }

    /// Re-run only the steps `report` does not list as completed. When the
    /// report carries a listing id the listing is updated, never created
    /// again.
    ///
    /// # Errors
    ///
    /// Same as [`Orchestrator::submit`].
    pub async fn resume(
        &self,
        draft: &ListingDraft,
        report: &SubmissionReport,
    ) -> Result<SubmitOutcome, SubmitError> {
        let mut report = report.clone();
        report.failed = None;
        self.run(draft, report).await
    }

    async fn run(
        &self,
        draft: &ListingDraft,
        mut report: SubmissionReport,
    ) -> Result<SubmitOutcome, SubmitError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Submit ignored: already in flight");
            return Err(SubmitError::InFlight);
        }
        let _guard = FlightGuard(&self.in_flight);

        self.transition(SubmissionState::Validating, report.listing_id);
        if let Err(errors) = draft.validate() {
            self.transition(SubmissionState::Failed, report.listing_id);
            return Err(SubmitError::Invalid(errors));
        }

        let listing_id = match report.listing_id {
            Some(id) if report.has_completed(SubmitStep::SaveListing) => id,
            known => {
                self.transition(SubmitStep::SaveListing.state(), known);
                let saved = match known.or(draft.listing_id) {
                    Some(id) => self
                        .listings
                        .update(id, &draft.update_payload())
                        .await
                        .map(|()| id),
                    None => self.listings.create(&draft.create_payload()).await,
                };
                match saved {
                    Ok(id) => {
                        report.listing_id = Some(id);
                        report.completed.push(SubmitStep::SaveListing);
                        id
                    }
                    Err(source) => return Err(self.fail(SubmitStep::SaveListing, report, source)),
                }
            }
        };

        if !draft.photos().is_empty() && !report.has_completed(SubmitStep::UploadPhotos) {
            self.transition(SubmitStep::UploadPhotos.state(), Some(listing_id));
            if let Err(source) = self.listings.upload_photos(listing_id, draft.photos()).await {
                return Err(self.fail(SubmitStep::UploadPhotos, report, source));
            }
            report.completed.push(SubmitStep::UploadPhotos);
        }

        if !draft.amenities().is_empty() && !report.has_completed(SubmitStep::AttachAmenities) {
            self.transition(SubmitStep::AttachAmenities.state(), Some(listing_id));
            if let Err(source) = self
                .listings
                .add_amenities(listing_id, draft.amenities())
                .await
            {
                return Err(self.fail(SubmitStep::AttachAmenities, report, source));
            }
            report.completed.push(SubmitStep::AttachAmenities);
        }

        let preferences = draft.preferences.to_payload();
        if !preferences.is_empty() && !report.has_completed(SubmitStep::SetPreferences) {
            self.transition(SubmitStep::SetPreferences.state(), Some(listing_id));
            if let Err(source) = self
                .listings
                .set_preferences(listing_id, &preferences)
                .await
            {
                return Err(self.fail(SubmitStep::SetPreferences, report, source));
            }
            report.completed.push(SubmitStep::SetPreferences);
        }

        self.transition(SubmissionState::Done, Some(listing_id));
        Ok(SubmitOutcome {
            listing_id,
            report,
            success_delay: self.success_delay,
        })
    }

    fn fail(
        &self,
        step: SubmitStep,
        mut report: SubmissionReport,
        source: ApiError,
    ) -> SubmitError {
        report.failed = Some(step);
        self.transition(SubmissionState::Failed, report.listing_id);
        tracing::warn!(%step, "Step failed: {source}");
        SubmitError::Step {
            step,
            report,
            source,
        }
    }
}
