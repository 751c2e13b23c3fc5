//! Listing commands.
//!
//! # Usage
//!
//! ```bash
//! sbnb listing new draft.yaml
//! sbnb listing submit draft.yaml --photo front.jpg
//! sbnb listing submit draft.yaml --id 42
//! sbnb listing resume draft.yaml --photo front.jpg
//! sbnb listing show 42
//! sbnb listing search --city Buffalo --min-bedrooms 2 --amenity WIFI
//! ```

use std::path::{Path, PathBuf};

use clap::Args;
use rust_decimal::Decimal;
use studentbnb_client::{
    ListingSearchRequest, SubmissionReport, SubmitError, SubmitOutcome, SubmitStep,
};
use studentbnb_core::{
    LeaseType, ListingDraft, ListingId, Money, PendingPhoto, PhotoId, PropertyType,
    VocabularyToken,
};

use super::Context;
use crate::output;

fn parse_amount(input: &str) -> Result<Decimal, String> {
    Money::parse_amount(input).map_err(|e| e.to_string())
}

/// Filters accepted by `sbnb listing search`.
#[derive(Debug, Default, Args)]
pub struct SearchArgs {
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    /// Nearest university
    #[arg(long)]
    pub university: Option<String>,
    #[arg(long)]
    pub min_bedrooms: Option<u32>,
    #[arg(long)]
    pub max_bedrooms: Option<u32>,
    #[arg(long, value_parser = parse_amount)]
    pub min_rent: Option<Decimal>,
    #[arg(long, value_parser = parse_amount)]
    pub max_rent: Option<Decimal>,
    /// e.g. `apartment`, `shared-room`
    #[arg(long)]
    pub property_type: Option<PropertyType>,
    #[arg(long)]
    pub lease_type: Option<LeaseType>,
    #[arg(long)]
    pub keywords: Option<String>,
    /// Required amenity (repeatable)
    #[arg(long = "amenity")]
    pub amenities: Vec<VocabularyToken>,
    #[arg(long, default_value_t = 0)]
    pub page: u32,
    #[arg(long, default_value_t = studentbnb_client::DEFAULT_PAGE_SIZE)]
    pub size: u32,
}

impl SearchArgs {
    fn to_request(&self) -> ListingSearchRequest {
        ListingSearchRequest {
            city: self.city.clone(),
            state: self.state.clone(),
            nearest_university: self.university.clone(),
            min_bedrooms: self.min_bedrooms,
            max_bedrooms: self.max_bedrooms,
            min_rent: self.min_rent,
            max_rent: self.max_rent,
            property_type: self.property_type,
            lease_type: self.lease_type,
            keywords: self.keywords.clone(),
            required_amenities: self.amenities.clone(),
            ..ListingSearchRequest::default()
        }
    }
}

/// Write an empty draft to `path` for editing.
///
/// # Errors
///
/// Returns an error if `path` already exists or cannot be written.
pub fn new_template(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        return Err(format!("{} already exists", path.display()).into());
    }
    let yaml = serde_yaml::to_string(&ListingDraft::new())?;
    std::fs::write(path, yaml)?;
    output::message(&format!("Draft written to {}", path.display()));
    Ok(())
}

fn read_draft(path: &Path) -> Result<ListingDraft, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    Ok(serde_yaml::from_str(&text)?)
}

fn read_photo(path: &Path) -> Result<PendingPhoto, Box<dyn std::error::Error>> {
    let bytes = std::fs::read(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let file_name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    let content_type = mime_guess::from_path(path).first_or_octet_stream();
    Ok(PendingPhoto::new(file_name, content_type.essence_str(), bytes))
}

/// Where the report of an unfinished submission of `draft` is kept.
fn progress_path(draft: &Path) -> PathBuf {
    let mut name = draft
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".progress.yaml");
    draft.with_file_name(name)
}

fn save_progress(draft: &Path, report: &SubmissionReport) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::write(progress_path(draft), serde_yaml::to_string(report)?)?;
    Ok(())
}

fn load_progress(draft: &Path) -> Result<Option<SubmissionReport>, Box<dyn std::error::Error>> {
    match std::fs::read_to_string(progress_path(draft)) {
        Ok(text) => Ok(Some(serde_yaml::from_str(&text)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn clear_progress(draft: &Path) -> Result<(), Box<dyn std::error::Error>> {
    match std::fs::remove_file(progress_path(draft)) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn queue_photos(draft: &mut ListingDraft, photos: &[PathBuf]) -> Result<(), Box<dyn std::error::Error>> {
    let pending = photos
        .iter()
        .map(|p| read_photo(p))
        .collect::<Result<Vec<_>, _>>()?;
    let intake = draft.intake(pending);
    if let Some(message) = intake.message() {
        tracing::warn!("{message}");
    }
    Ok(())
}

/// Validate and save the draft at `path`, uploading `photos` with it.
///
/// Refuses to start while an earlier submission of the same draft is
/// unfinished, since a fresh run would send its photos again.
///
/// # Errors
///
/// Returns the single user-facing message of the failed attempt.
pub async fn submit(
    ctx: &Context,
    path: &Path,
    photos: &[PathBuf],
    id: Option<i64>,
) -> Result<(), Box<dyn std::error::Error>> {
    if load_progress(path)?.is_some() {
        return Err(format!(
            "{} has an unfinished submission; run `sbnb listing resume {}` or delete {}",
            path.display(),
            path.display(),
            progress_path(path).display()
        )
        .into());
    }

    let mut draft = read_draft(path)?;
    if let Some(id) = id {
        draft.bind_to(ListingId::new(id));
    }
    queue_photos(&mut draft, photos)?;

    let result = ctx.clients.orchestrator().submit(&draft).await;
    finish(ctx, path, &draft, result).await
}

/// Finish an interrupted submission of the draft at `path`, running only
/// the steps its saved progress does not list as done.
///
/// # Errors
///
/// Returns an error if there is nothing to resume or a step fails again.
pub async fn resume(
    ctx: &Context,
    path: &Path,
    photos: &[PathBuf],
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(report) = load_progress(path)? else {
        return Err(format!("{} has no unfinished submission", path.display()).into());
    };

    let mut draft = read_draft(path)?;
    if report.has_completed(SubmitStep::UploadPhotos) {
        if !photos.is_empty() {
            output::message("Photos were already uploaded; skipping them.");
        }
    } else {
        queue_photos(&mut draft, photos)?;
    }

    let result = ctx.clients.orchestrator().resume(&draft, &report).await;
    finish(ctx, path, &draft, result).await
}

async fn finish(
    ctx: &Context,
    path: &Path,
    draft: &ListingDraft,
    result: Result<SubmitOutcome, SubmitError>,
) -> Result<(), Box<dyn std::error::Error>> {
    match result {
        Ok(outcome) => {
            clear_progress(path)?;
            let verb = if draft.is_edit() { "updated" } else { "saved" };
            output::message(&format!("Listing #{} {verb}.", outcome.listing_id));
            tokio::time::sleep(outcome.success_delay).await;
            let mine = ctx.clients.views().fetch_mine().await?;
            output::listings(&mine);
            Ok(())
        }
        Err(SubmitError::Invalid(errors)) => {
            for error in errors.errors() {
                output::message(&format!("  {error}"));
            }
            Err(errors.banner().into())
        }
        Err(err) => {
            if let Some(report) = err.report() {
                let done: Vec<_> = report.completed.iter().map(ToString::to_string).collect();
                if !done.is_empty() {
                    output::message(&format!("Completed: {}", done.join(", ")));
                }
                if let Some(listing_id) = report.listing_id {
                    save_progress(path, report)?;
                    output::message(&format!(
                        "Listing #{listing_id} exists; run `sbnb listing resume {}` to finish it.",
                        path.display()
                    ));
                }
            }
            Err(err.user_message().into())
        }
    }
}

/// # Errors
///
/// Returns an error if the listing cannot be fetched.
pub async fn show(ctx: &Context, id: i64) -> Result<(), Box<dyn std::error::Error>> {
    let detail = ctx.clients.views().fetch_one(ListingId::new(id)).await?;
    output::detail(&detail);
    Ok(())
}

/// # Errors
///
/// Returns an error if the request fails.
pub async fn mine(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    output::listings(&ctx.clients.views().fetch_mine().await?);
    Ok(())
}

/// # Errors
///
/// Returns an error if the request fails.
pub async fn browse(ctx: &Context, page: u32, size: u32) -> Result<(), Box<dyn std::error::Error>> {
    output::page(&ctx.clients.views().fetch_page(page, size).await?);
    Ok(())
}

/// # Errors
///
/// Returns an error if the request fails.
pub async fn search(ctx: &Context, args: SearchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let request = args.to_request();
    let page = ctx
        .clients
        .views()
        .search(&request, args.page, args.size)
        .await?;
    output::page(&page);
    Ok(())
}

/// Delete a listing and print what remains of "my listings".
///
/// # Errors
///
/// Returns an error if either request fails.
pub async fn delete(ctx: &Context, id: i64) -> Result<(), Box<dyn std::error::Error>> {
    let views = ctx.clients.views();
    let shown = views.fetch_mine().await?;
    let remaining = views.delete_listing(ListingId::new(id), shown).await?;
    output::message(&format!("Listing #{id} deleted."));
    output::listings(&remaining);
    Ok(())
}

/// # Errors
///
/// Returns an error if the request fails.
pub async fn delete_photo(ctx: &Context, photo_id: i64) -> Result<(), Box<dyn std::error::Error>> {
    ctx.clients
        .listings
        .delete_photo(PhotoId::new(photo_id))
        .await?;
    output::message(&format!("Photo #{photo_id} deleted."));
    Ok(())
}

/// Print both vocabularies; one failing does not hide the other.
pub async fn vocab(ctx: &Context) {
    let vocabulary = ctx.clients.views().fetch_vocabulary().await;
    match &vocabulary.amenities {
        Ok(amenities) => output::amenity_vocabulary(amenities),
        Err(e) => output::message(&format!("Amenities unavailable: {e}")),
    }
    match &vocabulary.preferences {
        Ok(preferences) => output::preference_vocabulary(preferences),
        Err(e) => output::message(&format!("Preferences unavailable: {e}")),
    }
}
