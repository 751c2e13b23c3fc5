//! Client-side draft validation.
//!
//! These checks duplicate what the listing service enforces. They exist so
//! obviously bad drafts never cost a network round trip; the server stays
//! the authority.

use core::fmt;

use rust_decimal::Decimal;

use super::ListingDraft;
use crate::types::Email;

pub const TITLE_LENGTH: std::ops::RangeInclusive<usize> = 10..=100;
pub const DESCRIPTION_LENGTH: std::ops::RangeInclusive<usize> = 50..=2000;
pub const BEDROOMS: std::ops::RangeInclusive<u32> = 0..=10;
pub const BATHROOMS: std::ops::RangeInclusive<u32> = 1..=10;
pub const LEASE_DURATION_MONTHS: std::ops::RangeInclusive<u32> = 1..=24;

/// One violated constraint, attached to the form field that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Wire name of the field (`title`, `contactEmail`, ...).
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every constraint a draft violates, collected in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Violations for a single field, for inline display.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
        self.0.iter().filter(move |e| e.field == field)
    }

    /// True when a required field was left blank.
    #[must_use]
    pub fn has_missing_required(&self) -> bool {
        self.0.iter().any(|e| e.message == REQUIRED)
    }

    /// Form-level banner text.
    #[must_use]
    pub fn banner(&self) -> String {
        if self.has_missing_required() {
            "Please fill in all required fields".to_owned()
        } else {
            "Please correct the highlighted fields".to_owned()
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{}: {joined}", self.banner())
    }
}

impl std::error::Error for ValidationErrors {}

const REQUIRED: &str = "is required";

fn check_length(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    range: &std::ops::RangeInclusive<usize>,
) {
    let len = value.trim().chars().count();
    if len == 0 {
        errors.push(field, REQUIRED);
    } else if !range.contains(&len) {
        errors.push(
            field,
            format!(
                "must be between {} and {} characters (currently {len})",
                range.start(),
                range.end()
            ),
        );
    }
}

fn check_required(errors: &mut ValidationErrors, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.push(field, REQUIRED);
    }
}

fn check_range(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: u32,
    range: &std::ops::RangeInclusive<u32>,
) {
    if !range.contains(&value) {
        errors.push(
            field,
            format!("must be between {} and {}", range.start(), range.end()),
        );
    }
}

/// Validate a draft, returning every violation at once.
///
/// # Errors
///
/// Returns [`ValidationErrors`] when at least one constraint is violated.
pub fn validate(draft: &ListingDraft) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    check_length(&mut errors, "title", &draft.title, &TITLE_LENGTH);
    check_length(
        &mut errors,
        "description",
        &draft.description,
        &DESCRIPTION_LENGTH,
    );
    check_required(&mut errors, "address", &draft.address);
    check_required(&mut errors, "city", &draft.city);

    match draft.rent {
        None => errors.push("rent", REQUIRED),
        Some(rent) if rent < Decimal::ZERO => errors.push("rent", "cannot be negative"),
        Some(_) => {}
    }
    if draft.security_deposit.is_some_and(|d| d < Decimal::ZERO) {
        errors.push("securityDeposit", "cannot be negative");
    }
    if draft.square_feet.is_some_and(|s| s <= Decimal::ZERO) {
        errors.push("squareFeet", "must be greater than zero");
    }

    check_range(&mut errors, "bedrooms", draft.bedrooms, &BEDROOMS);
    check_range(&mut errors, "bathrooms", draft.bathrooms, &BATHROOMS);
    check_range(
        &mut errors,
        "leaseDurationMonths",
        draft.lease_duration_months,
        &LEASE_DURATION_MONTHS,
    );

    if let (Some(from), Some(until)) = (draft.available_from, draft.available_until)
        && until < from
    {
        errors.push("availableUntil", "cannot be before the available-from date");
    }

    if draft.distance_to_campus_km.is_some_and(|d| !d.is_finite() || d < 0.0) {
        errors.push("distanceToCampusKm", "cannot be negative");
    }

    if draft.contact_email.trim().is_empty() {
        errors.push("contactEmail", REQUIRED);
    } else if let Err(e) = Email::parse(&draft.contact_email) {
        errors.push("contactEmail", e.to_string());
    }

    for photo in draft.photos() {
        if let Err(e) = photo.check() {
            errors.push("photos", e.to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
