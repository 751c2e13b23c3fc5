//! Plain-text rendering of listings, profiles and vocabularies.

#![allow(clippy::print_stdout)]

use studentbnb_client::{ListingDetail, ListingPage, PreferenceVocabulary, Session, UserProfile};
use studentbnb_core::{Listing, Money, VocabularyToken};

fn rent(listing: &Listing) -> String {
    listing.rent.map_or_else(
        || "rent n/a".to_owned(),
        |amount| Money::new(amount, listing.currency.unwrap_or_default()).to_string(),
    )
}

/// One line per listing.
pub fn listing_line(listing: &Listing) -> String {
    let bedrooms = listing
        .bedrooms
        .map_or_else(String::new, |b| format!(", {b} bd"));
    format!(
        "#{:<6} {} ({}{}) {}/mo",
        listing.id,
        listing.title,
        listing.city,
        bedrooms,
        rent(listing)
    )
}

pub fn listings(listings: &[Listing]) {
    if listings.is_empty() {
        println!("No listings.");
        return;
    }
    for listing in listings {
        println!("{}", listing_line(listing));
    }
}

pub fn page(page: &ListingPage) {
    listings(&page.content);
    println!(
        "Page {} of {} ({} listings)",
        page.number + 1,
        page.total_pages.max(1),
        page.total_elements
    );
}

pub fn detail(detail: &ListingDetail) {
    let listing = &detail.listing;
    println!("{}", listing_line(listing));
    println!("{}, {}", listing.address, listing.city);
    if !listing.description.is_empty() {
        println!();
        println!("{}", listing.description);
    }
    if let Some(photo) = listing.primary_photo() {
        println!();
        println!("Photo: {} ({} total)", photo.photo_url, listing.photos.len());
    }
    if !listing.amenities.is_empty() {
        let labels: Vec<_> = listing
            .amenities
            .iter()
            .map(|a| a.amenity_type.label())
            .collect();
        println!("Amenities: {}", labels.join(", "));
    }
    for preference in &detail.preferences {
        let tokens: Vec<_> = [
            preference.dietary_preference.as_ref(),
            preference.gender_preference.as_ref(),
            preference.smoking_preference.as_ref(),
        ]
        .into_iter()
        .flatten()
        .map(VocabularyToken::label)
        .collect();
        if !tokens.is_empty() {
            println!("Preferences: {}", tokens.join(", "));
        }
        if let Some(notes) = &preference.additional_notes {
            println!("Notes: {notes}");
        }
    }
}

pub fn session(session: Option<&Session>) {
    match session {
        None => println!("Not signed in."),
        Some(s) => {
            println!("{} ({}, user #{})", s.email, s.role, s.user_id);
            match s.expires_at() {
                Some(at) if s.is_expired() => println!("Session expired at {at}"),
                Some(at) => println!("Session valid until {at}"),
                None => println!("Session has no local expiry"),
            }
        }
    }
}

pub fn profile(profile: &UserProfile) {
    println!("{} <{}>", profile.display_name(), profile.email);
    println!("Role: {}", profile.role);
    let fields = [
        ("Phone", profile.phone_number.clone()),
        ("University", profile.university.clone()),
        ("Graduation", profile.graduation_year.map(|y| y.to_string())),
        ("City", profile.city.clone()),
        ("State", profile.state.clone()),
        ("Country", profile.country.clone()),
        ("Zip", profile.zipcode.clone()),
        ("Bio", profile.bio.clone()),
    ];
    for (label, value) in fields {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            println!("{label}: {value}");
        }
    }
}

fn tokens(label: &str, tokens: &[VocabularyToken]) {
    let names: Vec<_> = tokens.iter().map(VocabularyToken::as_str).collect();
    println!("{label}: {}", names.join(", "));
}

pub fn amenity_vocabulary(amenities: &[VocabularyToken]) {
    tokens("Amenities", amenities);
}

pub fn preference_vocabulary(vocabulary: &PreferenceVocabulary) {
    tokens("Dietary", &vocabulary.dietary_preferences);
    tokens("Gender", &vocabulary.gender_preferences);
    tokens("Smoking", &vocabulary.smoking_preferences);
}

pub fn message(text: &str) {
    println!("{text}");
}
