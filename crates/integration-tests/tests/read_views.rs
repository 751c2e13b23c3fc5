//! Integration tests for the read views.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::Method;
use serde_json::json;
use studentbnb_client::ApiError;
use studentbnb_core::{ListingId, VocabularyToken};
use studentbnb_integration_tests::{Reply, StubApi, listing_json};

fn ids(listings: &[studentbnb_core::Listing]) -> Vec<i64> {
    listings.iter().map(|l| l.id.as_i64()).collect()
}

// ============================================================================
// fetch_one
// ============================================================================

#[tokio::test]
async fn test_fetch_one_without_preferences_is_not_an_error() {
    let stub = StubApi::start().await;
    stub.on(
        Method::GET,
        "/api/listings/12",
        Reply::ok(listing_json(12, "Cozy 2BR near UB")),
    )
    .on(
        Method::GET,
        "/api/listings/12/preferences",
        Reply::json(
            404,
            json!({"error": "No preferences found", "status": 404, "path": "/api/listings/12/preferences"}),
        ),
    );
    let (clients, _session) = stub.signed_in_clients();

    let detail = clients.views().fetch_one(ListingId::new(12)).await.unwrap();

    assert_eq!(detail.listing.title, "Cozy 2BR near UB");
    assert!(detail.preferences.is_empty());
}

#[tokio::test]
async fn test_fetch_one_swallows_preference_server_errors() {
    let stub = StubApi::start().await;
    stub.on(
        Method::GET,
        "/api/listings/12",
        Reply::ok(listing_json(12, "Cozy 2BR near UB")),
    )
    .on(
        Method::GET,
        "/api/listings/12/preferences",
        Reply::text(500, "boom"),
    );
    let (clients, _session) = stub.signed_in_clients();

    let detail = clients.views().fetch_one(ListingId::new(12)).await.unwrap();

    assert!(detail.preferences.is_empty());
}

#[tokio::test]
async fn test_fetch_one_returns_stored_preferences() {
    let stub = StubApi::start().await;
    stub.on(
        Method::GET,
        "/api/listings/12",
        Reply::ok(listing_json(12, "Cozy 2BR near UB")),
    )
    .on(
        Method::GET,
        "/api/listings/12/preferences",
        Reply::ok(json!([{
            "id": 1,
            "listingId": 12,
            "genderPreference": "FEMALE_ONLY",
            "additionalNotes": "Quiet household"
        }])),
    );
    let (clients, _session) = stub.signed_in_clients();

    let detail = clients.views().fetch_one(ListingId::new(12)).await.unwrap();

    assert_eq!(detail.preferences.len(), 1);
    assert_eq!(
        detail.preferences[0].gender_preference,
        Some(VocabularyToken::new("FEMALE_ONLY").unwrap())
    );
}

#[tokio::test]
async fn test_fetch_one_missing_listing_is_not_found() {
    let stub = StubApi::start().await;
    stub.on(
        Method::GET,
        "/api/listings/99",
        Reply::json(404, json!({"error": "Listing not found"})),
    );
    let (clients, _session) = stub.signed_in_clients();

    let err = clients.views().fetch_one(ListingId::new(99)).await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.user_message(), "Listing not found");
    assert_eq!(stub.count(&Method::GET, "/api/listings/99/preferences"), 0);
}

// ============================================================================
// fetch_mine
// ============================================================================

#[tokio::test]
async fn test_fetch_mine_normalizes_all_shapes() {
    let bodies = [
        json!([listing_json(3, "First listing"), listing_json(1, "Second listing")]),
        json!({"data": [listing_json(3, "First listing"), listing_json(1, "Second listing")]}),
        json!({"listings": [listing_json(3, "First listing"), listing_json(1, "Second listing")]}),
    ];

    for body in bodies {
        let stub = StubApi::start().await;
        stub.on(Method::GET, "/api/listings/my-listings", Reply::ok(body));
        let (clients, _session) = stub.signed_in_clients();

        let mine = clients.views().fetch_mine().await.unwrap();

        assert_eq!(ids(&mine), vec![3, 1]);
    }
}

#[tokio::test]
async fn test_fetch_mine_rejects_unknown_shape() {
    let stub = StubApi::start().await;
    stub.on(
        Method::GET,
        "/api/listings/my-listings",
        Reply::ok(json!({"items": []})),
    );
    let (clients, _session) = stub.signed_in_clients();

    let err = clients.views().fetch_mine().await.unwrap_err();

    assert!(matches!(err, ApiError::Decode(_)));
}

// ============================================================================
// Vocabulary, browse, delete, edit
// ============================================================================

#[tokio::test]
async fn test_vocabularies_load_independently() {
    let stub = StubApi::start().await;
    stub.on(
        Method::GET,
        "/api/listings/amenities/types",
        Reply::ok(json!(["WIFI", "PARKING", "GYM"])),
    )
    .on(
        Method::GET,
        "/api/listings/1/preferences/types",
        Reply::json(500, json!({"error": "Preference service unavailable"})),
    );
    let (clients, _session) = stub.signed_in_clients();

    let vocabulary = clients.views().fetch_vocabulary().await;

    let amenities = vocabulary.amenities.unwrap();
    assert_eq!(amenities.len(), 3);
    assert_eq!(amenities[0].as_str(), "WIFI");
    assert_eq!(
        vocabulary.preferences.unwrap_err().user_message(),
        "Preference service unavailable"
    );
}

#[tokio::test]
async fn test_browse_sends_page_and_size() {
    let stub = StubApi::start().await;
    stub.on(
        Method::GET,
        "/api/listings",
        Reply::ok(json!({
            "content": [listing_json(1, "Studio by the lake")],
            "totalElements": 21,
            "totalPages": 2,
            "number": 1,
            "size": 20,
            "last": true
        })),
    );
    let (clients, _session) = stub.signed_in_clients();

    let page = clients.views().fetch_page(1, 20).await.unwrap();

    assert_eq!(page.total_elements, 21);
    assert!(page.last);
    assert_eq!(ids(&page.content), vec![1]);
    let query = stub.requests_to(&Method::GET, "/api/listings")[0]
        .query
        .clone()
        .unwrap();
    assert!(query.contains("page=1"));
    assert!(query.contains("size=20"));
}

#[tokio::test]
async fn test_delete_removes_listing_from_shown_list() {
    let stub = StubApi::start().await;
    stub.on(
        Method::DELETE,
        "/api/listings/2",
        Reply::ok(json!({"message": "Listing deleted successfully"})),
    );
    let (clients, _session) = stub.signed_in_clients();
    let shown: Vec<studentbnb_core::Listing> = [1, 2, 3]
        .into_iter()
        .map(|id| serde_json::from_value(listing_json(id, "Shared room downtown")).unwrap())
        .collect();

    let remaining = clients
        .views()
        .delete_listing(ListingId::new(2), shown)
        .await
        .unwrap();

    assert_eq!(ids(&remaining), vec![1, 3]);
    assert_eq!(stub.count(&Method::DELETE, "/api/listings/2"), 1);
}

#[tokio::test]
async fn test_edit_draft_is_seeded_from_listing_and_preferences() {
    let stub = StubApi::start().await;
    let mut listing = listing_json(42, "Cozy 2BR near UB");
    listing["amenities"] = json!([{"id": 1, "amenityType": "WIFI"}]);
    stub.on(Method::GET, "/api/listings/42", Reply::ok(listing))
        .on(
            Method::GET,
            "/api/listings/42/preferences",
            Reply::ok(json!([{"id": 5, "dietaryPreference": "VEGAN"}])),
        );
    let (clients, _session) = stub.signed_in_clients();

    let draft = clients.views().edit_draft(ListingId::new(42)).await.unwrap();

    assert!(draft.is_edit());
    assert_eq!(draft.title, "Cozy 2BR near UB");
    assert!(draft.is_amenity_selected(&VocabularyToken::new("WIFI").unwrap()));
    assert_eq!(
        draft.preferences.dietary_preference,
        Some(VocabularyToken::new("VEGAN").unwrap())
    );
    assert!(draft.validate().is_ok());
}
