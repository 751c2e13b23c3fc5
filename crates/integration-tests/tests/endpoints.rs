//! Integration tests for the photo, amenity and preference endpoints that
//! sit outside the submission sequence.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::Method;
use serde_json::json;
use studentbnb_core::{ListingId, PhotoId, VocabularyToken};
use studentbnb_integration_tests::{Reply, StubApi, photo};

#[tokio::test]
async fn test_single_photo_upload_sends_file_and_fields() {
    let stub = StubApi::start().await;
    stub.on(
        Method::POST,
        "/api/listings/9/photos/upload",
        Reply::ok(json!({"message": "Photo uploaded"})),
    );
    let (clients, _session) = stub.signed_in_clients();

    clients
        .listings
        .upload_photo(ListingId::new(9), &photo("porch.jpg", 512), "Front porch", true)
        .await
        .unwrap();

    let uploads = stub.requests_to(&Method::POST, "/api/listings/9/photos/upload");
    assert_eq!(uploads.len(), 1);
    assert!(uploads[0].is_multipart());
    assert_eq!(uploads[0].part_names, vec!["file", "description", "isPrimary"]);
    assert!(
        uploads[0]
            .authorization
            .as_deref()
            .is_some_and(|h| h.starts_with("Bearer "))
    );
}

#[tokio::test]
async fn test_photos_are_listed_in_server_order() {
    let stub = StubApi::start().await;
    stub.on(
        Method::GET,
        "/api/listings/9/photos",
        Reply::ok(json!([
            {"id": 4, "photoUrl": "/uploads/a.jpg", "isPrimary": true, "displayOrder": 0},
            {"id": 5, "photoUrl": "/uploads/b.jpg", "description": "Kitchen", "displayOrder": 1}
        ])),
    );
    let (clients, _session) = stub.signed_in_clients();

    let photos = clients.listings.photos(ListingId::new(9)).await.unwrap();

    assert_eq!(photos.len(), 2);
    assert!(photos[0].is_primary);
    assert_eq!(photos[1].id, PhotoId::new(5));
    assert_eq!(photos[1].description.as_deref(), Some("Kitchen"));
}

#[tokio::test]
async fn test_delete_photo_targets_the_photo_path() {
    let stub = StubApi::start().await;
    stub.on(
        Method::DELETE,
        "/api/listings/photos/5",
        Reply::ok(json!({"message": "Photo deleted"})),
    );
    let (clients, _session) = stub.signed_in_clients();

    clients.listings.delete_photo(PhotoId::new(5)).await.unwrap();

    let deletes = stub.requests_to(&Method::DELETE, "/api/listings/photos/5");
    assert_eq!(deletes.len(), 1);
    assert!(deletes[0].authorization.is_some());
}

#[tokio::test]
async fn test_amenities_are_read_back() {
    let stub = StubApi::start().await;
    stub.on(
        Method::GET,
        "/api/listings/9/amenities",
        Reply::ok(json!([
            {"id": 1, "amenityType": "WIFI"},
            {"id": 2, "amenityType": "PARKING"}
        ])),
    );
    let (clients, _session) = stub.signed_in_clients();

    let amenities = clients.listings.amenities(ListingId::new(9)).await.unwrap();

    let tokens: Vec<_> = amenities.iter().map(|a| a.amenity_type.as_str()).collect();
    assert_eq!(tokens, vec!["WIFI", "PARKING"]);
}

#[tokio::test]
async fn test_delete_amenity_encodes_the_token_as_one_segment() {
    let stub = StubApi::start().await;
    let path = "/api/listings/9/amenities/IN%20UNIT%2FLAUNDRY";
    stub.on(
        Method::DELETE,
        path,
        Reply::ok(json!({"message": "Amenity removed"})),
    );
    let (clients, _session) = stub.signed_in_clients();

    clients
        .listings
        .delete_amenity(
            ListingId::new(9),
            &VocabularyToken::new("IN UNIT/LAUNDRY").unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(stub.count(&Method::DELETE, path), 1);
}

#[tokio::test]
async fn test_delete_preferences() {
    let stub = StubApi::start().await;
    stub.on(
        Method::DELETE,
        "/api/listings/9/preferences",
        Reply::ok(json!({"message": "Preferences deleted"})),
    );
    let (clients, _session) = stub.signed_in_clients();

    clients
        .listings
        .delete_preferences(ListingId::new(9))
        .await
        .unwrap();

    let deletes = stub.requests_to(&Method::DELETE, "/api/listings/9/preferences");
    assert_eq!(deletes.len(), 1);
    assert!(deletes[0].authorization.is_some());
}

#[tokio::test]
async fn test_delete_preferences_surfaces_server_message() {
    let stub = StubApi::start().await;
    stub.on(
        Method::DELETE,
        "/api/listings/9/preferences",
        Reply::json(403, json!({"error": "You can only edit your own listings"})),
    );
    let (clients, _session) = stub.signed_in_clients();

    let err = clients
        .listings
        .delete_preferences(ListingId::new(9))
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "You can only edit your own listings");
}
