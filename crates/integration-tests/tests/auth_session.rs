//! Integration tests for sign-in, token refresh and the session store.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::http::Method;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use studentbnb_client::{
    ApiError, FileSessionStore, MemorySessionStore, RegisterRequest, SessionStore,
    UpdateProfileRequest,
};
use studentbnb_core::{ListingId, UserRole};
use studentbnb_integration_tests::{Reply, StubApi, jwt_with_exp, landlord_session};

fn auth_body(access_token: Option<&str>) -> serde_json::Value {
    let mut body = json!({
        "message": "Login successful",
        "userId": 7,
        "email": "landlord@uni.edu",
        "role": "LANDLORD"
    });
    if let Some(token) = access_token {
        body["accessToken"] = json!(token);
        body["refreshToken"] = json!("refresh-token");
    }
    body
}

fn in_future(seconds: i64) -> i64 {
    chrono::Utc::now().timestamp() + seconds
}

#[tokio::test]
async fn test_login_establishes_session() {
    let stub = StubApi::start().await;
    let token = jwt_with_exp(in_future(3600));
    stub.on(Method::POST, "/api/auth/login", Reply::ok(auth_body(Some(&token))));
    let store = Arc::new(MemorySessionStore::new());
    let clients = stub.clients_with(store.clone());

    let response = clients
        .auth
        .login("landlord@uni.edu", &SecretString::from("hunter22"))
        .await
        .unwrap();

    assert_eq!(response.role, UserRole::Landlord);
    let session = store.current().unwrap();
    assert_eq!(session.email, "landlord@uni.edu");
    assert_eq!(session.access_token().expose_secret(), token);
    assert!(!session.is_expired());
    assert_eq!(store.auth_header(), Some(format!("Bearer {token}")));

    let login = &stub.requests_to(&Method::POST, "/api/auth/login")[0];
    assert_eq!(
        login.json,
        Some(json!({"email": "landlord@uni.edu", "password": "hunter22"}))
    );
    assert!(login.authorization.is_none());
}

#[tokio::test]
async fn test_bad_credentials_leave_no_session() {
    let stub = StubApi::start().await;
    stub.on(
        Method::POST,
        "/api/auth/login",
        Reply::json(401, json!({"error": "Invalid email or password"})),
    );
    let store = Arc::new(MemorySessionStore::new());
    let clients = stub.clients_with(store.clone());

    let err = clients
        .auth
        .login("landlord@uni.edu", &SecretString::from("wrong"))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized { status: 401, .. }));
    assert_eq!(err.user_message(), "Invalid email or password");
    assert!(store.current().is_none());
}

#[tokio::test]
async fn test_register_without_token_does_not_sign_in() {
    let stub = StubApi::start().await;
    stub.on(Method::POST, "/api/auth/register", Reply::json(201, auth_body(None)));
    let store = Arc::new(MemorySessionStore::new());
    let clients = stub.clients_with(store.clone());

    let response = clients
        .auth
        .register(&RegisterRequest {
            email: "landlord@uni.edu".to_owned(),
            password: SecretString::from("hunter22"),
            role: UserRole::Landlord,
        })
        .await
        .unwrap();

    assert!(!response.has_token());
    assert!(store.current().is_none());
    let body = stub.requests_to(&Method::POST, "/api/auth/register")[0]
        .json
        .clone()
        .unwrap();
    assert_eq!(body["role"], "LANDLORD");
}

#[tokio::test]
async fn test_google_login_establishes_session() {
    let stub = StubApi::start().await;
    let token = jwt_with_exp(in_future(600));
    stub.on(Method::POST, "/api/auth/google", Reply::ok(auth_body(Some(&token))));
    let store = Arc::new(MemorySessionStore::new());
    let clients = stub.clients_with(store.clone());

    clients
        .auth
        .google_login(&SecretString::from("google-id-token"))
        .await
        .unwrap();

    assert!(store.current().is_some());
    assert_eq!(
        stub.requests_to(&Method::POST, "/api/auth/google")[0].json,
        Some(json!({"credential": "google-id-token"}))
    );
}

#[tokio::test]
async fn test_refresh_replaces_access_token() {
    let stub = StubApi::start().await;
    let fresh = jwt_with_exp(in_future(3600));
    stub.on(
        Method::POST,
        "/api/auth/refresh",
        Reply::ok(json!({"accessToken": fresh, "message": "Token refreshed"})),
    );
    let store = Arc::new(MemorySessionStore::new());
    store
        .establish(landlord_session(&jwt_with_exp(in_future(-120))))
        .unwrap();
    let clients = stub.clients_with(store.clone());

    let refreshed = clients.auth.ensure_fresh().await.unwrap().unwrap();

    assert!(!refreshed.is_expired());
    assert_eq!(refreshed.access_token().expose_secret(), fresh);
    assert_eq!(refreshed.user_id, store.current().unwrap().user_id);
    assert_eq!(
        stub.requests_to(&Method::POST, "/api/auth/refresh")[0].json,
        Some(json!({"refreshToken": "refresh-token"}))
    );
}

#[tokio::test]
async fn test_refresh_without_session_makes_no_call() {
    let stub = StubApi::start().await;
    let clients = stub.clients_with(Arc::new(MemorySessionStore::new()));

    let err = clients.auth.refresh().await.unwrap_err();

    assert!(matches!(err, ApiError::SessionExpired));
    assert!(stub.requests().is_empty());
}

#[tokio::test]
async fn test_expired_session_blocks_protected_calls_only() {
    let stub = StubApi::start().await;
    stub.on(
        Method::GET,
        "/api/listings/5",
        Reply::ok(studentbnb_integration_tests::listing_json(5, "Room near campus")),
    );
    let store = Arc::new(MemorySessionStore::new());
    store
        .establish(landlord_session(&jwt_with_exp(in_future(-10))))
        .unwrap();
    let clients = stub.clients_with(store.clone());

    let err = clients.views().fetch_mine().await.unwrap_err();
    assert!(matches!(err, ApiError::SessionExpired));
    assert_eq!(err.user_message(), "Your session has expired, please log in again");
    assert_eq!(stub.count(&Method::GET, "/api/listings/my-listings"), 0);

    // Reading a single listing is public.
    let listing = clients.listings.get(ListingId::new(5)).await.unwrap();
    assert_eq!(listing.title, "Room near campus");
}

#[tokio::test]
async fn test_protected_call_without_session_is_sent_without_credentials() {
    let stub = StubApi::start().await;
    stub.on(
        Method::GET,
        "/api/listings/my-listings",
        Reply::json(401, json!({"error": "Authentication required"})),
    );
    let clients = stub.clients_with(Arc::new(MemorySessionStore::new()));

    let err = clients.views().fetch_mine().await.unwrap_err();

    assert_eq!(err.user_message(), "Authentication required");
    let request = &stub.requests_to(&Method::GET, "/api/listings/my-listings")[0];
    assert!(request.authorization.is_none());
}

#[tokio::test]
async fn test_file_session_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let stub = StubApi::start().await;
    let token = jwt_with_exp(in_future(3600));
    stub.on(Method::POST, "/api/auth/login", Reply::ok(auth_body(Some(&token))))
        .on(
            Method::GET,
            "/api/auth/profile/details",
            Reply::ok(json!({
                "id": 7,
                "email": "landlord@uni.edu",
                "role": "LANDLORD",
                "firstName": "Sam",
                "lastName": "Lee"
            })),
        );

    let first = stub.clients_with(Arc::new(FileSessionStore::new(&path)));
    first
        .auth
        .login("landlord@uni.edu", &SecretString::from("hunter22"))
        .await
        .unwrap();
    drop(first);

    let second = stub.clients_with(Arc::new(FileSessionStore::new(&path)));
    let profile = second.views().fetch_profile().await.unwrap();
    assert_eq!(profile.display_name(), "Sam Lee");
    let request = &stub.requests_to(&Method::GET, "/api/auth/profile/details")[0];
    assert_eq!(request.authorization, Some(format!("Bearer {token}")));

    second.auth.logout().unwrap();
    assert!(!path.exists());
}

#[tokio::test]
async fn test_profile_update_sends_only_given_fields() {
    let stub = StubApi::start().await;
    stub.on(
        Method::PUT,
        "/api/auth/profile",
        Reply::ok(json!({
            "id": 7,
            "email": "landlord@uni.edu",
            "role": "LANDLORD",
            "university": "University at Buffalo"
        })),
    );
    let (clients, _session) = stub.signed_in_clients();

    let profile = clients
        .views()
        .save_profile(&UpdateProfileRequest {
            university: Some("University at Buffalo".to_owned()),
            ..UpdateProfileRequest::default()
        })
        .await
        .unwrap();

    assert_eq!(profile.university.as_deref(), Some("University at Buffalo"));
    assert_eq!(
        stub.requests_to(&Method::PUT, "/api/auth/profile")[0].json,
        Some(json!({"university": "University at Buffalo"}))
    );
}
