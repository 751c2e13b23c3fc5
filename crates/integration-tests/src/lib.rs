//! Integration tests for the StudentBnB client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p studentbnb-integration-tests
//! ```
//!
//! Every test starts its own [`StubApi`]: an in-process `axum` server on an
//! ephemeral port that answers with canned replies and records every request
//! it receives, so call counts and payloads can be asserted.
//!
//! # Test Categories
//!
//! - `submission` - Orchestrator sequencing, failures, resume and edit mode
//! - `read_views` - Detail, my listings, vocabularies, delete
//! - `auth_session` - Login, register, refresh, expired sessions
//! - `endpoints` - Photo, amenity and preference endpoints
//! - `errors` - Error body normalization

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use studentbnb_client::{ClientConfig, Clients, MemorySessionStore, Session, SessionStore};
use studentbnb_core::{ListingDraft, PendingPhoto, UserId, UserRole};
use url::Url;

/// Large enough for several photos at the client-side size cap.
const BODY_LIMIT: usize = 64 * 1024 * 1024;

/// A canned response for one route.
#[derive(Debug, Clone)]
pub struct Reply {
    status: StatusCode,
    body: ReplyBody,
    delay: Duration,
}

#[derive(Debug, Clone)]
enum ReplyBody {
    Empty,
    Json(Value),
    Text(String),
}

impl Reply {
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status: status_code(status),
            body: ReplyBody::Json(body),
            delay: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn ok(body: Value) -> Self {
        Self::json(200, body)
    }

    #[must_use]
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: status_code(status),
            body: ReplyBody::Text(body.into()),
            delay: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn empty(status: u16) -> Self {
        Self {
            status: status_code(status),
            body: ReplyBody::Empty,
            delay: Duration::ZERO,
        }
    }

    /// Hold the response back for `delay`.
    #[must_use]
    pub const fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// One request as the stub saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    /// The body, when it parsed as JSON.
    pub json: Option<Value>,
    /// `name` of every multipart part, in order.
    pub part_names: Vec<String>,
}

impl Recorded {
    #[must_use]
    pub fn part_count(&self) -> usize {
        self.part_names.len()
    }

    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|c| c.starts_with("multipart/form-data"))
    }
}

#[derive(Default)]
struct StubState {
    routes: Mutex<HashMap<(Method, String), Reply>>,
    requests: Mutex<Vec<Recorded>>,
}

/// In-process stand-in for the auth and listing services.
pub struct StubApi {
    addr: SocketAddr,
    state: Arc<StubState>,
}

impl StubApi {
    /// Bind to an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let state = Arc::new(StubState::default());
        let app = Router::new()
            .fallback(handle)
            .layer(DefaultBodyLimit::max(BODY_LIMIT))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub listener");
        let addr = listener.local_addr().expect("Stub listener has no address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    /// Answer `method path` with `reply` from now on.
    pub fn on(&self, method: Method, path: &str, reply: Reply) -> &Self {
        self.state
            .routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((method, path.to_owned()), reply);
        self
    }

    /// Base URL of the stub, usable for both services.
    ///
    /// # Panics
    ///
    /// Never in practice: the address always forms a valid URL.
    #[must_use]
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("Stub address is a valid URL")
    }

    /// Every request received so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<Recorded> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests received for `method path`.
    #[must_use]
    pub fn requests_to(&self, method: &Method, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == *method && r.path == path)
            .collect()
    }

    #[must_use]
    pub fn count(&self, method: &Method, path: &str) -> usize {
        self.requests_to(method, path).len()
    }

    /// Client configuration pointing both services at this stub.
    #[must_use]
    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(self.url(), self.url())
            .with_timeout(Duration::from_secs(5))
            .with_success_delay(Duration::ZERO)
    }

    /// Clients over `session`, talking to this stub.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn clients_with(&self, session: Arc<dyn SessionStore>) -> Clients {
        Clients::new(&self.config(), session).expect("Failed to build clients")
    }

    /// Clients with a signed-in landlord session held in memory.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn signed_in_clients(&self) -> (Clients, Arc<MemorySessionStore>) {
        let store = Arc::new(MemorySessionStore::new());
        store
            .establish(landlord_session(&jwt_with_exp(
                chrono::Utc::now().timestamp() + 3600,
            )))
            .expect("Memory store accepts any session");
        let session: Arc<dyn SessionStore> = store.clone();
        (self.clients_with(session), store)
    }
}

async fn handle(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = header_value(&headers, header::CONTENT_TYPE);
    let part_names = content_type
        .as_deref()
        .and_then(boundary)
        .map(|b| multipart_part_names(&body, &b))
        .unwrap_or_default();

    let recorded = Recorded {
        method: method.clone(),
        path: uri.path().to_owned(),
        query: uri.query().map(ToOwned::to_owned),
        authorization: header_value(&headers, header::AUTHORIZATION),
        content_type,
        json: serde_json::from_slice(&body).ok(),
        part_names,
    };
    state
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(recorded);

    let reply = state
        .routes
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&(method.clone(), uri.path().to_owned()))
        .cloned();

    let Some(reply) = reply else {
        return (
            StatusCode::NOT_FOUND,
            axum::Json(json!({
                "error": format!("No stub for {method} {}", uri.path()),
                "status": 404,
                "path": uri.path(),
            })),
        )
            .into_response();
    };

    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }
    match reply.body {
        ReplyBody::Empty => reply.status.into_response(),
        ReplyBody::Json(value) => (reply.status, axum::Json(value)).into_response(),
        ReplyBody::Text(text) => (reply.status, text).into_response(),
    }
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned)
}

fn boundary(content_type: &str) -> Option<String> {
    if !content_type.starts_with("multipart/") {
        return None;
    }
    content_type
        .split(';')
        .filter_map(|p| p.trim().strip_prefix("boundary="))
        .map(|b| b.trim_matches('"').to_owned())
        .next()
}

fn multipart_part_names(body: &[u8], boundary: &str) -> Vec<String> {
    let text = String::from_utf8_lossy(body);
    let delimiter = format!("--{boundary}");
    text.split(delimiter.as_str())
        .filter_map(|part| {
            let start = part.find("name=\"")? + "name=\"".len();
            let rest = part.get(start..)?;
            let end = rest.find('"')?;
            rest.get(..end).map(ToOwned::to_owned)
        })
        .collect()
}

// =============================================================================
// Fixtures
// =============================================================================

/// An unsigned JWT whose payload carries `exp`.
#[must_use]
pub fn jwt_with_exp(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({ "sub": "7", "exp": exp }).to_string());
    format!("{header}.{payload}.signature")
}

#[must_use]
pub fn landlord_session(access_token: &str) -> Session {
    Session::new(
        access_token.to_owned().into(),
        Some("refresh-token".to_owned().into()),
        UserId::new(7),
        "landlord@uni.edu".to_owned(),
        UserRole::Landlord,
    )
}

/// A listing as the listing service returns it.
#[must_use]
pub fn listing_json(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": "Bright two bedroom apartment, ten minutes from campus",
        "address": "12 Main St",
        "city": "Buffalo",
        "state": "NY",
        "zipCode": "14201",
        "rent": 1200,
        "currency": "USD",
        "bedrooms": 2,
        "bathrooms": 1,
        "propertyType": "APARTMENT",
        "leaseType": "SEMESTER",
        "status": "ACTIVE",
        "contactEmail": "a@b.com",
        "photos": [],
        "amenities": []
    })
}

/// The create-listing success envelope.
#[must_use]
pub fn created(id: i64) -> Value {
    json!({ "message": "Listing created successfully", "data": { "id": id } })
}

/// A draft that passes validation: title, description, address, city,
/// rent 1200 and a contact email.
#[must_use]
pub fn valid_draft() -> ListingDraft {
    let mut draft = ListingDraft::new();
    draft.title = "Cozy 2BR near UB".to_owned();
    draft.description = "Bright two bedroom apartment, ten minutes from campus".to_owned();
    draft.address = "12 Main St".to_owned();
    draft.city = "Buffalo".to_owned();
    draft.rent = Some(Decimal::new(1200, 0));
    draft.contact_email = "a@b.com".to_owned();
    draft
}

/// A JPEG-typed photo of `size` bytes.
#[must_use]
pub fn photo(name: &str, size: usize) -> PendingPhoto {
    PendingPhoto::new(name, "image/jpeg", vec![0xAB; size])
}
