//! Shared HTTP plumbing for the auth and listing clients.
//!
//! Every request goes through [`HttpCore::request`], which resolves the
//! path against the service base URL and, for protected endpoints, asks the
//! session store for the bearer header. Responses go through
//! [`HttpCore::send`], which turns non-2xx statuses into [`ApiError`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::ApiError;
use crate::session::SessionStore;

const USER_AGENT: &str = concat!("studentbnb-client/", env!("CARGO_PKG_VERSION"));

/// Whether an endpoint needs the session's bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected,
}

/// One service base URL plus the shared HTTP client and session store.
#[derive(Clone)]
pub struct HttpCore {
    client: reqwest::Client,
    base: Url,
    session: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for HttpCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCore")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

/// Build the `reqwest` client shared by both services.
///
/// # Errors
///
/// Returns `ApiError::Transport` if the TLS backend cannot be initialised.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, ApiError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| ApiError::Transport(format!("Failed to create HTTP client: {e}")))
}

impl HttpCore {
    #[must_use]
    pub fn new(client: reqwest::Client, base: Url, session: Arc<dyn SessionStore>) -> Self {
        Self {
            client,
            base,
            session,
        }
    }

    #[must_use]
    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Resolve `path` (which starts with `/api/`) against the base URL,
    /// keeping any path prefix the base carries.
    pub(crate) fn url(&self, path: &str) -> Result<Url, ApiError> {
        let mut base = self.base.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        Ok(base.join(path.trim_start_matches('/'))?)
    }

    /// Start a request, attaching the bearer header for protected calls.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::SessionExpired` without touching the network when
    /// a protected call is made with an expired session.
    pub(crate) fn request(
        &self,
        method: Method,
        url: Url,
        access: Access,
    ) -> Result<RequestBuilder, ApiError> {
        let builder = self.client.request(method, url);
        match access {
            Access::Public => Ok(builder),
            Access::Protected => match self.session.bearer_for_protected_call()? {
                Some(bearer) => Ok(builder.header(reqwest::header::AUTHORIZATION, bearer)),
                None => {
                    tracing::debug!("No session; sending protected request without credentials");
                    Ok(builder)
                }
            },
        }
    }

    /// Send and check the status, returning the raw response on success.
    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_response(status, &body);
        tracing::debug!(status = status.as_u16(), "Request rejected: {err}");
        Err(err)
    }

    /// Send and decode a JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.send(builder).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Send, ignoring whatever body a success carries.
    pub(crate) async fn send_unit(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        self.send(builder).await.map(drop)
    }
}
