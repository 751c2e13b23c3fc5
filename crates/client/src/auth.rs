//! Auth service client: registration, login, token refresh and profile.

use std::sync::Arc;

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use crate::error::ApiError;
use crate::http::{Access, HttpCore};
use crate::models::{
    AuthResponse, GoogleLoginRequest, LoginRequest, RefreshRequest, RefreshResponse,
    RegisterRequest, UpdateProfileRequest, UserProfile,
};
use crate::session::{Session, SessionStore};

/// Client for `/api/auth/*`.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: HttpCore,
}

impl AuthClient {
    #[must_use]
    pub const fn new(http: HttpCore) -> Self {
        Self { http }
    }

    #[must_use]
    pub fn session(&self) -> &Arc<dyn SessionStore> {
        self.http.session()
    }

    /// Store the session carried by an auth response, if it has a token.
    fn adopt(&self, response: &AuthResponse) -> Result<(), ApiError> {
        let Some(access_token) = response.access_token.as_ref() else {
            tracing::debug!(user_id = %response.user_id, "Auth response carried no token");
            return Ok(());
        };
        let session = Session::new(
            SecretString::from(access_token.clone()),
            response.refresh_token.clone().map(SecretString::from),
            response.user_id,
            response.email.clone(),
            response.role,
        );
        self.session().establish(session)?;
        tracing::info!(user_id = %response.user_id, role = %response.role, "Signed in");
        Ok(())
    }

    /// Create an account. Some deployments sign the user in right away; the
    /// session is established only in that case.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the session cannot be stored.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let url = self.http.url("/api/auth/register")?;
        let response: AuthResponse = self
            .http
            .send_json(self.http.request(Method::POST, url, Access::Public)?.json(request))
            .await?;
        self.adopt(&response)?;
        Ok(response)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for bad credentials.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthResponse, ApiError> {
        let url = self.http.url("/api/auth/login")?;
        let body = LoginRequest {
            email,
            password: password.expose_secret(),
        };
        let response: AuthResponse = self
            .http
            .send_json(self.http.request(Method::POST, url, Access::Public)?.json(&body))
            .await?;
        self.adopt(&response)?;
        Ok(response)
    }

    /// Sign in with a Google ID-token credential.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the service rejects the credential.
    #[instrument(skip(self, credential))]
    pub async fn google_login(&self, credential: &SecretString) -> Result<AuthResponse, ApiError> {
        let url = self.http.url("/api/auth/google")?;
        let body = GoogleLoginRequest {
            credential: credential.expose_secret(),
        };
        let response: AuthResponse = self
            .http
            .send_json(self.http.request(Method::POST, url, Access::Public)?.json(&body))
            .await?;
        self.adopt(&response)?;
        Ok(response)
    }

    /// Exchange the stored refresh token for a new access token and
    /// re-establish the session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::SessionExpired` when there is no session or no
    /// refresh token; the user has to log in again.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Session, ApiError> {
        let Some(session) = self.session().current() else {
            return Err(ApiError::SessionExpired);
        };
        let Some(refresh_token) = session.refresh_token() else {
            return Err(ApiError::SessionExpired);
        };
        let url = self.http.url("/api/auth/refresh")?;
        let body = RefreshRequest {
            refresh_token: refresh_token.expose_secret(),
        };
        let response: RefreshResponse = self
            .http
            .send_json(self.http.request(Method::POST, url, Access::Public)?.json(&body))
            .await?;

        let refreshed = session.with_access_token(SecretString::from(response.access_token));
        self.session().establish(refreshed.clone())?;
        tracing::info!(user_id = %refreshed.user_id, "Access token refreshed");
        Ok(refreshed)
    }

    /// Refresh only when the stored session is expired and refreshable.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::SessionExpired` if the session is expired and
    /// cannot be refreshed.
    pub async fn ensure_fresh(&self) -> Result<Option<Session>, ApiError> {
        match self.session().current() {
            Some(session) if session.is_expired() => {
                if session.can_refresh() {
                    self.refresh().await.map(Some)
                } else {
                    Err(ApiError::SessionExpired)
                }
            }
            other => Ok(other),
        }
    }

    /// Forget the local session. There is no server-side logout.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Session` if the session file cannot be removed.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.session().invalidate()?;
        tracing::info!("Signed out");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        let url = self.http.url("/api/auth/profile/details")?;
        self.http
            .send_json(self.http.request(Method::GET, url, Access::Protected)?)
            .await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, update))]
    pub async fn update_profile(
        &self,
        update: &UpdateProfileRequest,
    ) -> Result<UserProfile, ApiError> {
        let url = self.http.url("/api/auth/profile")?;
        self.http
            .send_json(
                self.http
                    .request(Method::PUT, url, Access::Protected)?
                    .json(update),
            )
            .await
    }
}
