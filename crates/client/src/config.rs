//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `STUDENTBNB_API_URL` - Auth service base URL (default: `http://localhost:8080`)
//! - `STUDENTBNB_LISTINGS_URL` - Listing service base URL (default: `http://localhost:8082`)
//! - `STUDENTBNB_SESSION_FILE` - Session file (default: `<config dir>/studentbnb/session.json`)
//! - `STUDENTBNB_HTTP_TIMEOUT_SECS` - Per-request timeout in seconds (default: 30)
//! - `STUDENTBNB_SUCCESS_DELAY_MS` - Pause after a successful save (default: 2000)
//! - `STUDENTBNB_PREFERENCE_TYPES_LISTING_ID` - Listing id anchoring the
//!   preference vocabulary path (default: 1)

use std::path::PathBuf;
use std::time::Duration;

use studentbnb_core::ListingId;
use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_LISTINGS_URL: &str = "http://localhost:8082";
const DEFAULT_TIMEOUT_SECS: &str = "30";
const DEFAULT_SUCCESS_DELAY_MS: &str = "2000";
const DEFAULT_PREFERENCE_TYPES_LISTING_ID: &str = "1";
const SESSION_FILE_NAME: &str = "session.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the auth service
    pub auth_url: Url,
    /// Base URL of the listing service
    pub listings_url: Url,
    /// Where the durable session lives
    pub session_file: PathBuf,
    /// Per-request timeout
    pub timeout: Duration,
    /// How long a success message stays up before navigating away
    pub success_delay: Duration,
    /// Path anchor for `GET /api/listings/{id}/preferences/types`
    pub preference_types_listing_id: ListingId,
}

impl ClientConfig {
    /// Configuration for the given service URLs with every other setting
    /// at its default.
    #[must_use]
    pub fn new(auth_url: Url, listings_url: Url) -> Self {
        Self {
            auth_url,
            listings_url,
            session_file: default_session_file(),
            timeout: Duration::from_secs(30),
            success_delay: Duration::from_millis(2000),
            preference_types_listing_id: ListingId::new(1),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let auth_url = parse_url("STUDENTBNB_API_URL", DEFAULT_API_URL)?;
        let listings_url = parse_url("STUDENTBNB_LISTINGS_URL", DEFAULT_LISTINGS_URL)?;
        let session_file = get_optional_env("STUDENTBNB_SESSION_FILE")
            .map_or_else(default_session_file, PathBuf::from);
        let timeout_secs = get_env_or_default("STUDENTBNB_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)
            .parse::<u64>()
            .map_err(|e| invalid("STUDENTBNB_HTTP_TIMEOUT_SECS", e))?;
        if timeout_secs == 0 {
            return Err(invalid(
                "STUDENTBNB_HTTP_TIMEOUT_SECS",
                "must be greater than zero",
            ));
        }
        let success_delay_ms =
            get_env_or_default("STUDENTBNB_SUCCESS_DELAY_MS", DEFAULT_SUCCESS_DELAY_MS)
                .parse::<u64>()
                .map_err(|e| invalid("STUDENTBNB_SUCCESS_DELAY_MS", e))?;
        let preference_types_listing_id = get_env_or_default(
            "STUDENTBNB_PREFERENCE_TYPES_LISTING_ID",
            DEFAULT_PREFERENCE_TYPES_LISTING_ID,
        )
        .parse::<ListingId>()
        .map_err(|e| invalid("STUDENTBNB_PREFERENCE_TYPES_LISTING_ID", e))?;

        Ok(Self {
            auth_url,
            listings_url,
            session_file,
            timeout: Duration::from_secs(timeout_secs),
            success_delay: Duration::from_millis(success_delay_ms),
            preference_types_listing_id,
        })
    }

    #[must_use]
    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = path.into();
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_success_delay(mut self, delay: Duration) -> Self {
        self.success_delay = delay;
        self
    }

    #[must_use]
    pub const fn with_preference_types_listing_id(mut self, id: ListingId) -> Self {
        self.preference_types_listing_id = id;
        self
    }
}

/// `<config dir>/studentbnb/session.json`, falling back to the working
/// directory on platforms without a config dir.
fn default_session_file() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("studentbnb"))
        .unwrap_or_default()
        .join(SESSION_FILE_NAME)
}

fn parse_url(key: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = get_env_or_default(key, default);
    let url = Url::parse(raw.trim()).map_err(|e| invalid(key, e))?;
    if url.cannot_be_a_base() {
        return Err(invalid(key, "must be an absolute http(s) URL"));
    }
    Ok(url)
}

fn invalid(key: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidEnvVar(key.to_string(), reason.to_string())
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}
