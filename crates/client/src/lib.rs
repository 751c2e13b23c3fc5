//! StudentBnB Client - HTTP access to the auth and listing services.
//!
//! # Architecture
//!
//! - [`session`] - Explicit session store (file or memory) shared by every client
//! - [`AuthClient`] / [`ListingsClient`] - One method per service endpoint,
//!   normalized [`ApiError`]s, bearer attachment through one request hook
//! - [`Orchestrator`] - The multi-call "save a listing" workflow
//! - [`Views`] - Read-side operations (detail, my listings, vocabularies, profile)
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use studentbnb_client::{ClientConfig, Clients, FileSessionStore};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! let session = Arc::new(FileSessionStore::new(&config.session_file));
//! let clients = Clients::new(&config, session)?;
//! let mine = clients.views().fetch_mine().await?;
//! println!("{} listings", mine.len());
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod listings;
pub mod models;
pub mod orchestrator;
pub mod session;
pub mod views;

use std::sync::Arc;
use std::time::Duration;

pub use auth::AuthClient;
pub use config::{ClientConfig, ConfigError};
pub use error::ApiError;
pub use http::HttpCore;
pub use listings::{DEFAULT_PAGE_SIZE, ListingsClient};
pub use models::*;
pub use orchestrator::{
    Orchestrator, SubmissionReport, SubmissionState, SubmitError, SubmitOutcome, SubmitStep,
};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionError, SessionStore};
pub use views::{Views, Vocabulary};

/// Both service clients, wired to one HTTP client and one session store.
#[derive(Debug, Clone)]
pub struct Clients {
    pub auth: AuthClient,
    pub listings: ListingsClient,
    success_delay: Duration,
}

impl Clients {
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, session: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        let client = http::build_client(config.timeout)?;
        let auth = AuthClient::new(HttpCore::new(
            client.clone(),
            config.auth_url.clone(),
            Arc::clone(&session),
        ));
        let listings = ListingsClient::new(
            HttpCore::new(client, config.listings_url.clone(), session),
            config.preference_types_listing_id,
        );
        Ok(Self {
            auth,
            listings,
            success_delay: config.success_delay,
        })
    }

    #[must_use]
    pub fn views(&self) -> Views {
        Views::new(self.auth.clone(), self.listings.clone())
    }

    #[must_use]
    pub fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(self.listings.clone(), self.success_delay)
    }
}
