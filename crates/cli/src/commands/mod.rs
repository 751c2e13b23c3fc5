//! Subcommand implementations.

pub mod auth;
pub mod listing;
pub mod profile;

use std::sync::Arc;

use studentbnb_client::{ClientConfig, Clients, FileSessionStore};

/// What every command needs: configuration and clients bound to the
/// session file.
pub struct Context {
    pub config: ClientConfig,
    pub clients: Clients,
}

impl Context {
    /// # Errors
    ///
    /// Returns an error if the environment is misconfigured.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = ClientConfig::from_env()?;
        let session = Arc::new(FileSessionStore::new(&config.session_file));
        let clients = Clients::new(&config, session)?;
        Ok(Self { config, clients })
    }
}

/// Read a secret from stdin when it was not given on the command line.
pub(crate) fn secret_or_stdin(
    given: Option<String>,
    prompt: &str,
) -> Result<secrecy::SecretString, Box<dyn std::error::Error>> {
    if let Some(value) = given {
        return Ok(secrecy::SecretString::from(value));
    }
    tracing::info!("{prompt}");
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let value = line.trim_end_matches(['\r', '\n']).to_owned();
    if value.is_empty() {
        return Err("no input given".into());
    }
    Ok(secrecy::SecretString::from(value))
}
