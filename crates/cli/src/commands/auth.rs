//! Account commands.
//!
//! # Usage
//!
//! ```bash
//! sbnb auth register -e sam@uni.edu -r landlord
//! sbnb auth login -e sam@uni.edu
//! sbnb auth whoami
//! sbnb auth refresh
//! sbnb auth logout
//! ```

use secrecy::SecretString;
use studentbnb_client::RegisterRequest;
use studentbnb_core::{Email, UserRole};
use thiserror::Error;

use super::{Context, secret_or_stdin};
use crate::output;

/// Errors raised before any request is made.
#[derive(Debug, Error)]
pub enum AuthCommandError {
    #[error("Invalid role: {0}. Valid roles: student, landlord")]
    InvalidRole(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] studentbnb_core::EmailError),
}

fn parse_role(role: &str) -> Result<UserRole, AuthCommandError> {
    match role.parse::<UserRole>() {
        Ok(role @ (UserRole::Student | UserRole::Landlord)) => Ok(role),
        _ => Err(AuthCommandError::InvalidRole(role.to_owned())),
    }
}

/// Create an account.
///
/// # Errors
///
/// Returns an error for a bad email or role, or if the service rejects it.
pub async fn register(
    ctx: &Context,
    email: String,
    role: &str,
    password: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let email = Email::parse(&email).map_err(AuthCommandError::from)?;
    let role = parse_role(role)?;
    let password = secret_or_stdin(password, "Password:")?;

    let response = ctx
        .clients
        .auth
        .register(&RegisterRequest {
            email: email.into_inner(),
            password,
            role,
        })
        .await?;

    if response.has_token() {
        output::message(&format!("Registered and signed in as {}", response.email));
    } else {
        output::message(&format!(
            "Registered {}; sign in with `sbnb auth login`",
            response.email
        ));
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if the credentials are rejected.
pub async fn login(
    ctx: &Context,
    email: &str,
    password: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let password = secret_or_stdin(password, "Password:")?;
    let response = ctx.clients.auth.login(email, &password).await?;
    output::message(&format!("Signed in as {} ({})", response.email, response.role));
    Ok(())
}

/// # Errors
///
/// Returns an error if the credential is rejected.
pub async fn google(ctx: &Context, credential: String) -> Result<(), Box<dyn std::error::Error>> {
    let response = ctx
        .clients
        .auth
        .google_login(&SecretString::from(credential))
        .await?;
    output::message(&format!("Signed in as {} ({})", response.email, response.role));
    Ok(())
}

/// # Errors
///
/// Returns an error if the session file cannot be removed.
pub fn logout(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    ctx.clients.auth.logout()?;
    output::message("Signed out.");
    Ok(())
}

pub fn whoami(ctx: &Context) {
    output::session(ctx.clients.auth.session().current().as_ref());
}

/// # Errors
///
/// Returns an error if there is no refreshable session.
pub async fn refresh(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let session = ctx.clients.auth.refresh().await?;
    output::session(Some(&session));
    Ok(())
}
