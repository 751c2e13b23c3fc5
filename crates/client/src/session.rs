//! Session store.
//!
//! Holds the authenticated user's tokens and identity. The store is an
//! explicit object shared (`Arc<dyn SessionStore>`) by the auth client, the
//! listing client and the submission orchestrator; nothing reads a session
//! from ambient global state.
//!
//! # Expiry
//!
//! When the access token is a JWT with an `exp` claim, the session records
//! it and is considered expired 60 seconds early. Protected calls made with
//! an expired session fail locally with [`SessionError::Expired`]; the
//! re-authentication path is [`crate::AuthClient::refresh`], or a new login.
//! Tokens without a readable `exp` never expire locally and the server
//! stays the authority.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeDelta, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use studentbnb_core::{UserId, UserRole};
use thiserror::Error;

/// Seconds before `exp` at which a session is treated as expired.
const EXPIRY_BUFFER_SECS: i64 = 60;

/// Errors raised by a session store.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading or writing the session file failed.
    #[error("Session file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The session file exists but is not a valid session.
    #[error("Session file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// The stored access token has expired.
    #[error("Session expired")]
    Expired,
}

/// An authenticated session.
#[derive(Clone)]
pub struct Session {
    access_token: SecretString,
    refresh_token: Option<SecretString>,
    pub user_id: UserId,
    pub email: String,
    pub role: UserRole,
    expires_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Session {
    /// Build a session, reading the expiry from the token's `exp` claim.
    #[must_use]
    pub fn new(
        access_token: SecretString,
        refresh_token: Option<SecretString>,
        user_id: UserId,
        email: impl Into<String>,
        role: UserRole,
    ) -> Self {
        let expires_at = jwt_expiry(access_token.expose_secret());
        Self {
            access_token,
            refresh_token,
            user_id,
            email: email.into(),
            role,
            expires_at,
        }
    }

    /// Replace the access token after a refresh, keeping the identity.
    #[must_use]
    pub fn with_access_token(self, access_token: SecretString) -> Self {
        let expires_at = jwt_expiry(access_token.expose_secret());
        Self {
            access_token,
            expires_at,
            ..self
        }
    }

    #[must_use]
    pub const fn access_token(&self) -> &SecretString {
        &self.access_token
    }

    #[must_use]
    pub const fn refresh_token(&self) -> Option<&SecretString> {
        self.refresh_token.as_ref()
    }

    #[must_use]
    pub const fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Check if the access token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_within(EXPIRY_BUFFER_SECS)
    }

    /// Check if the access token will expire within the given number of seconds.
    #[must_use]
    pub fn expires_within(&self, seconds: i64) -> bool {
        self.expires_at
            .is_some_and(|at| Utc::now() >= at - TimeDelta::seconds(seconds))
    }

    #[must_use]
    pub const fn can_refresh(&self) -> bool {
        self.refresh_token.is_some()
    }

    /// `Authorization` header value for this session.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token.expose_secret())
    }
}

#[derive(Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// Expiry from the `exp` claim of a JWT, if the token is one.
fn jwt_expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(claims.exp?, 0)
}

/// On-disk representation of a session.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSession {
    access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    user_id: UserId,
    #[serde(default)]
    email: String,
    #[serde(default)]
    role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
}

impl From<&Session> for StoredSession {
    fn from(session: &Session) -> Self {
        Self {
            access_token: session.access_token.expose_secret().to_owned(),
            refresh_token: session
                .refresh_token
                .as_ref()
                .map(|t| t.expose_secret().to_owned()),
            user_id: session.user_id,
            email: session.email.clone(),
            role: session.role,
            expires_at: session.expires_at,
        }
    }
}

impl From<StoredSession> for Session {
    fn from(stored: StoredSession) -> Self {
        let expires_at = stored
            .expires_at
            .or_else(|| jwt_expiry(&stored.access_token));
        Self {
            access_token: SecretString::from(stored.access_token),
            refresh_token: stored.refresh_token.map(SecretString::from),
            user_id: stored.user_id,
            email: stored.email,
            role: stored.role,
            expires_at,
        }
    }
}

/// Where the current session lives.
pub trait SessionStore: Send + Sync {
    /// Persist `session`, replacing any prior value.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the backend cannot store it.
    fn establish(&self, session: Session) -> Result<(), SessionError>;

    /// The stored session, or `None` when there is none or it cannot be read.
    fn current(&self) -> Option<Session>;

    /// Remove the stored session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the backend cannot remove it.
    fn invalidate(&self) -> Result<(), SessionError>;

    /// `Authorization` header value when a session exists, expired or not.
    fn auth_header(&self) -> Option<String> {
        self.current().map(|s| s.bearer())
    }

    /// Header value for a protected call.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Expired`] when the stored session is known
    /// to be expired.
    fn bearer_for_protected_call(&self) -> Result<Option<String>, SessionError> {
        match self.current() {
            Some(session) if session.is_expired() => Err(SessionError::Expired),
            Some(session) => Ok(Some(session.bearer())),
            None => Ok(None),
        }
    }
}

/// Session held in memory only.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn establish(&self, session: Session) -> Result<(), SessionError> {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
        Ok(())
    }

    fn current(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn invalidate(&self) -> Result<(), SessionError> {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Session persisted as JSON in a single file.
///
/// Writes go to a sibling temp file that is then renamed over the target,
/// so a reader never sees a half-written session.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the session file, distinguishing "absent" from "unreadable".
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Io` or `SessionError::Corrupt`.
    pub fn load(&self) -> Result<Option<Session>, SessionError> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let stored: StoredSession = serde_json::from_slice(&raw)?;
        Ok(Some(stored.into()))
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Write `bytes` to `path`, readable by the owner only on unix. The mode is
/// reapplied when `path` already exists, since `open` only sets it on create.
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    use std::io::Write;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(bytes)?;
    file.sync_all()
}

impl SessionStore for FileSessionStore {
    fn establish(&self, session: Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(&StoredSession::from(&session))?;
        let tmp = self.temp_path();
        write_private(&tmp, &json)?;
        std::fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), user_id = %session.user_id, "Session stored");
        Ok(())
    }

    fn current(&self) -> Option<Session> {
        match self.load() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Ignoring unreadable session: {e}");
                None
            }
        }
    }

    fn invalidate(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::test_support::jwt_with_exp;
    use super::*;

    fn session(token: &str) -> Session {
        Session::new(
            SecretString::from(token),
            Some(SecretString::from("refresh-1")),
            UserId::new(42),
            "sam@uni.edu",
            UserRole::Landlord,
        )
    }

    #[test]
    fn test_opaque_token_never_expires() {
        let s = session("opaque-token");
        assert!(s.expires_at().is_none());
        assert!(!s.is_expired());
    }

    #[test]
    fn test_jwt_expiry_is_read() {
        let exp = Utc::now().timestamp() + 3600;
        let s = session(&jwt_with_exp(exp));
        assert_eq!(s.expires_at().unwrap().timestamp(), exp);
        assert!(!s.is_expired());
    }

    #[test]
    fn test_expiry_buffer() {
        let s = session(&jwt_with_exp(Utc::now().timestamp() + 30));
        assert!(s.is_expired());
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let debug = format!("{:?}", session("very-secret-token"));
        assert!(!debug.contains("very-secret-token"));
        assert!(!debug.contains("refresh-1"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_memory_store_lifecycle() {
        let store = MemorySessionStore::new();
        assert!(store.current().is_none());
        assert!(store.auth_header().is_none());

        store.establish(session("abc")).unwrap();
        assert_eq!(store.auth_header().as_deref(), Some("Bearer abc"));

        store.invalidate().unwrap();
        assert!(store.current().is_none());
    }

    #[test]
    fn test_protected_call_with_expired_session() {
        let store = MemorySessionStore::new();
        store
            .establish(session(&jwt_with_exp(Utc::now().timestamp() - 10)))
            .unwrap();
        assert!(store.auth_header().is_some());
        assert!(matches!(
            store.bearer_for_protected_call(),
            Err(SessionError::Expired)
        ));
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested/session.json"));

        store.establish(session("abc")).unwrap();
        let loaded = store.current().unwrap();
        assert_eq!(loaded.user_id, UserId::new(42));
        assert_eq!(loaded.role, UserRole::Landlord);
        assert_eq!(loaded.refresh_token().unwrap().expose_secret(), "refresh-1");
        assert!(!dir.path().join("nested/session.json.tmp").exists());

        store.establish(session("def")).unwrap();
        assert_eq!(store.auth_header().as_deref(), Some("Bearer def"));

        store.invalidate().unwrap();
        assert!(store.current().is_none());
        store.invalidate().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(path.with_file_name("session.json.tmp"), "stale").unwrap();
        std::fs::set_permissions(
            path.with_file_name("session.json.tmp"),
            std::fs::Permissions::from_mode(0o644),
        )
        .unwrap();

        FileSessionStore::new(&path).establish(session("abc")).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_corrupt_file_reads_as_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileSessionStore::new(&path);
        assert!(matches!(store.load(), Err(SessionError::Corrupt(_))));
        assert!(store.current().is_none());
    }

    #[test]
    fn test_file_accepts_browser_shaped_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(
            &path,
            r#"{"message":"Login successful","userId":7,"email":"a@b.com","role":"STUDENT","accessToken":"tok","refreshToken":"ref"}"#,
        )
        .unwrap();

        let session = FileSessionStore::new(&path).current().unwrap();
        assert_eq!(session.user_id, UserId::new(7));
        assert_eq!(session.bearer(), "Bearer tok");
    }
}
