//! Login session persisted as `session.json` in the config directory.
//!
//! The session is an explicit value: `main` loads it once and hands clones of
//! the [`SessionStore`] to the API client, which reads it on every request and
//! clears it when the server rejects the authentication header.
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to access session file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

/// On-disk shape. Mirrors what the server hands back from `POST /api/sessions`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSession {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Current login state.
///
/// SEC-015: Custom Debug impl masks the session id.
#[derive(Default)]
pub struct Session {
    pub id: Option<SecretString>,
    pub name: Option<String>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id.as_ref().map(|_| "[REDACTED]"))
            .field("name", &self.name)
            .finish()
    }
}

/// Shared handle to the session. Cloning shares the same underlying state.
#[derive(Clone, Debug)]
pub struct SessionStore {
    path: Option<PathBuf>,
    state: Arc<Mutex<Session>>,
}

impl SessionStore {
    /// Load the session from `path`.
    ///
    /// A missing file yields a logged-out session. An unreadable or corrupt
    /// file is logged and also treated as logged out, so a damaged file never
    /// blocks startup.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let stored = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<StoredSession>(&content) {
                Ok(stored) => stored,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring corrupt session file");
                    StoredSession::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No session file, starting logged out");
                StoredSession::default()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read session file");
                StoredSession::default()
            }
        };

        Self {
            path: Some(path),
            state: Arc::new(Mutex::new(Session {
                id: stored.id.map(SecretString::from),
                name: stored.name,
            })),
        }
    }

    /// A session that is never written to disk. Used by tests.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: Arc::new(Mutex::new(Session::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The raw session token for the `X-Authentication` header.
    pub fn token(&self) -> Option<String> {
        self.lock()
            .id
            .as_ref()
            .map(|id| id.expose_secret().to_owned())
    }

    pub fn name(&self) -> Option<String> {
        self.lock().name.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().id.is_some()
    }

    /// Store a new session and persist it.
    pub fn set(&self, id: String, name: String) -> Result<(), SessionError> {
        let stored = StoredSession {
            id: Some(id.clone()),
            name: Some(name.clone()),
        };
        {
            let mut session = self.lock();
            session.id = Some(SecretString::from(id));
            session.name = Some(name);
        }
        if let Some(path) = &self.path {
            write_private(path, &serde_json::to_vec(&stored)?)?;
        }
        Ok(())
    }

    /// Forget the session, in memory and on disk.
    pub fn clear(&self) -> Result<(), SessionError> {
        *self.lock() = Session::default();
        if let Some(path) = &self.path {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(SessionError::Io(e)),
            }
        }
        tracing::info!("Session cleared");
        Ok(())
    }
}

/// Write `bytes` to `path`, user-readable only on Unix.
fn write_private(path: &Path, bytes: &[u8]) -> Result<(), std::io::Error> {
    std::fs::write(path, bytes)?;

    // SEC-007: Session id is a bearer credential
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(path)?.permissions();
        perms.set_mode(0o600);
        std::fs::set_permissions(path, perms)?;
    }

    Ok(())
}
