//! Credential storage backends.

use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;

use crate::error::SessionError;

/// Persistent home for the bearer token.
///
/// Implementations hold at most one token. `load` returning `Ok(None)` means
/// no credential is stored.
pub trait CredentialStore: Send + Sync + std::fmt::Debug {
    /// Read the stored token.
    fn load(&self) -> Result<Option<String>, SessionError>;
    /// Replace the stored token.
    fn save(&self, token: &str) -> Result<(), SessionError>;
    /// Forget the stored token. Removing an absent token is not an error.
    fn remove(&self) -> Result<(), SessionError>;
}

/// Process-local store, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    token: Mutex<Option<String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding a token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        let guard = self.token.lock().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone())
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        let mut guard = self.token.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(token.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<(), SessionError> {
        let mut guard = self.token.lock().unwrap_or_else(|e| e.into_inner());
        *guard = None;
        Ok(())
    }
}

/// On-disk credential document.
#[derive(Debug, Serialize, Deserialize)]
struct StoredCredential {
    token: String,
    #[serde(with = "time::serde::rfc3339")]
    saved_at: OffsetDateTime,
}

/// JSON file store that survives process restarts.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store backed by `path`. The file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("session"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

fn write_private(path: &Path, body: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(body)?;
    file.sync_all()
}

impl CredentialStore for FileStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let stored: StoredCredential =
            serde_json::from_str(&raw).map_err(|source| SessionError::Corrupt {
                path: self.path.display().to_string(),
                source,
            })?;

        if stored.token.is_empty() {
            return Ok(None);
        }
        Ok(Some(stored.token))
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let stored = StoredCredential {
            token: token.to_string(),
            saved_at: OffsetDateTime::now_utc(),
        };
        let body = serde_json::to_string_pretty(&stored).map_err(|source| {
            SessionError::Corrupt {
                path: self.path.display().to_string(),
                source,
            }
        })?;

        // Written owner-only from creation, then renamed over the old file.
        let temp = self.temp_path();
        match fs::remove_file(&temp) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                return Err(self.io_error(e));
            }
            _ => {}
        }
        let written =
            write_private(&temp, body.as_bytes()).and_then(|()| fs::rename(&temp, &self.path));
        if let Err(e) = written {
            let _ = fs::remove_file(&temp);
            return Err(self.io_error(e));
        }

        debug!(path = %self.path.display(), "Credential written");
        Ok(())
    }

    fn remove(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Credential removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}
