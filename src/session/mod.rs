//! Session ownership of the bearer credential.
//!
//! The credential has two states, absent and present. It becomes present only
//! through [`Session::set_token`] (called by a successful login) and absent
//! through [`Session::clear`] (logout, or a 401 under the clearing policy).
//! The request pipeline reads it through [`Session::token`] on every call.

pub mod store;

use std::sync::Arc;

use strum::Display;
use tracing::{info, warn};

use crate::error::SessionError;

pub use store::{CredentialStore, FileStore, MemoryStore};

/// Whether a credential is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum CredentialState {
    /// No token; requests go out unauthenticated.
    Absent,
    /// A token is stored and will be attached.
    Present,
}

/// Shared handle to the credential store.
#[derive(Debug, Clone)]
pub struct Session {
    store: Arc<dyn CredentialStore>,
}

impl Session {
    /// Create a session over any store.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Create a session that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Create a session persisted to a JSON file.
    pub fn file_backed(path: impl Into<std::path::PathBuf>) -> Self {
        Self::new(Arc::new(FileStore::new(path)))
    }

    /// Read the current token.
    ///
    /// A store that cannot be read is treated as holding no credential.
    pub fn token(&self) -> Option<String> {
        match self.store.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Credential store unreadable, sending unauthenticated");
                None
            }
        }
    }

    /// Store a new token.
    pub fn set_token(&self, token: &str) -> Result<(), SessionError> {
        if token.trim().is_empty() {
            return Err(SessionError::EmptyToken);
        }
        self.store.save(token)?;
        info!("Session credential stored");
        Ok(())
    }

    /// Forget the stored token.
    pub fn clear(&self) -> Result<(), SessionError> {
        self.store.remove()?;
        info!("Session credential cleared");
        Ok(())
    }

    /// Forget the stored token only if it is still `expected`.
    ///
    /// Returns whether anything was cleared.
    pub fn clear_if(&self, expected: &str) -> Result<bool, SessionError> {
        match self.token() {
            Some(current) if current == expected => {
                self.clear()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Get the credential state.
    pub fn state(&self) -> CredentialState {
        if self.token().is_some() {
            CredentialState::Present
        } else {
            CredentialState::Absent
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_follows_set_and_clear() {
        let session = Session::in_memory();
        assert_eq!(session.state(), CredentialState::Absent);

        session.set_token("tok").unwrap();
        assert_eq!(session.state(), CredentialState::Present);
        assert_eq!(session.token().as_deref(), Some("tok"));

        session.clear().unwrap();
        assert_eq!(session.state(), CredentialState::Absent);
    }

    #[test]
    fn empty_token_is_rejected() {
        let session = Session::in_memory();
        assert!(matches!(session.set_token("  "), Err(SessionError::EmptyToken)));
        assert_eq!(session.state(), CredentialState::Absent);
    }

    #[test]
    fn clones_share_the_store() {
        let session = Session::in_memory();
        let other = session.clone();
        session.set_token("shared").unwrap();
        assert_eq!(other.token().as_deref(), Some("shared"));
    }

    #[test]
    fn unreadable_store_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{").unwrap();

        let session = Session::file_backed(&path);
        assert_eq!(session.token(), None);
        assert_eq!(session.state(), CredentialState::Absent);
    }

    #[test]
    fn clear_if_only_matches_current_token() {
        let session = Session::in_memory();
        session.set_token("second").unwrap();

        assert!(!session.clear_if("first").unwrap());
        assert_eq!(session.token().as_deref(), Some("second"));

        assert!(session.clear_if("second").unwrap());
        assert_eq!(session.state(), CredentialState::Absent);
    }
}
