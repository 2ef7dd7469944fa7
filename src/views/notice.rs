//! Transient success/error messages shown above a view.

use std::fmt;

use strum::Display;

use crate::error::{AdminError, ApiError};

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum NoticeLevel {
    /// The action was applied.
    Success,
    /// The action failed.
    Error,
}

/// A message produced by a user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity, decided by the typed outcome.
    pub level: NoticeLevel,
    /// Operator-facing text.
    pub text: String,
}

impl Notice {
    /// Create a success notice.
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    /// Create an error notice.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }

    /// Error notice for a failed request, e.g. "Error deleting order: ...".
    pub fn from_api_error(action: &str, label: &str, err: &ApiError) -> Self {
        Self::error(format!("Error {} {}: {}", action, label, err.user_message()))
    }

    /// Error notice for any crate error.
    pub fn from_admin_error(action: &str, label: &str, err: &AdminError) -> Self {
        match err {
            AdminError::Api(api) => Self::from_api_error(action, label, api),
            AdminError::Validation(invalid) => {
                Self::error(format!("Invalid {}: {}", label, invalid))
            }
            other => Self::error(format!("Error {} {}: {}", action, label, other)),
        }
    }

    /// Whether this is an error notice.
    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            NoticeLevel::Success => write!(f, "[ok] {}", self.text),
            NoticeLevel::Error => write!(f, "[error] {}", self.text),
        }
    }
}
