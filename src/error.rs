//! Unified error types for the admin client.

use reqwest::StatusCode;
use strum::{Display, IntoStaticStr};
use thiserror::Error;

/// Unified error type for the admin client.
#[derive(Error, Debug)]
pub enum AdminError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration values present but unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Classified request failure.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Credential storage error.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Form input rejected before any request was sent.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Classified outcome of a failed request.
///
/// Every call through the request pipeline yields either a payload or one of
/// these variants; transport errors never escape unclassified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("server error ({status}): {message}")]
    Server {
        /// Response status.
        status: StatusCode,
        /// Human-readable message extracted from the body.
        message: String,
    },

    /// The requested record does not exist (404).
    #[error("not found: {message}")]
    NotFound {
        /// Message extracted from the body.
        message: String,
    },

    /// The credential was missing, expired or rejected (401).
    #[error("unauthorized: {message}")]
    Unauthorized {
        /// Message extracted from the body.
        message: String,
    },

    /// No response was received (connect failure, timeout, reset).
    #[error("service unreachable: {reason}")]
    Unreachable {
        /// Transport failure description.
        reason: String,
    },

    /// The request could not be built (bad URL, unserializable body).
    #[error("malformed request: {reason}")]
    MalformedRequest {
        /// Raw failure message.
        reason: String,
    },

    /// A successful response carried a body that did not decode.
    #[error("failed to decode response: {reason}")]
    Decode {
        /// Decoder failure description.
        reason: String,
    },

    /// A 2xx status the call site does not accept.
    #[error("unexpected status {status}")]
    UnexpectedStatus {
        /// Response status.
        status: StatusCode,
    },
}

/// Coarse classification of an [`ApiError`], used for metric labels and
/// view rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Non-2xx response.
    Server,
    /// 404 response.
    NotFound,
    /// 401 response.
    Unauthorized,
    /// No response.
    Unreachable,
    /// Request never left the client.
    MalformedRequest,
    /// Undecodable success body.
    Decode,
    /// Unaccepted 2xx.
    UnexpectedStatus,
}

impl ApiError {
    /// Get the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Server { .. } => ErrorKind::Server,
            ApiError::NotFound { .. } => ErrorKind::NotFound,
            ApiError::Unauthorized { .. } => ErrorKind::Unauthorized,
            ApiError::Unreachable { .. } => ErrorKind::Unreachable,
            ApiError::MalformedRequest { .. } => ErrorKind::MalformedRequest,
            ApiError::Decode { .. } => ErrorKind::Decode,
            ApiError::UnexpectedStatus { .. } => ErrorKind::UnexpectedStatus,
        }
    }

    /// Response status, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Server { status, .. } | ApiError::UnexpectedStatus { status } => {
                Some(*status)
            }
            ApiError::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            ApiError::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            _ => None,
        }
    }

    /// Text suitable for showing to the operator.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Server { status, message } => format!("{} (HTTP {})", message, status.as_u16()),
            ApiError::NotFound { .. } => "Record not found.".to_string(),
            ApiError::Unauthorized { .. } => {
                "Not authorized. Log in again and retry.".to_string()
            }
            ApiError::Unreachable { .. } => {
                "No response from server. Check that the backend service is running.".to_string()
            }
            ApiError::MalformedRequest { reason } => reason.clone(),
            ApiError::Decode { reason } => format!("Unexpected response: {}", reason),
            ApiError::UnexpectedStatus { status } => {
                format!("Request not applied. Status: {}", status.as_u16())
            }
        }
    }
}

/// Credential store errors.
#[derive(Error, Debug)]
pub enum SessionError {
    /// A login response carried an empty token.
    #[error("refusing to store an empty token")]
    EmptyToken,

    /// Reading or writing the credential file failed.
    #[error("credential file {path}: {source}")]
    Io {
        /// File path.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The credential file exists but is not valid.
    #[error("credential file {path} is corrupt: {source}")]
    Corrupt {
        /// File path.
        path: String,
        /// Parse failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Form input errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was blank.
    #[error("{field} is required")]
    Required {
        /// Field name.
        field: &'static str,
    },

    /// A numeric field did not parse.
    #[error("{field} must be a number, got {value:?}")]
    NotANumber {
        /// Field name.
        field: &'static str,
        /// Raw input.
        value: String,
    },

    /// A numeric field was negative.
    #[error("{field} must not be negative")]
    Negative {
        /// Field name.
        field: &'static str,
    },

    /// A field value outside its allowed set.
    #[error("{field} has invalid value {value:?}")]
    InvalidChoice {
        /// Field name.
        field: &'static str,
        /// Raw input.
        value: String,
    },

    /// A field value shorter than its minimum length.
    #[error("{field} must be at least {min} characters")]
    TooShort {
        /// Field name.
        field: &'static str,
        /// Minimum length.
        min: usize,
    },
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AdminError>;

/// Result of a call through the request pipeline.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_labels_are_snake_case() {
        let err = ApiError::MalformedRequest {
            reason: "bad url".to_string(),
        };
        assert_eq!(err.kind().to_string(), "malformed_request");
        let label: &'static str = ErrorKind::NotFound.into();
        assert_eq!(label, "not_found");
    }

    #[test]
    fn status_only_for_answered_requests() {
        let unreachable = ApiError::Unreachable {
            reason: "connection refused".to_string(),
        };
        assert_eq!(unreachable.status(), None);

        let not_found = ApiError::NotFound {
            message: "gone".to_string(),
        };
        assert_eq!(not_found.status(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn malformed_request_surfaces_raw_message() {
        let err = ApiError::MalformedRequest {
            reason: "relative URL without a base".to_string(),
        };
        assert_eq!(err.user_message(), "relative URL without a base");
    }
}
