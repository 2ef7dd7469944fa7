//! Login, logout and registration against the authentication service.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::{AdminError, ApiError, ValidationError};
use crate::pipeline::{ApiClient, Service, ServiceEndpoint};
use crate::session::Session;

/// Minimum accepted password length at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Login request body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// Account name.
    pub username: String,
    /// Plain-text password.
    pub password: String,
}

/// Login response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    /// Bearer token.
    #[serde(default)]
    pub token: Option<String>,
}

/// Registration request body.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    /// Account name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

/// Result of a login attempt the server accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// A token was received and stored.
    Authenticated,
    /// The server answered 2xx but sent no token; the session is unchanged.
    NoToken,
}

/// Client for the authentication service.
#[derive(Debug, Clone)]
pub struct AuthClient {
    api: ApiClient,
    endpoint: ServiceEndpoint,
}

impl AuthClient {
    /// Create a client. `endpoint` must belong to the auth service.
    pub fn new(api: ApiClient, endpoint: ServiceEndpoint) -> Result<Self, AdminError> {
        if endpoint.service() != Service::Auth {
            return Err(AdminError::InvalidConfig(format!(
                "auth client given the {} endpoint",
                endpoint.service()
            )));
        }
        Ok(Self { api, endpoint })
    }

    /// Get the session tokens are stored in.
    pub fn session(&self) -> &Session {
        self.api.session()
    }

    /// Exchange credentials for a bearer token and store it.
    ///
    /// Sent without the stored credential. A rejected login leaves any
    /// existing session in place.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AdminError> {
        validate_required("username", username)?;
        validate_required("password", password)?;

        let url = self.endpoint.url(&["Auth", "login"])?;
        let body = LoginRequest {
            username: username.trim().to_string(),
            password: password.to_string(),
        };

        let response: LoginResponse = self
            .api
            .post_unauthenticated(Service::Auth, url, &body)
            .await?
            .json_opt()?
            .unwrap_or_default();

        match response.token.filter(|t| !t.trim().is_empty()) {
            Some(token) => {
                self.session().set_token(&token)?;
                info!("Login successful");
                Ok(LoginOutcome::Authenticated)
            }
            None => {
                warn!("Login accepted but no token received");
                Ok(LoginOutcome::NoToken)
            }
        }
    }

    /// Forget the stored credential. No request is sent.
    pub fn logout(&self) -> Result<(), AdminError> {
        self.session().clear()?;
        Ok(())
    }

    /// Create an account after client-side validation.
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<(), AdminError> {
        let request = validate_registration(username, email, password)?;
        let url = self.endpoint.url(&["Auth", "register"])?;
        self.api
            .post_unauthenticated(Service::Auth, url, &request)
            .await?;
        info!("Registration accepted");
        Ok(())
    }
}

fn validate_required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(())
}

/// Check registration input and build the request body.
pub fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
) -> Result<RegisterRequest, ValidationError> {
    validate_required("username", username)?;
    validate_required("email", email)?;
    validate_required("password", password)?;

    let email = email.trim();
    let well_formed = email
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && !domain.is_empty())
        .unwrap_or(false);
    if !well_formed {
        return Err(ValidationError::InvalidChoice {
            field: "email",
            value: email.to_string(),
        });
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password",
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(RegisterRequest {
        username: username.trim().to_string(),
        email: email.to_string(),
        password: password.to_string(),
    })
}

/// Login failure as shown on the login screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginFailure(pub ApiError);

impl LoginFailure {
    /// Operator-facing text.
    pub fn message(&self) -> String {
        match &self.0 {
            ApiError::Unreachable { .. } => {
                "Login failed: No response from server. Check if backend is running.".to_string()
            }
            ApiError::Unauthorized { message } | ApiError::Server { message, .. } => {
                format!("Login failed: {}", message)
            }
            other => format!("Login failed: {}", other.user_message()),
        }
    }
}

impl From<ApiError> for LoginFailure {
    fn from(err: ApiError) -> Self {
        LoginFailure(err)
    }
}
