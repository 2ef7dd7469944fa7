//! Authenticated HTTP client shared by every resource view.

use std::time::Duration;

use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::{Config, UnauthorizedPolicy};
use crate::error::{AdminError, ApiError, ApiResult};
use crate::metrics::{self, RequestTimer};
use crate::session::Session;

use super::classify::{classify_status, classify_transport};
use super::endpoint::Service;

/// A 2xx response with its body still undecoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// Response status.
    pub status: StatusCode,
    /// Raw response body.
    pub body: String,
}

impl ApiResponse {
    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        serde_json::from_str(&self.body).map_err(|e| ApiError::Decode {
            reason: e.to_string(),
        })
    }

    /// Decode the body as JSON, treating an empty body as `None`.
    pub fn json_opt<T: DeserializeOwned>(&self) -> ApiResult<Option<T>> {
        if self.body.trim().is_empty() {
            return Ok(None);
        }
        self.json().map(Some)
    }

    /// Fail unless the status is one of `accepted`.
    pub fn expect_status(self, accepted: &[StatusCode]) -> ApiResult<Self> {
        if accepted.contains(&self.status) {
            Ok(self)
        } else {
            Err(ApiError::UnexpectedStatus {
                status: self.status,
            })
        }
    }
}

/// The request pipeline.
///
/// Outbound, every request is decorated with the session's current bearer
/// token (read fresh on each call). Inbound, every outcome is either a 2xx
/// [`ApiResponse`] or a classified [`ApiError`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Credential holder.
    session: Session,
    /// What to do with the credential after a 401.
    unauthorized_policy: UnauthorizedPolicy,
}

impl ApiClient {
    /// Create a client from config.
    pub fn new(config: &Config, session: Session) -> Result<Self, AdminError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.http_timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| AdminError::InvalidConfig(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self::with_http(http, session, config.unauthorized_policy))
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_http(
        http: reqwest::Client,
        session: Session,
        unauthorized_policy: UnauthorizedPolicy,
    ) -> Self {
        Self {
            http,
            session,
            unauthorized_policy,
        }
    }

    /// Get the session this client reads credentials from.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Start a request: JSON `Accept` header, no credential yet.
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
    }

    /// Outbound stage: attach `Authorization: Bearer <token>` if a credential
    /// is stored, otherwise leave the request untouched.
    ///
    /// Returns the token that was attached, if any.
    pub fn authorize(&self, builder: RequestBuilder) -> (RequestBuilder, Option<String>) {
        match self.session.token() {
            Some(token) => {
                debug!("Attaching bearer credential");
                (builder.bearer_auth(&token), Some(token))
            }
            None => {
                debug!("No credential stored, sending unauthenticated");
                metrics::inc_requests_unauthenticated();
                (builder, None)
            }
        }
    }

    /// GET a URL and return the 2xx response.
    pub async fn get(&self, service: Service, url: Url) -> ApiResult<ApiResponse> {
        self.dispatch(service, self.request(Method::GET, url)).await
    }

    /// POST a JSON body.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        service: Service,
        url: Url,
        body: &B,
    ) -> ApiResult<ApiResponse> {
        self.dispatch(service, self.request(Method::POST, url).json(body))
            .await
    }

    /// POST a JSON body without the stored credential.
    ///
    /// A 401 here rejects the submitted credentials, not the session, so the
    /// invalidation hook does not run.
    pub async fn post_unauthenticated<B: Serialize + ?Sized>(
        &self,
        service: Service,
        url: Url,
        body: &B,
    ) -> ApiResult<ApiResponse> {
        self.execute(service, self.request(Method::POST, url).json(body))
            .await
    }

    /// PUT a JSON body.
    pub async fn put<B: Serialize + ?Sized>(
        &self,
        service: Service,
        url: Url,
        body: &B,
    ) -> ApiResult<ApiResponse> {
        self.dispatch(service, self.request(Method::PUT, url).json(body))
            .await
    }

    /// DELETE a URL.
    pub async fn delete(&self, service: Service, url: Url) -> ApiResult<ApiResponse> {
        self.dispatch(service, self.request(Method::DELETE, url))
            .await
    }

    /// Decorate a request with the session credential, send it and run the
    /// inbound stage, including the 401 hook.
    pub async fn dispatch(&self, service: Service, builder: RequestBuilder) -> ApiResult<ApiResponse> {
        let (builder, sent) = self.authorize(builder);
        let outcome = self.execute(service, builder).await;

        if let Err(ApiError::Unauthorized { .. }) = &outcome {
            self.on_unauthorized(sent.as_deref());
        }

        outcome
    }

    /// Send a request as built and classify the outcome.
    #[instrument(skip(self, builder), fields(service = %service))]
    async fn execute(&self, service: Service, builder: RequestBuilder) -> ApiResult<ApiResponse> {
        let timer = RequestTimer::start(service.label());
        let outcome = self.send(builder).await;

        match &outcome {
            Ok(response) => {
                debug!(status = %response.status, "Request succeeded");
                timer.finish(None);
            }
            Err(err) => {
                warn!(kind = %err.kind(), error = %err, "Request failed");
                timer.finish(Some(err.kind()));
            }
        }

        outcome
    }

    async fn send(&self, builder: RequestBuilder) -> ApiResult<ApiResponse> {
        let response = builder.send().await.map_err(|e| classify_transport(&e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| classify_transport(&e))?;

        match classify_status(status, &body) {
            Some(err) => Err(err),
            None => Ok(ApiResponse { status, body }),
        }
    }

    /// Session invalidation hook for 401 responses.
    ///
    /// `sent` is the token the rejected request carried. Only that token is
    /// cleared; one stored after the request went out is kept.
    fn on_unauthorized(&self, sent: Option<&str>) {
        let Some(sent) = sent else {
            debug!("Unauthenticated request rejected, session untouched");
            return;
        };

        match self.unauthorized_policy {
            UnauthorizedPolicy::ClearCredential => match self.session.clear_if(sent) {
                Ok(true) => {
                    warn!("Credential rejected by server, cleared; log in again");
                    metrics::inc_sessions_invalidated();
                }
                Ok(false) => debug!("Credential replaced since the request was sent, keeping"),
                Err(e) => warn!(error = %e, "Failed to clear rejected credential"),
            },
            UnauthorizedPolicy::Keep => {
                debug!("Credential rejected by server, keeping per policy");
            }
        }
    }
}
