//! Service base URLs.

use strum::{Display, IntoStaticStr};
use url::Url;

use crate::error::{AdminError, ApiError, ApiResult};

/// Backend services the dashboard talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Service {
    /// Authentication service.
    Auth,
    /// Inventory (components) service.
    Inventory,
    /// Quotation service.
    Quotation,
    /// Order service.
    Order,
}

impl Service {
    /// Static label for logs and metrics.
    pub fn label(self) -> &'static str {
        self.into()
    }
}

/// A normalized base URL for one service.
///
/// The base always ends in `/` so that relative segments land beneath it:
/// `https://host:7250/api` and `https://host:7250/api/` are equivalent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    service: Service,
    base: Url,
}

impl ServiceEndpoint {
    /// Parse and normalize a base URL.
    pub fn parse(service: Service, raw: &str) -> Result<Self, AdminError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AdminError::InvalidConfig(format!(
                "{} service URL is empty",
                service
            )));
        }

        let mut base = Url::parse(trimmed).map_err(|e| {
            AdminError::InvalidConfig(format!("{} service URL {:?}: {}", service, trimmed, e))
        })?;

        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(AdminError::InvalidConfig(format!(
                "{} service URL {:?} must be an http(s) base URL",
                service, trimmed
            )));
        }

        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.set_query(None);
        base.set_fragment(None);

        Ok(Self { service, base })
    }

    /// Get the service this endpoint belongs to.
    pub fn service(&self) -> Service {
        self.service
    }

    /// Get the normalized base URL.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Build a URL by appending path segments to the base.
    ///
    /// Segments are percent-encoded, so an identifier containing `/` stays a
    /// single segment.
    pub fn url(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::MalformedRequest {
                    reason: format!("{} cannot take path segments", self.base),
                })?;
            path.pop_if_empty();
            for segment in segments {
                if segment.is_empty() {
                    return Err(ApiError::MalformedRequest {
                        reason: "empty path segment".to_string(),
                    });
                }
                path.push(segment);
            }
        }
        Ok(url)
    }
}
