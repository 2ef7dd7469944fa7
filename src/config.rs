//! Application configuration loaded from environment variables.

use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;
use strum::{Display, EnumString};

/// What the pipeline does with the stored credential after a 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display, EnumString, Default)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UnauthorizedPolicy {
    /// Drop the credential so the next request goes out unauthenticated.
    #[default]
    ClearCredential,
    /// Leave the credential in place.
    Keep,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Service Endpoints ===
    /// Authentication service base URL.
    #[serde(default = "default_auth_url")]
    pub auth_service_url: String,

    /// Inventory service base URL.
    #[serde(default = "default_inventory_url")]
    pub inventory_service_url: String,

    /// Quotation service base URL.
    #[serde(default = "default_quotation_url")]
    pub quotation_service_url: String,

    /// Order service base URL.
    #[serde(default = "default_order_url")]
    pub order_service_url: String,

    // === Session ===
    /// File holding the persisted credential.
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,

    /// Session invalidation policy on 401.
    #[serde(default)]
    pub unauthorized_policy: UnauthorizedPolicy,

    // === HTTP ===
    /// Whole-request timeout in milliseconds.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_ms: u64,

    /// Connection establishment timeout in milliseconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,

    /// Accept self-signed certificates (local development backends).
    #[serde(default)]
    pub accept_invalid_certs: bool,

    // === Logging ===
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_auth_url() -> String {
    "https://localhost:7001/api/".to_string()
}

fn default_inventory_url() -> String {
    "https://localhost:7250/api/".to_string()
}

fn default_quotation_url() -> String {
    "https://localhost:7127/api/".to_string()
}

fn default_order_url() -> String {
    "https://localhost:7230/api/".to_string()
}

fn default_session_file() -> PathBuf {
    PathBuf::from(".techfix/session.json")
}

fn default_http_timeout() -> u64 {
    10_000
}

fn default_connect_timeout() -> u64 {
    2_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth_service_url: default_auth_url(),
            inventory_service_url: default_inventory_url(),
            quotation_service_url: default_quotation_url(),
            order_service_url: default_order_url(),
            session_file: default_session_file(),
            unauthorized_policy: UnauthorizedPolicy::default(),
            http_timeout_ms: default_http_timeout(),
            connect_timeout_ms: default_connect_timeout(),
            accept_invalid_certs: false,
            rust_log: default_log_level(),
            verbose: false,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        for (name, url) in self.service_urls() {
            if url.trim().is_empty() {
                return Err(format!("{} is required", name));
            }
            let parsed = url::Url::parse(url.trim())
                .map_err(|e| format!("{} is not a valid URL: {}", name, e))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(format!("{} must use http or https", name));
            }
        }

        if self.http_timeout_ms == 0 {
            return Err("HTTP_TIMEOUT_MS must be greater than 0".to_string());
        }

        if self.connect_timeout_ms > self.http_timeout_ms {
            return Err("CONNECT_TIMEOUT_MS must not exceed HTTP_TIMEOUT_MS".to_string());
        }

        Ok(())
    }

    /// Environment variable names paired with their configured URLs.
    pub fn service_urls(&self) -> [(&'static str, &str); 4] {
        [
            ("AUTH_SERVICE_URL", &self.auth_service_url),
            ("INVENTORY_SERVICE_URL", &self.inventory_service_url),
            ("QUOTATION_SERVICE_URL", &self.quotation_service_url),
            ("ORDER_SERVICE_URL", &self.order_service_url),
        ]
    }

    /// Override the 401 policy from a CLI string.
    pub fn set_unauthorized_policy(&mut self, raw: &str) -> Result<(), String> {
        self.unauthorized_policy = UnauthorizedPolicy::from_str(raw)
            .map_err(|_| format!("unknown unauthorized policy {:?}", raw))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values_are_sensible() {
        let config = Config::default();
        assert_eq!(config.unauthorized_policy, UnauthorizedPolicy::ClearCredential);
        assert_eq!(config.http_timeout_ms, 10_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_service_url() {
        let config = Config {
            order_service_url: "  ".to_string(),
            ..Config::default()
        };

        let err = config.validate().unwrap_err();
        assert!(err.contains("ORDER_SERVICE_URL"));
    }

    #[test]
    fn validate_rejects_non_http_scheme() {
        let config = Config {
            inventory_service_url: "ftp://localhost/api/".to_string(),
            ..Config::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_connect_timeout_above_total() {
        let config = Config {
            http_timeout_ms: 1_000,
            connect_timeout_ms: 5_000,
            ..Config::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn unauthorized_policy_parses_from_cli_string() {
        let mut config = Config::default();
        config.set_unauthorized_policy("keep").unwrap();
        assert_eq!(config.unauthorized_policy, UnauthorizedPolicy::Keep);
        assert!(config.set_unauthorized_policy("logout").is_err());
    }
}
