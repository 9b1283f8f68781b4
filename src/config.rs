//! Client configuration: YAML file, environment overrides, validation.
//!
//! Environment variables take precedence over the file:
//! - `TERRITORY_API_URL`
//! - `TERRITORY_STREAM_PATH` (must contain `{session_id}`)
//! - `TERRITORY_STREAM_FORMAT` (`sse` | `ndjson`)
//! - `TERRITORY_HTTP_TIMEOUT_SECS` (REST requests only; the stream itself never times out)
//! - `TERRITORY_CONNECT_TIMEOUT_SECS`
//! - `TERRITORY_API_TOKEN`
//! - `TERRITORY_PROXY_URL`

use crate::pipeline::StreamFormat;
use crate::types::SessionId;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_STREAM_PATH: &str = "/api/agent/sessions/{session_id}/stream";
const SESSION_PLACEHOLDER: &str = "{session_id}";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub stream_path: String,
    pub stream_format: StreamFormat,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            stream_path: DEFAULT_STREAM_PATH.to_string(),
            stream_format: StreamFormat::Sse,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            api_token: None,
            proxy_url: None,
        }
    }
}

impl ClientConfig {
    /// Defaults plus environment overrides.
    pub fn from_env() -> Result<Self> {
        Self::default().with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Optional YAML file, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        base.with_overrides_from(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with_context(
                format!("cannot read config file: {}", e),
                ErrorContext::new()
                    .with_field_path(path.display().to_string())
                    .with_source("config_loader"),
            )
        })?;
        Self::from_yaml_str(&raw)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let cfg: ClientConfig = serde_yaml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply overrides from a key lookup (normally the process environment).
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("TERRITORY_API_URL") {
            self.base_url = v;
        }
        if let Some(v) = lookup("TERRITORY_STREAM_PATH") {
            self.stream_path = v;
        }
        if let Some(v) = lookup("TERRITORY_STREAM_FORMAT") {
            self.stream_format = v.parse()?;
        }
        if let Some(v) = lookup("TERRITORY_HTTP_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_secs("TERRITORY_HTTP_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("TERRITORY_CONNECT_TIMEOUT_SECS") {
            self.connect_timeout_secs = parse_secs("TERRITORY_CONNECT_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("TERRITORY_API_TOKEN").filter(|v| !v.trim().is_empty()) {
            self.api_token = Some(v);
        }
        if let Some(v) = lookup("TERRITORY_PROXY_URL").filter(|v| !v.trim().is_empty()) {
            self.proxy_url = Some(v);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        let base = Url::parse(&self.base_url).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid base URL '{}'", self.base_url),
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_details(e.to_string())
                    .with_source("config_loader"),
            )
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::configuration_with_context(
                format!("unsupported URL scheme '{}'", base.scheme()),
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_source("config_loader"),
            ));
        }
        if !self.stream_path.starts_with('/') || !self.stream_path.contains(SESSION_PLACEHOLDER) {
            return Err(Error::configuration_with_context(
                "stream path must be absolute and contain {session_id}",
                ErrorContext::new()
                    .with_field_path("stream_path")
                    .with_details(self.stream_path.clone())
                    .with_source("config_loader"),
            ));
        }
        if self.request_timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(Error::configuration_with_context(
                "timeouts must be at least one second",
                ErrorContext::new().with_source("config_loader"),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Absolute URL of the event stream for `session_id`.
    pub fn stream_url(&self, session_id: SessionId) -> Result<Url> {
        let path = self
            .stream_path
            .replace(SESSION_PLACEHOLDER, &session_id.to_string());
        self.endpoint_url(&path)
    }

    /// Absolute URL for a REST path. Keeps any path prefix carried by the base URL.
    pub fn endpoint_url(&self, path: &str) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid endpoint URL '{}'", joined),
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("config_loader"),
            )
        })
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<u64> {
    raw.trim().parse::<u64>().map_err(|e| {
        Error::configuration_with_context(
            format!("{} must be a whole number of seconds", key),
            ErrorContext::new()
                .with_field_path(key)
                .with_details(e.to_string())
                .with_source("config_loader"),
        )
    })
}
