// src/config.rs

use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

use crate::types::{ProviderCredentials, DEFAULT_MODEL_ID};

pub const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com";
pub const DEFAULT_API_VERSION: &str = "2023-05-29";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} must be set")]
    Missing(&'static str),
    #[error("environment variable {var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Settings for the watsonx.ai client.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    pub credentials: ProviderCredentials,
    pub model_id: String,
    pub iam_url: String,
    pub api_version: String,
    pub timeout: Duration,
}

/// Everything the process needs, read once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub provider: ProviderConfig,
    pub bind_addr: SocketAddr,
    pub cors_origin: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup, so tests do not
    /// have to mutate the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let credentials = ProviderCredentials {
            url: required("WATSONX_URL")?.trim_end_matches('/').to_string(),
            api_key: required("WATSONX_API_KEY")?,
            project_id: required("WATSONX_PROJECT_ID")?,
        };

        let timeout_secs = match get("WATSONX_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                var: "WATSONX_TIMEOUT_SECS",
                reason: e.to_string(),
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let bind_raw = get("ANALYZER_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.trim().parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            var: "ANALYZER_BIND_ADDR",
            reason: e.to_string(),
        })?;

        let provider = ProviderConfig {
            credentials,
            model_id: get("WATSONX_MODEL_ID").unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
            iam_url: get("WATSONX_IAM_URL")
                .unwrap_or_else(|| DEFAULT_IAM_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_version: get("WATSONX_API_VERSION").unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        };

        Ok(Self {
            provider,
            bind_addr,
            cors_origin: get("ANALYZER_CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
        })
    }
}
