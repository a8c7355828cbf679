//! Credentials and endpoint configuration

use crate::error::{Result, TencentError};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_REGION: &str = "ap-guangzhou";
pub const DEFAULT_DOMAIN: &str = "tencentcloudapi.com";

const ENV_SECRET_ID: &str = "TENCENTCLOUD_SECRET_ID";
const ENV_SECRET_KEY: &str = "TENCENTCLOUD_SECRET_KEY";
const ENV_SECURITY_TOKEN: &str = "TENCENTCLOUD_SECURITY_TOKEN";
const ENV_REGION: &str = "TENCENTCLOUD_REGION";
const ENV_ENDPOINT: &str = "TENCENTCLOUD_ENDPOINT";

/// API key pair, optionally with an STS session token
#[derive(Clone)]
pub struct Credential {
    pub secret_id: String,
    pub secret_key: String,
    pub token: Option<String>,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"***")
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct TencentConfig {
    pub credential: Credential,
    pub region: String,

    /// Base URL used for every service instead of
    /// `https://<service>.tencentcloudapi.com`
    pub endpoint: Option<String>,

    /// Per-request HTTP timeout
    pub request_timeout: Duration,
}

impl TencentConfig {
    pub fn new(secret_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            credential: Credential {
                secret_id: secret_id.into(),
                secret_key: secret_key.into(),
                token: None,
            },
            region: DEFAULT_REGION.to_string(),
            endpoint: None,
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Create TencentConfig from environment variables
    pub fn from_env() -> Result<Self> {
        let secret_id = std::env::var(ENV_SECRET_ID)
            .map_err(|_| TencentError::MissingEnvVar(ENV_SECRET_ID.to_string()))?;
        let secret_key = std::env::var(ENV_SECRET_KEY)
            .map_err(|_| TencentError::MissingEnvVar(ENV_SECRET_KEY.to_string()))?;

        let mut config = Self::new(secret_id, secret_key);
        config.credential.token = std::env::var(ENV_SECURITY_TOKEN).ok();
        if let Ok(region) = std::env::var(ENV_REGION) {
            config.region = region;
        }
        config.endpoint = std::env::var(ENV_ENDPOINT).ok();
        Ok(config)
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Base URL and `Host` header value for a service
    pub fn service_url(&self, service: &str) -> Result<(String, String)> {
        match &self.endpoint {
            Some(endpoint) => {
                let host = endpoint
                    .split_once("://")
                    .map(|(_, rest)| rest)
                    .unwrap_or(endpoint)
                    .trim_end_matches('/')
                    .to_string();
                if host.is_empty() {
                    return Err(TencentError::InvalidConfig(format!(
                        "invalid endpoint `{}`",
                        endpoint
                    )));
                }
                Ok((endpoint.trim_end_matches('/').to_string(), host))
            }
            None => {
                let host = format!("{}.{}", service, DEFAULT_DOMAIN);
                Ok((format!("https://{}", host), host))
            }
        }
    }
}
