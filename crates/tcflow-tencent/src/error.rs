//! Tencent Cloud provider error types

use tcflow_cloud::CloudError;
use thiserror::Error;

/// Error codes that resolve on their own: rate limiting, backend hiccups and
/// resources that are busy with another operation.
const RETRYABLE_CODE_PREFIXES: &[&str] = &[
    "RequestLimitExceeded",
    "InternalError",
    "ResourceInUse",
    "ResourceBusy",
    "ResourceUnavailable",
    "FailedOperation.Conflict",
    "ClientError.NetworkError",
];

const NOT_FOUND_CODE_PREFIXES: &[&str] = &["ResourceNotFound"];

#[derive(Error, Debug)]
pub enum TencentError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("[{code}] {message} (RequestId: {request_id})")]
    Api {
        code: String,
        message: String,
        request_id: String,
    },

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl TencentError {
    /// API error code, when the remote side returned one
    pub fn code(&self) -> Option<&str> {
        match self {
            TencentError::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            TencentError::Api { code, .. } => RETRYABLE_CODE_PREFIXES
                .iter()
                .any(|prefix| code.starts_with(prefix)),
            TencentError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            TencentError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Whether the error reports a missing resource
    ///
    /// `extra_codes` lists resource-specific codes that also mean "absent".
    pub fn is_not_found(&self, extra_codes: &[&str]) -> bool {
        self.code().is_some_and(|code| {
            NOT_FOUND_CODE_PREFIXES
                .iter()
                .any(|prefix| code.starts_with(prefix))
                || extra_codes.contains(&code)
        })
    }

    /// Classify into the core error type
    ///
    /// Not-found takes precedence over retryable, since some services report
    /// missing resources under a `ResourceUnavailable.*` code.
    pub fn into_cloud_error(self, not_found_codes: &[&str]) -> CloudError {
        if self.is_not_found(not_found_codes) {
            return CloudError::ResourceNotFound(self.to_string());
        }
        if self.is_retryable() {
            return CloudError::Transient(self.to_string());
        }
        match self {
            TencentError::MissingEnvVar(_) | TencentError::InvalidConfig(_) => {
                CloudError::InvalidConfig(self.to_string())
            }
            TencentError::Api { ref code, .. } if code.starts_with("AuthFailure") => {
                CloudError::AuthenticationFailed(self.to_string())
            }
            other => CloudError::ApiError(other.to_string()),
        }
    }
}

impl From<TencentError> for CloudError {
    fn from(err: TencentError) -> Self {
        err.into_cloud_error(&[])
    }
}

pub type Result<T> = std::result::Result<T, TencentError>;
