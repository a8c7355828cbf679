//! Tencent Cloud API 3.0 client
//!
//! Every service is reached the same way: a signed JSON POST to
//! `https://<service>.tencentcloudapi.com` with the action named in the
//! `X-TC-Action` header. Responses are wrapped in a `{"Response": {...}}`
//! envelope that carries either the payload or an `Error` object.

use crate::config::TencentConfig;
use crate::error::{Result, TencentError};
use crate::sign;
use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// A Tencent Cloud service endpoint and its API version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Service {
    pub name: &'static str,
    pub version: &'static str,
}

impl Service {
    pub const fn new(name: &'static str, version: &'static str) -> Self {
        Self { name, version }
    }

    /// Build a request for `action` with a serializable request DTO
    pub fn request<T: Serialize>(&self, action: &'static str, payload: &T) -> Result<ApiRequest> {
        Ok(ApiRequest {
            service: *self,
            action,
            payload: serde_json::to_value(payload)?,
        })
    }
}

pub const KMS: Service = Service::new("kms", "2019-01-18");
pub const PRIVATE_DNS: Service = Service::new("privatedns", "2020-10-28");
pub const TDMQ: Service = Service::new("tdmq", "2020-02-17");
pub const CFS: Service = Service::new("cfs", "2019-07-19");
pub const STS: Service = Service::new("sts", "2018-08-13");

/// A single API action invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub service: Service,
    pub action: &'static str,
    pub payload: Value,
}

impl ApiRequest {
    /// `service:Action`, used in log lines and retry operation names
    pub fn operation(&self) -> String {
        format!("{}:{}", self.service.name, self.action)
    }
}

/// Transport for API actions
///
/// Returns the content of the `Response` object on success. Resources only
/// ever see this trait, so tests can substitute an in-memory backend.
#[async_trait]
pub trait TencentApi: Send + Sync {
    async fn call(&self, request: ApiRequest) -> Result<Value>;
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Envelope {
    response: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiErrorBody {
    code: String,
    message: String,
}

/// HTTP client signing requests with TC3-HMAC-SHA256
pub struct TencentClient {
    client: reqwest::Client,
    config: TencentConfig,
}

impl TencentClient {
    pub fn new(config: TencentConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn region(&self) -> &str {
        &self.config.region
    }
}

#[async_trait]
impl TencentApi for TencentClient {
    async fn call(&self, request: ApiRequest) -> Result<Value> {
        let (url, host) = self.config.service_url(request.service.name)?;
        let body = serde_json::to_string(&request.payload)?;
        let timestamp = chrono::Utc::now().timestamp();
        let authorization = sign::authorization(
            &self.config.credential,
            request.service.name,
            &host,
            timestamp,
            &body,
        )?;

        tracing::debug!("POST {} {}", url, request.operation());

        let mut builder = self
            .client
            .post(&url)
            .header("Authorization", authorization)
            .header("Content-Type", sign::CONTENT_TYPE)
            .header("X-TC-Action", request.action)
            .header("X-TC-Version", request.service.version)
            .header("X-TC-Timestamp", timestamp.to_string())
            .header("X-TC-Region", &self.config.region);
        if let Some(token) = &self.config.credential.token {
            builder = builder.header("X-TC-Token", token);
        }

        let response = builder.body(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        let envelope: Envelope = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(TencentError::HttpStatus {
                    status: status.as_u16(),
                    body: text,
                });
            }
            Err(e) => return Err(e.into()),
        };

        parse_response(envelope.response)
    }
}

/// Split the `Response` object into payload or API error
fn parse_response(mut response: Value) -> Result<Value> {
    let Some(object) = response.as_object_mut() else {
        return Err(TencentError::UnexpectedResponse(response.to_string()));
    };

    let request_id = object
        .get("RequestId")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    if let Some(error) = object.remove("Error") {
        let error: ApiErrorBody = serde_json::from_value(error)?;
        return Err(TencentError::Api {
            code: error.code,
            message: error.message,
            request_id,
        });
    }

    Ok(response)
}
